// crates/cep-core/src/resolve.rs

//! Builds an [`Address`] out of a matched record.
//!
//! Relations are followed through explicit store lookups by id. A dangling
//! id leaves the corresponding field empty; range hits in particular often
//! only yield a UF, and that partial address is still a valid answer.

use crate::cep::Cep;
use crate::error::Result;
use crate::model::{
    Address, AddressKind, AddressSource, CepRange, RangeOwner, RangeTable, ResolvedRecord,
};
use crate::text::non_blank;
use crate::traits::PostalStore;
use tokio_util::sync::CancellationToken;

fn text(s: &str) -> Option<String> {
    non_blank(Some(s)).map(str::to_string)
}

fn opt_text(s: Option<&str>) -> Option<String> {
    non_blank(s).map(str::to_string)
}

/// Composes the address for `record`, which was found for `cep`.
pub async fn compose_address<S>(
    store: &S,
    cep: &Cep,
    record: &ResolvedRecord,
    cancel: &CancellationToken,
) -> Result<Address>
where
    S: PostalStore + ?Sized,
{
    let mut address = Address {
        cep: Some(cep.clone()),
        kind: Some(AddressSource::from(record.kind())),
        ..Address::default()
    };

    match record {
        ResolvedRecord::Locality(l) => {
            address.locality = text(&l.name);
            address.uf = text(&l.uf);
        }
        ResolvedRecord::Street(s) => {
            address.street_type = text(&s.type_prefix);
            address.street = text(&s.name);
            address.complement = opt_text(s.complement.as_deref());
            address.uf = text(&s.uf);
            if let Some(id) = s.start_neighborhood_id.or(s.end_neighborhood_id) {
                address.neighborhood = neighborhood_name(store, id, cancel).await?;
            }
            address.locality = locality_name(store, s.locality_id, cancel).await?;
        }
        ResolvedRecord::LargeUser(u) => {
            address.street = text(&u.name);
            address.complement = text(&u.address);
            address.uf = text(&u.uf);
            if let Some(id) = u.neighborhood_id {
                address.neighborhood = neighborhood_name(store, id, cancel).await?;
            }
            address.locality = locality_name(store, u.locality_id, cancel).await?;
        }
        ResolvedRecord::OperationalUnit(u) => {
            address.street = text(&u.name);
            address.complement = text(&u.address);
            address.uf = text(&u.uf);
            if let Some(id) = u.neighborhood_id {
                address.neighborhood = neighborhood_name(store, id, cancel).await?;
            }
            address.locality = locality_name(store, u.locality_id, cancel).await?;
        }
        ResolvedRecord::CommunityPoBox(b) => {
            address.street = text(&b.name);
            address.complement = text(&b.address);
            address.uf = text(&b.uf);
            address.locality = locality_name(store, b.locality_id, cancel).await?;
        }
        ResolvedRecord::RangeUf(r)
        | ResolvedRecord::RangeLocality(r)
        | ResolvedRecord::RangeNeighborhood(r) => {
            fill_from_range(store, cep, r, &mut address, cancel).await?;
        }
    }

    Ok(address)
}

async fn fill_from_range<S>(
    store: &S,
    cep: &Cep,
    range: &CepRange,
    address: &mut Address,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: PostalStore + ?Sized,
{
    match &range.owner {
        RangeOwner::Uf(uf) => {
            address.uf = text(uf);
        }
        RangeOwner::Locality(id) => {
            if let Some(l) = store.locality_by_id(*id, cancel).await? {
                address.locality = text(&l.name);
                address.uf = text(&l.uf);
            }
        }
        RangeOwner::Neighborhood(id) => {
            if let Some(n) = store.neighborhood_by_id(*id, cancel).await? {
                address.neighborhood = text(&n.name);
                address.uf = text(&n.uf);
                address.locality = locality_name(store, n.locality_id, cancel).await?;
            }
        }
        RangeOwner::OperationalUnit(_) => {}
    }

    // Owner could not be resolved: the UF table still knows the state.
    if address.uf.is_none() {
        if let Some(uf_range) = store
            .find_range_containing(RangeTable::Uf, cep, cancel)
            .await?
        {
            if let RangeOwner::Uf(uf) = uf_range.owner {
                address.uf = text(&uf);
            }
        }
    }
    Ok(())
}

async fn locality_name<S>(store: &S, id: u32, cancel: &CancellationToken) -> Result<Option<String>>
where
    S: PostalStore + ?Sized,
{
    Ok(store
        .locality_by_id(id, cancel)
        .await?
        .and_then(|l| text(&l.name)))
}

async fn neighborhood_name<S>(
    store: &S,
    id: u32,
    cancel: &CancellationToken,
) -> Result<Option<String>>
where
    S: PostalStore + ?Sized,
{
    Ok(store
        .neighborhood_by_id(id, cancel)
        .await?
        .and_then(|n| text(&n.name)))
}

/// Address for a bare street row, as produced by search and autocomplete.
pub(crate) async fn street_address<S>(
    store: &S,
    street: crate::model::Street,
    cancel: &CancellationToken,
) -> Result<Address>
where
    S: PostalStore + ?Sized,
{
    let cep = street.cep.clone();
    compose_address(store, &cep, &ResolvedRecord::Street(street), cancel).await
}

/// Address for a neighborhood row: name, locality and UF.
pub(crate) async fn neighborhood_address<S>(
    store: &S,
    neighborhood: &crate::model::Neighborhood,
    cancel: &CancellationToken,
) -> Result<Address>
where
    S: PostalStore + ?Sized,
{
    Ok(Address {
        neighborhood: text(&neighborhood.name),
        locality: locality_name(store, neighborhood.locality_id, cancel).await?,
        uf: text(&neighborhood.uf),
        kind: Some(AddressSource::from(AddressKind::Neighborhood)),
        ..Address::default()
    })
}

/// Address for a locality row.
pub(crate) fn locality_address(locality: &crate::model::Locality) -> Address {
    Address {
        cep: locality.cep.clone(),
        locality: text(&locality.name),
        uf: text(&locality.uf),
        kind: Some(AddressSource::from(AddressKind::Locality)),
        ..Address::default()
    }
}
