// crates/cep-core/src/geocode.rs

//! Approximate geocoding on top of [`CepService`].
//!
//! Coordinates are state capitals plus jitter (see [`geo`](crate::geo)). Two
//! calls for the same address may therefore return slightly different
//! positions unless a cached value is served.

use crate::cache::{geocode_key, reverse_key};
use crate::cep::Cep;
use crate::error::{CepError, Result};
use crate::geo::{self, GeoPoint};
use crate::model::{Address, AddressSource, Lookup, Page, PageRequest};
use crate::resolve::{locality_address, neighborhood_address, street_address};
use crate::service::CepService;
use crate::text::{non_blank, normalize_uf};
use crate::traits::{AddressCache, PostalStore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub const APPROXIMATE_STREET: &str = "Endereço aproximado";
pub const APPROXIMATE_NEIGHBORHOOD: &str = "Bairro aproximado";
pub const APPROXIMATE_LOCALITY: &str = "Localidade aproximada";

/// What to geocode: a CEP, or a street/locality/UF triple.
///
/// `complement` and `neighborhood` are only used when the address is built
/// from the triple.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeRequest {
    pub cep: Option<String>,
    pub street: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub locality: Option<String>,
    pub uf: Option<String>,
}

impl GeocodeRequest {
    pub fn by_cep(cep: impl Into<String>) -> Self {
        GeocodeRequest {
            cep: Some(cep.into()),
            ..Self::default()
        }
    }

    pub fn by_street(
        street: impl Into<String>,
        locality: impl Into<String>,
        uf: impl Into<String>,
    ) -> Self {
        GeocodeRequest {
            street: Some(street.into()),
            locality: Some(locality.into()),
            uf: Some(uf.into()),
            ..Self::default()
        }
    }

    /// Street, locality and UF, when all three are non-blank.
    fn street_triple(&self) -> Option<(&str, &str, &str)> {
        Some((
            non_blank(self.street.as_deref())?,
            non_blank(self.locality.as_deref())?,
            non_blank(self.uf.as_deref())?,
        ))
    }
}

/// One side of a distance or radius query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Cep(String),
    Coordinates(GeoPoint),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceReport {
    /// Rounded to two decimals.
    pub distance_km: f64,
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub from_address: Option<Address>,
    pub to_address: Option<Address>,
    /// [`Address::display_line`] of each side, when known.
    pub from_label: Option<String>,
    pub to_label: Option<String>,
}

/// Which records a radius search samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusKind {
    Locality,
    Street,
    Neighborhood,
    #[default]
    All,
}

impl FromStr for RadiusKind {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "localidade" | "locality" => Ok(RadiusKind::Locality),
            "logradouro" | "street" => Ok(RadiusKind::Street),
            "bairro" | "neighborhood" => Ok(RadiusKind::Neighborhood),
            "todos" | "all" => Ok(RadiusKind::All),
            other => Err(CepError::Format(format!(
                "unknown radius kind {other:?}, expected localidade, logradouro, bairro or todos"
            ))),
        }
    }
}

impl fmt::Display for RadiusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RadiusKind::Locality => "localidade",
            RadiusKind::Street => "logradouro",
            RadiusKind::Neighborhood => "bairro",
            RadiusKind::All => "todos",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadiusQuery {
    pub origin: Endpoint,
    pub radius_km: f64,
    pub kind: RadiusKind,
    pub page: usize,
    pub page_size: usize,
}

/// A radius-search hit with its approximate position and distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NearbyAddress {
    pub address: Address,
    pub distance_km: f64,
}

impl<S, C> CepService<S, C>
where
    S: PostalStore,
    C: AddressCache,
{
    fn approximate(&self, uf: Option<&str>) -> GeoPoint {
        geo::approximate_coordinates(uf, self.jitter.as_ref(), self.config.jitter_degrees)
    }

    /// Address with approximate coordinates.
    ///
    /// With a CEP the address is resolved first (cached for 30 days under
    /// `geocode:cep:{cep}`). When there is no CEP, or it is unknown, street,
    /// locality and UF are used to build an approximate address directly.
    #[instrument(skip(self, cancel))]
    pub async fn geocode(
        &self,
        request: &GeocodeRequest,
        cancel: &CancellationToken,
    ) -> Result<Lookup<Address>> {
        let cep = non_blank(request.cep.as_deref()).map(Cep::parse).transpose()?;
        let triple = request.street_triple();

        if let Some(cep) = &cep {
            match self.geocode_cep(cep, cancel).await? {
                Lookup::Found(address) => return Ok(Lookup::Found(address)),
                Lookup::NotFound(nf) if triple.is_none() => return Ok(Lookup::NotFound(nf)),
                Lookup::NotFound(_) => debug!(%cep, "unknown CEP, geocoding from street"),
            }
        }

        let Some((street, locality, uf)) = triple else {
            return Err(CepError::InsufficientInput(
                "geocoding needs a CEP or street, locality and UF".into(),
            ));
        };
        let uf = normalize_uf(uf)
            .ok_or_else(|| CepError::Format(format!("UF must be two letters, got {uf:?}")))?;

        let point = self.approximate(Some(&uf));
        Ok(Lookup::Found(Address {
            cep,
            street: Some(street.to_string()),
            complement: non_blank(request.complement.as_deref()).map(str::to_string),
            neighborhood: non_blank(request.neighborhood.as_deref()).map(str::to_string),
            locality: Some(locality.to_string()),
            uf: Some(uf),
            latitude: Some(point.latitude),
            longitude: Some(point.longitude),
            kind: Some(AddressSource::APPROXIMATE),
            ..Address::default()
        }))
    }

    pub(crate) async fn geocode_cep(
        &self,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Lookup<Address>> {
        let key = geocode_key(cep);
        if let Some(address) = self.cached::<Address>(&key, cancel).await? {
            debug!(%cep, "geocode cache hit");
            return Ok(Lookup::Found(address));
        }

        let mut address = match self.resolve(cep, cancel).await? {
            Lookup::Found(address) => address,
            Lookup::NotFound(nf) => return Ok(Lookup::NotFound(nf)),
        };
        let point = self.approximate(address.uf.as_deref());
        address.latitude = Some(point.latitude);
        address.longitude = Some(point.longitude);

        self.remember(&key, &address, self.config.geocode_cache_ttl(), cancel)
            .await?;
        Ok(Lookup::Found(address))
    }

    /// Placeholder address in the state whose capital is nearest.
    ///
    /// Cached for 30 days per five-decimal coordinate cell.
    #[instrument(skip(self, cancel))]
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> Result<Address> {
        let point = GeoPoint::new(latitude, longitude)?;
        let key = reverse_key(point.latitude, point.longitude);
        if let Some(address) = self.cached::<Address>(&key, cancel).await? {
            debug!(%key, "reverse geocode cache hit");
            return Ok(address);
        }

        let uf = geo::nearest_state(point.latitude, point.longitude);
        let address = Address {
            street: Some(APPROXIMATE_STREET.to_string()),
            neighborhood: Some(APPROXIMATE_NEIGHBORHOOD.to_string()),
            locality: Some(APPROXIMATE_LOCALITY.to_string()),
            uf: Some(uf.to_string()),
            latitude: Some(point.latitude),
            longitude: Some(point.longitude),
            kind: Some(AddressSource::APPROXIMATE),
            ..Address::default()
        };

        self.remember(&key, &address, self.config.reverse_cache_ttl(), cancel)
            .await?;
        info!(%uf, "reverse geocoded");
        Ok(address)
    }

    /// Point and, when available, address of one endpoint.
    ///
    /// `Ok(None)` means the CEP does not exist. The reverse geocode done for
    /// coordinate endpoints is display-only; its failure leaves the address
    /// empty.
    async fn locate(
        &self,
        endpoint: &Endpoint,
        cancel: &CancellationToken,
    ) -> Result<Option<(GeoPoint, Option<Address>)>> {
        match endpoint {
            Endpoint::Cep(raw) => {
                let cep = Cep::parse(raw)?;
                let address = match self.geocode_cep(&cep, cancel).await? {
                    Lookup::Found(a) => a,
                    Lookup::NotFound(_) => return Ok(None),
                };
                let point = match (address.latitude, address.longitude) {
                    (Some(lat), Some(lon)) => GeoPoint::new(lat, lon)?,
                    _ => self.approximate(address.uf.as_deref()),
                };
                Ok(Some((point, Some(address))))
            }
            Endpoint::Coordinates(p) => {
                let point = GeoPoint::new(p.latitude, p.longitude)?;
                let address = match self
                    .reverse_geocode(point.latitude, point.longitude, cancel)
                    .await
                {
                    Ok(a) => Some(a),
                    Err(CepError::Cancelled) => return Err(CepError::Cancelled),
                    Err(e) => {
                        warn!(error = %e, "reverse geocode for display failed");
                        None
                    }
                };
                Ok(Some((point, address)))
            }
        }
    }

    /// Great-circle distance between two CEPs or coordinate pairs.
    #[instrument(skip(self, cancel))]
    pub async fn distance(
        &self,
        from: &Endpoint,
        to: &Endpoint,
        cancel: &CancellationToken,
    ) -> Result<Lookup<DistanceReport>> {
        let Some((from_point, from_address)) = self.locate(from, cancel).await? else {
            return Ok(Lookup::not_found(format!("origin {from:?} not found")));
        };
        let Some((to_point, to_address)) = self.locate(to, cancel).await? else {
            return Ok(Lookup::not_found(format!("destination {to:?} not found")));
        };

        let distance_km = geo::round_km(from_point.distance_km(&to_point));
        info!(distance_km, "distance computed");
        Ok(Lookup::Found(DistanceReport {
            distance_km,
            from: from_point,
            to: to_point,
            from_label: from_address.as_ref().map(Address::display_line),
            to_label: to_address.as_ref().map(Address::display_line),
            from_address,
            to_address,
        }))
    }

    /// Records of the origin's state within `radius_km` of the origin.
    ///
    /// Candidates are sampled from the store (`radius_sample_size` rows,
    /// split evenly across kinds for [`RadiusKind::All`]), placed with the
    /// centroid approximation and kept when within the radius. Results are
    /// ordered by distance, then CEP, then display line; `total` counts all
    /// hits before pagination.
    #[instrument(skip(self, cancel))]
    pub async fn search_by_radius(
        &self,
        query: &RadiusQuery,
        cancel: &CancellationToken,
    ) -> Result<Lookup<Page<NearbyAddress>>> {
        if !(query.radius_km > 0.0 && query.radius_km <= self.config.max_radius_km) {
            return Err(CepError::Format(format!(
                "radius must be in (0, {}] km, got {}",
                self.config.max_radius_km, query.radius_km
            )));
        }
        let page = PageRequest::new(query.page, query.page_size, self.config.max_page_size)?;

        let Some((origin, _)) = self.locate_origin(&query.origin, cancel).await? else {
            return Ok(Lookup::not_found(format!("origin {:?} not found", query.origin)));
        };
        let uf = geo::nearest_state(origin.latitude, origin.longitude);

        let per_kind = match query.kind {
            RadiusKind::All => self.config.radius_sample_size / 3,
            _ => self.config.radius_sample_size,
        };
        let wants = |k: RadiusKind| query.kind == RadiusKind::All || query.kind == k;

        let mut candidates: Vec<Address> = Vec::new();
        if wants(RadiusKind::Locality) {
            for l in self.store.search_localities("", per_kind, Some(uf), cancel).await? {
                candidates.push(locality_address(&l));
            }
        }
        if wants(RadiusKind::Street) {
            for s in self.store.search_streets("", per_kind, Some(uf), cancel).await? {
                candidates.push(street_address(&self.store, s, cancel).await?);
            }
        }
        if wants(RadiusKind::Neighborhood) {
            for n in self.store.search_neighborhoods("", per_kind, Some(uf), cancel).await? {
                candidates.push(neighborhood_address(&self.store, &n, cancel).await?);
            }
        }

        let mut hits: Vec<NearbyAddress> = candidates
            .into_iter()
            .filter_map(|mut address| {
                let point = self.approximate(address.uf.as_deref().or(Some(uf)));
                let d = origin.distance_km(&point);
                if d > query.radius_km {
                    return None;
                }
                address.latitude = Some(point.latitude);
                address.longitude = Some(point.longitude);
                Some(NearbyAddress {
                    address,
                    distance_km: geo::round_km(d),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.address.cep.cmp(&b.address.cep))
                .then_with(|| a.address.display_line().cmp(&b.address.display_line()))
        });

        info!(%uf, radius_km = query.radius_km, hits = hits.len(), "radius search");
        Ok(Lookup::Found(page.paginate(hits)))
    }

    /// Like `locate`, without the display-only reverse geocode.
    async fn locate_origin(
        &self,
        endpoint: &Endpoint,
        cancel: &CancellationToken,
    ) -> Result<Option<(GeoPoint, Option<Address>)>> {
        match endpoint {
            Endpoint::Coordinates(p) => Ok(Some((GeoPoint::new(p.latitude, p.longitude)?, None))),
            Endpoint::Cep(_) => self.locate(endpoint, cancel).await,
        }
    }
}
