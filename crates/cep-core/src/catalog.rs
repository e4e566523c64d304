// crates/cep-core/src/catalog.rs

//! Entity-level queries: localities, neighborhoods and streets by id, by
//! relation, and through filtered, paginated searches.
//!
//! Filters are folded substring matches (accents and case ignored) except
//! UF, CEP and IBGE code, which must match exactly. All filters combine with
//! AND.

use crate::cep::Cep;
use crate::error::{CepError, Result};
use crate::model::{Locality, Lookup, Neighborhood, Page, PageRequest, RecordTable, ResolvedRecord, Street};
use crate::service::CepService;
use crate::text::{contains_folded, non_blank, normalize_uf};
use crate::traits::{AddressCache, PostalStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityQuery {
    pub name: Option<String>,
    pub uf: Option<String>,
    pub ibge_code: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodQuery {
    pub name: Option<String>,
    pub locality: Option<String>,
    pub uf: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetQuery {
    /// Matched against the name and against "type prefix + name".
    pub name: Option<String>,
    /// Matched against the start and the end neighborhood.
    pub neighborhood: Option<String>,
    pub locality: Option<String>,
    pub uf: Option<String>,
    pub cep: Option<String>,
}

/// Validates an optional UF filter. Blank means no filter.
pub(crate) fn uf_filter(uf: Option<&str>) -> Result<Option<String>> {
    match non_blank(uf) {
        None => Ok(None),
        Some(raw) => normalize_uf(raw)
            .map(Some)
            .ok_or_else(|| CepError::Format(format!("UF must be two letters, got {raw:?}"))),
    }
}

impl<S, C> CepService<S, C>
where
    S: PostalStore,
    C: AddressCache,
{
    fn page_request(&self, page: usize, page_size: usize) -> Result<PageRequest> {
        PageRequest::new(page, page_size, self.config.max_page_size)
    }

    pub async fn locality_by_id(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Lookup<Locality>> {
        let found = self.store.locality_by_id(id, cancel).await?;
        Ok(found.map_or_else(
            || Lookup::not_found(format!("locality {id} not found")),
            Lookup::Found,
        ))
    }

    /// Localities of a UF ordered by name.
    pub async fn localities_by_uf(
        &self,
        uf: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Locality>> {
        let uf = uf_filter(Some(uf))?
            .ok_or_else(|| CepError::Format("UF is required".into()))?;
        self.store.localities_by_uf(&uf, cancel).await
    }

    /// Ordered by UF, then name.
    pub async fn search_localities(
        &self,
        query: &LocalityQuery,
        page: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Locality>> {
        let page = self.page_request(page, page_size)?;
        let rows = self.filtered_localities(query, cancel).await?;
        Ok(page.paginate(rows))
    }

    pub(crate) async fn filtered_localities(
        &self,
        query: &LocalityQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Locality>> {
        let uf = uf_filter(query.uf.as_deref())?;
        let name = non_blank(query.name.as_deref());

        let mut rows: Vec<Locality> = self
            .store
            .list_localities(cancel)
            .await?
            .into_iter()
            .filter(|l| name.map_or(true, |n| contains_folded(&l.name, n)))
            .filter(|l| uf.as_deref().map_or(true, |u| l.uf == u))
            .filter(|l| query.ibge_code.map_or(true, |code| l.ibge_code == Some(code)))
            .collect();
        rows.sort_by(|a, b| (&a.uf, &a.name, a.id).cmp(&(&b.uf, &b.name, b.id)));
        Ok(rows)
    }

    pub async fn neighborhood_by_id(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Lookup<Neighborhood>> {
        let found = self.store.neighborhood_by_id(id, cancel).await?;
        Ok(found.map_or_else(
            || Lookup::not_found(format!("neighborhood {id} not found")),
            Lookup::Found,
        ))
    }

    pub async fn neighborhoods_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>> {
        self.store.neighborhoods_by_locality(locality_id, cancel).await
    }

    /// Ordered by UF, locality name, then name.
    pub async fn search_neighborhoods(
        &self,
        query: &NeighborhoodQuery,
        page: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Neighborhood>> {
        let page = self.page_request(page, page_size)?;
        let rows = self.filtered_neighborhoods(query, cancel).await?;
        Ok(page.paginate(rows))
    }

    pub(crate) async fn filtered_neighborhoods(
        &self,
        query: &NeighborhoodQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>> {
        let uf = uf_filter(query.uf.as_deref())?;
        let name = non_blank(query.name.as_deref());
        let locality = non_blank(query.locality.as_deref());

        let locality_names = self.locality_names(cancel).await?;
        let locality_of = |n: &Neighborhood| {
            locality_names
                .get(&n.locality_id)
                .map(String::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let mut rows: Vec<(String, Neighborhood)> = self
            .store
            .list_neighborhoods(cancel)
            .await?
            .into_iter()
            .filter(|n| name.map_or(true, |q| contains_folded(&n.name, q)))
            .filter(|n| {
                locality.map_or(true, |q| {
                    locality_names
                        .get(&n.locality_id)
                        .is_some_and(|l| contains_folded(l, q))
                })
            })
            .filter(|n| uf.as_deref().map_or(true, |u| n.uf == u))
            .map(|n| (locality_of(&n), n))
            .collect();
        rows.sort_by(|(la, a), (lb, b)| (&a.uf, la, &a.name, a.id).cmp(&(&b.uf, lb, &b.name, b.id)));
        Ok(rows.into_iter().map(|(_, n)| n).collect())
    }

    pub async fn street_by_id(&self, id: u32, cancel: &CancellationToken) -> Result<Lookup<Street>> {
        let found = self.store.street_by_id(id, cancel).await?;
        Ok(found.map_or_else(
            || Lookup::not_found(format!("street {id} not found")),
            Lookup::Found,
        ))
    }

    pub async fn street_by_cep(
        &self,
        raw_cep: &str,
        cancel: &CancellationToken,
    ) -> Result<Lookup<Street>> {
        let cep = Cep::parse(raw_cep)?;
        match self
            .store
            .find_by_exact_cep(RecordTable::Street, &cep, cancel)
            .await?
        {
            Some(ResolvedRecord::Street(s)) => Ok(Lookup::Found(s)),
            _ => Ok(Lookup::not_found(format!("no street with CEP {cep}"))),
        }
    }

    pub async fn streets_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        self.store.streets_by_locality(locality_id, cancel).await
    }

    /// Streets starting or ending in the neighborhood.
    pub async fn streets_by_neighborhood(
        &self,
        neighborhood_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        self.store
            .streets_by_neighborhood(neighborhood_id, cancel)
            .await
    }

    /// Ordered by UF, locality id, then name.
    pub async fn search_streets(
        &self,
        query: &StreetQuery,
        page: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Street>> {
        let page = self.page_request(page, page_size)?;
        let rows = self.filtered_streets(query, true, cancel).await?;
        Ok(page.paginate(rows))
    }

    /// `match_prefix` extends the name filter to "type prefix + name".
    pub(crate) async fn filtered_streets(
        &self,
        query: &StreetQuery,
        match_prefix: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        let uf = uf_filter(query.uf.as_deref())?;
        let cep = non_blank(query.cep.as_deref()).map(Cep::parse).transpose()?;
        let name = non_blank(query.name.as_deref());
        let neighborhood = non_blank(query.neighborhood.as_deref());
        let locality = non_blank(query.locality.as_deref());

        let locality_names = match locality {
            Some(_) => self.locality_names(cancel).await?,
            None => HashMap::new(),
        };
        let neighborhood_names = match neighborhood {
            Some(_) => self.neighborhood_names(cancel).await?,
            None => HashMap::new(),
        };

        let name_matches = |s: &Street, q: &str| {
            contains_folded(&s.name, q)
                || (match_prefix && contains_folded(&format!("{} {}", s.type_prefix, s.name), q))
        };
        let in_neighborhood = |s: &Street, q: &str| {
            [s.start_neighborhood_id, s.end_neighborhood_id]
                .into_iter()
                .flatten()
                .filter_map(|id| neighborhood_names.get(&id))
                .any(|n| contains_folded(n, q))
        };

        let mut rows: Vec<Street> = self
            .store
            .list_streets(cancel)
            .await?
            .into_iter()
            .filter(|s| name.map_or(true, |q| name_matches(s, q)))
            .filter(|s| neighborhood.map_or(true, |q| in_neighborhood(s, q)))
            .filter(|s| {
                locality.map_or(true, |q| {
                    locality_names
                        .get(&s.locality_id)
                        .is_some_and(|l| contains_folded(l, q))
                })
            })
            .filter(|s| uf.as_deref().map_or(true, |u| s.uf == u))
            .filter(|s| cep.as_ref().map_or(true, |c| &s.cep == c))
            .collect();
        rows.sort_by(|a, b| {
            (&a.uf, a.locality_id, &a.name, a.id).cmp(&(&b.uf, b.locality_id, &b.name, b.id))
        });
        Ok(rows)
    }

    async fn locality_names(&self, cancel: &CancellationToken) -> Result<HashMap<u32, String>> {
        Ok(self
            .store
            .list_localities(cancel)
            .await?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect())
    }

    async fn neighborhood_names(&self, cancel: &CancellationToken) -> Result<HashMap<u32, String>> {
        Ok(self
            .store
            .list_neighborhoods(cancel)
            .await?
            .into_iter()
            .map(|n| (n.id, n.name))
            .collect())
    }
}
