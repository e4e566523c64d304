// crates/cep-core/src/search.rs

//! Free-text address search and autocomplete.

use crate::catalog::{uf_filter, LocalityQuery, NeighborhoodQuery, StreetQuery};
use crate::cep::Cep;
use crate::error::{CepError, Result};
use crate::model::{Address, Lookup, Page};
use crate::resolve::{locality_address, neighborhood_address, street_address};
use crate::service::CepService;
use crate::text::non_blank;
use crate::traits::{AddressCache, PostalStore};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Minimum autocomplete term length, in characters.
pub const MIN_AUTOCOMPLETE_TERM: usize = 3;

/// Filters of [`CepService::search_addresses`]. At least one must be set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
    pub cep: Option<String>,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub locality: Option<String>,
    pub uf: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutocompleteKind {
    Street,
    Neighborhood,
    Locality,
}

impl FromStr for AutocompleteKind {
    type Err = CepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logradouro" | "street" => Ok(AutocompleteKind::Street),
            "bairro" | "neighborhood" => Ok(AutocompleteKind::Neighborhood),
            "localidade" | "locality" => Ok(AutocompleteKind::Locality),
            other => Err(CepError::Format(format!(
                "unknown kind {other:?}, expected logradouro, bairro or localidade"
            ))),
        }
    }
}

impl<S, C> CepService<S, C>
where
    S: PostalStore,
    C: AddressCache,
{
    /// Searches addresses by the most specific filter given.
    ///
    /// * CEP: the resolved address, or an empty page.
    /// * street: streets, further filtered by neighborhood, locality and UF.
    /// * neighborhood: neighborhoods, filtered by locality and UF.
    /// * locality or UF: localities.
    #[instrument(skip(self, cancel))]
    pub async fn search_addresses(
        &self,
        query: &AddressQuery,
        page: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<Address>> {
        let request = crate::model::PageRequest::new(page, page_size, self.config.max_page_size)?;
        let uf = uf_filter(query.uf.as_deref())?;

        let result = if let Some(raw) = non_blank(query.cep.as_deref()) {
            let cep = Cep::parse(raw)?;
            let found = match self.resolve(&cep, cancel).await? {
                Lookup::Found(address) => vec![address],
                Lookup::NotFound(_) => Vec::new(),
            };
            request.paginate(found)
        } else if let Some(street) = non_blank(query.street.as_deref()) {
            let filter = StreetQuery {
                name: Some(street.to_string()),
                neighborhood: query.neighborhood.clone(),
                locality: query.locality.clone(),
                uf: uf.clone(),
                cep: None,
            };
            let streets = request.paginate(self.filtered_streets(&filter, false, cancel).await?);
            let mut items = Vec::with_capacity(streets.items.len());
            for s in streets.items {
                items.push(street_address(&self.store, s, cancel).await?);
            }
            Page {
                items,
                total: streets.total,
                page: streets.page,
                page_size: streets.page_size,
            }
        } else if let Some(neighborhood) = non_blank(query.neighborhood.as_deref()) {
            let filter = NeighborhoodQuery {
                name: Some(neighborhood.to_string()),
                locality: query.locality.clone(),
                uf: uf.clone(),
            };
            let rows = request.paginate(self.filtered_neighborhoods(&filter, cancel).await?);
            let mut items = Vec::with_capacity(rows.items.len());
            for n in &rows.items {
                items.push(neighborhood_address(&self.store, n, cancel).await?);
            }
            Page {
                items,
                total: rows.total,
                page: rows.page,
                page_size: rows.page_size,
            }
        } else if non_blank(query.locality.as_deref()).is_some() || uf.is_some() {
            let filter = LocalityQuery {
                name: query.locality.clone(),
                uf: uf.clone(),
                ibge_code: None,
            };
            request
                .paginate(self.filtered_localities(&filter, cancel).await?)
                .map(|l| locality_address(&l))
        } else {
            return Err(CepError::Format(
                "at least one of cep, street, neighborhood, locality or uf is required".into(),
            ));
        };

        info!(total = result.total, "address search");
        Ok(result)
    }

    /// Suggestions for a partial name.
    ///
    /// Without a kind, streets, neighborhoods and localities are queried
    /// concurrently, each capped at `limit / 3`, and the combined list is cut
    /// to `limit`. With a kind, only that table is queried, capped at `limit`.
    #[instrument(skip(self, cancel))]
    pub async fn autocomplete(
        &self,
        term: &str,
        kind: Option<AutocompleteKind>,
        uf: Option<&str>,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Address>> {
        let term = term.trim();
        if term.chars().count() < MIN_AUTOCOMPLETE_TERM {
            return Err(CepError::Format(format!(
                "term must have at least {MIN_AUTOCOMPLETE_TERM} characters"
            )));
        }
        let max = self.config.max_autocomplete_limit;
        if limit == 0 || limit > max {
            return Err(CepError::Format(format!(
                "limit must be between 1 and {max}, got {limit}"
            )));
        }
        let uf = uf_filter(uf)?;
        let uf = uf.as_deref();

        let cap = if kind.is_none() { limit / 3 } else { limit };
        let wants = |k: AutocompleteKind| kind.map_or(true, |x| x == k);

        let streets = async {
            if wants(AutocompleteKind::Street) {
                self.store.search_streets(term, cap, uf, cancel).await
            } else {
                Ok(Vec::new())
            }
        };
        let neighborhoods = async {
            if wants(AutocompleteKind::Neighborhood) {
                self.store.search_neighborhoods(term, cap, uf, cancel).await
            } else {
                Ok(Vec::new())
            }
        };
        let localities = async {
            if wants(AutocompleteKind::Locality) {
                self.store.search_localities(term, cap, uf, cancel).await
            } else {
                Ok(Vec::new())
            }
        };
        let (streets, neighborhoods, localities) =
            futures::try_join!(streets, neighborhoods, localities)?;

        let mut results = Vec::with_capacity(streets.len() + neighborhoods.len() + localities.len());
        for s in streets {
            results.push(street_address(&self.store, s, cancel).await?);
        }
        for n in &neighborhoods {
            results.push(neighborhood_address(&self.store, n, cancel).await?);
        }
        results.extend(localities.iter().map(locality_address));

        if kind.is_none() {
            results.truncate(limit);
        }
        info!(results = results.len(), "autocomplete");
        Ok(results)
    }
}
