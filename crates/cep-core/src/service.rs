// crates/cep-core/src/service.rs

//! # Lookup service
//!
//! [`CepService`] wires a [`PostalStore`], an [`AddressCache`] and a
//! [`JitterSource`] together and exposes the public operations. The CEP
//! operations live here; geocoding is in [`geocode`](crate::geocode), search
//! and catalog queries in [`search`](crate::search) and
//! [`catalog`](crate::catalog).
//!
//! Input is validated before any I/O. Store and cache failures propagate
//! unchanged; nothing is retried.

use crate::cache::{address_key, MemoryCache};
use crate::cep::Cep;
use crate::classify::{self, Classification};
use crate::common::StoreStats;
use crate::config::ServiceConfig;
use crate::error::{CepError, Result};
use crate::geo::RandomJitter;
use crate::model::{Address, AddressKind, CepRange, CepValidation, Lookup, RangeTable};
use crate::resolve::compose_address;
use crate::traits::{AddressCache, JitterSource, PostalStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// A range containing a CEP, with the table it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeHit {
    pub table: RangeTable,
    /// Classification the range implies; `None` for operational-unit ranges.
    pub kind: Option<AddressKind>,
    pub range: CepRange,
}

pub struct CepService<S, C = MemoryCache> {
    pub(crate) store: S,
    pub(crate) cache: C,
    pub(crate) jitter: Box<dyn JitterSource>,
    pub(crate) config: ServiceConfig,
}

impl<S, C> CepService<S, C>
where
    S: PostalStore,
    C: AddressCache,
{
    /// Random jitter and default configuration.
    pub fn new(store: S, cache: C) -> Self {
        CepService {
            store,
            cache,
            jitter: Box::new(RandomJitter),
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_jitter(mut self, jitter: impl JitterSource + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Parses a raw CEP and resolves it to an address.
    #[instrument(skip(self, cancel))]
    pub async fn lookup(&self, raw_cep: &str, cancel: &CancellationToken) -> Result<Lookup<Address>> {
        let cep = Cep::parse(raw_cep)?;
        self.resolve(&cep, cancel).await
    }

    /// Resolves a CEP to an address, going through the cache first.
    ///
    /// Record tables are tried in priority order (Locality, Street, LargeUser,
    /// OperationalUnit, CommunityPoBox), then the UF, Locality and
    /// Neighborhood ranges. Successful resolutions are cached.
    pub async fn resolve(&self, cep: &Cep, cancel: &CancellationToken) -> Result<Lookup<Address>> {
        let key = address_key(cep);
        if let Some(address) = self.cached::<Address>(&key, cancel).await? {
            debug!(%cep, "address cache hit");
            return Ok(Lookup::Found(address));
        }

        let Some(record) = classify::find_record(&self.store, cep, cancel).await? else {
            info!(%cep, "CEP not found");
            return Ok(Lookup::not_found(format!("CEP {cep} not found")));
        };

        let address = compose_address(&self.store, cep, &record, cancel).await?;
        self.remember(&key, &address, self.config.cep_cache_ttl(), cancel)
            .await?;
        info!(%cep, kind = %record.kind(), "CEP resolved");
        Ok(Lookup::Found(address))
    }

    /// `{valid, kind}` for a raw CEP.
    ///
    /// `valid` comes from the existence sweep over every table; `kind` from
    /// the classifier, so the suffix heuristic decides it when it applies.
    #[instrument(skip(self, cancel))]
    pub async fn validate_cep(
        &self,
        raw_cep: &str,
        cancel: &CancellationToken,
    ) -> Result<CepValidation> {
        let cep = Cep::parse(raw_cep)?;
        if !classify::cep_exists(&self.store, &cep, cancel).await? {
            return Ok(CepValidation {
                valid: false,
                kind: None,
            });
        }
        let classification = classify::classify(&self.store, &cep, cancel).await?;
        Ok(CepValidation {
            valid: true,
            kind: Some(classification.kind),
        })
    }

    pub async fn classify(
        &self,
        raw_cep: &str,
        cancel: &CancellationToken,
    ) -> Result<Classification> {
        let cep = Cep::parse(raw_cep)?;
        classify::classify(&self.store, &cep, cancel).await
    }

    pub async fn cep_exists(&self, raw_cep: &str, cancel: &CancellationToken) -> Result<bool> {
        let cep = Cep::parse(raw_cep)?;
        classify::cep_exists(&self.store, &cep, cancel).await
    }

    /// Every range of every table containing the CEP, operational-unit
    /// ranges included.
    pub async fn ranges_for_cep(
        &self,
        raw_cep: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RangeHit>> {
        let cep = Cep::parse(raw_cep)?;
        let hits = self.store.ranges_containing(&cep, cancel).await?;
        Ok(hits
            .into_iter()
            .map(|(table, range)| RangeHit {
                table,
                kind: table.kind(),
                range,
            })
            .collect())
    }

    pub async fn stats(&self, cancel: &CancellationToken) -> Result<StoreStats> {
        self.store.stats(cancel).await
    }

    /// Cached value for `key`. An undecodable entry counts as a miss.
    pub(crate) async fn cached<T: DeserializeOwned>(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let Some(raw) = self.cache.get(key, cancel).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    /// Stores `value` under `key`. Skipped once the request is cancelled.
    pub(crate) async fn remember<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(CepError::Cancelled);
        }
        let json = serde_json::to_string(value)?;
        self.cache.set(key, json, ttl, cancel).await
    }
}
