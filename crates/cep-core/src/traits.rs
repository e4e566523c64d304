// crates/cep-core/src/traits.rs
use crate::cep::Cep;
use crate::common::StoreStats;
use crate::error::Result;
use crate::model::{
    CepRange, Locality, Neighborhood, RangeTable, RecordTable, ResolvedRecord, Street,
};
use crate::text::fold_key;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Name-based matching helpers for types that expose a canonical display name.
///
/// Comparisons are accent- and case-insensitive through [`fold_key`].
///
/// # Examples
/// ```rust
/// use cep_core::traits::NameMatch;
///
/// struct Place(&'static str);
/// impl NameMatch for Place {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Place("Goiânia").is_named("goiania"));
/// assert!(Place("São José dos Campos").name_contains("jose dos"));
/// ```
pub trait NameMatch {
    /// Returns the canonical display name used for matching.
    fn name_str(&self) -> &str;

    #[inline]
    fn is_named(&self, q: &str) -> bool {
        fold_key(self.name_str()) == fold_key(q)
    }

    #[inline]
    fn name_contains(&self, q: &str) -> bool {
        fold_key(self.name_str()).contains(&fold_key(q))
    }
}

/// The postal record store.
///
/// Every call is an I/O boundary and takes a cancellation token. A token that
/// is already cancelled fails the call with
/// [`CepError::Cancelled`](crate::CepError::Cancelled) before any data is
/// touched. Implementations report their own outages as
/// [`CepError::Upstream`](crate::CepError::Upstream).
#[async_trait]
pub trait PostalStore: Send + Sync {
    /// Exact CEP match in one record table.
    async fn find_by_exact_cep(
        &self,
        table: RecordTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedRecord>>;

    async fn exists_by_cep(
        &self,
        table: RecordTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<bool>;

    /// The winning range containing `cep`: narrowest span, then lowest start,
    /// then lowest owner.
    async fn find_range_containing(
        &self,
        table: RangeTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Option<CepRange>>;

    /// Every range of every table containing `cep`, in table order.
    async fn ranges_containing(
        &self,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Vec<(RangeTable, CepRange)>>;

    async fn locality_by_id(&self, id: u32, cancel: &CancellationToken)
        -> Result<Option<Locality>>;

    async fn neighborhood_by_id(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Option<Neighborhood>>;

    async fn street_by_id(&self, id: u32, cancel: &CancellationToken) -> Result<Option<Street>>;

    /// Streets whose name contains `term` (folded), optionally restricted to
    /// one UF, at most `limit` rows ordered by name.
    async fn search_streets(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>>;

    async fn search_neighborhoods(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>>;

    async fn search_localities(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Locality>>;

    async fn list_streets(&self, cancel: &CancellationToken) -> Result<Vec<Street>>;

    async fn list_neighborhoods(&self, cancel: &CancellationToken) -> Result<Vec<Neighborhood>>;

    async fn list_localities(&self, cancel: &CancellationToken) -> Result<Vec<Locality>>;

    /// Localities of one UF ordered by name.
    async fn localities_by_uf(&self, uf: &str, cancel: &CancellationToken)
        -> Result<Vec<Locality>>;

    /// Neighborhoods of one locality ordered by name.
    async fn neighborhoods_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>>;

    /// Streets of one locality ordered by name.
    async fn streets_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>>;

    /// Streets starting or ending in a neighborhood, ordered by name.
    async fn streets_by_neighborhood(
        &self,
        neighborhood_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>>;

    async fn stats(&self, cancel: &CancellationToken) -> Result<StoreStats>;
}

/// Key/value cache over serialized JSON values.
///
/// Last write wins. A cancelled token fails the call with
/// [`CepError::Cancelled`](crate::CepError::Cancelled) and never writes.
#[async_trait]
pub trait AddressCache: Send + Sync {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<String>>;

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
        cancel: &CancellationToken,
    ) -> Result<()>;
}

/// Source of the coordinate jitter applied to approximate positions.
pub trait JitterSource: Send + Sync {
    /// A value in `[-max_abs, max_abs]`.
    fn jitter(&self, max_abs: f64) -> f64;
}
