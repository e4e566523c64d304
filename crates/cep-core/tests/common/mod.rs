// crates/cep-core/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use cep_core::model::convert::from_raw;
use cep_core::model::raw::{DatasetRaw, LocalityRaw};
use cep_core::{
    Cep, CepError, CepRange, CepService, Locality, MemoryCache, Neighborhood, PostalDb,
    PostalStore, RangeTable, RecordTable, ResolvedRecord, Result, StoreStats, Street, ZeroJitter,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

pub const SAMPLE_JSON: &str = include_str!("../../data/sample.json");

/// The bundled sample plus one locality sharing CEP 01310930 with a large
/// user, to exercise classification precedence.
pub fn fixture_db() -> PostalDb {
    let mut raw: DatasetRaw = serde_json::from_str(SAMPLE_JSON).unwrap();
    raw.localities.push(LocalityRaw {
        id: 99,
        uf: "SP".into(),
        name: "Distrito Paulista".into(),
        cep: Some("01310930".into()),
        ibge_code: None,
        situation: Some("1".into()),
        locality_type: Some("D".into()),
        parent_id: Some(1),
        abbreviation: None,
    });
    from_raw(raw).unwrap()
}

pub fn service() -> CepService<PostalDb, MemoryCache> {
    CepService::new(fixture_db(), MemoryCache::new()).with_jitter(ZeroJitter)
}

pub fn counting_service() -> CepService<CountingStore, MemoryCache> {
    CepService::new(CountingStore::new(fixture_db()), MemoryCache::new()).with_jitter(ZeroJitter)
}

pub fn token() -> CancellationToken {
    CancellationToken::new()
}

pub fn cep(s: &str) -> Cep {
    s.parse().unwrap()
}

/// Wraps a [`PostalDb`], counts calls and can be switched into an outage.
pub struct CountingStore {
    inner: PostalDb,
    calls: AtomicUsize,
    down: AtomicBool,
}

impl CountingStore {
    pub fn new(inner: PostalDb) -> Self {
        CountingStore {
            inner,
            calls: AtomicUsize::new(0),
            down: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn gate(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            Err(CepError::Upstream("store unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PostalStore for CountingStore {
    async fn find_by_exact_cep(
        &self,
        table: RecordTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedRecord>> {
        self.gate()?;
        self.inner.find_by_exact_cep(table, cep, cancel).await
    }

    async fn exists_by_cep(
        &self,
        table: RecordTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        self.gate()?;
        self.inner.exists_by_cep(table, cep, cancel).await
    }

    async fn find_range_containing(
        &self,
        table: RangeTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Option<CepRange>> {
        self.gate()?;
        self.inner.find_range_containing(table, cep, cancel).await
    }

    async fn ranges_containing(
        &self,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Vec<(RangeTable, CepRange)>> {
        self.gate()?;
        PostalStore::ranges_containing(&self.inner, cep, cancel).await
    }

    async fn locality_by_id(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Option<Locality>> {
        self.gate()?;
        self.inner.locality_by_id(id, cancel).await
    }

    async fn neighborhood_by_id(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Option<Neighborhood>> {
        self.gate()?;
        self.inner.neighborhood_by_id(id, cancel).await
    }

    async fn street_by_id(&self, id: u32, cancel: &CancellationToken) -> Result<Option<Street>> {
        self.gate()?;
        self.inner.street_by_id(id, cancel).await
    }

    async fn search_streets(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        self.gate()?;
        self.inner.search_streets(term, limit, uf, cancel).await
    }

    async fn search_neighborhoods(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>> {
        self.gate()?;
        self.inner.search_neighborhoods(term, limit, uf, cancel).await
    }

    async fn search_localities(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Locality>> {
        self.gate()?;
        self.inner.search_localities(term, limit, uf, cancel).await
    }

    async fn list_streets(&self, cancel: &CancellationToken) -> Result<Vec<Street>> {
        self.gate()?;
        self.inner.list_streets(cancel).await
    }

    async fn list_neighborhoods(&self, cancel: &CancellationToken) -> Result<Vec<Neighborhood>> {
        self.gate()?;
        self.inner.list_neighborhoods(cancel).await
    }

    async fn list_localities(&self, cancel: &CancellationToken) -> Result<Vec<Locality>> {
        self.gate()?;
        self.inner.list_localities(cancel).await
    }

    async fn localities_by_uf(
        &self,
        uf: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Locality>> {
        self.gate()?;
        self.inner.localities_by_uf(uf, cancel).await
    }

    async fn neighborhoods_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>> {
        self.gate()?;
        self.inner.neighborhoods_by_locality(locality_id, cancel).await
    }

    async fn streets_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        self.gate()?;
        self.inner.streets_by_locality(locality_id, cancel).await
    }

    async fn streets_by_neighborhood(
        &self,
        neighborhood_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        self.gate()?;
        self.inner.streets_by_neighborhood(neighborhood_id, cancel).await
    }

    async fn stats(&self, cancel: &CancellationToken) -> Result<StoreStats> {
        self.gate()?;
        PostalStore::stats(&self.inner, cancel).await
    }
}
