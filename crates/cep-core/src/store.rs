// crates/cep-core/src/store.rs

//! [`PostalStore`] over the in-memory [`PostalDb`].
//!
//! All data is local, so the only failure mode is cancellation.

use crate::cep::Cep;
use crate::common::StoreStats;
use crate::error::{CepError, Result};
use crate::model::{
    CepRange, Locality, Neighborhood, PostalDb, RangeTable, RecordTable, ResolvedRecord, Street,
};
use crate::traits::{NameMatch, PostalStore};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

fn check(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(CepError::Cancelled)
    } else {
        Ok(())
    }
}

fn by_name<T: NameMatch>(a: &T, b: &T) -> std::cmp::Ordering {
    a.name_str().cmp(b.name_str())
}

/// Rows that belong to a state.
trait InUf {
    fn uf(&self) -> &str;
}

impl InUf for Locality {
    fn uf(&self) -> &str {
        &self.uf
    }
}

impl InUf for Neighborhood {
    fn uf(&self) -> &str {
        &self.uf
    }
}

impl InUf for Street {
    fn uf(&self) -> &str {
        &self.uf
    }
}

fn matching<T: NameMatch + InUf + Clone>(
    rows: &[T],
    term: &str,
    limit: usize,
    uf: Option<&str>,
) -> Vec<T> {
    let mut hits: Vec<T> = rows
        .iter()
        .filter(|r| uf.map_or(true, |u| r.uf() == u))
        .filter(|r| r.name_contains(term))
        .cloned()
        .collect();
    hits.sort_by(by_name);
    hits.truncate(limit);
    hits
}

#[async_trait]
impl PostalStore for PostalDb {
    async fn find_by_exact_cep(
        &self,
        table: RecordTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Option<ResolvedRecord>> {
        check(cancel)?;
        Ok(self.record_by_cep(table, cep))
    }

    async fn exists_by_cep(
        &self,
        table: RecordTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        check(cancel)?;
        Ok(self.has_cep(table, cep))
    }

    async fn find_range_containing(
        &self,
        table: RangeTable,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Option<CepRange>> {
        check(cancel)?;
        Ok(self.range_containing(table, cep).cloned())
    }

    async fn ranges_containing(
        &self,
        cep: &Cep,
        cancel: &CancellationToken,
    ) -> Result<Vec<(RangeTable, CepRange)>> {
        check(cancel)?;
        Ok(PostalDb::ranges_containing(self, cep)
            .into_iter()
            .map(|(t, r)| (t, r.clone()))
            .collect())
    }

    async fn locality_by_id(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Option<Locality>> {
        check(cancel)?;
        Ok(self.locality(id).cloned())
    }

    async fn neighborhood_by_id(
        &self,
        id: u32,
        cancel: &CancellationToken,
    ) -> Result<Option<Neighborhood>> {
        check(cancel)?;
        Ok(self.neighborhood(id).cloned())
    }

    async fn street_by_id(&self, id: u32, cancel: &CancellationToken) -> Result<Option<Street>> {
        check(cancel)?;
        Ok(self.street(id).cloned())
    }

    async fn search_streets(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        check(cancel)?;
        Ok(matching(&self.streets, term, limit, uf))
    }

    async fn search_neighborhoods(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>> {
        check(cancel)?;
        Ok(matching(&self.neighborhoods, term, limit, uf))
    }

    async fn search_localities(
        &self,
        term: &str,
        limit: usize,
        uf: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Locality>> {
        check(cancel)?;
        Ok(matching(&self.localities, term, limit, uf))
    }

    async fn list_streets(&self, cancel: &CancellationToken) -> Result<Vec<Street>> {
        check(cancel)?;
        Ok(self.streets.clone())
    }

    async fn list_neighborhoods(&self, cancel: &CancellationToken) -> Result<Vec<Neighborhood>> {
        check(cancel)?;
        Ok(self.neighborhoods.clone())
    }

    async fn list_localities(&self, cancel: &CancellationToken) -> Result<Vec<Locality>> {
        check(cancel)?;
        Ok(self.localities.clone())
    }

    async fn localities_by_uf(
        &self,
        uf: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Locality>> {
        check(cancel)?;
        let mut rows: Vec<Locality> = self
            .localities
            .iter()
            .filter(|l| l.uf == uf)
            .cloned()
            .collect();
        rows.sort_by(by_name);
        Ok(rows)
    }

    async fn neighborhoods_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Neighborhood>> {
        check(cancel)?;
        let mut rows: Vec<Neighborhood> = self
            .neighborhoods
            .iter()
            .filter(|n| n.locality_id == locality_id)
            .cloned()
            .collect();
        rows.sort_by(by_name);
        Ok(rows)
    }

    async fn streets_by_locality(
        &self,
        locality_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        check(cancel)?;
        let mut rows: Vec<Street> = self
            .streets
            .iter()
            .filter(|s| s.locality_id == locality_id)
            .cloned()
            .collect();
        rows.sort_by(by_name);
        Ok(rows)
    }

    async fn streets_by_neighborhood(
        &self,
        neighborhood_id: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<Street>> {
        check(cancel)?;
        let mut rows: Vec<Street> = self
            .streets
            .iter()
            .filter(|s| s.touches_neighborhood(neighborhood_id))
            .cloned()
            .collect();
        rows.sort_by(by_name);
        Ok(rows)
    }

    async fn stats(&self, cancel: &CancellationToken) -> Result<StoreStats> {
        check(cancel)?;
        Ok(PostalDb::stats(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"{
        "localities": [
            {"id": 1, "uf": "SP", "name": "São Paulo", "ibge_code": 3550308},
            {"id": 2, "uf": "SP", "name": "Santos", "cep": "11000-000"},
            {"id": 3, "uf": "RJ", "name": "Santo Antônio de Pádua"}
        ],
        "neighborhoods": [
            {"id": 10, "uf": "SP", "locality_id": 1, "name": "Bela Vista"},
            {"id": 11, "uf": "SP", "locality_id": 1, "name": "Consolação"}
        ],
        "streets": [
            {"id": 100, "uf": "SP", "locality_id": 1, "start_neighborhood_id": 10,
             "end_neighborhood_id": 11, "name": "Paulista", "type_prefix": "Avenida", "cep": "01310100"},
            {"id": 101, "uf": "SP", "locality_id": 1, "start_neighborhood_id": 11,
             "name": "Augusta", "type_prefix": "Rua", "cep": "01305000"}
        ]
    }"#;

    fn db() -> PostalDb {
        PostalDb::from_json_str(DATA).unwrap()
    }

    #[tokio::test]
    async fn cancelled_token_fails_before_reading() {
        let db = db();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let cep: Cep = "01310100".parse().unwrap();
        let err = db
            .find_by_exact_cep(RecordTable::Street, &cep, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, CepError::Cancelled));
        assert!(matches!(
            db.list_localities(&cancel).await,
            Err(CepError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn search_is_folded_filtered_and_limited() {
        let db = db();
        let cancel = CancellationToken::new();

        let hits = db.search_localities("SANTO", 10, None, &cancel).await.unwrap();
        let names: Vec<_> = hits.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Santo Antônio de Pádua", "Santos"]);

        let hits = db.search_localities("santo", 10, Some("SP"), &cancel).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = db.search_localities("sa", 1, None, &cancel).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = db.search_neighborhoods("consolacao", 5, None, &cancel).await.unwrap();
        assert_eq!(hits[0].id, 11);
    }

    #[tokio::test]
    async fn relation_queries() {
        let db = db();
        let cancel = CancellationToken::new();

        let streets = db.streets_by_neighborhood(11, &cancel).await.unwrap();
        let names: Vec<_> = streets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Augusta", "Paulista"]);

        assert_eq!(db.streets_by_locality(1, &cancel).await.unwrap().len(), 2);
        assert_eq!(db.neighborhoods_by_locality(1, &cancel).await.unwrap().len(), 2);
        assert_eq!(db.localities_by_uf("SP", &cancel).await.unwrap().len(), 2);
        assert!(db.exists_by_cep(RecordTable::Locality, &"11000000".parse().unwrap(), &cancel).await.unwrap());
        assert_eq!(db.street_by_id(101, &cancel).await.unwrap().map(|s| s.name), Some("Augusta".into()));
    }
}
