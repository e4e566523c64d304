// crates/cep-core/src/classify.rs

//! # CEP classification
//!
//! Works out which kind of postal entity a code belongs to. Checks run one at
//! a time in a fixed order and the first hit wins:
//!
//! 1. suffix heuristic (no I/O): 900–959, 970–989/999, 990–998
//! 2. exact record: Locality, then Street
//! 3. containing range: UF, then Locality, then Neighborhood
//! 4. otherwise [`AddressKind::Unknown`]
//!
//! The heuristic is applied before any lookup, so a code ending in 930 is a
//! large user even when a locality row carries the same code.
//!
//! [`find_record`] is the richer variant used for resolution: it looks at all
//! five record tables, then the three range tables, and returns the record.

use crate::cep::Cep;
use crate::error::Result;
use crate::model::{AddressKind, RangeTable, RecordTable, ResolvedRecord};
use crate::traits::PostalStore;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Kind of a CEP plus the record that decided it, when there is one.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Classification {
    pub cep: Cep,
    pub kind: AddressKind,
    /// Absent for suffix-heuristic hits and for `Unknown`.
    pub record: Option<ResolvedRecord>,
}

/// Record tables consulted by [`classify`] after the suffix heuristic.
const CLASSIFY_RECORD_TABLES: [RecordTable; 2] = [RecordTable::Locality, RecordTable::Street];

pub async fn classify<S>(store: &S, cep: &Cep, cancel: &CancellationToken) -> Result<Classification>
where
    S: PostalStore + ?Sized,
{
    if let Some(kind) = cep.suffix_kind() {
        debug!(%cep, %kind, "classified by suffix");
        return Ok(Classification {
            cep: cep.clone(),
            kind,
            record: None,
        });
    }

    for table in CLASSIFY_RECORD_TABLES {
        if let Some(record) = store.find_by_exact_cep(table, cep, cancel).await? {
            let kind = record.kind();
            debug!(%cep, %kind, "classified by exact record");
            return Ok(Classification {
                cep: cep.clone(),
                kind,
                record: Some(record),
            });
        }
    }

    if let Some(record) = find_in_ranges(store, cep, cancel).await? {
        let kind = record.kind();
        debug!(%cep, %kind, "classified by range");
        return Ok(Classification {
            cep: cep.clone(),
            kind,
            record: Some(record),
        });
    }

    debug!(%cep, "no classification");
    Ok(Classification {
        cep: cep.clone(),
        kind: AddressKind::Unknown,
        record: None,
    })
}

/// Existence sweep over every record table and the three addressable range
/// tables. Independent of [`classify`].
pub async fn cep_exists<S>(store: &S, cep: &Cep, cancel: &CancellationToken) -> Result<bool>
where
    S: PostalStore + ?Sized,
{
    for table in RecordTable::ALL {
        if store.exists_by_cep(table, cep, cancel).await? {
            return Ok(true);
        }
    }
    for table in RangeTable::ADDRESSABLE {
        if store.find_range_containing(table, cep, cancel).await?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// First record for `cep`: the five record tables in priority order, then
/// the UF, Locality and Neighborhood range tables.
pub async fn find_record<S>(
    store: &S,
    cep: &Cep,
    cancel: &CancellationToken,
) -> Result<Option<ResolvedRecord>>
where
    S: PostalStore + ?Sized,
{
    for table in RecordTable::ALL {
        if let Some(record) = store.find_by_exact_cep(table, cep, cancel).await? {
            return Ok(Some(record));
        }
    }
    find_in_ranges(store, cep, cancel).await
}

async fn find_in_ranges<S>(
    store: &S,
    cep: &Cep,
    cancel: &CancellationToken,
) -> Result<Option<ResolvedRecord>>
where
    S: PostalStore + ?Sized,
{
    for table in RangeTable::ADDRESSABLE {
        if let Some(range) = store.find_range_containing(table, cep, cancel).await? {
            return Ok(ResolvedRecord::from_range(table, range));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PostalDb;

    const DATA: &str = r#"{
        "localities": [
            {"id": 1, "uf": "SP", "name": "São Paulo"},
            {"id": 2, "uf": "SP", "name": "Pirapora", "cep": "01310930"},
            {"id": 3, "uf": "GO", "name": "Vila Boa", "cep": "73840000"}
        ],
        "neighborhoods": [
            {"id": 10, "uf": "SP", "locality_id": 1, "name": "Bela Vista"}
        ],
        "streets": [
            {"id": 100, "uf": "SP", "locality_id": 1, "start_neighborhood_id": 10,
             "name": "Paulista", "type_prefix": "Avenida", "cep": "01310100"}
        ],
        "large_users": [
            {"id": 500, "uf": "SP", "locality_id": 1, "name": "Banco Central",
             "address": "Avenida Paulista, 1804", "cep": "01310922"}
        ],
        "uf_ranges": [
            {"uf": "SP", "start": "01000000", "end": "19999999"},
            {"uf": "GO", "start": "72800000", "end": "76799999"}
        ],
        "locality_ranges": [
            {"locality_id": 1, "start": "01000001", "end": "05999999"}
        ],
        "neighborhood_ranges": [
            {"neighborhood_id": 10, "start": "01301000", "end": "01329999"}
        ]
    }"#;

    fn db() -> PostalDb {
        PostalDb::from_json_str(DATA).unwrap()
    }

    fn cep(s: &str) -> Cep {
        s.parse().unwrap()
    }

    async fn kind_of(db: &PostalDb, s: &str) -> AddressKind {
        classify(db, &cep(s), &CancellationToken::new())
            .await
            .unwrap()
            .kind
    }

    #[tokio::test]
    async fn suffix_wins_over_locality_row() {
        let db = db();
        assert_eq!(kind_of(&db, "01310930").await, AddressKind::LargeUser);
        let c = classify(&db, &cep("01310930"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(c.record.is_none());
    }

    #[tokio::test]
    async fn exact_records_then_ranges() {
        let db = db();
        assert_eq!(kind_of(&db, "73840000").await, AddressKind::Locality);
        assert_eq!(kind_of(&db, "01310100").await, AddressKind::Street);
        // Inside UF, locality and neighborhood ranges: the UF range is checked first.
        assert_eq!(kind_of(&db, "01310200").await, AddressKind::RangeUf);
        assert_eq!(kind_of(&db, "99999000").await, AddressKind::Unknown);
        assert_eq!(kind_of(&db, "01310970").await, AddressKind::OperationalUnit);
        assert_eq!(kind_of(&db, "01310995").await, AddressKind::CommunityPoBox);
    }

    #[tokio::test]
    async fn locality_range_without_uf_range() {
        let db = PostalDb::from_json_str(
            r#"{"locality_ranges": [{"locality_id": 1, "start": "01000001", "end": "05999999"}]}"#,
        )
        .unwrap();
        let c = classify(&db, &cep("01000001"), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(c.kind, AddressKind::RangeLocality);
        assert!(matches!(c.record, Some(ResolvedRecord::RangeLocality(_))));
    }

    #[tokio::test]
    async fn existence_sweep_covers_every_table() {
        let db = db();
        let cancel = CancellationToken::new();
        // Large user rows are only seen by the sweep, never by exact classification.
        assert!(cep_exists(&db, &cep("01310922"), &cancel).await.unwrap());
        assert!(cep_exists(&db, &cep("75000000"), &cancel).await.unwrap());
        assert!(!cep_exists(&db, &cep("99999000"), &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn find_record_prefers_direct_tables() {
        let db = db();
        let cancel = CancellationToken::new();
        let rec = find_record(&db, &cep("01310922"), &cancel).await.unwrap();
        assert!(matches!(rec, Some(ResolvedRecord::LargeUser(ref u)) if u.id == 500));

        let rec = find_record(&db, &cep("01310930"), &cancel).await.unwrap();
        assert!(matches!(rec, Some(ResolvedRecord::Locality(ref l)) if l.id == 2));

        let rec = find_record(&db, &cep("74000000"), &cancel).await.unwrap();
        assert!(matches!(rec, Some(ResolvedRecord::RangeUf(_))));

        assert_eq!(find_record(&db, &cep("99999000"), &cancel).await.unwrap(), None);
    }
}
