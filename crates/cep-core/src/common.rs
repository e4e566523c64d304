// crates/cep-core/src/common.rs
use serde::{Deserialize, Serialize};

/// Row counts per table.
///
/// Returned by [`PostalDb::stats`](crate::PostalDb::stats) and by
/// [`PostalStore::stats`](crate::PostalStore::stats). `ranges` sums all four
/// range tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub localities: usize,
    pub neighborhoods: usize,
    pub streets: usize,
    pub large_users: usize,
    pub operational_units: usize,
    pub community_boxes: usize,
    pub ranges: usize,
}
