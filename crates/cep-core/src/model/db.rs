// crates/cep-core/src/model/db.rs
use super::entities::{
    CepRange, CommunityPoBox, LargeUser, Locality, Neighborhood, OperationalUnit, RangeTable,
    RecordTable, ResolvedRecord, Street,
};
use crate::cep::Cep;
use crate::common::StoreStats;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The in-memory postal database.
///
/// Plain tables plus lazily built lookup indices. The indices are not part
/// of the binary snapshot; they are rebuilt on first use after loading.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostalDb {
    pub(crate) localities: Vec<Locality>,
    pub(crate) neighborhoods: Vec<Neighborhood>,
    pub(crate) streets: Vec<Street>,
    pub(crate) large_users: Vec<LargeUser>,
    pub(crate) operational_units: Vec<OperationalUnit>,
    pub(crate) community_boxes: Vec<CommunityPoBox>,
    pub(crate) uf_ranges: Vec<CepRange>,
    pub(crate) locality_ranges: Vec<CepRange>,
    pub(crate) neighborhood_ranges: Vec<CepRange>,
    pub(crate) operational_unit_ranges: Vec<CepRange>,
    #[serde(skip)]
    index: OnceCell<DbIndex>,
}

/// Row positions keyed by CEP or id. The first row wins on duplicates.
#[derive(Debug, Default, Clone)]
struct DbIndex {
    locality_by_cep: HashMap<Cep, usize>,
    street_by_cep: HashMap<Cep, usize>,
    large_user_by_cep: HashMap<Cep, usize>,
    operational_unit_by_cep: HashMap<Cep, usize>,
    community_box_by_cep: HashMap<Cep, usize>,
    locality_by_id: HashMap<u32, usize>,
    neighborhood_by_id: HashMap<u32, usize>,
    street_by_id: HashMap<u32, usize>,
}

fn index_by<T, K: std::hash::Hash + Eq>(
    rows: &[T],
    key: impl Fn(&T) -> Option<K>,
) -> HashMap<K, usize> {
    let mut map = HashMap::with_capacity(rows.len());
    for (pos, row) in rows.iter().enumerate() {
        if let Some(k) = key(row) {
            map.entry(k).or_insert(pos);
        }
    }
    map
}

impl PostalDb {
    fn index(&self) -> &DbIndex {
        self.index.get_or_init(|| DbIndex {
            locality_by_cep: index_by(&self.localities, |l| l.cep.clone()),
            street_by_cep: index_by(&self.streets, |s| Some(s.cep.clone())),
            large_user_by_cep: index_by(&self.large_users, |u| Some(u.cep.clone())),
            operational_unit_by_cep: index_by(&self.operational_units, |u| Some(u.cep.clone())),
            community_box_by_cep: index_by(&self.community_boxes, |b| Some(b.cep.clone())),
            locality_by_id: index_by(&self.localities, |l| Some(l.id)),
            neighborhood_by_id: index_by(&self.neighborhoods, |n| Some(n.id)),
            street_by_id: index_by(&self.streets, |s| Some(s.id)),
        })
    }

    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    pub fn neighborhoods(&self) -> &[Neighborhood] {
        &self.neighborhoods
    }

    pub fn streets(&self) -> &[Street] {
        &self.streets
    }

    pub fn large_users(&self) -> &[LargeUser] {
        &self.large_users
    }

    pub fn operational_units(&self) -> &[OperationalUnit] {
        &self.operational_units
    }

    pub fn community_boxes(&self) -> &[CommunityPoBox] {
        &self.community_boxes
    }

    /// Ranges of one table, narrowest first.
    pub fn ranges(&self, table: RangeTable) -> &[CepRange] {
        match table {
            RangeTable::Uf => &self.uf_ranges,
            RangeTable::Locality => &self.locality_ranges,
            RangeTable::Neighborhood => &self.neighborhood_ranges,
            RangeTable::OperationalUnit => &self.operational_unit_ranges,
        }
    }

    pub fn locality(&self, id: u32) -> Option<&Locality> {
        self.index()
            .locality_by_id
            .get(&id)
            .map(|&i| &self.localities[i])
    }

    pub fn neighborhood(&self, id: u32) -> Option<&Neighborhood> {
        self.index()
            .neighborhood_by_id
            .get(&id)
            .map(|&i| &self.neighborhoods[i])
    }

    pub fn street(&self, id: u32) -> Option<&Street> {
        self.index()
            .street_by_id
            .get(&id)
            .map(|&i| &self.streets[i])
    }

    /// Exact-CEP lookup in one record table.
    pub fn record_by_cep(&self, table: RecordTable, cep: &Cep) -> Option<ResolvedRecord> {
        let idx = self.index();
        match table {
            RecordTable::Locality => idx
                .locality_by_cep
                .get(cep)
                .map(|&i| ResolvedRecord::Locality(self.localities[i].clone())),
            RecordTable::Street => idx
                .street_by_cep
                .get(cep)
                .map(|&i| ResolvedRecord::Street(self.streets[i].clone())),
            RecordTable::LargeUser => idx
                .large_user_by_cep
                .get(cep)
                .map(|&i| ResolvedRecord::LargeUser(self.large_users[i].clone())),
            RecordTable::OperationalUnit => idx
                .operational_unit_by_cep
                .get(cep)
                .map(|&i| ResolvedRecord::OperationalUnit(self.operational_units[i].clone())),
            RecordTable::CommunityPoBox => idx
                .community_box_by_cep
                .get(cep)
                .map(|&i| ResolvedRecord::CommunityPoBox(self.community_boxes[i].clone())),
        }
    }

    pub fn has_cep(&self, table: RecordTable, cep: &Cep) -> bool {
        let idx = self.index();
        match table {
            RecordTable::Locality => idx.locality_by_cep.contains_key(cep),
            RecordTable::Street => idx.street_by_cep.contains_key(cep),
            RecordTable::LargeUser => idx.large_user_by_cep.contains_key(cep),
            RecordTable::OperationalUnit => idx.operational_unit_by_cep.contains_key(cep),
            RecordTable::CommunityPoBox => idx.community_box_by_cep.contains_key(cep),
        }
    }

    /// First range containing `cep`. Tables are kept in precedence order, so
    /// this is the narrowest match.
    pub fn range_containing(&self, table: RangeTable, cep: &Cep) -> Option<&CepRange> {
        self.ranges(table).iter().find(|r| r.contains(cep))
    }

    /// Every range, across all four tables, that contains `cep`.
    pub fn ranges_containing(&self, cep: &Cep) -> Vec<(RangeTable, &CepRange)> {
        RangeTable::ALL
            .into_iter()
            .flat_map(|table| {
                self.ranges(table)
                    .iter()
                    .filter(move |r| r.contains(cep))
                    .map(move |r| (table, r))
            })
            .collect()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            localities: self.localities.len(),
            neighborhoods: self.neighborhoods.len(),
            streets: self.streets.len(),
            large_users: self.large_users.len(),
            operational_units: self.operational_units.len(),
            community_boxes: self.community_boxes.len(),
            ranges: self.uf_ranges.len()
                + self.locality_ranges.len()
                + self.neighborhood_ranges.len()
                + self.operational_unit_ranges.len(),
        }
    }
}
