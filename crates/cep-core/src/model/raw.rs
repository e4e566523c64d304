// crates/cep-core/src/model/raw.rs

//! Source-file shape of a postal dataset.
//!
//! Everything here is loosely typed (CEPs as free text, flags as optional
//! strings). [`convert`](super::convert) validates and tightens it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetRaw {
    pub localities: Vec<LocalityRaw>,
    pub neighborhoods: Vec<NeighborhoodRaw>,
    pub streets: Vec<StreetRaw>,
    pub large_users: Vec<LargeUserRaw>,
    pub operational_units: Vec<OperationalUnitRaw>,
    pub community_boxes: Vec<CommunityPoBoxRaw>,
    pub uf_ranges: Vec<UfRangeRaw>,
    pub locality_ranges: Vec<LocalityRangeRaw>,
    pub neighborhood_ranges: Vec<NeighborhoodRangeRaw>,
    pub operational_unit_ranges: Vec<OperationalUnitRangeRaw>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalityRaw {
    pub id: u32,
    pub uf: String,
    pub name: String,
    pub cep: Option<String>,
    pub ibge_code: Option<u32>,
    pub situation: Option<String>,
    pub locality_type: Option<String>,
    pub parent_id: Option<u32>,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodRaw {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub name: String,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetRaw {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub start_neighborhood_id: Option<u32>,
    pub end_neighborhood_id: Option<u32>,
    pub name: String,
    pub complement: Option<String>,
    pub type_prefix: Option<String>,
    pub cep: String,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LargeUserRaw {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub neighborhood_id: Option<u32>,
    pub street_id: Option<u32>,
    pub name: String,
    pub address: Option<String>,
    pub cep: String,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalUnitRaw {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub neighborhood_id: Option<u32>,
    pub street_id: Option<u32>,
    pub name: String,
    pub address: Option<String>,
    pub cep: String,
    pub po_box_flag: Option<String>,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPoBoxRaw {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub name: String,
    pub address: Option<String>,
    pub cep: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UfRangeRaw {
    pub uf: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalityRangeRaw {
    pub locality_id: u32,
    pub start: String,
    pub end: String,
    pub range_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodRangeRaw {
    pub neighborhood_id: u32,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationalUnitRangeRaw {
    pub operational_unit_id: u32,
    pub start: String,
    pub end: String,
}
