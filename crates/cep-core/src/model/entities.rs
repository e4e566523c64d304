// crates/cep-core/src/model/entities.rs
use crate::cep::Cep;
use crate::model::AddressKind;
use crate::traits::NameMatch;
use serde::{Deserialize, Serialize};

/// A municipality, district or settlement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    pub id: u32,
    pub uf: String,
    pub name: String,
    /// Only small localities without street-level codes carry their own CEP.
    pub cep: Option<Cep>,
    pub ibge_code: Option<u32>,
    /// Situation flag as published by the postal service (`0`, `1`, `2`...).
    pub situation: String,
    /// Locality type flag (`M` município, `D` distrito, `P` povoado...).
    pub locality_type: String,
    /// Parent locality for districts and settlements.
    pub parent_id: Option<u32>,
    pub abbreviation: Option<String>,
}

impl Locality {
    /// Human readable locality type; unknown flags are passed through.
    pub fn type_label(&self) -> &str {
        match self.locality_type.as_str() {
            "C" => "Cidade",
            "M" => "Município",
            "D" => "Distrito",
            "P" => "Povoado",
            "A" => "Área",
            other => other,
        }
    }
}

/// A neighborhood (bairro). Belongs to exactly one locality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neighborhood {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub name: String,
    pub abbreviation: Option<String>,
}

/// A street (logradouro) with its own CEP.
///
/// A street spans at most two neighborhoods. Relations are stored as ids and
/// resolved through the store, never as embedded objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Street {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub start_neighborhood_id: Option<u32>,
    pub end_neighborhood_id: Option<u32>,
    pub name: String,
    pub complement: Option<String>,
    /// Thoroughfare type prefix: "Rua", "Avenida", "Travessa"...
    pub type_prefix: String,
    pub cep: Cep,
    pub abbreviation: Option<String>,
}

impl Street {
    /// Does the street touch this neighborhood at either end?
    pub fn touches_neighborhood(&self, neighborhood_id: u32) -> bool {
        self.start_neighborhood_id == Some(neighborhood_id)
            || self.end_neighborhood_id == Some(neighborhood_id)
    }
}

/// An organization with a dedicated CEP (grande usuário).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LargeUser {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub neighborhood_id: Option<u32>,
    pub street_id: Option<u32>,
    pub name: String,
    pub address: String,
    pub cep: Cep,
    pub abbreviation: Option<String>,
}

/// A post office or other operational unit of the postal service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationalUnit {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub neighborhood_id: Option<u32>,
    pub street_id: Option<u32>,
    pub name: String,
    pub address: String,
    pub cep: Cep,
    /// `S` when the unit offers PO boxes.
    pub po_box_flag: Option<String>,
    pub abbreviation: Option<String>,
}

/// A community PO box cluster (caixa postal comunitária).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommunityPoBox {
    pub id: u32,
    pub uf: String,
    pub locality_id: u32,
    pub name: String,
    pub address: String,
    pub cep: Cep,
}

/// Who a [`CepRange`] belongs to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOwner {
    Uf(String),
    Locality(u32),
    Neighborhood(u32),
    OperationalUnit(u32),
}

/// An inclusive block of codes owned by a state, locality, neighborhood or
/// operational unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CepRange {
    pub owner: RangeOwner,
    pub start: Cep,
    pub end: Cep,
    pub range_type: Option<String>,
}

impl CepRange {
    pub fn contains(&self, cep: &Cep) -> bool {
        cep.within(&self.start, &self.end)
    }

    /// Number of codes in the range minus one.
    pub fn span(&self) -> u32 {
        self.end.value().saturating_sub(self.start.value())
    }

    /// Ordering key for overlapping ranges: narrowest first, then lowest
    /// start, then lowest owner.
    pub(crate) fn precedence_key(&self) -> (u32, &Cep, &RangeOwner) {
        (self.span(), &self.start, &self.owner)
    }
}

/// Tables holding records addressed by an exact CEP, in lookup priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordTable {
    Locality,
    Street,
    LargeUser,
    OperationalUnit,
    CommunityPoBox,
}

impl RecordTable {
    /// Priority order used by resolution and by the existence sweep.
    pub const ALL: [RecordTable; 5] = [
        RecordTable::Locality,
        RecordTable::Street,
        RecordTable::LargeUser,
        RecordTable::OperationalUnit,
        RecordTable::CommunityPoBox,
    ];
}

/// Range tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeTable {
    Uf,
    Locality,
    Neighborhood,
    OperationalUnit,
}

impl RangeTable {
    /// Range tables consulted when classifying or resolving a code, in order.
    /// Operational-unit ranges are excluded; they only show up in diagnostics.
    pub const ADDRESSABLE: [RangeTable; 3] =
        [RangeTable::Uf, RangeTable::Locality, RangeTable::Neighborhood];

    pub const ALL: [RangeTable; 4] = [
        RangeTable::Uf,
        RangeTable::Locality,
        RangeTable::Neighborhood,
        RangeTable::OperationalUnit,
    ];

    /// Classification a containing range of this table implies.
    pub fn kind(self) -> Option<AddressKind> {
        match self {
            RangeTable::Uf => Some(AddressKind::RangeUf),
            RangeTable::Locality => Some(AddressKind::RangeLocality),
            RangeTable::Neighborhood => Some(AddressKind::RangeNeighborhood),
            RangeTable::OperationalUnit => None,
        }
    }
}

/// The record a CEP resolved to, tagged by its table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum ResolvedRecord {
    Locality(Locality),
    Street(Street),
    LargeUser(LargeUser),
    OperationalUnit(OperationalUnit),
    CommunityPoBox(CommunityPoBox),
    RangeUf(CepRange),
    RangeLocality(CepRange),
    RangeNeighborhood(CepRange),
}

impl ResolvedRecord {
    pub fn kind(&self) -> AddressKind {
        match self {
            ResolvedRecord::Locality(_) => AddressKind::Locality,
            ResolvedRecord::Street(_) => AddressKind::Street,
            ResolvedRecord::LargeUser(_) => AddressKind::LargeUser,
            ResolvedRecord::OperationalUnit(_) => AddressKind::OperationalUnit,
            ResolvedRecord::CommunityPoBox(_) => AddressKind::CommunityPoBox,
            ResolvedRecord::RangeUf(_) => AddressKind::RangeUf,
            ResolvedRecord::RangeLocality(_) => AddressKind::RangeLocality,
            ResolvedRecord::RangeNeighborhood(_) => AddressKind::RangeNeighborhood,
        }
    }

    /// Wraps a range hit in the variant matching its table.
    pub(crate) fn from_range(table: RangeTable, range: CepRange) -> Option<Self> {
        match table {
            RangeTable::Uf => Some(ResolvedRecord::RangeUf(range)),
            RangeTable::Locality => Some(ResolvedRecord::RangeLocality(range)),
            RangeTable::Neighborhood => Some(ResolvedRecord::RangeNeighborhood(range)),
            RangeTable::OperationalUnit => None,
        }
    }
}

impl NameMatch for Locality {
    fn name_str(&self) -> &str {
        &self.name
    }
}

impl NameMatch for Neighborhood {
    fn name_str(&self) -> &str {
        &self.name
    }
}

impl NameMatch for Street {
    fn name_str(&self) -> &str {
        &self.name
    }
}

impl NameMatch for LargeUser {
    fn name_str(&self) -> &str {
        &self.name
    }
}
