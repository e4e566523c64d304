// crates/cep-core/src/model/mod.rs
pub mod address;
pub mod convert;
pub mod db;
pub mod entities;
pub mod page;
#[doc(hidden)]
pub mod raw;

pub use address::{Address, AddressKind, AddressSource, CepValidation, Lookup, NotFound};
pub use db::PostalDb;
pub use entities::{
    CepRange, CommunityPoBox, LargeUser, Locality, Neighborhood, OperationalUnit, RangeOwner,
    RangeTable, RecordTable, ResolvedRecord, Street,
};
pub use page::{Page, PageRequest};

/// File suffix appended to a dataset path for its binary snapshot.
pub const CACHE_SUFFIX: &str = "bin";
