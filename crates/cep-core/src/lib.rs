// crates/cep-core/src/lib.rs

//! # cep-core
//!
//! Brazilian postal code (CEP) classification, resolution, approximate
//! geocoding and address search.
//!
//! ```no_run
//! use cep_core::{CepService, Lookup, MemoryCache, PostalDb};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> cep_core::Result<()> {
//! let db = PostalDb::load()?;
//! let service = CepService::new(db, MemoryCache::new());
//! let cancel = CancellationToken::new();
//!
//! if let Lookup::Found(address) = service.lookup("01310-100", &cancel).await? {
//!     println!("{}", address.display_line());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod catalog;
pub mod cep;
pub mod classify;
pub mod common;
pub mod config;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod search;
pub mod service;
pub mod store;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::cache::{MemoryCache, NoCache};
pub use crate::catalog::{LocalityQuery, NeighborhoodQuery, StreetQuery};
pub use crate::cep::Cep;
pub use crate::classify::Classification;
pub use crate::common::StoreStats;
pub use crate::config::ServiceConfig;
pub use crate::error::{CepError, Result};
pub use crate::geo::{FixedJitter, GeoPoint, RandomJitter, ZeroJitter};
pub use crate::geocode::{
    DistanceReport, Endpoint, GeocodeRequest, NearbyAddress, RadiusKind, RadiusQuery,
};
pub use crate::model::{
    Address, AddressKind, AddressSource, CepRange, CepValidation, CommunityPoBox, LargeUser,
    Locality, Lookup, Neighborhood, NotFound, OperationalUnit, Page, PageRequest, PostalDb,
    RangeOwner, RangeTable, RecordTable, ResolvedRecord, Street,
};
pub use crate::search::{AddressQuery, AutocompleteKind};
pub use crate::service::{CepService, RangeHit};
pub use crate::traits::{AddressCache, JitterSource, NameMatch, PostalStore};
