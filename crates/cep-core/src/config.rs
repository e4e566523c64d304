// crates/cep-core/src/config.rs
use crate::error::Result;
use crate::geo::DEFAULT_JITTER_DEGREES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables of [`CepService`](crate::CepService).
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```rust
/// use cep_core::ServiceConfig;
/// let cfg: ServiceConfig = serde_json::from_str(r#"{"max_page_size": 50}"#).unwrap();
/// assert_eq!(cfg.max_page_size, 50);
/// assert_eq!(cfg.cep_cache_ttl_secs, 86_400);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// TTL of resolved addresses (24 h).
    pub cep_cache_ttl_secs: u64,
    /// TTL of geocoded addresses (30 d).
    pub geocode_cache_ttl_secs: u64,
    /// TTL of reverse-geocoded addresses (30 d).
    pub reverse_cache_ttl_secs: u64,
    /// Maximum absolute offset, in degrees, added to approximate coordinates.
    pub jitter_degrees: f64,
    /// Candidates drawn per radius search.
    pub radius_sample_size: usize,
    pub max_page_size: usize,
    pub max_autocomplete_limit: usize,
    pub max_radius_km: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            cep_cache_ttl_secs: 24 * 60 * 60,
            geocode_cache_ttl_secs: 30 * 24 * 60 * 60,
            reverse_cache_ttl_secs: 30 * 24 * 60 * 60,
            jitter_degrees: DEFAULT_JITTER_DEGREES,
            radius_sample_size: 150,
            max_page_size: 100,
            max_autocomplete_limit: 50,
            max_radius_km: 100.0,
        }
    }
}

impl ServiceConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn cep_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cep_cache_ttl_secs)
    }

    pub fn geocode_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.geocode_cache_ttl_secs)
    }

    pub fn reverse_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.reverse_cache_ttl_secs)
    }
}
