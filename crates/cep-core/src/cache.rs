// crates/cep-core/src/cache.rs

//! Cache implementations and the key layout shared by every cache backend.

use crate::cep::Cep;
use crate::error::{CepError, Result};
use crate::traits::AddressCache;
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub fn address_key(cep: &Cep) -> String {
    format!("endereco:cep:{cep}")
}

pub fn geocode_key(cep: &Cep) -> String {
    format!("geocode:cep:{cep}")
}

/// Coordinates rounded to five decimals, roughly a one metre grid.
pub fn reverse_key(latitude: f64, longitude: f64) -> String {
    format!("revgeo:{latitude:.5}:{longitude:.5}")
}

fn check(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(CepError::Cancelled)
    } else {
        Ok(())
    }
}

/// Longest TTL an entry can get; longer requests are clamped.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Writes between two sweeps of expired entries.
const SWEEP_INTERVAL: usize = 256;

#[derive(Debug)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    writes_since_sweep: usize,
}

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now)
}

/// Value of `key` if it is still live; an expired entry is dropped.
fn read_live(map: &mut HashMap<String, CacheEntry>, key: &str, now: Instant) -> Option<String> {
    match map.entry(key.to_owned()) {
        Entry::Occupied(e) if e.get().expires_at > now => Some(e.get().value.clone()),
        Entry::Occupied(e) => {
            e.remove();
            None
        }
        Entry::Vacant(_) => None,
    }
}

/// In-process TTL cache.
///
/// Expiry uses `tokio::time::Instant`, so tests with a paused clock can
/// advance past a TTL without sleeping. Expired entries are dropped lazily on
/// read and swept every few hundred writes.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<Entries>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .map
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AddressCache for MemoryCache {
    async fn get(&self, key: &str, cancel: &CancellationToken) -> Result<Option<String>> {
        check(cancel)?;
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.map.get(key) {
                Some(e) if e.expires_at > now => return Ok(Some(e.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // A set may have landed between the two locks.
        let mut entries = self.entries.write().await;
        Ok(read_live(&mut entries.map, key, now))
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        check(cancel)?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        // Re-check under the lock: a request cancelled while waiting must not write.
        check(cancel)?;
        entries.writes_since_sweep += 1;
        if entries.writes_since_sweep >= SWEEP_INTERVAL {
            entries.map.retain(|_, e| e.expires_at > now);
            entries.writes_since_sweep = 0;
        }
        entries.map.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: expiry(now, ttl),
            },
        );
        Ok(())
    }
}

/// A cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl AddressCache for NoCache {
    async fn get(&self, _key: &str, cancel: &CancellationToken) -> Result<Option<String>> {
        check(cancel)?;
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: String,
        _ttl: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        check(cancel)?;
        Ok(())
    }
}
