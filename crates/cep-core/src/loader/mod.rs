// crates/cep-core/src/loader/mod.rs

//! # Data Loader
//!
//! Handles the physical layer (I/O, decompression, binary snapshot) and
//! delegates row validation to [`model::convert`](crate::model::convert).
//!
//! A source dataset `foo.json` (or `foo.json.gz`) gets a bincode snapshot
//! `foo.json.bin` written next to it on first load. Later loads reuse the
//! snapshot as long as it is not older than the source.

use crate::error::{CepError, Result};
use crate::model::raw::DatasetRaw;
use crate::model::{convert, PostalDb, CACHE_SUFFIX};
use bincode::Options;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod common_io;

use common_io::CompressionMode;

/// Upper bound for a snapshot, guards against corrupt or hostile input.
const SNAPSHOT_LIMIT: u64 = 256 * 1024 * 1024;

pub(crate) fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(SNAPSHOT_LIMIT)
        .allow_trailing_bytes()
}

impl PostalDb {
    pub fn default_data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    pub fn default_dataset_filename() -> &'static str {
        "sample.json"
    }

    /// Loads the dataset bundled with the crate.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::default_data_dir().join(Self::default_dataset_filename()))
    }

    /// **Smart Load:** snapshot if fresh, otherwise parse the source and
    /// refresh the snapshot. Paths ending in `.bin` are read as snapshots
    /// directly.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == CACHE_SUFFIX) {
            return Self::load_binary_file(path);
        }

        let cache_path = common_io::get_cache_path(path, CACHE_SUFFIX)?;
        if common_io::is_cache_fresh(path, &cache_path) {
            match Self::load_binary_file(&cache_path) {
                Ok(db) => {
                    debug!(snapshot = %cache_path.display(), "loaded postal snapshot");
                    return Ok(db);
                }
                Err(e) => warn!(snapshot = %cache_path.display(), error = %e, "ignoring unreadable snapshot"),
            }
        }

        let db = Self::load_raw_json(path)?;
        if let Err(e) = db.save_as(&cache_path) {
            warn!(snapshot = %cache_path.display(), error = %e, "could not write postal snapshot");
        }
        Ok(db)
    }

    /// Parses and validates a source JSON dataset (plain or gzip).
    pub fn load_raw_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = common_io::open_stream(path)?;
        let raw: DatasetRaw = serde_json::from_reader(reader)?;
        let db = convert::from_raw(raw)?;
        let stats = db.stats();
        info!(
            source = %path.display(),
            localities = stats.localities,
            streets = stats.streets,
            ranges = stats.ranges,
            "loaded postal dataset"
        );
        Ok(db)
    }

    /// Parses a dataset already held in memory as JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: DatasetRaw = serde_json::from_str(json)?;
        convert::from_raw(raw)
    }

    /// Writes a bincode snapshot (gzip-wrapped when `compact` is enabled).
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        common_io::write_generic(path.as_ref(), self, CompressionMode::preferred())
    }

    pub fn load_binary_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = common_io::open_stream(path.as_ref())?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Reconstructs the database from an uncompressed bincode snapshot.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let db: PostalDb = bincode_options().deserialize(data)?;
        Ok(db)
    }

    /// Serializes into an uncompressed bincode snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode_options().serialize(self).map_err(CepError::Bincode)
    }
}
