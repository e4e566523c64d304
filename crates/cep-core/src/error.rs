// crates/cep-core/src/error.rs

use thiserror::Error;

/// Errors raised by the postal database, its loader and the lookup service.
///
/// A CEP that simply does not exist is *not* an error: lookups return
/// [`Lookup::NotFound`](crate::Lookup::NotFound) for that. The variants here
/// are for malformed input, missing collaborators and broken datasets.
#[derive(Debug, Error)]
pub enum CepError {
    /// Malformed caller input: a CEP that is not 8 digits, a UF that is not
    /// two letters, coordinates out of range, a missing filter combination.
    #[error("invalid format: {0}")]
    Format(String),

    /// Geocoding was asked for without a CEP and without the
    /// (street, locality, UF) triple.
    #[error("insufficient input: {0}")]
    InsufficientInput(String),

    /// The record store or the cache failed or is unreachable.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The request was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A dataset file could not be located.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// The dataset violates a structural invariant (bad CEP, inverted range).
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, CepError>;

impl CepError {
    /// True for errors the caller caused and should not retry.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CepError::Format(_) | CepError::InsufficientInput(_))
    }
}
