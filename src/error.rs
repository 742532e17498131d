//! Per-record error types.
//!
//! A [`MappingError`] means the source record has the wrong shape; a
//! [`StoreError`] means the store could not complete a lookup or write.
//! Both are scoped to a single record: the sync loop reports them and moves
//! on. Setup failures (configuration, input file, connection) are plain
//! `anyhow` errors and abort the run.

use crate::models::DetailKind;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("missing required attribute '{0}'")]
    MissingAttribute(&'static str),

    #[error("detail list has {found} entries, expected at least {expected}")]
    ShortDetailList { found: usize, expected: usize },

    #[error("detail '{0}' is missing")]
    MissingDetail(DetailKind),

    #[error("detail '{0}' appears more than once")]
    DuplicateDetail(DetailKind),

    #[error("detail '{kind}' value '{value}' is not a number")]
    InvalidNumber { kind: DetailKind, value: String },

    #[error("detail '{kind}' value '{value}' is not an integer")]
    InvalidInteger { kind: DetailKind, value: String },

    #[error("createdAt value '{0}' is not an RFC 3339 timestamp")]
    InvalidTimestamp(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("lookup of '{stock_code}' failed: {source}")]
    Lookup {
        stock_code: String,
        source: BoxError,
    },

    #[error("insert of '{stock_code}' failed: {source}")]
    Insert {
        stock_code: String,
        source: BoxError,
    },

    #[error("update of '{stock_code}' failed: {source}")]
    Update {
        stock_code: String,
        source: BoxError,
    },

    #[error("stored document '{stock_code}' could not be decoded: {source}")]
    Decode {
        stock_code: String,
        source: BoxError,
    },
}

/// Why a single record was skipped.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("mapping failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}
