//! Error taxonomy for the ETL job.
//!
//! Every failure is fatal for the run: there is no retry and no partial-output
//! recovery. Join misses are not errors and never surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error in {path}: {reason}")]
    Credentials { path: String, reason: String },

    #[error("Storage error at {location}: {reason}")]
    Storage { location: String, reason: String },

    #[error("No input matched {pattern}")]
    NoInput { pattern: String },

    #[error("Could not decode record {index} of {location}: {source}")]
    Decode {
        location: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Timestamp {0} ms is outside the supported calendar range")]
    InvalidTimestamp(i64),

    #[error("Output already exists at {0}")]
    OutputExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn storage(location: impl Into<String>, reason: impl ToString) -> Self {
        EtlError::Storage {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
