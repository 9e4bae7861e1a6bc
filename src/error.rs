//! Error types for the store and the aggregation engine.
//!
//! Library-style errors use `thiserror`; `main` and the CLI glue wrap them
//! with `anyhow` context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the durable call store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record at {}:{line}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while assembling an analytics snapshot or validating input.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A record carries a value outside the closed enumerations.
    #[error("invalid call record {record}: {reason}")]
    Validation { record: String, reason: String },

    /// The record source could not be read; no partial snapshot is produced.
    #[error("call record source unavailable: {0}")]
    SourceUnavailable(#[from] StoreError),
}

impl EngineError {
    pub fn validation(record: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Validation {
            record: record.into(),
            reason: reason.into(),
        }
    }
}
