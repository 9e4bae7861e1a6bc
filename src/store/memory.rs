//! In-memory record source for tests.

use super::RecordSource;
use crate::error::StoreError;
use crate::models::StoredCall;
use std::path::PathBuf;

pub struct MemoryStore {
    records: Option<Vec<StoredCall>>,
}

impl MemoryStore {
    pub fn new(records: Vec<StoredCall>) -> Self {
        Self {
            records: Some(records),
        }
    }

    /// A source whose reads always fail.
    pub fn unavailable() -> Self {
        Self { records: None }
    }
}

impl RecordSource for MemoryStore {
    fn list_all_records(&self) -> Result<Vec<StoredCall>, StoreError> {
        self.records.clone().ok_or_else(|| StoreError::Io {
            path: PathBuf::from("<memory>"),
            source: std::io::Error::new(std::io::ErrorKind::NotConnected, "store offline"),
        })
    }
}
