//! Durable call store.
//!
//! Calls are kept in an append-only JSON Lines file, one stored call per
//! line. The engine only ever reads "all records as of now"; writes happen
//! during ingest.

mod jsonl;
#[cfg(test)]
mod memory;

pub use jsonl::JsonlStore;
#[cfg(test)]
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::StoredCall;

/// Read access to every stored call.
pub trait RecordSource {
    /// All stored calls, in no particular order.
    fn list_all_records(&self) -> Result<Vec<StoredCall>, StoreError>;

    /// Stored calls newest first, capped at `limit`.
    fn list_recent(&self, limit: usize) -> Result<Vec<StoredCall>, StoreError> {
        let mut records = self.list_all_records()?;
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(limit);
        Ok(records)
    }
}
