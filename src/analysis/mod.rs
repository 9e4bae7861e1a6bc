//! Aggregation and insight engine.
//!
//! Pure computations over call records: sentiment counts, objection
//! rankings, daily trends and the coaching insight rules.

pub mod insights;
pub mod objections;
pub mod sentiment;
pub mod snapshot;
pub mod trends;

pub use insights::{Insight, InsightCategory, InsightEngine, RecommendationTable};
pub use snapshot::{load_records, objection_tally, summarize_batch, SnapshotAssembler};
