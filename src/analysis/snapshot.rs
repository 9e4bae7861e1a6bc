//! Analytics snapshot assembly.
//!
//! One read of the full record set feeds the sentiment summary, objection
//! tally and trend aggregator; their results feed the insight engine. Every
//! snapshot is recomputed from scratch.

use super::insights::{InsightEngine, InsightInputs};
use super::objections::ObjectionTally;
use super::sentiment::SentimentSummary;
use super::trends::TrendAggregator;
use crate::error::EngineError;
use crate::models::{AnalyticsSnapshot, BatchSummary, CallRecord, NewCall};
use crate::store::RecordSource;
use tracing::debug;

/// Number of ranked objections the insight rules consider.
const INSIGHT_OBJECTIONS: usize = 2;

/// Builds analytics snapshots. Holds no mutable state.
#[derive(Debug, Clone, Default)]
pub struct SnapshotAssembler {
    engine: InsightEngine,
}

impl SnapshotAssembler {
    pub fn new(engine: InsightEngine) -> Self {
        Self { engine }
    }

    /// Compute a snapshot over validated records.
    pub fn compute_snapshot(&self, records: &[CallRecord]) -> AnalyticsSnapshot {
        let sentiment = SentimentSummary::from_sentiments(records.iter().map(|r| r.sentiment));
        let tally = objection_tally(records);
        let trends = TrendAggregator::from_records(records);

        let top_objections = tally.top(INSIGHT_OBJECTIONS);
        let insights = self.engine.evaluate(&InsightInputs {
            total_calls: records.len(),
            sentiment: &sentiment,
            top_objections: &top_objections,
        });

        debug!(
            "Snapshot over {} calls: {} positive, {} neutral, {} negative",
            records.len(),
            sentiment.positive,
            sentiment.neutral,
            sentiment.negative
        );

        AnalyticsSnapshot {
            total_calls: records.len(),
            sentiment_counts: sentiment.counts(),
            avg_sentiment: sentiment.verdict(),
            top_objection: tally.primary(),
            insights,
            charts: trends.charts(),
        }
    }

    /// Read every record from the source, validate all of them, then compute.
    ///
    /// Fails without a partial result if the source cannot be read or any
    /// record is invalid.
    pub fn snapshot_from_source<S>(&self, source: &S) -> Result<AnalyticsSnapshot, EngineError>
    where
        S: RecordSource + ?Sized,
    {
        let records = load_records(source)?;
        Ok(self.compute_snapshot(&records))
    }
}

/// Read and validate all records from a source.
pub fn load_records<S>(source: &S) -> Result<Vec<CallRecord>, EngineError>
where
    S: RecordSource + ?Sized,
{
    let stored = source.list_all_records()?;
    debug!("Loaded {} stored calls", stored.len());

    stored.iter().map(CallRecord::try_from).collect()
}

/// Objection ranking over a record set.
pub fn objection_tally(records: &[CallRecord]) -> ObjectionTally {
    ObjectionTally::from_tags(records.iter().flat_map(|r| r.objections.iter().copied()))
}

/// Summarize a freshly ingested batch of calls.
pub fn summarize_batch(calls: &[NewCall]) -> BatchSummary {
    let sentiment = SentimentSummary::from_sentiments(calls.iter().map(|c| c.sentiment));
    let tally = ObjectionTally::from_tags(calls.iter().flat_map(|c| c.objections.iter().copied()));

    BatchSummary {
        total_calls: calls.len(),
        positive_calls: sentiment.positive,
        neutral_calls: sentiment.neutral,
        negative_calls: sentiment.negative,
        top_objection: tally.primary(),
    }
}
