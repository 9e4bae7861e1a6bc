//! Daily volume and sentiment trend series.
//!
//! Records are bucketed by the calendar date of their UTC timestamp.
//! Dates without calls are skipped, never filled with zeroes.

use crate::models::{CallRecord, Charts, Sentiment, SentimentTrendPoint, VolumePoint};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
struct DayBucket {
    total: usize,
    positive: usize,
    neutral: usize,
    negative: usize,
}

/// Groups records by calendar date.
#[derive(Debug, Default)]
pub struct TrendAggregator {
    days: HashMap<NaiveDate, DayBucket>,
}

impl TrendAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record to its day bucket.
    pub fn record(&mut self, call: &CallRecord) {
        let bucket = self.days.entry(call.timestamp.date_naive()).or_default();
        bucket.total += 1;
        match call.sentiment {
            Sentiment::Positive => bucket.positive += 1,
            Sentiment::Neutral => bucket.neutral += 1,
            Sentiment::Negative => bucket.negative += 1,
        }
    }

    /// Aggregate a whole record set.
    pub fn from_records(records: &[CallRecord]) -> Self {
        let mut aggregator = Self::new();
        for call in records {
            aggregator.record(call);
        }
        aggregator
    }

    /// Buckets sorted by ascending date.
    fn sorted_days(&self) -> Vec<(NaiveDate, DayBucket)> {
        let mut days: Vec<_> = self.days.iter().map(|(date, bucket)| (*date, *bucket)).collect();
        days.sort_by_key(|(date, _)| *date);
        days
    }

    /// Calls per date, ascending.
    pub fn volume(&self) -> Vec<VolumePoint> {
        self.sorted_days()
            .into_iter()
            .map(|(date, bucket)| VolumePoint {
                date,
                count: bucket.total,
            })
            .collect()
    }

    /// Positive and negative calls per date, ascending.
    pub fn sentiment_trend(&self) -> Vec<SentimentTrendPoint> {
        self.sorted_days()
            .into_iter()
            .map(|(date, bucket)| {
                debug_assert_eq!(bucket.total, bucket.positive + bucket.neutral + bucket.negative);
                SentimentTrendPoint {
                    date,
                    positive: bucket.positive,
                    negative: bucket.negative,
                }
            })
            .collect()
    }

    pub fn charts(&self) -> Charts {
        Charts {
            volume: self.volume(),
            sentiment_trend: self.sentiment_trend(),
        }
    }
}
