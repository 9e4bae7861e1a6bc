//! Sentiment counting and the directional verdict.

use crate::models::{Sentiment, SentimentVerdict};
use std::collections::BTreeMap;

/// Per-label sentiment counts over a set of calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentSummary {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentSummary {
    /// Count a collection of sentiment labels.
    pub fn from_sentiments<I>(sentiments: I) -> Self
    where
        I: IntoIterator<Item = Sentiment>,
    {
        let mut summary = Self::default();

        for sentiment in sentiments {
            match sentiment {
                Sentiment::Positive => summary.positive += 1,
                Sentiment::Neutral => summary.neutral += 1,
                Sentiment::Negative => summary.negative += 1,
            }
        }

        summary
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Overall verdict. Neutral calls only count towards the total.
    pub fn verdict(&self) -> SentimentVerdict {
        if self.total() == 0 {
            SentimentVerdict::NotAvailable
        } else if self.positive > self.negative {
            SentimentVerdict::Positive
        } else if self.negative > self.positive {
            SentimentVerdict::Negative
        } else {
            SentimentVerdict::Neutral
        }
    }

    /// Counts keyed by label, omitting labels that never occur.
    pub fn counts(&self) -> BTreeMap<Sentiment, usize> {
        [
            (Sentiment::Positive, self.positive),
            (Sentiment::Neutral, self.neutral),
            (Sentiment::Negative, self.negative),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }

    /// Share of positive calls in percent; 0 for an empty set.
    pub fn positive_rate(&self) -> f64 {
        rate(self.positive, self.total())
    }

    /// Share of negative calls in percent; 0 for an empty set.
    pub fn negative_rate(&self) -> f64 {
        rate(self.negative, self.total())
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
