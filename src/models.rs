//! Data models for call analytics.
//!
//! This module contains the core data structures used throughout the
//! application: the closed sentiment and objection enumerations, stored and
//! validated call records, and the analytics snapshot handed to renderers.

use crate::analysis::Insight;
use crate::error::EngineError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Sentiment label attached to a single call by the upstream tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Negative => write!(f, "Negative"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            _ => Err(format!("unknown sentiment '{}'", s)),
        }
    }
}

/// Sales objection category detected in a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ObjectionTag {
    Price,
    Timing,
    Competitor,
    Authority,
    #[serde(rename = "Product/Feature")]
    ProductFeature,
}

impl ObjectionTag {
    /// All tags in detection order.
    pub const ALL: [ObjectionTag; 5] = [
        ObjectionTag::Price,
        ObjectionTag::Timing,
        ObjectionTag::Competitor,
        ObjectionTag::Authority,
        ObjectionTag::ProductFeature,
    ];
}

impl fmt::Display for ObjectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectionTag::Price => write!(f, "Price"),
            ObjectionTag::Timing => write!(f, "Timing"),
            ObjectionTag::Competitor => write!(f, "Competitor"),
            ObjectionTag::Authority => write!(f, "Authority"),
            ObjectionTag::ProductFeature => write!(f, "Product/Feature"),
        }
    }
}

impl FromStr for ObjectionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(ObjectionTag::Price),
            "timing" => Ok(ObjectionTag::Timing),
            "competitor" => Ok(ObjectionTag::Competitor),
            "authority" => Ok(ObjectionTag::Authority),
            "product/feature" | "product_feature" | "productfeature" => {
                Ok(ObjectionTag::ProductFeature)
            }
            _ => Err(format!("unknown objection tag '{}'", s)),
        }
    }
}

/// A call record exactly as persisted in the store.
///
/// Labels are kept as written so that a bad row surfaces as a validation
/// error naming the record instead of a store parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCall {
    /// Unique, monotonically increasing identifier.
    pub id: u64,
    /// Original upload name (informational only).
    pub filename: String,
    /// Sentiment label as written by the tagger.
    pub sentiment: String,
    /// Objection tags as written by the tagger.
    #[serde(default)]
    pub objections: Vec<String>,
    /// Free-text call summary.
    #[serde(default)]
    pub summary: String,
    /// Write time; the only ordering and grouping key.
    pub timestamp: DateTime<Utc>,
}

impl StoredCall {
    /// Identity used in validation errors.
    pub fn label(&self) -> String {
        format!("#{} ({})", self.id, self.filename)
    }
}

/// A validated call record.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub id: u64,
    pub filename: String,
    pub sentiment: Sentiment,
    pub objections: Vec<ObjectionTag>,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<&StoredCall> for CallRecord {
    type Error = EngineError;

    fn try_from(stored: &StoredCall) -> Result<Self, Self::Error> {
        let record = stored.label();
        Ok(CallRecord {
            id: stored.id,
            filename: stored.filename.clone(),
            sentiment: parse_sentiment(&stored.sentiment, &record)?,
            objections: parse_objections(&stored.objections, &record)?,
            summary: stored.summary.clone(),
            timestamp: stored.timestamp,
        })
    }
}

/// Output of the per-call tagger, as read from ingest files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAnalysis {
    /// Upload name; defaults to the source file name when absent.
    #[serde(default)]
    pub filename: Option<String>,
    pub sentiment: String,
    #[serde(default)]
    pub objections: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl CallAnalysis {
    /// Validate the tagger output into a call ready to be appended.
    pub fn validate(&self, record: &str, default_filename: &str) -> Result<NewCall, EngineError> {
        Ok(NewCall {
            filename: self
                .filename
                .clone()
                .unwrap_or_else(|| default_filename.to_string()),
            sentiment: parse_sentiment(&self.sentiment, record)?,
            objections: parse_objections(&self.objections, record)?,
            summary: self.summary.clone(),
        })
    }
}

/// A validated call that has not been assigned an id or timestamp yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCall {
    pub filename: String,
    pub sentiment: Sentiment,
    pub objections: Vec<ObjectionTag>,
    pub summary: String,
}

fn parse_sentiment(label: &str, record: &str) -> Result<Sentiment, EngineError> {
    label
        .parse()
        .map_err(|reason: String| EngineError::validation(record, reason))
}

/// Parse tags, collapsing duplicates while keeping first-occurrence order.
fn parse_objections(tags: &[String], record: &str) -> Result<Vec<ObjectionTag>, EngineError> {
    let mut parsed: Vec<ObjectionTag> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag: ObjectionTag = tag
            .parse()
            .map_err(|reason: String| EngineError::validation(record, reason))?;
        if !parsed.contains(&tag) {
            parsed.push(tag);
        }
    }
    Ok(parsed)
}

/// Directional verdict over a set of sentiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentVerdict {
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl fmt::Display for SentimentVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentVerdict::Positive => write!(f, "Positive"),
            SentimentVerdict::Neutral => write!(f, "Neutral"),
            SentimentVerdict::Negative => write!(f, "Negative"),
            SentimentVerdict::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// Calls per calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Positive and negative calls per calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTrendPoint {
    pub date: NaiveDate,
    pub positive: usize,
    pub negative: usize,
}

/// Chart series included in the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charts {
    pub volume: Vec<VolumePoint>,
    pub sentiment_trend: Vec<SentimentTrendPoint>,
}

/// One complete aggregation over the full record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_calls: usize,
    /// Only labels that occur are present; keys serialize lower-case.
    pub sentiment_counts: BTreeMap<Sentiment, usize>,
    pub avg_sentiment: SentimentVerdict,
    #[serde(serialize_with = "serialize_top_objection")]
    pub top_objection: Option<ObjectionTag>,
    /// Ordered by priority.
    pub insights: Vec<Insight>,
    pub charts: Charts,
}

fn serialize_top_objection<S>(tag: &Option<ObjectionTag>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match tag {
        Some(tag) => tag.serialize(serializer),
        None => serializer.serialize_str("None"),
    }
}

/// Metadata about a rendered analytics report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Store the snapshot was computed from.
    pub store_path: String,
}

/// Everything the Markdown analytics report renders.
#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    pub metadata: ReportMetadata,
    pub snapshot: AnalyticsSnapshot,
    /// Full objection ranking with counts.
    pub objection_ranking: Vec<(ObjectionTag, usize)>,
}

/// Summary of a freshly ingested batch of calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_calls: usize,
    pub positive_calls: usize,
    pub neutral_calls: usize,
    pub negative_calls: usize,
    pub top_objection: Option<ObjectionTag>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored(sentiment: &str, objections: &[&str]) -> StoredCall {
        StoredCall {
            id: 3,
            filename: "call.wav".to_string(),
            sentiment: sentiment.to_string(),
            objections: objections.iter().map(|s| s.to_string()).collect(),
            summary: "Asked about pricing.".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_sentiment_from_str_is_case_insensitive() {
        assert_eq!("Positive".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert_eq!("NEGATIVE".parse::<Sentiment>(), Ok(Sentiment::Negative));
        assert_eq!(" neutral ".parse::<Sentiment>(), Ok(Sentiment::Neutral));
        assert!("angry".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_objection_tag_from_str() {
        assert_eq!("price".parse::<ObjectionTag>(), Ok(ObjectionTag::Price));
        assert_eq!(
            "Product/Feature".parse::<ObjectionTag>(),
            Ok(ObjectionTag::ProductFeature)
        );
        assert!("weather".parse::<ObjectionTag>().is_err());
    }

    #[test]
    fn test_parse_errors_quote_label_as_written() {
        assert_eq!(
            "Furious".parse::<Sentiment>(),
            Err("unknown sentiment 'Furious'".to_string())
        );
        assert_eq!(
            "Budget Freeze".parse::<ObjectionTag>(),
            Err("unknown objection tag 'Budget Freeze'".to_string())
        );
    }

    #[test]
    fn test_objection_tag_display_round_trips() {
        for tag in ObjectionTag::ALL {
            assert_eq!(tag.to_string().parse::<ObjectionTag>(), Ok(tag));
        }
    }

    #[test]
    fn test_stored_call_validates() {
        let record = CallRecord::try_from(&stored("positive", &["Price", "Timing", "price"])).unwrap();
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(
            record.objections,
            vec![ObjectionTag::Price, ObjectionTag::Timing]
        );
    }

    #[test]
    fn test_stored_call_rejects_unknown_sentiment() {
        let err = CallRecord::try_from(&stored("furious", &[])).unwrap_err();
        match err {
            EngineError::Validation { record, reason } => {
                assert_eq!(record, "#3 (call.wav)");
                assert!(reason.contains("furious"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stored_call_rejects_unknown_objection() {
        let err = CallRecord::try_from(&stored("neutral", &["Weather"])).unwrap_err();
        assert!(err.to_string().contains("unknown objection tag"));
    }

    #[test]
    fn test_call_analysis_defaults_filename() {
        let analysis = CallAnalysis {
            filename: None,
            sentiment: "Neutral".to_string(),
            objections: vec![],
            summary: String::new(),
        };
        let call = analysis.validate("calls.json[0]", "calls.json").unwrap();
        assert_eq!(call.filename, "calls.json");
        assert_eq!(call.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_snapshot_serializes_contract_fields() {
        let snapshot = AnalyticsSnapshot {
            total_calls: 0,
            sentiment_counts: BTreeMap::new(),
            avg_sentiment: SentimentVerdict::NotAvailable,
            top_objection: None,
            insights: Vec::new(),
            charts: Charts::default(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["avg_sentiment"], "N/A");
        assert_eq!(json["top_objection"], "None");
        assert!(json["charts"]["volume"].as_array().unwrap().is_empty());
        assert!(json["charts"]["sentiment_trend"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_sentiment_counts_keys_are_lowercase() {
        let mut counts = BTreeMap::new();
        counts.insert(Sentiment::Positive, 2);
        counts.insert(Sentiment::Negative, 1);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"positive":2,"negative":1}"#);
    }
}
