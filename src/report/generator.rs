//! Markdown and JSON report generation.
//!
//! This module renders analytics snapshots and call listings. JSON output
//! of a snapshot is the snapshot itself, so its field names are the
//! external contract.

use crate::analysis::{Insight, InsightCategory};
use crate::models::{
    AnalyticsReport, AnalyticsSnapshot, CallRecord, Charts, ObjectionTag, ReportMetadata,
    Sentiment,
};
use anyhow::Result;
use serde::Serialize;

/// Generate a complete Markdown analytics report.
pub fn generate_markdown_report(report: &AnalyticsReport, include_charts: bool) -> String {
    let mut output = String::new();

    output.push_str("# Sales Call Analytics\n\n");
    output.push_str(&generate_metadata_section(&report.metadata, &report.snapshot));
    output.push_str(&generate_sentiment_section(&report.snapshot));
    output.push_str(&generate_objections_section(&report.objection_ranking));
    output.push_str(&generate_insights_section(&report.snapshot.insights));

    if include_charts {
        output.push_str(&generate_trends_section(&report.snapshot.charts));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Store:** `{}`\n", metadata.store_path));
    section.push_str(&format!("- **Total Calls:** {}\n", snapshot.total_calls));
    section.push_str(&format!(
        "- **Average Sentiment:** {}\n",
        snapshot.avg_sentiment
    ));
    match snapshot.top_objection {
        Some(tag) => section.push_str(&format!("- **Top Objection:** {}\n", tag)),
        None => section.push_str("- **Top Objection:** None\n"),
    }
    section.push('\n');

    section
}

/// Generate the sentiment breakdown table.
fn generate_sentiment_section(snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Sentiment Breakdown\n\n");

    if snapshot.total_calls == 0 {
        section.push_str("No calls have been analyzed yet.\n\n");
        return section;
    }

    section.push_str("| Sentiment | Calls | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for sentiment in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
        let count = snapshot
            .sentiment_counts
            .get(&sentiment)
            .copied()
            .unwrap_or(0);
        let share = count as f64 / snapshot.total_calls as f64 * 100.0;
        section.push_str(&format!("| {} | {} | {:.1}% |\n", sentiment, count, share));
    }
    section.push_str(&format!("| **Total** | **{}** | |\n\n", snapshot.total_calls));

    section
}

/// Generate the ranked objection table.
fn generate_objections_section(ranking: &[(ObjectionTag, usize)]) -> String {
    let mut section = String::new();

    section.push_str("## Objections\n\n");

    if ranking.is_empty() {
        section.push_str("No objections were detected.\n\n");
        return section;
    }

    section.push_str("| Rank | Objection | Mentions |\n");
    section.push_str("|:---:|:---|:---:|\n");

    for (i, (tag, count)) in ranking.iter().enumerate() {
        section.push_str(&format!("| {} | {} | {} |\n", i + 1, tag, count));
    }
    section.push('\n');

    section
}

/// Generate the insights section, keeping engine order.
fn generate_insights_section(insights: &[Insight]) -> String {
    let mut section = String::new();

    section.push_str("## Coaching Insights\n\n");

    if insights.is_empty() {
        section.push_str("No insights for the current data.\n\n");
        return section;
    }

    for (i, insight) in insights.iter().enumerate() {
        section.push_str(&format!(
            "{}. {} {}\n",
            i + 1,
            category_marker(insight.category),
            insight.message
        ));
    }
    section.push('\n');

    section
}

fn category_marker(category: InsightCategory) -> &'static str {
    match category {
        InsightCategory::Objection => "🎯",
        InsightCategory::Sentiment => "💬",
        InsightCategory::DataVolume => "📊",
        InsightCategory::ActionPlan => "🧭",
    }
}

/// Generate the daily trend tables.
fn generate_trends_section(charts: &Charts) -> String {
    let mut section = String::new();

    section.push_str("## Daily Trends\n\n");

    if charts.volume.is_empty() {
        section.push_str("No trend data yet.\n\n");
        return section;
    }

    section.push_str("| Date | Calls | Positive | Negative |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");

    for (volume, trend) in charts.volume.iter().zip(&charts.sentiment_trend) {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            volume.date, volume.count, trend.positive, trend.negative
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by Callsight*\n");

    footer
}

/// Generate the JSON analytics snapshot.
pub fn generate_json_snapshot(snapshot: &AnalyticsSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(Into::into)
}

/// Generate a Markdown listing of calls.
pub fn generate_calls_markdown(calls: &[CallRecord]) -> String {
    let mut output = String::new();

    output.push_str("# Call Reports\n\n");

    if calls.is_empty() {
        output.push_str("No calls stored yet.\n");
        return output;
    }

    output.push_str("| ID | Date | File | Sentiment | Objections | Summary |\n");
    output.push_str("|:---:|:---|:---|:---|:---|:---|\n");

    for call in calls {
        let objections = if call.objections.is_empty() {
            "-".to_string()
        } else {
            call.objections
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            call.id,
            call.timestamp.format("%Y-%m-%d %H:%M"),
            escape_cell(&call.filename),
            call.sentiment,
            objections,
            escape_cell(&call.summary)
        ));
    }

    output
}

/// Keep table cells on one line and pipes from splitting columns.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[derive(Serialize)]
struct CallEntry<'a> {
    id: u64,
    filename: &'a str,
    sentiment: String,
    objections: Vec<String>,
    summary: &'a str,
    timestamp: String,
}

/// Generate a JSON listing of calls.
pub fn generate_calls_json(calls: &[CallRecord]) -> Result<String> {
    let entries: Vec<CallEntry<'_>> = calls
        .iter()
        .map(|call| CallEntry {
            id: call.id,
            filename: &call.filename,
            sentiment: call.sentiment.to_string(),
            objections: call.objections.iter().map(|t| t.to_string()).collect(),
            summary: &call.summary,
            timestamp: call.timestamp.to_rfc3339(),
        })
        .collect();

    serde_json::to_string_pretty(&entries).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SnapshotAssembler;
    use chrono::{TimeZone, Utc};

    fn call(id: u64, day: u32, sentiment: Sentiment, objections: &[ObjectionTag]) -> CallRecord {
        CallRecord {
            id,
            filename: format!("call-{}.wav", id),
            sentiment,
            objections: objections.to_vec(),
            summary: "Customer asked | about pricing.\nWill follow up.".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 15, 4, 0).unwrap(),
        }
    }

    fn create_test_report(records: &[CallRecord]) -> AnalyticsReport {
        let snapshot = SnapshotAssembler::default().compute_snapshot(records);
        AnalyticsReport {
            metadata: ReportMetadata {
                generated_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
                store_path: "sales_calls.jsonl".to_string(),
            },
            objection_ranking: crate::analysis::objection_tally(records).ranked().to_vec(),
            snapshot,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let records = vec![
            call(1, 1, Sentiment::Positive, &[ObjectionTag::Price]),
            call(2, 3, Sentiment::Negative, &[ObjectionTag::Price, ObjectionTag::Timing]),
        ];
        let markdown = generate_markdown_report(&create_test_report(&records), true);

        assert!(markdown.contains("# Sales Call Analytics"));
        assert!(markdown.contains("- **Total Calls:** 2"));
        assert!(markdown.contains("- **Top Objection:** Price"));
        assert!(markdown.contains("| Positive | 1 | 50.0% |"));
        assert!(markdown.contains("| 1 | Price | 2 |"));
        assert!(markdown.contains("1. 🎯 Primary Challenge: Price."));
        assert!(markdown.contains("| 2024-01-03 | 1 | 0 | 1 |"));
    }

    #[test]
    fn test_markdown_without_charts() {
        let records = vec![call(1, 1, Sentiment::Neutral, &[])];
        let markdown = generate_markdown_report(&create_test_report(&records), false);
        assert!(!markdown.contains("## Daily Trends"));
    }

    #[test]
    fn test_empty_report() {
        let markdown = generate_markdown_report(&create_test_report(&[]), true);

        assert!(markdown.contains("- **Average Sentiment:** N/A"));
        assert!(markdown.contains("- **Top Objection:** None"));
        assert!(markdown.contains("No calls have been analyzed yet."));
        assert!(markdown.contains("No objections were detected."));
        assert!(markdown.contains("Data Limited."));
        assert!(markdown.contains("No trend data yet."));
    }

    #[test]
    fn test_generate_json_snapshot() {
        let records = vec![call(1, 1, Sentiment::Positive, &[ObjectionTag::ProductFeature])];
        let report = create_test_report(&records);
        let json = generate_json_snapshot(&report.snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_calls"], 1);
        assert_eq!(value["sentiment_counts"]["positive"], 1);
        assert_eq!(value["avg_sentiment"], "Positive");
        assert_eq!(value["top_objection"], "Product/Feature");
        assert!(value["insights"][0]
            .as_str()
            .unwrap()
            .starts_with("Primary Challenge: Product/Feature."));
        assert_eq!(value["charts"]["volume"][0]["date"], "2024-01-01");
        assert_eq!(value["charts"]["volume"][0]["count"], 1);
        assert_eq!(value["charts"]["sentiment_trend"][0]["positive"], 1);
        assert_eq!(value["charts"]["sentiment_trend"][0]["negative"], 0);
    }

    #[test]
    fn test_calls_markdown_escapes_cells() {
        let markdown = generate_calls_markdown(&[call(7, 2, Sentiment::Neutral, &[])]);

        assert!(markdown.contains("| 7 | 2024-01-02 15:04 | call-7.wav | Neutral | - |"));
        assert!(markdown.contains("Customer asked \\| about pricing. Will follow up."));
    }

    #[test]
    fn test_calls_json() {
        let json = generate_calls_json(&[call(
            3,
            1,
            Sentiment::Negative,
            &[ObjectionTag::Competitor],
        )])
        .unwrap();

        assert!(json.contains("\"filename\": \"call-3.wav\""));
        assert!(json.contains("\"sentiment\": \"Negative\""));
        assert!(json.contains("\"Competitor\""));
    }

    #[test]
    fn test_empty_calls_listing() {
        assert!(generate_calls_markdown(&[]).contains("No calls stored yet."));
        assert_eq!(generate_calls_json(&[]).unwrap(), "[]");
    }
}
