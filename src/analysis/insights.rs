//! Rule-based coaching insights.
//!
//! Rules run in a fixed order and each appends at most one message (the
//! objection rule may append two). The order is the priority shown to users:
//! objection advice, then sentiment health, then data volume, then the
//! strategic action plan.

use super::sentiment::SentimentSummary;
use crate::models::ObjectionTag;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::debug;

/// Negative share (percent) above which coaching is flagged as critical.
const NEGATIVE_RATE_CRITICAL: f64 = 30.0;
/// Positive share (percent) above which the team is praised.
const POSITIVE_RATE_STRONG: f64 = 60.0;
/// Mixed-sentiment rule only applies above this many calls.
const MIXED_SENTIMENT_MIN_CALLS: usize = 5;
/// Positive/negative gap below which sentiment counts as mixed.
const MIXED_SENTIMENT_MAX_GAP: usize = 2;
/// Fewer calls than this is reported as limited data.
const LIMITED_DATA_CALLS: usize = 5;
/// More calls than this is reported as a robust dataset.
const ROBUST_DATA_CALLS: usize = 20;

const DEFAULT_FALLBACK: &str = "Review objection handling scripts.";

/// Which rule produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InsightCategory {
    Objection,
    Sentiment,
    DataVolume,
    ActionPlan,
}

/// A single coaching insight. Serializes as its message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub category: InsightCategory,
    pub message: String,
}

impl Insight {
    fn new(category: InsightCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl Serialize for Insight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.message)
    }
}

/// Advice looked up for the primary objection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationTable {
    advice: HashMap<ObjectionTag, String>,
    fallback: String,
}

impl RecommendationTable {
    /// A table with no entries; every lookup yields the fallback.
    pub fn empty(fallback: impl Into<String>) -> Self {
        Self {
            advice: HashMap::new(),
            fallback: fallback.into(),
        }
    }

    pub fn with(mut self, tag: ObjectionTag, advice: impl Into<String>) -> Self {
        self.advice.insert(tag, advice.into());
        self
    }

    pub fn insert(&mut self, tag: ObjectionTag, advice: impl Into<String>) {
        self.advice.insert(tag, advice.into());
    }

    /// Advice for the tag, or the fallback when the tag is unmapped.
    pub fn advice_for(&self, tag: ObjectionTag) -> &str {
        self.advice
            .get(&tag)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for RecommendationTable {
    fn default() -> Self {
        Self::empty(DEFAULT_FALLBACK)
            .with(
                ObjectionTag::Price,
                "Emphasize ROI and long-term value. Offer flexibility in payment terms if possible, or highlight premium features that justify the cost.",
            )
            .with(
                ObjectionTag::Timing,
                "Establish a clear follow-up timeline. Share case studies or relevant content to keep them engaged until the timing is right.",
            )
            .with(
                ObjectionTag::Competitor,
                "Focus on unique selling propositions (USPs) and differentiators. Avoid bad-mouthing; instead, highlight where your solution excels.",
            )
            .with(
                ObjectionTag::Authority,
                "Ask for an introduction to the decision-maker. Equip your champion with materials to sell internally on your behalf.",
            )
            .with(
                ObjectionTag::ProductFeature,
                "Validate the need for the missing feature. If it's on the roadmap, share the timeline. If not, focus on existing workarounds or core benefits.",
            )
    }
}

/// Everything the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct InsightInputs<'a> {
    pub total_calls: usize,
    pub sentiment: &'a SentimentSummary,
    /// Highest-ranked objections first; only the first two are used.
    pub top_objections: &'a [(ObjectionTag, usize)],
}

/// Evaluates the insight rules against aggregated results.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    recommendations: RecommendationTable,
}

impl InsightEngine {
    pub fn new(recommendations: RecommendationTable) -> Self {
        Self { recommendations }
    }

    /// Run every rule in priority order.
    pub fn evaluate(&self, inputs: &InsightInputs<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();
        let primary = inputs.top_objections.first().map(|(tag, _)| *tag);

        self.objection_rule(inputs, &mut insights);
        sentiment_rule(inputs, &mut insights);
        volume_rule(inputs.total_calls, &mut insights);
        if let Some(plan) = primary.and_then(action_plan) {
            insights.push(Insight::new(InsightCategory::ActionPlan, plan));
        }

        debug!(
            "Generated {} insights for {} calls (primary objection: {:?})",
            insights.len(),
            inputs.total_calls,
            primary
        );

        insights
    }

    fn objection_rule(&self, inputs: &InsightInputs<'_>, insights: &mut Vec<Insight>) {
        let Some((primary, _)) = inputs.top_objections.first() else {
            return;
        };

        insights.push(Insight::new(
            InsightCategory::Objection,
            format!(
                "Primary Challenge: {}. {}",
                primary,
                self.recommendations.advice_for(*primary)
            ),
        ));

        if let Some((secondary, _)) = inputs.top_objections.get(1) {
            insights.push(Insight::new(
                InsightCategory::Objection,
                format!(
                    "Secondary Challenge: {}. Watch for this surfacing alongside {}.",
                    secondary, primary
                ),
            ));
        }
    }
}

fn sentiment_rule(inputs: &InsightInputs<'_>, insights: &mut Vec<Insight>) {
    let sentiment = inputs.sentiment;
    let negative_rate = sentiment.negative_rate();
    let positive_rate = sentiment.positive_rate();

    let message = if negative_rate > NEGATIVE_RATE_CRITICAL {
        format!(
            "Critical: High negative sentiment ({:.1}%). Immediate coaching required on conflict resolution.",
            negative_rate
        )
    } else if positive_rate > POSITIVE_RATE_STRONG {
        "Team is performing well! Sentiment is overwhelmingly positive. Share top calls as training examples."
            .to_string()
    } else if inputs.total_calls > MIXED_SENTIMENT_MIN_CALLS
        && sentiment.positive.abs_diff(sentiment.negative) < MIXED_SENTIMENT_MAX_GAP
    {
        "Mixed sentiment results. Focus on closing techniques to convert neutral calls to positive outcomes."
            .to_string()
    } else {
        return;
    };

    insights.push(Insight::new(InsightCategory::Sentiment, message));
}

fn volume_rule(total_calls: usize, insights: &mut Vec<Insight>) {
    let message = if total_calls < LIMITED_DATA_CALLS {
        "Data Limited. Upload at least 5 more calls to unlock deeper trend analysis."
    } else if total_calls > ROBUST_DATA_CALLS {
        "Robust dataset available. Consider segmenting analysis by sales rep (feature coming soon)."
    } else {
        return;
    };

    insights.push(Insight::new(InsightCategory::DataVolume, message));
}

/// Three-step playbook for the objections that have one.
fn action_plan(primary: ObjectionTag) -> Option<&'static str> {
    match primary {
        ObjectionTag::Price => Some(
            "Strategic Action Plan: 1) Acknowledge the budget constraint. 2) Reframe the discussion around 'cost of inaction'. 3) Offer a tiered pricing model or pilot program to lower the barrier to entry.",
        ),
        ObjectionTag::Competitor => Some(
            "Strategic Action Plan: 1) Do not get defensive. 2) Ask 'What do you like most about them?'. 3) Pivot to your unique strengths (e.g., better support, faster implementation) that the competitor lacks.",
        ),
        ObjectionTag::Timing => Some(
            "Strategic Action Plan: 1) Validate their timeline. 2) Ask 'What changes next quarter?'. 3) Propose a 'mutual action plan' to work backwards from their desired go-live date, creating urgency now.",
        ),
        ObjectionTag::Authority | ObjectionTag::ProductFeature => None,
    }
}
