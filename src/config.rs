//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.callsight.toml` files.

use crate::analysis::{InsightEngine, RecommendationTable};
use crate::models::ObjectionTag;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".callsight.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Call store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Insight rule settings.
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Call store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON Lines store file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("sales_calls.jsonl")
}

/// Objection advice used by the insight rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Advice used when a tag has no entry.
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Advice per objection tag name (e.g. "Price", "Product/Feature").
    #[serde(default = "default_recommendations")]
    pub recommendations: BTreeMap<String, String>,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            recommendations: default_recommendations(),
        }
    }
}

fn default_fallback() -> String {
    RecommendationTable::default().fallback().to_string()
}

fn default_recommendations() -> BTreeMap<String, String> {
    let table = RecommendationTable::default();
    ObjectionTag::ALL
        .iter()
        .map(|tag| (tag.to_string(), table.advice_for(*tag).to_string()))
        .collect()
}

impl InsightsConfig {
    /// Build the recommendation table, ignoring unknown tag names.
    pub fn recommendation_table(&self) -> RecommendationTable {
        let mut table = RecommendationTable::empty(self.fallback.clone());

        for (name, advice) in &self.recommendations {
            match name.parse::<ObjectionTag>() {
                Ok(tag) => table.insert(tag, advice.trim()),
                Err(e) => warn!("Ignoring recommendation: {}", e),
            }
        }

        table
    }

    pub fn insight_engine(&self) -> InsightEngine {
        InsightEngine::new(self.recommendation_table())
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum calls listed by `reports`.
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,

    /// Include daily trend tables in Markdown reports.
    #[serde(default = "default_true")]
    pub include_charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            include_charts: true,
        }
    }
}

fn default_max_calls() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref store) = args.store {
            self.store.path = store.clone();
        }

        if let crate::cli::Command::Reports {
            limit: Some(limit), ..
        } = args.command
        {
            self.report.max_calls = limit;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.path, PathBuf::from("sales_calls.jsonl"));
        assert_eq!(config.report.max_calls, 50);
        assert_eq!(config.insights.recommendations.len(), 5);
        assert!(config.insights.recommendations.contains_key("Product/Feature"));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[store]
path = "data/calls.jsonl"

[insights]
fallback = "Check the playbook."

[insights.recommendations]
Price = "Anchor on ROI."
"Product/Feature" = "Share the roadmap."
Weather = "Ignored."

[report]
max_calls = 10
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.store.path, PathBuf::from("data/calls.jsonl"));
        assert_eq!(config.report.max_calls, 10);
        assert!(config.report.include_charts);

        let table = config.insights.recommendation_table();
        assert_eq!(table.advice_for(ObjectionTag::Price), "Anchor on ROI.");
        assert_eq!(
            table.advice_for(ObjectionTag::ProductFeature),
            "Share the roadmap."
        );
        assert_eq!(table.advice_for(ObjectionTag::Timing), "Check the playbook.");
    }

    #[test]
    fn test_merge_with_args() {
        use crate::cli::{Args, Command, OutputFormat};

        let args = Args {
            command: Command::Reports {
                format: OutputFormat::Json,
                output: None,
                limit: Some(5),
            },
            store: Some(PathBuf::from("other.jsonl")),
            config: None,
            verbose: true,
            quiet: false,
        };

        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.store.path, PathBuf::from("other.jsonl"));
        assert_eq!(config.report.max_calls, 5);
        assert!(config.general.verbose);
    }

    #[test]
    fn test_default_table_matches_builtin() {
        let table = InsightsConfig::default().recommendation_table();
        assert_eq!(table, RecommendationTable::default());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[insights"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.insights.recommendations.len(), 5);
    }
}
