//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Callsight - sales call analytics and coaching insights
///
/// Stores per-call analysis results (sentiment, objections, summary) and
/// turns the full history into trends, objection rankings and coaching
/// recommendations.
///
/// Examples:
///   callsight ingest ./analyses
///   callsight analytics --format json
///   callsight reports --limit 20
///   callsight --store data/calls.jsonl analytics -o report.md
///   callsight init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path of the call store (JSON Lines)
    ///
    /// Overrides the store path from .callsight.toml.
    #[arg(long, global = true, value_name = "FILE", env = "CALLSIGHT_STORE")]
    pub store: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .callsight.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Append tagger output to the call store
    ///
    /// PATH is a JSON file or a directory searched recursively for *.json
    /// files. Each file holds one analysis object or an array of them.
    Ingest {
        /// Analysis file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Compute the analytics snapshot over every stored call
    Analytics {
        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List stored calls, newest first
    Reports {
        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,

        /// Write the listing to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum number of calls to list
        #[arg(long, value_name = "COUNT")]
        limit: Option<usize>,
    },

    /// Generate a default .callsight.toml configuration file
    InitConfig,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Ingest { path, .. } => {
                if !path.exists() {
                    return Err(format!("Ingest path does not exist: {}", path.display()));
                }
            }
            Command::Reports {
                limit: Some(0), ..
            } => {
                return Err("Limit must be at least 1".to_string());
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
