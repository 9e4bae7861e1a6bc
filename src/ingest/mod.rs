//! Loading per-call tagger output for ingestion.
//!
//! Accepts a single JSON file or a directory searched recursively for
//! `*.json` files. Each file holds one analysis object or an array of them.
//! Every entry is validated before anything is returned, so a bad entry
//! stops the whole batch.

use crate::error::EngineError;
use crate::models::{CallAnalysis, NewCall};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Find analysis files under `path`, sorted for a stable ingest order.
pub fn discover_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Ingest path does not exist: {}", path.display());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let is_json = entry.path().extension().and_then(|e| e.to_str()) == Some("json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!("Discovered {} analysis files under {}", files.len(), path.display());
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Parse and validate every entry in one analysis file.
pub fn load_file(path: &Path) -> Result<Vec<NewCall>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read analysis file: {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse analysis file: {}", path.display()))?;

    let entries = match parsed {
        Value::Array(entries) => entries,
        entry => vec![entry],
    };

    let default_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let calls = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let record = format!("{}[{}]", path.display(), index);
            CallAnalysis::deserialize(entry)
                .map_err(|e| EngineError::validation(&record, e.to_string()))?
                .validate(&record, &default_name)
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    Ok(calls)
}

/// Load every analysis under `path`, failing on the first invalid entry.
pub fn load_path(path: &Path) -> Result<Vec<NewCall>> {
    let mut calls = Vec::new();
    for file in discover_files(path)? {
        calls.extend(load_file(&file)?);
    }
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ObjectionTag, Sentiment};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_single_object() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "call.json",
            r#"{"sentiment": "Negative", "objections": ["Price", "Competitor"], "summary": "Too expensive."}"#,
        );

        let calls = load_file(&path).unwrap();

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].filename, "call.json");
        assert_eq!(calls[0].sentiment, Sentiment::Negative);
        assert_eq!(
            calls[0].objections,
            vec![ObjectionTag::Price, ObjectionTag::Competitor]
        );
    }

    #[test]
    fn test_load_array() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "batch.json",
            r#"[
                {"filename": "a.wav", "sentiment": "positive", "objections": [], "summary": ""},
                {"filename": "b.wav", "sentiment": "NEUTRAL", "summary": "Follow up."}
            ]"#,
        );

        let calls = load_file(&path).unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].filename, "b.wav");
        assert_eq!(calls[1].sentiment, Sentiment::Neutral);
        assert!(calls[1].objections.is_empty());
    }

    #[test]
    fn test_invalid_entry_names_file_and_index() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "bad.json",
            r#"[{"sentiment": "Positive"}, {"sentiment": "Elated"}]"#,
        );

        let err = load_file(&path).unwrap_err();
        let engine_err = err.downcast_ref::<EngineError>().unwrap();

        match engine_err {
            EngineError::Validation { record, .. } => assert!(record.ends_with("bad.json[1]")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_entry_names_file_and_index() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "batch.json",
            r#"[{"sentiment": "Positive"}, {"summary": "no label"}, {"sentiment": 3}]"#,
        );

        let err = load_file(&path).unwrap_err();

        match err.downcast_ref::<EngineError>() {
            Some(EngineError::Validation { record, reason }) => {
                assert!(record.ends_with("batch.json[1]"));
                assert!(reason.contains("sentiment"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_entry_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "odd.json", r#""just a string""#);

        let err = load_file(&path).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Validation { record, .. }) if record.ends_with("odd.json[0]")
        ));
    }

    #[test]
    fn test_discover_walks_directories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.json", "{}");
        write(dir.path(), "nested/a.json", "{}");
        write(dir.path(), "notes.txt", "ignored");
        write(dir.path(), ".hidden/c.json", "{}");

        let files = discover_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names.len(), 2);
        assert!(names.contains(&"b.json".to_string()));
        assert!(names.iter().any(|n| n.ends_with("a.json")));
    }

    #[test]
    fn test_load_path_fails_fast() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", r#"{"sentiment": "Positive"}"#);
        write(dir.path(), "b.json", r#"{"sentiment": "Positive", "objections": ["Weather"]}"#);

        assert!(load_path(dir.path()).is_err());
    }

    #[test]
    fn test_load_bundled_fixtures() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/calls");

        let calls = load_path(&fixtures).unwrap();

        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].filename, "acme-discovery.wav");
        assert_eq!(calls[3].filename, "umbrella-renewal.json");
        assert_eq!(
            calls[3].objections,
            vec![ObjectionTag::Price, ObjectionTag::Timing]
        );
    }

    #[test]
    fn test_missing_path_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_path(&dir.path().join("nope")).is_err());
    }
}
