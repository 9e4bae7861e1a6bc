//! JSON Lines backed store.

use super::RecordSource;
use crate::error::StoreError;
use crate::models::{NewCall, StoredCall};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only store in a single `.jsonl` file.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_records(&self, file: &mut File) -> Result<Vec<StoredCall>, StoreError> {
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| self.io_error(e))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|source| StoreError::Corrupt {
                    path: self.path.clone(),
                    line: index + 1,
                    source,
                })
            })
            .collect()
    }

    /// Append calls, assigning ids and write timestamps.
    pub fn append(&self, calls: Vec<NewCall>) -> Result<Vec<StoredCall>, StoreError> {
        self.append_with(calls, |_| {})
    }

    /// Append calls, invoking `on_write` after each one is written.
    ///
    /// Holds an exclusive lock on the store file from the id scan until the
    /// last line is flushed.
    pub fn append_with<F>(
        &self,
        calls: Vec<NewCall>,
        mut on_write: F,
    ) -> Result<Vec<StoredCall>, StoreError>
    where
        F: FnMut(&StoredCall),
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.lock().map_err(|e| self.io_error(e))?;

        let mut next_id = self
            .read_records(&mut file)?
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(0)
            + 1;

        let mut writer = BufWriter::new(&file);

        let mut written = Vec::with_capacity(calls.len());
        for call in calls {
            let stored = StoredCall {
                id: next_id,
                filename: call.filename,
                sentiment: call.sentiment.to_string(),
                objections: call.objections.iter().map(|t| t.to_string()).collect(),
                summary: call.summary,
                timestamp: Utc::now(),
            };
            next_id += 1;

            let line = serde_json::to_string(&stored)?;
            writeln!(writer, "{}", line).map_err(|e| self.io_error(e))?;
            on_write(&stored);
            written.push(stored);
        }

        writer.flush().map_err(|e| self.io_error(e))?;
        drop(writer);
        file.unlock().map_err(|e| self.io_error(e))?;
        debug!("Appended {} calls to {}", written.len(), self.path.display());

        Ok(written)
    }
}

impl RecordSource for JsonlStore {
    fn list_all_records(&self) -> Result<Vec<StoredCall>, StoreError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Store {} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        file.lock_shared().map_err(|e| self.io_error(e))?;
        let records = self.read_records(&mut file);
        file.unlock().map_err(|e| self.io_error(e))?;
        records
    }
}
