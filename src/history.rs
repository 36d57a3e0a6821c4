//! Calculation history, persisted as a JSON array.
//!
//! The interpreter and keypad never write here directly; they hand
//! `(expression, result)` pairs to a [`HistorySink`] owned by the front end.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Receives successful calculations.
pub trait HistorySink {
    fn record(&mut self, expression: &str, result: &str);
}

impl<F: FnMut(&str, &str)> HistorySink for F {
    fn record(&mut self, expression: &str, result: &str) {
        self(expression, result)
    }
}

/// Discards everything.
pub struct NoHistory;

impl HistorySink for NoHistory {
    fn record(&mut self, _expression: &str, _result: &str) {}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub expression: String,
    pub result: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(expression: &str, result: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            expression: expression.to_string(),
            result: result.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
    max_entries: usize,
}

impl HistoryStore {
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("poppi_calc")
            .join("history.json")
    }

    /// Opens the history at `path`. A missing file is an empty history; an
    /// unreadable or corrupt one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        let entries = match Self::read(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable history");
                Vec::new()
            }
        };

        let mut store = Self {
            path,
            entries,
            max_entries,
        };
        store.trim();
        store
    }

    fn read(path: &Path) -> Result<Vec<HistoryEntry>, HistoryError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, dropping the oldest ones beyond `max_entries`.
    ///
    /// Returns the stored entry, or `None` when `max_entries` is zero and
    /// nothing is kept.
    pub fn push(&mut self, expression: &str, result: &str) -> Option<&HistoryEntry> {
        self.entries.push(HistoryEntry::new(expression, result));
        self.trim();
        debug!(expression, result, "Recorded calculation");
        self.entries.last()
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    pub fn save(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Forgets every entry and removes the file.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl HistorySink for HistoryStore {
    fn record(&mut self, expression: &str, result: &str) {
        self.push(expression, result);
    }
}
