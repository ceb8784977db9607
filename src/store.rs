//! Log store collaborators
//!
//! The engine never talks to a database directly. It asks a `LogStore` for the
//! entries of one user within one period and treats any failure as fatal for
//! the request.

use crate::error::{AnalyticsError, Result};
use crate::sleep::SleepLog;
use crate::types::{LogEntry, Period, RatingScale};
use serde::{Deserialize, Serialize};

/// Source of raw log entries
pub trait LogStore {
    /// Mood entries of `user_id` whose date falls within `period`
    fn entries(&self, user_id: &str, period: &Period) -> Result<Vec<LogEntry>>;

    /// Sleep logs of `user_id` whose sleep date falls within `period`
    fn sleep_logs(&self, user_id: &str, period: &Period) -> Result<Vec<SleepLog>>;
}

/// JSON document holding entries and sleep logs for any number of users
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDocument {
    #[serde(default)]
    pub entries: Vec<LogEntry>,
    #[serde(default)]
    pub sleep_logs: Vec<SleepLog>,
}

/// An entry that failed validation
#[derive(Debug)]
pub struct EntryValidationResult {
    pub index: usize,
    pub entry_id: i64,
    pub error: AnalyticsError,
}

/// Store backed by in-process vectors
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Vec<LogEntry>,
    sleep_logs: Vec<SleepLog>,
}

impl InMemoryStore {
    pub fn new(entries: Vec<LogEntry>, sleep_logs: Vec<SleepLog>) -> Self {
        Self {
            entries,
            sleep_logs,
        }
    }

    /// Load a store from a `LogDocument` JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let document: LogDocument = serde_json::from_str(json)?;
        Ok(Self::from(document))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn sleep_log_count(&self) -> usize {
        self.sleep_logs.len()
    }

    /// Validate every entry, returning the ones that fail
    pub fn validate_entries(&self, scale: &RatingScale) -> Vec<EntryValidationResult> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry.validate(scale).err().map(|error| EntryValidationResult {
                    index,
                    entry_id: entry.id,
                    error,
                })
            })
            .collect()
    }
}

impl From<LogDocument> for InMemoryStore {
    fn from(document: LogDocument) -> Self {
        Self::new(document.entries, document.sleep_logs)
    }
}

impl LogStore for InMemoryStore {
    fn entries(&self, user_id: &str, period: &Period) -> Result<Vec<LogEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && period.contains(e.date()))
            .cloned()
            .collect())
    }

    fn sleep_logs(&self, user_id: &str, period: &Period) -> Result<Vec<SleepLog>> {
        Ok(self
            .sleep_logs
            .iter()
            .filter(|l| l.user_id == user_id && period.contains(l.sleep_date))
            .cloned()
            .collect())
    }
}
