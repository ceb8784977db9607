//! Error types for Horizon Analytics

use chrono::NaiveDate;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while computing analytics
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No previous period: {start}..{end} starts at the earliest supported date")]
    NoPreviousPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Log store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid log entry: {0}")]
    InvalidEntry(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
