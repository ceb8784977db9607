//! Horizon Analytics - temporal behavioral analytics for mood and sleep journals
//!
//! The engine turns dated, rated log entries into trend and variability
//! classifications, tag-frequency rankings and streaks of consecutive
//! qualifying days, then compares the result with the preceding period of
//! equal length: fetch → daily aggregation → moving average/trend →
//! variability → tag frequencies → qualifying days/streaks → period diff.
//!
//! ## Modules
//!
//! - **Mood analytics**: `AnalyticsEngine::metrics` over `LogEntry` records
//! - **Sleep analytics**: `AnalyticsEngine::sleep_metrics` over `SleepLog` records

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod report;
pub mod sleep;
pub mod store;
pub mod streaks;
pub mod tags;
pub mod trend;
pub mod types;
pub mod variability;

pub use compare::{percent_change, CategoryDiff, PeriodDiff, TopTagDiff};
pub use config::EngineConfig;
pub use engine::{AnalyticsEngine, MetricsComparison, SleepComparison};
pub use error::AnalyticsError;
pub use report::{MetricsReport, ReportEncoder};
pub use sleep::{SleepDiff, SleepLog, SleepSnapshot};
pub use store::{InMemoryStore, LogStore};
pub use types::{
    DailyAggregate, LogEntry, MetricsSnapshot, MoodCategory, Period, Stability, Streak, Tag,
    TagFrequency, Trend,
};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "horizon-analytics";
