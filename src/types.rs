//! Core types for the Horizon analytics engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: raw log entries, periods, daily aggregates, tag frequencies, streaks
//! and the per-period metrics snapshot.

use crate::error::{AnalyticsError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used wherever a label or tag cannot be computed
pub const NOT_ENOUGH_DATA: &str = "not enough data";

/// A tag attached to a log entry, together with the tag category it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    /// Tag category identifier (e.g. "positive", "clinical")
    pub category: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Inclusive bounds of the rating scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: i32,
    pub max: i32,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

/// A single rated journal entry, as fetched from the log store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub user_id: String,
    pub rating: i32,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl LogEntry {
    /// Calendar date the entry belongs to
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Check the rating against the scale and reject unnamed tags
    pub fn validate(&self, scale: &RatingScale) -> Result<()> {
        if self.rating < scale.min || self.rating > scale.max {
            return Err(AnalyticsError::InvalidEntry(format!(
                "entry {} has rating {} outside {}..={}",
                self.id, self.rating, scale.min, scale.max
            )));
        }
        if let Some(tag) = self.tags.iter().find(|t| t.name.trim().is_empty()) {
            return Err(AnalyticsError::InvalidEntry(format!(
                "entry {} has a tag with an empty name (category {:?})",
                self.id, tag.category
            )));
        }
        Ok(())
    }
}

/// Coarse label derived from the length of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl Granularity {
    pub fn from_days(days: i64) -> Self {
        match days {
            1 => Granularity::Daily,
            7 => Granularity::Weekly,
            28..=31 => Granularity::Monthly,
            _ => Granularity::Custom,
        }
    }
}

/// Inclusive date range. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    #[serde(rename = "startDate")]
    start: NaiveDate,
    #[serde(rename = "endDate")]
    end: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriod {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<RawPeriod> for Period {
    type Error = AnalyticsError;

    fn try_from(raw: RawPeriod) -> Result<Self> {
        Period::new(raw.start_date, raw.end_date)
    }
}

impl Period {
    /// Create a period, rejecting ranges that end before they start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(AnalyticsError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a period from two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, inclusive of both ends
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn granularity(&self) -> Granularity {
        Granularity::from_days(self.len_days())
    }

    /// The period of equal length ending the day before this one starts
    pub fn previous(&self) -> Result<Self> {
        let no_previous = || AnalyticsError::NoPreviousPeriod {
            start: self.start,
            end: self.end,
        };
        let end = self
            .start
            .checked_sub_signed(Duration::days(1))
            .ok_or_else(no_previous)?;
        let start = end
            .checked_sub_signed(Duration::days(self.len_days() - 1))
            .ok_or_else(no_previous)?;
        Ok(Self { start, end })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| AnalyticsError::DateParseError(format!("{value:?}: {e}")))
}

/// Share of tag mentions held by one tag within a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFrequency {
    pub tag_name: String,
    pub count: u32,
    /// count / total tag mentions in scope * 100
    pub percentage: f64,
}

/// All entries logged on one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub mean_rating: f64,
    /// Ordered by timestamp
    pub entries: Vec<LogEntry>,
    pub tag_frequencies: Vec<TagFrequency>,
}

impl DailyAggregate {
    /// Percentage of the day's tag mentions that belong to `category`.
    /// `None` when the day has no tags at all.
    pub fn tag_category_share(&self, category: &str) -> Option<f64> {
        let total = self.entries.iter().map(|e| e.tags.len()).sum::<usize>();
        if total == 0 {
            return None;
        }
        let matching = self
            .entries
            .iter()
            .flat_map(|e| e.tags.iter())
            .filter(|t| t.category == category)
            .count();
        Some(matching as f64 * 100.0 / total as f64)
    }
}

/// Rating comparator used by a mood category policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "=")]
    Equal,
}

impl Comparator {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::AtLeast => value >= threshold,
            Comparator::AtMost => value <= threshold,
            Comparator::Equal => value == threshold,
        }
    }
}

/// Policy describing which days count towards a mood category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodCategory {
    pub name: String,
    pub comparator: Comparator,
    pub rating_threshold: f64,
    /// Tag category whose share of the day's tags is checked
    pub tag_category: String,
    /// Minimum share (percentage) of the day's tags in `tag_category`
    pub min_tag_category_share: f64,
}

impl MoodCategory {
    pub fn new(
        name: &str,
        comparator: Comparator,
        rating_threshold: f64,
        min_tag_category_share: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            comparator,
            rating_threshold,
            tag_category: name.to_string(),
            min_tag_category_share,
        }
    }

    /// Positive, neutral, negative and clinical policies
    pub fn standard() -> Vec<MoodCategory> {
        vec![
            MoodCategory::new("positive", Comparator::AtLeast, 6.0, 50.0),
            MoodCategory::new("neutral", Comparator::Equal, 5.0, 50.0),
            MoodCategory::new("negative", Comparator::AtMost, 4.0, 50.0),
            MoodCategory::new("clinical", Comparator::AtLeast, 1.0, 50.0),
        ]
    }
}

/// Maximal run of at least two consecutive qualifying days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: String,
    pub days: Vec<DailyAggregate>,
    pub length: u32,
}

/// Short-term direction of the moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "increasing")]
    Increasing,
    #[serde(rename = "decreasing")]
    Decreasing,
    #[serde(rename = "flat")]
    Flat,
    #[serde(rename = "not enough data")]
    NotEnoughData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Flat => "flat",
            Trend::NotEnoughData => NOT_ENOUGH_DATA,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucketed population standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stability {
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "volatile")]
    Volatile,
    #[serde(rename = "not enough data")]
    NotEnoughData,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Stable => "stable",
            Stability::Moderate => "moderate",
            Stability::Volatile => "volatile",
            Stability::NotEnoughData => NOT_ENOUGH_DATA,
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point of the trailing moving-average series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Per-category results within one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetrics {
    pub category: String,
    /// Tag frequencies restricted to the category's qualifying days
    pub top_tags: Vec<TagFrequency>,
    pub streaks: Vec<Streak>,
    pub qualifying_days: Vec<DailyAggregate>,
}

impl CategoryMetrics {
    pub fn longest_streak(&self) -> u32 {
        self.streaks.iter().map(|s| s.length).max().unwrap_or(0)
    }
}

/// Analytics for one user over one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub user_id: String,
    pub period: Period,
    pub granularity: Granularity,
    pub days_logged: usize,
    pub moving_averages: Vec<MovingAveragePoint>,
    /// Last moving-average value, 0 when there is no data
    pub moving_average_latest: f64,
    pub trend: Trend,
    pub std_deviation: f64,
    pub stability: Stability,
    /// Mean of the daily mean ratings, 0 when there is no data
    pub avg_rating: f64,
    pub top_tags: Vec<TagFrequency>,
    pub categories: Vec<CategoryMetrics>,
}

impl MetricsSnapshot {
    pub fn category(&self, name: &str) -> Option<&CategoryMetrics> {
        self.categories.iter().find(|c| c.category == name)
    }
}
