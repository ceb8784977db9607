//! Period comparison
//!
//! Diffs two metrics snapshots: percent changes for paired scalars, label
//! shifts written as `"previous -> current"`, and integer deltas for day and
//! streak counts. A comparison whose previous value does not exist is `None`,
//! never coerced to zero.

use crate::types::{CategoryMetrics, MetricsSnapshot, TagFrequency, NOT_ENOUGH_DATA};
use serde::{Deserialize, Serialize};

/// `(current - previous) / previous * 100`, defined as 0 when previous is 0
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Percent change where either side may be missing
pub fn optional_percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(curr), Some(prev)) => Some(percent_change(curr, prev)),
        _ => None,
    }
}

/// `"previous -> current"`
pub fn shift(previous: &str, current: &str) -> String {
    format!("{previous} -> {current}")
}

/// Change of the leading tag in one scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTagDiff {
    /// e.g. `"calm -> anxious"`, with the sentinel for a missing side
    pub shift: String,
    /// Change in the current top tag's share relative to its share last period.
    /// `None` when the tag did not appear last period.
    pub change_pct: Option<f64>,
    /// Same comparison in percentage points
    pub points_delta: Option<f64>,
}

impl TopTagDiff {
    pub fn between(current: &[TagFrequency], previous: &[TagFrequency]) -> Self {
        let current_top = current.first();
        let previous_top = previous.first();

        let shift = shift(
            previous_top.map_or(NOT_ENOUGH_DATA, |t| t.tag_name.as_str()),
            current_top.map_or(NOT_ENOUGH_DATA, |t| t.tag_name.as_str()),
        );

        let current_share = current_top.map(|t| t.percentage);
        let previous_share = current_top.and_then(|top| {
            previous
                .iter()
                .find(|t| t.tag_name == top.tag_name)
                .map(|t| t.percentage)
        });

        Self {
            shift,
            change_pct: optional_percent_change(current_share, previous_share),
            points_delta: current_share.zip(previous_share).map(|(c, p)| c - p),
        }
    }
}

/// Percentage of logged days that qualify for a category, 0 when nothing was logged
pub fn qualifying_share(qualifying_days: usize, days_logged: usize) -> f64 {
    if days_logged == 0 {
        return 0.0;
    }
    qualifying_days as f64 / days_logged as f64 * 100.0
}

/// Count deltas and top-tag change of one mood category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDiff {
    pub category: String,
    pub days_delta: i64,
    /// Change in the share of logged days that qualify, in percentage points
    pub days_ratio_change: f64,
    pub streaks_delta: i64,
    pub longest_streak_delta: i64,
    pub top_tag: TopTagDiff,
}

impl CategoryDiff {
    /// `current_days_logged` and `previous_days_logged` are the days with any
    /// entry in each period, not only qualifying ones.
    pub fn between(
        current: &CategoryMetrics,
        current_days_logged: usize,
        previous: Option<&CategoryMetrics>,
        previous_days_logged: usize,
    ) -> Self {
        let empty: &[TagFrequency] = &[];
        let prev_days = previous.map_or(0, |p| p.qualifying_days.len());
        let prev_streaks = previous.map_or(0, |p| p.streaks.len());
        let prev_longest = previous.map_or(0, |p| p.longest_streak());

        let current_share = qualifying_share(current.qualifying_days.len(), current_days_logged);
        let previous_share = qualifying_share(prev_days, previous_days_logged);

        Self {
            category: current.category.clone(),
            days_delta: current.qualifying_days.len() as i64 - prev_days as i64,
            days_ratio_change: current_share - previous_share,
            streaks_delta: current.streaks.len() as i64 - prev_streaks as i64,
            longest_streak_delta: current.longest_streak() as i64 - prev_longest as i64,
            top_tag: TopTagDiff::between(
                &current.top_tags,
                previous.map_or(empty, |p| p.top_tags.as_slice()),
            ),
        }
    }
}

/// Structured difference between the current and previous period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDiff {
    pub avg_rating_change_pct: f64,
    pub avg_rating_delta: f64,
    pub moving_average_change_pct: f64,
    pub std_deviation_change_pct: f64,
    /// Absolute change in sigma
    pub volatility_delta: f64,
    pub trend_shift: String,
    pub stability_shift: String,
    pub top_tag: TopTagDiff,
    pub categories: Vec<CategoryDiff>,
}

impl PeriodDiff {
    pub fn between(current: &MetricsSnapshot, previous: &MetricsSnapshot) -> Self {
        let categories = current
            .categories
            .iter()
            .map(|c| {
                CategoryDiff::between(
                    c,
                    current.days_logged,
                    previous.category(&c.category),
                    previous.days_logged,
                )
            })
            .collect();

        Self {
            avg_rating_change_pct: percent_change(current.avg_rating, previous.avg_rating),
            avg_rating_delta: current.avg_rating - previous.avg_rating,
            moving_average_change_pct: percent_change(
                current.moving_average_latest,
                previous.moving_average_latest,
            ),
            std_deviation_change_pct: percent_change(
                current.std_deviation,
                previous.std_deviation,
            ),
            volatility_delta: current.std_deviation - previous.std_deviation,
            trend_shift: shift(previous.trend.as_str(), current.trend.as_str()),
            stability_shift: shift(previous.stability.as_str(), current.stability.as_str()),
            top_tag: TopTagDiff::between(&current.top_tags, &previous.top_tags),
            categories,
        }
    }

    pub fn category(&self, name: &str) -> Option<&CategoryDiff> {
        self.categories.iter().find(|c| c.category == name)
    }
}
