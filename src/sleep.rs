//! Sleep analytics
//!
//! Sleep logs go through the same moving-average, trend, variability and
//! tag-frequency components as mood entries, with sleep-specific stability
//! cutpoints measured in hours.

use crate::compare::{percent_change, shift, TopTagDiff};
use crate::tags::rank_tags;
use crate::trend::{classify_trend, latest, moving_averages, MovingAverageWindow};
use crate::types::{Granularity, MovingAveragePoint, Period, Stability, TagFrequency, Trend};
use crate::variability::{population_std_dev, StabilityThresholds};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One night of sleep as recorded by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLog {
    pub id: i64,
    pub user_id: String,
    pub sleep_date: NaiveDate,
    pub hours_slept: f64,
    #[serde(default)]
    pub quality_tags: Vec<String>,
}

/// Sleep analytics for one user over one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSnapshot {
    pub user_id: String,
    pub period: Period,
    pub granularity: Granularity,
    pub nights_logged: usize,
    pub moving_averages: Vec<MovingAveragePoint>,
    pub moving_average_latest: f64,
    pub trend: Trend,
    pub std_deviation: f64,
    pub stability: Stability,
    pub avg_sleep_hours: f64,
    pub top_quality_tags: Vec<TagFrequency>,
}

/// Difference between two sleep snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepDiff {
    pub avg_sleep_hours_change_pct: f64,
    pub avg_sleep_hours_delta: f64,
    pub moving_average_change_pct: f64,
    pub std_deviation_change_pct: f64,
    pub trend_shift: String,
    pub stability_shift: String,
    pub top_quality_tag: TopTagDiff,
}

impl SleepDiff {
    pub fn between(current: &SleepSnapshot, previous: &SleepSnapshot) -> Self {
        Self {
            avg_sleep_hours_change_pct: percent_change(
                current.avg_sleep_hours,
                previous.avg_sleep_hours,
            ),
            avg_sleep_hours_delta: current.avg_sleep_hours - previous.avg_sleep_hours,
            moving_average_change_pct: percent_change(
                current.moving_average_latest,
                previous.moving_average_latest,
            ),
            std_deviation_change_pct: percent_change(
                current.std_deviation,
                previous.std_deviation,
            ),
            trend_shift: shift(previous.trend.as_str(), current.trend.as_str()),
            stability_shift: shift(previous.stability.as_str(), current.stability.as_str()),
            top_quality_tag: TopTagDiff::between(
                &current.top_quality_tags,
                &previous.top_quality_tags,
            ),
        }
    }
}

/// Compute the sleep snapshot for logs already restricted to `period`
pub fn sleep_snapshot(
    user_id: &str,
    period: Period,
    logs: &[SleepLog],
    window: MovingAverageWindow,
    thresholds: &StabilityThresholds,
) -> SleepSnapshot {
    let nightly = nightly_hours(logs);
    let moving = moving_averages(&nightly, window.size_for(&period));
    let hours: Vec<f64> = logs.iter().map(|l| l.hours_slept).collect();
    let std_deviation = population_std_dev(&hours);
    let avg_sleep_hours = if hours.is_empty() {
        0.0
    } else {
        hours.iter().sum::<f64>() / hours.len() as f64
    };

    SleepSnapshot {
        user_id: user_id.to_string(),
        period,
        granularity: period.granularity(),
        nights_logged: nightly.len(),
        moving_average_latest: latest(&moving),
        trend: classify_trend(&moving),
        moving_averages: moving,
        std_deviation,
        stability: thresholds.classify(std_deviation),
        avg_sleep_hours,
        top_quality_tags: rank_tags(
            logs.iter()
                .flat_map(|l| l.quality_tags.iter().map(String::as_str)),
        ),
    }
}

/// Mean hours per sleep date, ordered by date
fn nightly_hours(logs: &[SleepLog]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for log in logs {
        let slot = by_date.entry(log.sleep_date).or_insert((0.0, 0));
        slot.0 += log.hours_slept;
        slot.1 += 1;
    }
    by_date
        .into_iter()
        .map(|(date, (sum, n))| (date, sum / n as f64))
        .collect()
}
