//! Moving average and trend detection
//!
//! The moving average is a trailing window over the days that have data. The
//! first `window - 1` points average fewer samples than the full window.
//! Trend only looks at the two most recent moving-average points.

use crate::types::{DailyAggregate, MovingAveragePoint, Period, Trend};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default trailing window in days
pub const DEFAULT_MOVING_AVERAGE_DAYS: usize = 3;

/// How many samples the trailing window spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MovingAverageWindow {
    /// Fixed number of trailing days
    Fixed { days: usize },
    /// Window as long as the requested period
    WholePeriod,
}

impl Default for MovingAverageWindow {
    fn default() -> Self {
        MovingAverageWindow::Fixed {
            days: DEFAULT_MOVING_AVERAGE_DAYS,
        }
    }
}

impl MovingAverageWindow {
    /// Window size in samples for the given period (never less than 1)
    pub fn size_for(&self, period: &Period) -> usize {
        match self {
            MovingAverageWindow::Fixed { days } => (*days).max(1),
            MovingAverageWindow::WholePeriod => period.len_days().max(1) as usize,
        }
    }
}

/// Trailing moving average over any dated series, assumed ordered by date
pub fn moving_averages(series: &[(NaiveDate, f64)], window: usize) -> Vec<MovingAveragePoint> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, (date, _))| {
            let from = (i + 1).saturating_sub(window);
            let slice = &series[from..=i];
            let value = slice.iter().map(|(_, v)| v).sum::<f64>() / slice.len() as f64;
            MovingAveragePoint { date: *date, value }
        })
        .collect()
}

/// Moving average of the daily mean ratings
pub fn daily_moving_averages(days: &[DailyAggregate], window: usize) -> Vec<MovingAveragePoint> {
    let series: Vec<(NaiveDate, f64)> = days.iter().map(|d| (d.date, d.mean_rating)).collect();
    moving_averages(&series, window)
}

/// Compare the last two points of the series
pub fn classify_trend(series: &[MovingAveragePoint]) -> Trend {
    match series {
        [.., previous, last] => {
            if last.value > previous.value {
                Trend::Increasing
            } else if last.value < previous.value {
                Trend::Decreasing
            } else {
                Trend::Flat
            }
        }
        _ => Trend::NotEnoughData,
    }
}

/// Last value of the series, 0 when empty
pub fn latest(series: &[MovingAveragePoint]) -> f64 {
    series.last().map(|p| p.value).unwrap_or(0.0)
}
