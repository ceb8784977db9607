//! Daily aggregation
//!
//! Groups raw log entries by calendar date into one `DailyAggregate` per day
//! that has at least one entry. Days without entries are simply absent.

use crate::tags::tag_frequencies;
use crate::types::{DailyAggregate, LogEntry};
use std::collections::BTreeMap;

/// Group entries by date, ordered by date. Entries within a day are ordered by timestamp.
pub fn aggregate_daily(entries: &[LogEntry]) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<_, Vec<LogEntry>> = BTreeMap::new();
    for entry in entries {
        by_date.entry(entry.date()).or_default().push(entry.clone());
    }

    by_date
        .into_iter()
        .map(|(date, mut day_entries)| {
            day_entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
            let mean_rating = mean_rating(&day_entries);
            let tag_frequencies = tag_frequencies(&day_entries);
            DailyAggregate {
                date,
                mean_rating,
                entries: day_entries,
                tag_frequencies,
            }
        })
        .collect()
}

/// Arithmetic mean of the entries' ratings, 0 for an empty slice
pub fn mean_rating(entries: &[LogEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum: i64 = entries.iter().map(|e| e.rating as i64).sum();
    sum as f64 / entries.len() as f64
}

/// Mean of the daily means, so each day weighs the same regardless of entry count
pub fn mean_of_daily_means(days: &[DailyAggregate]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    days.iter().map(|d| d.mean_rating).sum::<f64>() / days.len() as f64
}
