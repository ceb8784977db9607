//! Engine orchestration
//!
//! This module provides the public entry points of the analytics engine. A
//! request derives the previous period, computes both snapshots independently
//! and then diffs them.
//!
//! Pipeline per period:
//! 1. LogStore - fetch raw entries
//! 2. Daily aggregation
//! 3. Moving average and trend
//! 4. Variability
//! 5. Tag frequencies
//! 6. Qualifying days and streaks, once per mood category

use crate::aggregate::{aggregate_daily, mean_of_daily_means};
use crate::compare::PeriodDiff;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::sleep::{sleep_snapshot, SleepDiff, SleepSnapshot};
use crate::store::LogStore;
use crate::streaks::category_metrics;
use crate::tags::tag_frequencies;
use crate::trend::{classify_trend, daily_moving_averages, latest};
use crate::types::{LogEntry, MetricsSnapshot, Period};
use crate::variability::population_std_dev;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mood analytics for a period and the one before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsComparison {
    pub current: MetricsSnapshot,
    pub previous: MetricsSnapshot,
    pub diff: PeriodDiff,
}

/// Sleep analytics for a period and the one before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepComparison {
    pub current: SleepSnapshot,
    pub previous: SleepSnapshot,
    pub diff: SleepDiff,
}

/// Stateless analytics engine over a log store.
///
/// Every call fetches fresh entries; nothing is cached between calls.
pub struct AnalyticsEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: LogStore + Sync> AnalyticsEngine<S> {
    /// Create an engine, rejecting invalid configuration up front
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// Create an engine with the standard policy
    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mood metrics for `[start, end]` compared against the preceding period of equal length
    pub fn metrics(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MetricsComparison> {
        let current_period = Period::new(start, end)?;
        let previous_period = current_period.previous()?;

        tracing::info!(
            user_id,
            current = %current_period,
            previous = %previous_period,
            "Computing mood metrics"
        );

        let (current, previous) = rayon::join(
            || self.snapshot(user_id, current_period),
            || self.snapshot(user_id, previous_period),
        );
        let current = current?;
        let previous = previous?;

        let diff = PeriodDiff::between(&current, &previous);

        tracing::info!(
            user_id,
            days_logged = current.days_logged,
            previous_days_logged = previous.days_logged,
            trend_shift = %diff.trend_shift,
            "Mood metrics computed"
        );

        Ok(MetricsComparison {
            current,
            previous,
            diff,
        })
    }

    /// Mood snapshot for a single period
    pub fn snapshot(&self, user_id: &str, period: Period) -> Result<MetricsSnapshot> {
        let entries = self.store.entries(user_id, &period)?;
        tracing::debug!(user_id, %period, entries = entries.len(), "Fetched log entries");
        Ok(build_snapshot(user_id, period, &entries, &self.config))
    }

    /// Sleep metrics for `[start, end]` compared against the preceding period of equal length
    pub fn sleep_metrics(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SleepComparison> {
        let current_period = Period::new(start, end)?;
        let previous_period = current_period.previous()?;

        tracing::info!(
            user_id,
            current = %current_period,
            previous = %previous_period,
            "Computing sleep metrics"
        );

        let (current, previous) = rayon::join(
            || self.sleep_snapshot(user_id, current_period),
            || self.sleep_snapshot(user_id, previous_period),
        );
        let current = current?;
        let previous = previous?;
        let diff = SleepDiff::between(&current, &previous);

        Ok(SleepComparison {
            current,
            previous,
            diff,
        })
    }

    fn sleep_snapshot(&self, user_id: &str, period: Period) -> Result<SleepSnapshot> {
        let logs = self.store.sleep_logs(user_id, &period)?;
        tracing::debug!(user_id, %period, logs = logs.len(), "Fetched sleep logs");
        Ok(sleep_snapshot(
            user_id,
            period,
            &logs,
            self.config.moving_average,
            &self.config.sleep_stability,
        ))
    }
}

/// Compute a mood snapshot from entries already restricted to `period`
pub fn build_snapshot(
    user_id: &str,
    period: Period,
    entries: &[LogEntry],
    config: &EngineConfig,
) -> MetricsSnapshot {
    let days = aggregate_daily(entries);

    let window = config.moving_average.size_for(&period);
    let moving_averages = daily_moving_averages(&days, window);
    let trend = classify_trend(&moving_averages);

    let ratings: Vec<f64> = entries.iter().map(|e| e.rating as f64).collect();
    let std_deviation = population_std_dev(&ratings);
    let stability = config.mood_stability.classify(std_deviation);

    let categories: Vec<_> = config
        .categories
        .iter()
        .map(|category| category_metrics(&days, category))
        .collect();

    tracing::debug!(
        user_id,
        %period,
        days = days.len(),
        window,
        std_deviation,
        trend = %trend,
        stability = %stability,
        streaks = categories.iter().map(|c| c.streaks.len()).sum::<usize>(),
        "Built metrics snapshot"
    );

    MetricsSnapshot {
        user_id: user_id.to_string(),
        period,
        granularity: period.granularity(),
        days_logged: days.len(),
        moving_average_latest: latest(&moving_averages),
        moving_averages,
        trend,
        std_deviation,
        stability,
        avg_rating: mean_of_daily_means(&days),
        top_tags: tag_frequencies(entries),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::sleep::SleepLog;
    use crate::store::InMemoryStore;
    use crate::trend::MovingAverageWindow;
    use crate::types::{Stability, Tag, Trend};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap() + Duration::days(offset)
    }

    fn entry(id: i64, offset: i64, rating: i32, tag: (&str, &str)) -> LogEntry {
        LogEntry {
            id,
            user_id: "42".to_string(),
            rating,
            timestamp: day(offset).and_hms_opt(20, 30, 0).unwrap(),
            note: String::new(),
            tags: vec![Tag::new(tag.0, tag.1)],
        }
    }

    /// Ratings 7,7,2,2,2,8,8 on 2024-01-08..14, tagged to match
    fn week_of_swings() -> Vec<LogEntry> {
        let ratings = [7, 7, 2, 2, 2, 8, 8];
        ratings
            .iter()
            .enumerate()
            .map(|(i, &rating)| {
                let tag = if rating >= 6 {
                    ("joy", "positive")
                } else {
                    ("sadness", "negative")
                };
                entry(i as i64 + 1, i as i64, rating, tag)
            })
            .collect()
    }

    struct UnavailableStore;

    impl LogStore for UnavailableStore {
        fn entries(&self, _: &str, _: &Period) -> Result<Vec<LogEntry>> {
            Err(AnalyticsError::StoreUnavailable("connection refused".to_string()))
        }

        fn sleep_logs(&self, _: &str, _: &Period) -> Result<Vec<SleepLog>> {
            Err(AnalyticsError::StoreUnavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_end_to_end_streaks_and_trend() {
        let engine = AnalyticsEngine::with_defaults(InMemoryStore::new(week_of_swings(), vec![]));
        let result = engine.metrics("42", day(0), day(6)).unwrap();
        let current = &result.current;

        let positive = current.category("positive").unwrap();
        let spans: Vec<(NaiveDate, NaiveDate, u32)> = positive
            .streaks
            .iter()
            .map(|s| (s.start_date, s.end_date, s.length))
            .collect();
        assert_eq!(spans, vec![(day(0), day(1), 2), (day(5), day(6), 2)]);

        let negative = current.category("negative").unwrap();
        assert_eq!(negative.streaks.len(), 1);
        assert_eq!(negative.streaks[0].start_date, day(2));
        assert_eq!(negative.streaks[0].end_date, day(4));
        assert_eq!(negative.streaks[0].length, 3);
        assert_eq!(negative.streaks[0].days.len(), 3);
        assert_eq!(negative.top_tags[0].tag_name, "sadness");

        assert!(current.category("neutral").unwrap().qualifying_days.is_empty());
        assert!(current.category("clinical").unwrap().streaks.is_empty());

        // 3-day moving average ends at 4.0 -> 6.0
        assert_eq!(current.trend, Trend::Increasing);
        assert!((current.moving_average_latest - 6.0).abs() < 1e-9);
        assert_eq!(current.days_logged, 7);
        assert!((current.avg_rating - 36.0 / 7.0).abs() < 1e-9);
        // sigma ~2.75
        assert_eq!(current.stability, Stability::Moderate);
    }

    #[test]
    fn test_previous_period_is_derived_and_diffed() {
        let mut entries = week_of_swings();
        // One previous-period day: 2024-01-03
        entries.push(entry(100, -5, 4, ("sadness", "negative")));
        let engine = AnalyticsEngine::with_defaults(InMemoryStore::new(entries, vec![]));
        let result = engine.metrics("42", day(0), day(6)).unwrap();

        assert_eq!(
            result.previous.period,
            Period::parse("2024-01-01", "2024-01-07").unwrap()
        );
        assert_eq!(result.previous.days_logged, 1);
        assert_eq!(result.previous.trend, Trend::NotEnoughData);
        assert_eq!(result.previous.stability, Stability::NotEnoughData);

        let diff = &result.diff;
        assert_eq!(diff.trend_shift, "not enough data -> increasing");
        assert_eq!(diff.stability_shift, "not enough data -> moderate");
        assert!((diff.avg_rating_change_pct - (36.0 / 7.0 - 4.0) / 4.0 * 100.0).abs() < 1e-9);
        assert_eq!(diff.top_tag.shift, "sadness -> joy");
        assert_eq!(diff.top_tag.change_pct, None);

        let negative = diff.category("negative").unwrap();
        assert_eq!(negative.days_delta, 2);
        // 3 of 7 days now, the only logged day before
        assert!((negative.days_ratio_change - (300.0 / 7.0 - 100.0)).abs() < 1e-9);
        assert_eq!(negative.streaks_delta, 1);
        assert_eq!(negative.longest_streak_delta, 3);
        let positive = diff.category("positive").unwrap();
        assert_eq!(positive.days_delta, 4);
        assert!((positive.days_ratio_change - 400.0 / 7.0).abs() < 1e-9);
        assert_eq!(positive.streaks_delta, 2);
    }

    #[test]
    fn test_empty_periods_degrade_to_sentinels() {
        let engine = AnalyticsEngine::with_defaults(InMemoryStore::default());
        let result = engine.metrics("42", day(0), day(6)).unwrap();

        assert_eq!(result.current.trend, Trend::NotEnoughData);
        assert_eq!(result.current.stability, Stability::NotEnoughData);
        assert_eq!(result.current.avg_rating, 0.0);
        assert!(result.current.top_tags.is_empty());
        assert_eq!(result.diff.avg_rating_change_pct, 0.0);
        assert_eq!(result.diff.categories.len(), 4);
    }

    #[test]
    fn test_invalid_range_rejected_before_store_access() {
        let engine = AnalyticsEngine::with_defaults(UnavailableStore);
        let result = engine.metrics("42", day(6), day(0));
        assert!(matches!(result, Err(AnalyticsError::InvalidRange { .. })));
    }

    #[test]
    fn test_period_at_earliest_date_has_no_previous() {
        let engine = AnalyticsEngine::with_defaults(UnavailableStore);
        assert!(matches!(
            engine.metrics("42", NaiveDate::MIN, NaiveDate::MIN),
            Err(AnalyticsError::NoPreviousPeriod { .. })
        ));
        assert!(matches!(
            engine.sleep_metrics("42", NaiveDate::MIN, NaiveDate::MIN),
            Err(AnalyticsError::NoPreviousPeriod { .. })
        ));
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let engine = AnalyticsEngine::with_defaults(UnavailableStore);
        assert!(matches!(
            engine.metrics("42", day(0), day(6)),
            Err(AnalyticsError::StoreUnavailable(_))
        ));
        assert!(matches!(
            engine.sleep_metrics("42", day(0), day(6)),
            Err(AnalyticsError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_whole_period_window() {
        let config = EngineConfig {
            moving_average: MovingAverageWindow::WholePeriod,
            ..EngineConfig::default()
        };
        let engine =
            AnalyticsEngine::new(InMemoryStore::new(week_of_swings(), vec![]), config).unwrap();
        assert_eq!(engine.config().moving_average, MovingAverageWindow::WholePeriod);
        let snapshot = engine
            .snapshot("42", Period::new(day(0), day(6)).unwrap())
            .unwrap();

        // Cumulative mean: 28/6 -> 36/7
        assert!((snapshot.moving_average_latest - 36.0 / 7.0).abs() < 1e-9);
        assert_eq!(snapshot.trend, Trend::Increasing);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.categories.clear();
        assert!(AnalyticsEngine::new(InMemoryStore::default(), config).is_err());
    }

    #[test]
    fn test_sleep_metrics() {
        let logs = (0..7)
            .map(|i| SleepLog {
                id: i,
                user_id: "42".to_string(),
                sleep_date: day(i),
                hours_slept: 6.0 + (i % 2) as f64,
                quality_tags: vec!["restful".to_string()],
            })
            .collect();
        let engine = AnalyticsEngine::with_defaults(InMemoryStore::new(vec![], logs));
        let result = engine.sleep_metrics("42", day(0), day(6)).unwrap();

        assert_eq!(result.current.nights_logged, 7);
        assert_eq!(result.previous.nights_logged, 0);
        assert_eq!(result.current.stability, Stability::Stable);
        assert_eq!(result.diff.stability_shift, "not enough data -> stable");
    }
}
