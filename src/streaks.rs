//! Qualifying-day selection and streak detection
//!
//! A day qualifies for a mood category when its mean rating satisfies the
//! category's comparator and enough of its tag mentions belong to the
//! category's tag category. Streaks are found with the gaps-and-islands trick:
//! for sorted dates, `date - rank` is constant along a run of consecutive days.

use crate::tags::tag_frequencies;
use crate::types::{CategoryMetrics, DailyAggregate, MoodCategory, Streak};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Shortest run reported as a streak
pub const MIN_STREAK_DAYS: u32 = 2;

/// Whether a single day satisfies the category policy.
/// Days without any tags never qualify since their share is undefined.
pub fn qualifies(day: &DailyAggregate, category: &MoodCategory) -> bool {
    if !category
        .comparator
        .holds(day.mean_rating, category.rating_threshold)
    {
        return false;
    }
    day.tag_category_share(&category.tag_category)
        .is_some_and(|share| share >= category.min_tag_category_share)
}

/// All qualifying days, ordered by date
pub fn select_qualifying_days(
    days: &[DailyAggregate],
    category: &MoodCategory,
) -> Vec<DailyAggregate> {
    let mut selected: Vec<DailyAggregate> = days
        .iter()
        .filter(|day| qualifies(day, category))
        .cloned()
        .collect();
    selected.sort_by_key(|d| d.date);
    selected
}

/// Group dates into islands of consecutive calendar days, keyed by `date - rank`.
/// Duplicate dates are collapsed first. Islands come back in date order.
pub fn consecutive_runs(dates: &[NaiveDate]) -> Vec<Vec<NaiveDate>> {
    let mut sorted = dates.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut islands: BTreeMap<NaiveDate, Vec<NaiveDate>> = BTreeMap::new();
    for (rank, date) in sorted.into_iter().enumerate() {
        let group_key = date - Duration::days(rank as i64);
        islands.entry(group_key).or_default().push(date);
    }
    islands.into_values().collect()
}

/// Streaks of at least `MIN_STREAK_DAYS` among already-qualifying days
pub fn detect_streaks(qualifying: &[DailyAggregate], category: &MoodCategory) -> Vec<Streak> {
    let by_date: BTreeMap<NaiveDate, &DailyAggregate> =
        qualifying.iter().map(|d| (d.date, d)).collect();
    let dates: Vec<NaiveDate> = by_date.keys().copied().collect();

    consecutive_runs(&dates)
        .into_iter()
        .filter(|run| run.len() as u32 >= MIN_STREAK_DAYS)
        .filter_map(|run| {
            let start_date = *run.first()?;
            let end_date = *run.last()?;
            let days: Vec<DailyAggregate> = run
                .iter()
                .filter_map(|date| by_date.get(date).map(|d| (*d).clone()))
                .collect();
            Some(Streak {
                start_date,
                end_date,
                category: category.name.clone(),
                length: days.len() as u32,
                days,
            })
        })
        .collect()
}

/// Qualifying days, streaks and top tags of one category within a period
pub fn category_metrics(days: &[DailyAggregate], category: &MoodCategory) -> CategoryMetrics {
    let qualifying_days = select_qualifying_days(days, category);
    let streaks = detect_streaks(&qualifying_days, category);
    let top_tags = tag_frequencies(qualifying_days.iter().flat_map(|d| d.entries.iter()));

    CategoryMetrics {
        category: category.name.clone(),
        top_tags,
        streaks,
        qualifying_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_daily;
    use crate::types::{Comparator, LogEntry, Tag};

    fn d(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    fn entry(id: i64, offset: i64, rating: i32, tags: &[(&str, &str)]) -> LogEntry {
        LogEntry {
            id,
            user_id: "7".to_string(),
            rating,
            timestamp: d(offset).and_hms_opt(12, 0, 0).unwrap(),
            note: String::new(),
            tags: tags.iter().map(|(n, c)| Tag::new(*n, *c)).collect(),
        }
    }

    fn positive() -> MoodCategory {
        MoodCategory::new("positive", Comparator::AtLeast, 6.0, 50.0)
    }

    #[test]
    fn test_islands_from_rank_minus_date() {
        let runs = consecutive_runs(&[d(5), d(0), d(1), d(2), d(6)]);
        assert_eq!(runs, vec![vec![d(0), d(1), d(2)], vec![d(5), d(6)]]);
    }

    #[test]
    fn test_streaks_drop_isolated_days() {
        let entries: Vec<LogEntry> = [0, 1, 2, 5, 6, 9]
            .iter()
            .enumerate()
            .map(|(i, off)| entry(i as i64, *off, 8, &[("joy", "positive")]))
            .collect();
        let days = aggregate_daily(&entries);
        let qualifying = select_qualifying_days(&days, &positive());
        let streaks = detect_streaks(&qualifying, &positive());

        assert_eq!(qualifying.len(), 6);
        assert_eq!(streaks.len(), 2);
        assert_eq!(streaks[0].start_date, d(0));
        assert_eq!(streaks[0].end_date, d(2));
        assert_eq!(streaks[0].length, 3);
        assert_eq!(streaks[1].start_date, d(5));
        assert_eq!(streaks[1].end_date, d(6));
        assert_eq!(streaks[1].length, 2);

        for streak in &streaks {
            let span = (streak.end_date - streak.start_date).num_days() + 1;
            assert_eq!(span, streak.length as i64);
            assert_eq!(streak.days.len(), streak.length as usize);
            assert_eq!(streak.category, "positive");
        }
    }

    #[test]
    fn test_single_day_is_not_a_streak() {
        let days = aggregate_daily(&[entry(1, 0, 9, &[("joy", "positive")])]);
        let metrics = category_metrics(&days, &positive());
        assert_eq!(metrics.qualifying_days.len(), 1);
        assert!(metrics.streaks.is_empty());
    }

    #[test]
    fn test_tag_share_threshold() {
        let days = aggregate_daily(&[
            // 1 of 3 mentions positive: 33% < 50%
            entry(1, 0, 8, &[("joy", "positive"), ("fear", "negative"), ("dread", "negative")]),
            // exactly 50%
            entry(2, 1, 8, &[("joy", "positive"), ("fear", "negative")]),
            // no tags at all
            entry(3, 2, 8, &[]),
        ]);
        let qualifying = select_qualifying_days(&days, &positive());
        assert_eq!(qualifying.len(), 1);
        assert_eq!(qualifying[0].date, d(1));
    }

    #[test]
    fn test_rating_uses_daily_mean() {
        // Mean of 9 and 2 is 5.5, below the positive threshold
        let days = aggregate_daily(&[
            entry(1, 0, 9, &[("joy", "positive")]),
            entry(2, 0, 2, &[("calm", "positive")]),
        ]);
        assert!(select_qualifying_days(&days, &positive()).is_empty());
    }

    #[test]
    fn test_category_top_tags_scoped_to_qualifying_days() {
        let days = aggregate_daily(&[
            entry(1, 0, 8, &[("joy", "positive")]),
            entry(2, 1, 8, &[("pride", "positive")]),
            entry(3, 2, 2, &[("grief", "negative")]),
        ]);
        let metrics = category_metrics(&days, &positive());
        let names: Vec<&str> = metrics.top_tags.iter().map(|t| t.tag_name.as_str()).collect();
        assert_eq!(names, vec!["joy", "pride"]);
        assert_eq!(metrics.longest_streak(), 2);
    }

    #[test]
    fn test_no_qualifying_days() {
        let metrics = category_metrics(&[], &positive());
        assert!(metrics.qualifying_days.is_empty());
        assert!(metrics.streaks.is_empty());
        assert!(metrics.top_tags.is_empty());
    }
}
