//! Tag-frequency analysis
//!
//! Counts entry–tag associations within a scope and ranks tags by their share
//! of all tag mentions in that scope. Ranking is by descending percentage with
//! ties broken by tag name ascending.

use crate::types::{LogEntry, TagFrequency};
use std::collections::HashMap;

/// Rank the tags of every entry in scope
pub fn tag_frequencies<'a, I>(entries: I) -> Vec<TagFrequency>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    rank_tags(
        entries
            .into_iter()
            .flat_map(|e| e.tags.iter().map(|t| t.name.as_str())),
    )
}

/// Rank raw tag mentions. Each item is one association of a tag with a record.
pub fn rank_tags<'a, I>(mentions: I) -> Vec<TagFrequency>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, u32> = HashMap::new();
    let mut total: u32 = 0;
    for name in mentions {
        *counts.entry(name).or_insert(0) += 1;
        total += 1;
    }

    if total == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<TagFrequency> = counts
        .into_iter()
        .map(|(name, count)| TagFrequency {
            tag_name: name.to_string(),
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect();

    // Equal counts give bit-identical percentages, so the total order is safe
    ranked.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.tag_name.cmp(&b.tag_name))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tag;
    use chrono::NaiveDate;

    fn entry(id: i64, tags: &[&str]) -> LogEntry {
        LogEntry {
            id,
            user_id: "1".to_string(),
            rating: 5,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            note: String::new(),
            tags: tags.iter().map(|t| Tag::new(*t, "neutral")).collect(),
        }
    }

    #[test]
    fn test_percentages_are_share_of_mentions() {
        let entries = vec![
            entry(1, &["calm", "tired"]),
            entry(2, &["calm"]),
            entry(3, &["anxious", "calm"]),
        ];
        let ranked = tag_frequencies(&entries);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].tag_name, "calm");
        assert_eq!(ranked[0].count, 3);
        // 3 of 5 mentions, not 3 of 3 entries
        assert!((ranked[0].percentage - 60.0).abs() < 1e-9);

        let sum: f64 = ranked.iter().map(|t| t.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let entries = vec![entry(1, &["zeal", "awe"]), entry(2, &["mellow"])];
        let ranked = tag_frequencies(&entries);
        let names: Vec<&str> = ranked.iter().map(|t| t.tag_name.as_str()).collect();
        assert_eq!(names, vec!["awe", "mellow", "zeal"]);
    }

    #[test]
    fn test_untagged_scope_is_empty() {
        let entries = vec![entry(1, &[]), entry(2, &[])];
        assert!(tag_frequencies(&entries).is_empty());
        assert!(rank_tags(Vec::<&str>::new()).is_empty());
    }
}
