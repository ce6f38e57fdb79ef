//! Affected-region and trigger rankings across the whole history.

use super::timeline::TimedEntry;
use super::TOP_N;
use crate::types::{BodyRegion, Triggers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How often a body region was reported painful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFrequency {
    pub region: BodyRegion,
    pub frequency: u32,
    /// Share of all entries, 0-100
    pub percentage: f64,
}

/// How often a trigger bucket was reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerFrequency {
    pub trigger: String,
    pub frequency: u32,
}

/// Counter that remembers the order in which keys were first seen, so ties
/// rank deterministically.
#[derive(Debug, Default)]
pub(crate) struct FirstSeenCounter {
    counts: HashMap<String, (u32, usize)>,
}

impl FirstSeenCounter {
    pub(crate) fn increment(&mut self, key: String) {
        let next_rank = self.counts.len();
        self.counts.entry(key).or_insert((0, next_rank)).0 += 1;
    }

    /// Keys by descending count, ties in first-seen order, capped at `limit`.
    pub(crate) fn top(self, limit: usize) -> Vec<(String, u32)> {
        let mut ranked: Vec<(String, u32, usize)> = self
            .counts
            .into_iter()
            .map(|(key, (count, first_seen))| (key, count, first_seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked
            .into_iter()
            .take(limit)
            .map(|(key, count, _)| (key, count))
            .collect()
    }
}

/// Rank the most frequently painful regions.
///
/// Regions never reported are left out; ties keep checklist order.
pub fn rank_regions(sorted: &[TimedEntry<'_>]) -> Vec<RegionFrequency> {
    if sorted.is_empty() {
        return Vec::new();
    }

    let mut counts = [0u32; 18];
    for timed in sorted {
        for (index, (_, painful)) in timed.entry.wpi.regions().enumerate() {
            if painful {
                counts[index] += 1;
            }
        }
    }

    let total = sorted.len() as f64;
    let mut ranked: Vec<RegionFrequency> = BodyRegion::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(region, frequency)| RegionFrequency {
            region,
            frequency,
            percentage: f64::from(frequency) / total * 100.0,
        })
        .collect();

    // Stable sort keeps checklist order among equal counts.
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked.truncate(TOP_N);
    ranked
}

/// Bucket keys contributed by one entry's triggers.
///
/// - `weather:<value>` for a non-empty weather string
/// - `food:<trimmed>` for each non-blank food
/// - the flag name for every flag set to `true`
pub fn trigger_buckets(triggers: &Triggers) -> Vec<String> {
    let mut buckets = Vec::new();

    if let Some(weather) = triggers.weather.as_deref().filter(|w| !w.is_empty()) {
        buckets.push(format!("weather:{}", weather));
    }

    buckets.extend(
        triggers
            .food_sensitivity
            .iter()
            .map(|food| food.trim())
            .filter(|food| !food.is_empty())
            .map(|food| format!("food:{}", food)),
    );

    buckets.extend(
        triggers
            .flags
            .iter()
            .filter(|(_, active)| **active)
            .map(|(name, _)| name.clone()),
    );

    buckets
}

/// Rank the most common trigger buckets.
pub fn rank_triggers(sorted: &[TimedEntry<'_>]) -> Vec<TriggerFrequency> {
    let mut counter = FirstSeenCounter::default();
    for timed in sorted {
        for bucket in trigger_buckets(&timed.entry.triggers) {
            counter.increment(bucket);
        }
    }

    counter
        .top(TOP_N)
        .into_iter()
        .map(|(trigger, frequency)| TriggerFrequency { trigger, frequency })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::timeline::sort_entries;
    use crate::types::Entry;
    use chrono::Utc;

    fn entry(id: &str, day: u32) -> Entry {
        Entry::new(id, &format!("2024-01-{:02}T09:00:00Z", day))
    }

    #[test]
    fn test_rank_regions_counts_and_percentages() {
        let entries = vec![
            entry("a", 1).with_wpi(&[BodyRegion::Neck, BodyRegion::LowerBack]),
            entry("b", 2).with_wpi(&[BodyRegion::Neck]),
            entry("c", 3).with_wpi(&[BodyRegion::Neck, BodyRegion::LeftHip]),
            entry("d", 4),
        ];
        let sorted = sort_entries(&entries, &Utc);

        let ranked = rank_regions(&sorted);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].region, BodyRegion::Neck);
        assert_eq!(ranked[0].frequency, 3);
        assert_eq!(ranked[0].percentage, 75.0);
        // LeftHip precedes LowerBack in checklist order
        assert_eq!(ranked[1].region, BodyRegion::LeftHip);
        assert_eq!(ranked[2].region, BodyRegion::LowerBack);
        assert_eq!(ranked[2].percentage, 25.0);
    }

    #[test]
    fn test_rank_regions_caps_at_five() {
        let entries = vec![entry("a", 1).with_wpi(&BodyRegion::ALL)];
        let sorted = sort_entries(&entries, &Utc);

        let ranked = rank_regions(&sorted);
        assert_eq!(ranked.len(), TOP_N);
        assert_eq!(ranked[0].region, BodyRegion::LeftJaw);
        assert!(ranked.iter().all(|r| r.percentage == 100.0));
    }

    #[test]
    fn test_trigger_bucketing() {
        let entries = vec![
            entry("a", 1).with_triggers(
                Triggers::default()
                    .with_weather("cold")
                    .with_foods(&["gluten", "dairy"]),
            ),
            entry("b", 2).with_triggers(Triggers::default().with_weather("cold").with_foods(&["gluten"])),
        ];
        let sorted = sort_entries(&entries, &Utc);

        let ranked = rank_triggers(&sorted);
        assert_eq!(
            ranked,
            vec![
                TriggerFrequency { trigger: "weather:cold".into(), frequency: 2 },
                TriggerFrequency { trigger: "food:gluten".into(), frequency: 2 },
                TriggerFrequency { trigger: "food:dairy".into(), frequency: 1 },
            ]
        );
    }

    #[test]
    fn test_trigger_buckets_skip_blank_and_false_values() {
        let triggers = Triggers::default()
            .with_weather("")
            .with_foods(&["  soy ", "", "   "])
            .with_flag("stress", true)
            .with_flag("poorSleep", false);

        assert_eq!(trigger_buckets(&triggers), vec!["food:soy", "stress"]);
        assert!(trigger_buckets(&Triggers::default()).is_empty());
    }

    #[test]
    fn test_trigger_ties_rank_by_first_appearance() {
        let entries = vec![
            entry("b", 2).with_triggers(Triggers::default().with_flag("alpha", true)),
            entry("a", 1).with_triggers(Triggers::default().with_flag("zeta", true)),
        ];
        let sorted = sort_entries(&entries, &Utc);

        let names: Vec<String> = rank_triggers(&sorted).into_iter().map(|t| t.trigger).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_trigger_ranking_caps_at_five() {
        let mut triggers = Triggers::default();
        for name in ["a", "b", "c", "d", "e", "f", "g"] {
            triggers = triggers.with_flag(name, true);
        }
        let entries = vec![entry("x", 1).with_triggers(triggers)];
        let sorted = sort_entries(&entries, &Utc);

        assert_eq!(rank_triggers(&sorted).len(), TOP_N);
    }

    #[test]
    fn test_empty_history() {
        assert!(rank_regions(&[]).is_empty());
        assert!(rank_triggers(&[]).is_empty());
    }
}
