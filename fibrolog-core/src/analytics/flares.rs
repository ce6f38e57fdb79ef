//! Flare episode detection
//!
//! Works at calendar-day granularity in the engine's timezone:
//!
//! 1. **Day bucketing**: entries sharing a local day collapse to the one with
//!    the highest composite score (`fatigue + waking_unrefreshed +
//!    cognitive_symptoms + functionalAbility`). A later entry replaces the
//!    kept one only if its score is strictly higher.
//! 2. **Flare days**: a day is a flare day if fatigue or unrefreshed waking is
//!    at least 2, or functional ability is at least 4.
//! 3. **Episodes**: flare days one calendar day apart join the same episode.
//! 4. **Severity**: an episode is severe if any of its days has a subscale at
//!    3 or functional ability at 5; otherwise it is moderate. There is no mild
//!    episode; `mild` intensity means no episodes at all.
//!
//! Undated entries have no calendar day and do not take part.
//!
//! ## Example
//!
//! Flare days on Jan 1, Jan 2 and Jan 5 give two episodes lasting 2 and 1
//! days, so the average duration is 1.5.

use super::timeline::{observed_day_span, TimedEntry};
use crate::types::Entry;
use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fatigue or unrefreshed waking at or above this marks a flare day.
pub const FLARE_SUBSCALE_THRESHOLD: u8 = 2;
/// Functional ability at or above this marks a flare day.
pub const FLARE_FUNCTION_THRESHOLD: u8 = 4;
/// Subscale rating that makes a day severe.
pub const SEVERE_SUBSCALE: u8 = 3;
/// Functional ability that makes a day severe.
pub const SEVERE_FUNCTION: u8 = 5;
/// Days per observed month when computing flare frequency.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Severity of a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeSeverity {
    Moderate,
    Severe,
}

impl EpisodeSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeSeverity::Moderate => "moderate",
            EpisodeSeverity::Severe => "severe",
        }
    }
}

/// Overall flare intensity across the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlareIntensity {
    /// No flare episodes
    #[default]
    Mild,
    Moderate,
    Severe,
}

impl FlareIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlareIntensity::Mild => "mild",
            FlareIntensity::Moderate => "moderate",
            FlareIntensity::Severe => "severe",
        }
    }
}

/// A maximal run of consecutive flare days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlareEpisode {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    pub duration_days: u32,
    pub max_severity: EpisodeSeverity,
}

/// Episodes plus the statistics derived from them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlareReport {
    pub episodes: Vec<FlareEpisode>,
    /// Episodes per observed month
    pub flare_frequency: f64,
    /// Mean episode length in days
    pub average_flare_duration: f64,
    pub flare_intensity: FlareIntensity,
}

/// Score used to pick the worst entry of a day.
pub fn composite_score(entry: &Entry) -> u32 {
    u32::from(entry.sss.fatigue)
        + u32::from(entry.sss.waking_unrefreshed)
        + u32::from(entry.sss.cognitive_symptoms)
        + u32::from(entry.impact.functional_ability)
}

/// Whether an entry marks its day as a flare day.
pub fn is_flare_day(entry: &Entry) -> bool {
    entry.sss.fatigue >= FLARE_SUBSCALE_THRESHOLD
        || entry.sss.waking_unrefreshed >= FLARE_SUBSCALE_THRESHOLD
        || entry.impact.functional_ability >= FLARE_FUNCTION_THRESHOLD
}

/// Whether an entry marks its day as severe.
pub fn is_severe_day(entry: &Entry) -> bool {
    entry.sss.fatigue == SEVERE_SUBSCALE
        || entry.sss.cognitive_symptoms == SEVERE_SUBSCALE
        || entry.sss.waking_unrefreshed == SEVERE_SUBSCALE
        || entry.impact.functional_ability == SEVERE_FUNCTION
}

/// Keep the worst entry of each local day.
fn worst_entry_per_day<'a, Tz: TimeZone>(
    sorted: &[TimedEntry<'a>],
    tz: &Tz,
) -> BTreeMap<NaiveDate, &'a Entry> {
    let mut days: BTreeMap<NaiveDate, &'a Entry> = BTreeMap::new();
    for timed in sorted {
        let Some(day) = timed.local_day(tz) else {
            continue;
        };
        days.entry(day)
            .and_modify(|kept| {
                if composite_score(timed.entry) > composite_score(*kept) {
                    *kept = timed.entry;
                }
            })
            .or_insert(timed.entry);
    }
    days
}

/// Group flare days (ascending) into episodes of consecutive days.
fn group_episodes<'a>(flare_days: impl Iterator<Item = (NaiveDate, &'a Entry)>) -> Vec<FlareEpisode> {
    let mut episodes: Vec<FlareEpisode> = Vec::new();

    for (day, entry) in flare_days {
        let severity = if is_severe_day(entry) {
            EpisodeSeverity::Severe
        } else {
            EpisodeSeverity::Moderate
        };

        match episodes.last_mut() {
            Some(current) if current.end_day.succ_opt() == Some(day) => {
                current.end_day = day;
                current.duration_days += 1;
                if severity == EpisodeSeverity::Severe {
                    current.max_severity = EpisodeSeverity::Severe;
                }
            }
            _ => episodes.push(FlareEpisode {
                start_day: day,
                end_day: day,
                duration_days: 1,
                max_severity: severity,
            }),
        }
    }

    episodes
}

/// Detect flare episodes over a chronologically sorted history.
pub fn detect_flares<Tz: TimeZone>(sorted: &[TimedEntry<'_>], tz: &Tz) -> FlareReport {
    if sorted.is_empty() {
        return FlareReport::default();
    }

    let days = worst_entry_per_day(sorted, tz);
    let episodes = group_episodes(
        days.into_iter()
            .filter(|(_, entry)| is_flare_day(entry)),
    );

    let span_days = observed_day_span(sorted, tz);
    let observed_months = (f64::from(span_days) / DAYS_PER_MONTH).max(1.0);
    let flare_frequency = episodes.len() as f64 / observed_months;

    let average_flare_duration = if episodes.is_empty() {
        0.0
    } else {
        let total: u32 = episodes.iter().map(|e| e.duration_days).sum();
        f64::from(total) / episodes.len() as f64
    };

    let flare_intensity = if episodes
        .iter()
        .any(|e| e.max_severity == EpisodeSeverity::Severe)
    {
        FlareIntensity::Severe
    } else if !episodes.is_empty() {
        FlareIntensity::Moderate
    } else {
        FlareIntensity::Mild
    };

    tracing::debug!(
        episodes = episodes.len(),
        span_days,
        flare_frequency,
        "Detected flare episodes"
    );

    FlareReport {
        episodes,
        flare_frequency,
        average_flare_duration,
        flare_intensity,
    }
}
