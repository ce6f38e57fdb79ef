//! Symptom analytics engine
//!
//! Turns a symptom log into an [`Analytics`] summary. The engine is a pure
//! function of its input: it sorts a borrowed view of the entries, runs each
//! stage over that view and assembles the results.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ANALYTICS ENGINE                        │
//! │                                                              │
//! │  entries ──► timeline::sort_entries (oldest first)           │
//! │                 │                                            │
//! │     ┌───────────┼─────────────┬──────────────┬─────────┐     │
//! │     ▼           ▼             ▼              ▼         ▼     │
//! │ diagnostic  frequency      trends         flares  interventions
//! │ (last entry) (all entries) (last 14)   (local days) (all)    │
//! │     └───────────┴─────────────┴──────────────┴─────────┘     │
//! │                         ▼                                    │
//! │                     Analytics                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use fibrolog_core::analytics::{compute_analytics, AnalyticsEngine};
//! use fibrolog_core::types::{Entry, Sss};
//!
//! let entries = vec![
//!     Entry::new("1", "2024-01-01T09:00:00Z").with_sss(Sss::new(2, 2, 1, 1)),
//!     Entry::new("2", "2024-01-02T09:00:00Z").with_sss(Sss::new(1, 1, 1, 1)),
//! ];
//!
//! // Day bucketing in the process-local timezone
//! let analytics = compute_analytics(&entries);
//! assert_eq!(analytics.sss_score, 4);
//!
//! // Or pin the timezone
//! let engine = AnalyticsEngine::with_timezone(chrono::Utc);
//! assert_eq!(engine.compute(&entries), engine.compute(&entries));
//! ```

use super::diagnostic::{score_entry, DiagnosticScores};
use super::flares::{detect_flares, FlareIntensity, FlareReport};
use super::frequency::{rank_regions, rank_triggers, RegionFrequency, TriggerFrequency};
use super::interventions::{correlate_interventions, EffectiveIntervention};
use super::timeline::sort_entries;
use super::trends::{
    functional_capacity, recent_window, symptom_trends, FunctionalCapacity, SymptomTrends,
};
use crate::types::Entry;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Analytics summary for a symptom log.
///
/// An empty log yields `Analytics::default()`: zero scores, empty rankings,
/// stable trends and mild flare intensity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Painful regions in the most recent entry (0-18)
    pub wpi_score: u32,
    /// Symptom severity of the most recent entry (0-12)
    pub sss_score: u32,
    pub meets_diagnostic_criteria: bool,
    /// Up to 5 regions, most frequent first
    pub most_affected_regions: Vec<RegionFrequency>,
    /// Up to 5 trigger buckets, most frequent first
    pub common_triggers: Vec<TriggerFrequency>,
    pub symptom_trends: SymptomTrends,
    /// Flare episodes per observed month
    pub flare_frequency: f64,
    /// Mean flare episode length in days
    pub average_flare_duration: f64,
    pub flare_intensity: FlareIntensity,
    pub functional_capacity: FunctionalCapacity,
    /// Up to 5 interventions, strongest improvement first
    pub effective_interventions: Vec<EffectiveIntervention>,
}

/// Engine that computes [`Analytics`] with calendar days taken in `Tz`.
///
/// The engine holds no state besides its timezone, so a single instance can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine<Tz: TimeZone = Local> {
    tz: Tz,
}

impl AnalyticsEngine<Local> {
    /// Create an engine that buckets days in the process-local timezone.
    pub fn new() -> Self {
        Self { tz: Local }
    }
}

impl Default for AnalyticsEngine<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> AnalyticsEngine<Tz> {
    /// Create an engine that buckets days in `tz`.
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }

    /// The timezone used for calendar days.
    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Compute the analytics summary for a log.
    ///
    /// Input order does not matter and the input is never modified.
    pub fn compute(&self, entries: &[Entry]) -> Analytics {
        let sorted = sort_entries(entries, &self.tz);
        let Some(latest) = sorted.last() else {
            tracing::debug!("No entries; returning default analytics");
            return Analytics::default();
        };

        let DiagnosticScores {
            wpi_score,
            sss_score,
            meets_diagnostic_criteria,
        } = score_entry(latest.entry);

        let window = recent_window(&sorted);
        let flares = detect_flares(&sorted, &self.tz);

        let analytics = Analytics {
            wpi_score,
            sss_score,
            meets_diagnostic_criteria,
            most_affected_regions: rank_regions(&sorted),
            common_triggers: rank_triggers(&sorted),
            symptom_trends: symptom_trends(window),
            flare_frequency: flares.flare_frequency,
            average_flare_duration: flares.average_flare_duration,
            flare_intensity: flares.flare_intensity,
            functional_capacity: functional_capacity(window),
            effective_interventions: correlate_interventions(&sorted),
        };

        tracing::debug!(
            entries = entries.len(),
            undated = sorted.iter().filter(|t| t.at.is_none()).count(),
            window = window.len(),
            episodes = flares.episodes.len(),
            wpi_score,
            sss_score,
            "Computed symptom analytics"
        );

        analytics
    }

    /// Flare episodes for a log, with the same statistics that
    /// [`compute`](Self::compute) reports.
    pub fn flare_report(&self, entries: &[Entry]) -> FlareReport {
        let sorted = sort_entries(entries, &self.tz);
        detect_flares(&sorted, &self.tz)
    }
}

/// Compute analytics with calendar days in the process-local timezone.
pub fn compute_analytics(entries: &[Entry]) -> Analytics {
    AnalyticsEngine::new().compute(entries)
}
