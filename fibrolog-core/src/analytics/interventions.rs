//! Intervention effectiveness
//!
//! For every intervention seen in the history, entries are split into those
//! that used it and those that did not, and the mean functional ability of
//! each side is compared:
//!
//! ```text
//! correlationWithImprovement = withoutAvg - withAvg
//! ```
//!
//! Lower functional ability is better, so a positive value means days with the
//! intervention went better. An empty side borrows the overall mean. Deltas
//! within [`NOISE_FLOOR`] of zero are dropped.

use super::timeline::TimedEntry;
use super::TOP_N;
use crate::types::Interventions;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Deltas at or below this magnitude are treated as noise.
pub const NOISE_FLOOR: f64 = 0.05;

/// An intervention associated with a change in functional ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveIntervention {
    pub intervention: String,
    pub correlation_with_improvement: f64,
}

/// Identifiers of the interventions used in one entry.
///
/// Flags set to `true` contribute their name. Medication and supplement
/// names contribute `medication:<name>` / `supplement:<name>`, trimmed, with
/// blank names skipped.
pub fn intervention_ids(interventions: &Interventions) -> BTreeSet<String> {
    let flags = interventions
        .flags
        .iter()
        .filter(|(_, used)| **used)
        .map(|(name, _)| name.clone());

    let named = |prefix: &'static str, names: &[String]| {
        names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(move |name| format!("{}:{}", prefix, name))
            .collect::<Vec<_>>()
    };

    flags
        .chain(named("medication", &interventions.medication))
        .chain(named("supplement", &interventions.supplements))
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Rank interventions by their association with lower functional impairment.
pub fn correlate_interventions(sorted: &[TimedEntry<'_>]) -> Vec<EffectiveIntervention> {
    if sorted.is_empty() {
        return Vec::new();
    }

    let used: Vec<BTreeSet<String>> = sorted
        .iter()
        .map(|timed| intervention_ids(&timed.entry.interventions))
        .collect();
    let abilities: Vec<f64> = sorted
        .iter()
        .map(|timed| f64::from(timed.entry.impact.functional_ability))
        .collect();
    let overall = mean(&abilities).unwrap_or(0.0);

    // Universe in first-seen order; the stable sort below keeps it for ties.
    let mut seen = HashSet::new();
    let universe: Vec<&String> = used
        .iter()
        .flatten()
        .filter(|id| seen.insert(*id))
        .collect();

    let mut ranked: Vec<EffectiveIntervention> = universe
        .into_iter()
        .filter_map(|id| {
            let mut with = Vec::new();
            let mut without = Vec::new();
            for (ability, ids) in abilities.iter().zip(&used) {
                if ids.contains(id) {
                    with.push(*ability);
                } else {
                    without.push(*ability);
                }
            }

            let with_avg = mean(&with).unwrap_or(overall);
            let without_avg = mean(&without).unwrap_or(overall);
            let delta = without_avg - with_avg;

            if !delta.is_finite() || delta.abs() <= NOISE_FLOOR {
                return None;
            }
            Some(EffectiveIntervention {
                intervention: id.clone(),
                correlation_with_improvement: delta,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.correlation_with_improvement
            .total_cmp(&a.correlation_with_improvement)
    });
    ranked.truncate(TOP_N);
    ranked
}
