//! Recent-window symptom trends and functional capacity.
//!
//! The window is the last [`WINDOW_SIZE`] entries in chronological order.
//! A trend compares only the first and last entries of the window; it is
//! not a regression.

use super::timeline::TimedEntry;
use crate::types::Entry;
use serde::{Deserialize, Serialize};

/// Number of most recent entries in the trend window.
pub const WINDOW_SIZE: usize = 14;
/// Endpoint change that must be exceeded before a trend is reported.
pub const TREND_DELTA: i32 = 1;
/// Functional ability at or below this is a good day.
pub const GOOD_DAY_MAX: u8 = 2;
/// Functional ability at or above this is a bad day.
pub const BAD_DAY_MIN: u8 = 4;
/// Functional ability meaning bedridden.
pub const BEDRIDDEN: u8 = 5;

/// Direction of a symptom over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    #[default]
    Stable,
    Worsening,
}

impl Trend {
    /// Classify the change from the first to the last value.
    pub fn from_endpoints(first: u8, last: u8) -> Self {
        let delta = i32::from(last) - i32::from(first);
        if delta > TREND_DELTA {
            Trend::Worsening
        } else if delta < -TREND_DELTA {
            Trend::Improving
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Worsening => "worsening",
        }
    }
}

/// One subscale summarized over the window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SymptomTrend {
    pub current: u8,
    pub trend: Trend,
    pub average: f64,
}

/// Trends for the tracked subscales.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SymptomTrends {
    /// `sss.fatigue`
    pub fatigue: SymptomTrend,
    /// `sss.cognitive_symptoms`
    pub cognition: SymptomTrend,
    /// `sss.waking_unrefreshed`
    pub sleep: SymptomTrend,
}

/// Daily functioning over the window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionalCapacity {
    /// Mean functional ability (0 = unimpaired, 5 = bedridden)
    pub average: f64,
    pub good_days: u32,
    pub bad_days: u32,
    pub bedridden: u32,
}

/// The last [`WINDOW_SIZE`] entries, or all of them if there are fewer.
pub fn recent_window<'s, 'a>(sorted: &'s [TimedEntry<'a>]) -> &'s [TimedEntry<'a>] {
    &sorted[sorted.len().saturating_sub(WINDOW_SIZE)..]
}

fn mean(values: impl Iterator<Item = u8>) -> f64 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn summarize(window: &[TimedEntry<'_>], value: fn(&Entry) -> u8) -> SymptomTrend {
    match (window.first(), window.last()) {
        (Some(first), Some(last)) => SymptomTrend {
            current: value(last.entry),
            trend: Trend::from_endpoints(value(first.entry), value(last.entry)),
            average: mean(window.iter().map(|t| value(t.entry))),
        },
        _ => SymptomTrend::default(),
    }
}

/// Summarize fatigue, cognition and sleep over the window.
pub fn symptom_trends(window: &[TimedEntry<'_>]) -> SymptomTrends {
    SymptomTrends {
        fatigue: summarize(window, |e| e.sss.fatigue),
        cognition: summarize(window, |e| e.sss.cognitive_symptoms),
        sleep: summarize(window, |e| e.sss.waking_unrefreshed),
    }
}

/// Summarize functional ability over the window.
pub fn functional_capacity(window: &[TimedEntry<'_>]) -> FunctionalCapacity {
    let abilities = || window.iter().map(|t| t.entry.impact.functional_ability);
    FunctionalCapacity {
        average: mean(abilities()),
        good_days: abilities().filter(|v| *v <= GOOD_DAY_MAX).count() as u32,
        bad_days: abilities().filter(|v| *v >= BAD_DAY_MIN).count() as u32,
        bedridden: abilities().filter(|v| *v == BEDRIDDEN).count() as u32,
    }
}
