//! Analytics module for fibrolog
//!
//! Computes a clinical-style summary of a symptom log:
//! - Diagnostic index scores (WPI, SSS) from the most recent entry
//! - Most affected body regions and most common triggers
//! - Recent symptom trends and functional capacity
//! - Flare episode detection
//! - Intervention effectiveness
//!
//! See [`engine`] for the entry point. Each stage lives in its own module and
//! can be run on its own over a [`timeline::sort_entries`] view.

pub mod diagnostic;
pub mod engine;
pub mod flares;
pub mod frequency;
pub mod interventions;
pub mod timeline;
pub mod trends;

/// Maximum length of every ranked list.
pub const TOP_N: usize = 5;

pub use diagnostic::{meets_criteria, DiagnosticScores};
pub use engine::{compute_analytics, Analytics, AnalyticsEngine};
pub use flares::{EpisodeSeverity, FlareEpisode, FlareIntensity, FlareReport};
pub use frequency::{RegionFrequency, TriggerFrequency};
pub use interventions::EffectiveIntervention;
pub use trends::{FunctionalCapacity, SymptomTrend, SymptomTrends, Trend};
