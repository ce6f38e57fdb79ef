//! Diagnostic index scores.
//!
//! Scores always describe the single most recent entry, never an aggregate.
//! The criteria follow the published WPI/SSS severity classification:
//!
//! - WPI >= 7 and SSS >= 5, or
//! - WPI between 4 and 6 and SSS >= 9

use crate::types::Entry;

/// WPI needed for the first branch of the criteria.
pub const WPI_HIGH_THRESHOLD: u32 = 7;
/// SSS needed alongside a high WPI.
pub const SSS_WITH_HIGH_WPI: u32 = 5;
/// Lower bound of the moderate WPI band.
pub const WPI_MODERATE_MIN: u32 = 4;
/// Upper bound of the moderate WPI band.
pub const WPI_MODERATE_MAX: u32 = 6;
/// SSS needed alongside a moderate WPI.
pub const SSS_WITH_MODERATE_WPI: u32 = 9;

/// Index scores for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticScores {
    pub wpi_score: u32,
    pub sss_score: u32,
    pub meets_diagnostic_criteria: bool,
}

/// Whether a WPI/SSS pair meets the diagnostic criteria.
pub fn meets_criteria(wpi_score: u32, sss_score: u32) -> bool {
    (wpi_score >= WPI_HIGH_THRESHOLD && sss_score >= SSS_WITH_HIGH_WPI)
        || ((WPI_MODERATE_MIN..=WPI_MODERATE_MAX).contains(&wpi_score)
            && sss_score >= SSS_WITH_MODERATE_WPI)
}

/// Score a single entry.
pub fn score_entry(entry: &Entry) -> DiagnosticScores {
    let wpi_score = entry.wpi.count();
    let sss_score = entry.sss.total();
    DiagnosticScores {
        wpi_score,
        sss_score,
        meets_diagnostic_criteria: meets_criteria(wpi_score, sss_score),
    }
}
