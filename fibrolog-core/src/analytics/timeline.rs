//! Timestamp parsing, chronological ordering and calendar-day keys.
//!
//! Stored timestamps are ISO-8601 strings written by several app versions, so
//! three shapes are accepted:
//!
//! | Shape | Example | Read as |
//! |-------|---------|---------|
//! | RFC 3339 | `2024-03-01T08:30:00+01:00` | the instant it names |
//! | naive date-time | `2024-03-01T08:30:00` | wall-clock time in the engine's zone |
//! | bare date | `2024-03-01` | UTC midnight |
//!
//! Anything else (including the empty string) is *undated*. Undated entries
//! are never dropped; they sort before every dated entry and have no calendar
//! day.
//!
//! A naive time that falls in a daylight-saving gap is moved forward by an
//! hour, so it keeps its calendar day.

use crate::types::Entry;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a stored timestamp into an instant.
///
/// Returns `None` for empty or unparsable input.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return resolve_local(tz, &naive).map(|ts| ts.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolve a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times skipped by a forward jump are shifted past the gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(naive).earliest().or_else(|| {
        naive
            .checked_add_signed(Duration::hours(1))
            .and_then(|later| tz.from_local_datetime(&later).earliest())
    })
}

/// An entry paired with its parsed instant.
#[derive(Debug, Clone, Copy)]
pub struct TimedEntry<'a> {
    pub entry: &'a Entry,
    /// `None` when the timestamp is unusable
    pub at: Option<DateTime<Utc>>,
}

impl TimedEntry<'_> {
    /// Calendar day of this entry in `tz`, if it is dated.
    pub fn local_day<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.at.map(|at| at.with_timezone(tz).date_naive())
    }
}

/// Serialized entry, the last sort key. Entries that compare equal on it are
/// identical, so their relative order cannot change any result.
fn content_key(entry: &Entry) -> String {
    serde_json::to_string(entry).unwrap_or_default()
}

/// Sort entries oldest first without touching the caller's slice.
///
/// The order is total: instant (undated first), then raw timestamp, then id,
/// then the full entry content. Input order never decides a tie.
pub fn sort_entries<'a, Tz: TimeZone>(entries: &'a [Entry], tz: &Tz) -> Vec<TimedEntry<'a>> {
    let mut timed: Vec<TimedEntry<'a>> = entries
        .iter()
        .map(|entry| TimedEntry {
            entry,
            at: parse_timestamp(&entry.timestamp, tz),
        })
        .collect();
    timed.sort_by_cached_key(|timed| {
        let entry = timed.entry;
        (
            timed.at,
            entry.timestamp.as_str(),
            entry.id.as_str(),
            content_key(entry),
        )
    });
    timed
}

/// Inclusive number of calendar days between the earliest and latest dated
/// entries, or the entry count when nothing is dated.
pub fn observed_day_span<Tz: TimeZone>(sorted: &[TimedEntry<'_>], tz: &Tz) -> u32 {
    let mut days = sorted.iter().filter_map(|timed| timed.local_day(tz));
    let first = days.next();
    let last = days.last().or(first);

    match (first, last) {
        (Some(first), Some(last)) => {
            let span = last.signed_duration_since(first).num_days() + 1;
            u32::try_from(span).unwrap_or(u32::MAX)
        }
        _ => sorted.len() as u32,
    }
}
