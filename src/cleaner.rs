//! Cleaning and classification of raw disruption records.
//!
//! Turns the untrusted shapes from [`crate::feed`] into validated
//! [`DisruptionRow`]s with derived duration, impact level, and station list.
//! A record that cannot be validated is dropped, never an error.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::RawDisruption;

/// A validated disruption row as persisted by the store. Immutable once
/// produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisruptionRow {
    /// Lower-cased feed category, e.g. `"cancellation"` or `"delay"`.
    pub disruption_type: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// True when the feed gave no usable end time; `end_time` is then the
    /// clock reading at cleaning time.
    pub is_ongoing: bool,
    pub duration_minutes: f64,
    /// Severity in 2..=5. 1 ("minor") is reserved and never produced by the
    /// current classification.
    pub impact_level: u8,
    /// Comma-joined station codes in feed order; `None` when the record
    /// listed no routes.
    pub affected_stations: Option<String>,
}

/// Cleans a batch of raw records, dropping any that cannot be validated.
///
/// `now` is the clock reading substituted for missing end times. Pure: no
/// I/O and no logging; callers report drop counts if they care.
pub fn clean_disruptions(records: &[RawDisruption], now: DateTime<Utc>) -> Vec<DisruptionRow> {
    records.iter().filter_map(|r| clean_one(r, now)).collect()
}

fn clean_one(record: &RawDisruption, now: DateTime<Utc>) -> Option<DisruptionRow> {
    let disruption_type = record.disruption_type.as_deref()?.to_lowercase();
    let title = record.title.as_deref()?.trim().to_string();

    // No usable start means no duration and no window ordering.
    let start_time = parse_timestamp(record.start.as_deref()?)?;
    let (end_time, is_ongoing) = match record.end.as_deref().and_then(parse_timestamp) {
        Some(end) => (end, false),
        None => (now, true),
    };

    let duration_minutes = (end_time - start_time).num_seconds() as f64 / 60.0;
    let impact_level = classify_impact(&disruption_type, duration_minutes);

    let codes: Vec<&str> = record
        .routes
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|route| route.code.as_deref())
        .collect();
    let affected_stations = if codes.is_empty() {
        None
    } else {
        Some(codes.join(","))
    };

    // Test entries carry placeholder titles; negative durations are feed
    // glitches. Neither may reach the store.
    if title.chars().count() <= 5 || duration_minutes < 0.0 {
        return None;
    }

    Some(DisruptionRow {
        disruption_type,
        title,
        start_time,
        end_time,
        is_ongoing,
        duration_minutes,
        impact_level,
        affected_stations,
    })
}

/// Severity classification, first match wins: cancellations are always
/// severe regardless of how short they were.
pub fn classify_impact(disruption_type: &str, duration_minutes: f64) -> u8 {
    if disruption_type == "cancellation" {
        5
    } else if duration_minutes > 120.0 {
        4
    } else if duration_minutes > 60.0 {
        3
    } else {
        2
    }
}

/// Parses an ISO 8601 timestamp; naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
