//! Typed shapes for the raw NS disruptions feed.

use anyhow::{Context, Result};
use serde::Deserialize;

/// One station descriptor inside a disruption's route listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRoute {
    pub code: Option<String>,
    pub name: Option<String>,
}

/// A single disruption record exactly as the feed delivers it.
///
/// Nothing here is trusted: any field may be missing or garbage. Deciding
/// what survives is the cleaner's job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDisruption {
    #[serde(rename = "type")]
    pub disruption_type: Option<String>,
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub routes: Option<Vec<RawRoute>>,
}

/// Decodes a feed body into raw disruption records.
///
/// # Errors
///
/// Returns an error if the bytes are not a JSON array of objects. Records
/// with missing or malformed fields still decode; the cleaner drops them
/// individually instead of failing the batch.
pub fn parse_disruptions(bytes: &[u8]) -> Result<Vec<RawDisruption>> {
    serde_json::from_slice(bytes).context("disruption feed is not a JSON array of records")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_of_records() {
        let body = br#"[
            {"type": "Delay", "title": "Vertraging bij Utrecht",
             "start": "2024-03-15T08:00:00", "end": "2024-03-15T09:00:00",
             "routes": [{"code": "UT", "name": "Utrecht Centraal"}]}
        ]"#;
        let records = parse_disruptions(body).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].disruption_type.as_deref(), Some("Delay"));
        assert_eq!(records[0].routes.as_ref().unwrap()[0].code.as_deref(), Some("UT"));
    }

    #[test]
    fn test_parse_records_with_missing_fields() {
        // Missing end and routes must not fail the whole batch.
        let body = br#"[{"type": "delay", "title": "Iets", "start": "2024-03-15T08:00:00"}, {}]"#;
        let records = parse_disruptions(body).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[0].end.is_none());
        assert!(records[0].routes.is_none());
        assert!(records[1].title.is_none());
    }

    #[test]
    fn test_parse_non_array_is_an_error() {
        assert!(parse_disruptions(br#"{"type": "delay"}"#).is_err());
        assert!(parse_disruptions(br#""just a string""#).is_err());
    }

    #[test]
    fn test_parse_invalid_json_is_an_error() {
        assert!(parse_disruptions(b"not json at all").is_err());
    }
}
