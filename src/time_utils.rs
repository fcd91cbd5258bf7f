// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC3339 timestamp with any offset and normalize it to UTC.
pub fn parse_rfc3339_utc(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_uses_z_suffix() {
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2026-03-01T09:30:00Z");
    }

    #[test]
    fn test_parse_normalizes_offset() {
        let parsed = parse_rfc3339_utc("2026-03-01T10:30:00+01:00").unwrap();
        assert_eq!(format_utc_rfc3339(parsed), "2026-03-01T09:30:00Z");

        assert!(parse_rfc3339_utc("2026-03-01").is_none());
        assert!(parse_rfc3339_utc("tomorrow").is_none());
    }
}
