//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` stamps audit events and comments. It is always UTC,
//! truncated to seconds, and renders as `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! Ordering of audit events never relies on timestamps (two commits in the
//! same second share a timestamp); the audit log carries its own sequence.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LwayError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`LwayError::Timestamp`] if the string is not RFC 3339 or
    /// carries an explicit offset (including `+00:00`).
    pub fn parse(s: &str) -> Result<Self, LwayError> {
        if !s.ends_with('Z') {
            return Err(LwayError::Timestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| LwayError::Timestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g., `2024-01-15T10:15:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc
            .with_ymd_and_hms(2024, 1, 15, 10, 15, 30)
            .unwrap()
            .with_nanosecond(987_000_000)
            .unwrap();
        let ts = Timestamp::from_utc(dt);
        assert_eq!(ts.to_iso8601(), "2024-01-15T10:15:30Z");
    }

    #[test]
    fn test_display_matches_iso8601() {
        let ts = Timestamp::parse("2024-01-15T14:18:00Z").unwrap();
        assert_eq!(format!("{ts}"), "2024-01-15T14:18:00Z");
    }

    #[test]
    fn test_parse_rejects_offsets() {
        assert!(Timestamp::parse("2024-01-15T14:18:00+00:00").is_err());
        assert!(Timestamp::parse("2024-01-15T17:18:00+03:00").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Timestamp::parse("").is_err());
        assert!(Timestamp::parse("15.01.2024 10:15").is_err());
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2024-01-15T10:15:00Z").unwrap();
        let later = Timestamp::parse("2024-01-15T10:20:00Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::parse("2024-01-16T09:15:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
