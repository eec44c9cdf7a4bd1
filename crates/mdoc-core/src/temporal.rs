//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` carries the security object's `signed`, `validFrom` and
//! `validUntil` fields and the value of `timestamp`-kind elements such as
//! `issuance_date`.
//!
//! ## Security Invariant
//!
//! An instant hashed into a commitment has exactly one text form,
//! `YYYY-MM-DDTHH:MM:SSZ`. Sub-second precision is dropped on the way in and
//! offsets other than `Z` are refused, so `+00:00` and `.000` variants can
//! never produce a second digest for the same value.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A UTC instant at whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current time, truncated to the second.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Drops nanoseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parse an RFC 3339 string that ends in `Z`.
    ///
    /// Fractional seconds are accepted and truncated; any explicit offset,
    /// `+00:00` included, is a `CoreError::Validation`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::Validation(format!(
                "timestamp {s:?} must be UTC with a Z suffix"
            )));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self::from_utc(dt.with_timezone(&Utc)))
            .map_err(|e| CoreError::Validation(format!("timestamp {s:?}: {e}")))
    }

    /// `self + secs`, or `self` unchanged if the result leaves chrono's range.
    pub fn plus_secs(&self, secs: i64) -> Self {
        Duration::try_seconds(secs)
            .and_then(|d| self.0.checked_add_signed(d))
            .map(Self)
            .unwrap_or(*self)
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`, the only form written or hashed.
    pub fn to_iso8601(&self) -> String {
        self.0.format(WIRE_FORMAT).to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_is_whole_seconds() {
        assert!(Timestamp::now().to_iso8601().ends_with('Z'));
        assert_eq!(Timestamp::now().0.nanosecond(), 0);
    }

    #[test]
    fn nanoseconds_are_dropped() {
        let dt = Utc.with_ymd_and_hms(2051, 1, 8, 16, 29, 4).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(999_999_999).unwrap());
        assert_eq!(ts.to_iso8601(), "2051-01-08T16:29:04Z");
        assert_eq!(ts, Timestamp::parse("2051-01-08T16:29:04.5Z").expect("valid timestamp"));
    }

    #[test]
    fn only_z_suffix_is_accepted() {
        assert_eq!(
            Timestamp::parse("2051-01-08T16:29:05Z").expect("valid timestamp").to_string(),
            "2051-01-08T16:29:05Z"
        );
        for s in [
            "2051-01-08T16:29:05+00:00",
            "2051-01-08T18:29:05+02:00",
            "2051-01-08",
            "08/01/2051",
            "",
        ] {
            assert!(Timestamp::parse(s).is_err(), "{s}");
        }
    }

    #[test]
    fn validity_arithmetic() {
        let from = Timestamp::parse("2030-01-01T00:00:00Z").expect("valid timestamp");
        assert!(from < from.plus_secs(1));
        assert_eq!(from.plus_secs(-300).to_iso8601(), "2029-12-31T23:55:00Z");
        assert_eq!(from.plus_secs(i64::MAX), from);
    }

    #[test]
    fn serde_is_the_wire_string() {
        let ts = Timestamp::parse("2051-01-08T16:29:05Z").expect("valid timestamp");
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#""2051-01-08T16:29:05Z""#);
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
        assert!(serde_json::from_str::<Timestamp>(r#""2051-01-08T17:29:05+01:00""#).is_err());
    }
}
