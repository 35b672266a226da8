//! Instants carried on tickets.
//!
//! Upstream data delivers `createdAt` / `lastModified` as loosely formatted
//! strings. A value that cannot be read is kept as [`Timestamp::Invalid`]
//! instead of collapsing to the Unix epoch, so range checks and ordering can
//! treat it explicitly.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%#z";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Valid(DateTime<Utc>),
    /// Raw input that did not parse as an instant.
    Invalid(String),
}

impl Timestamp {
    /// Reads RFC 3339, offset-less date-times (taken as UTC) and bare dates
    /// (UTC midnight). Everything else becomes [`Timestamp::Invalid`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::Valid(dt.with_timezone(&Utc));
        }

        if let Ok(dt) = DateTime::parse_from_str(trimmed, OFFSET_DATETIME_FORMAT) {
            return Self::Valid(dt.with_timezone(&Utc));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Self::Valid(naive.and_utc());
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Self::Valid(day_start(date));
        }

        Self::Invalid(raw.to_string())
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Valid(dt) => Some(*dt),
            Self::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// `self >= bound`. Never true for an invalid timestamp.
    pub fn is_at_or_after(&self, bound: DateTime<Utc>) -> bool {
        self.instant().is_some_and(|dt| dt >= bound)
    }

    /// `self <= bound`. Never true for an invalid timestamp.
    pub fn is_at_or_before(&self, bound: DateTime<Utc>) -> bool {
        self.instant().is_some_and(|dt| dt <= bound)
    }

    /// Chronological order with every invalid value placed after all valid
    /// ones. Two invalid values compare equal.
    pub fn cmp_invalid_last(&self, other: &Self) -> Ordering {
        match (self.instant(), other.instant()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// UTC midnight at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Valid(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Invalid(raw) => write!(f, "{raw}"),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
