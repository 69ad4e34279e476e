//! Strongly-typed keys for domain entities.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar date with the time of day stripped.
///
/// Equality, ordering and hashing are by (year, month, day), which makes it
/// the natural lookup key for one bulletin per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<NaiveDateTime> for DateKey {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime.date())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateKey {
    fn from(datetime: DateTime<Tz>) -> Self {
        Self(datetime.date_naive())
    }
}

impl From<DateKey> for NaiveDate {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(NaiveDate::parse_from_str(s, "%Y-%m-%d")?))
    }
}
