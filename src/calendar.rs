use chrono::{Datelike, Days, Local, NaiveDate};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Medium-style English formats written by older builds of the app.
const LEGACY_FORMATS: [&str; 2] = ["%b %d, %Y", "%d %b %Y"];

/// Canonical schedule key: a calendar date rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDateKey(pub String);

impl fmt::Display for InvalidDateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date key '{}'", self.0)
    }
}

impl std::error::Error for InvalidDateKey {}

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse only the canonical form.
    pub fn parse_canonical(input: &str) -> Result<Self, InvalidDateKey> {
        NaiveDate::parse_from_str(input.trim(), CANONICAL_FORMAT)
            .map(Self)
            .map_err(|_| InvalidDateKey(input.to_string()))
    }

    /// True when `input` is already in canonical form.
    pub fn is_canonical(input: &str) -> bool {
        Self::parse_canonical(input)
            .map(|key| key.to_string() == input)
            .unwrap_or(false)
    }

    /// The following day, or `None` past the last representable date.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Ok(key) = Self::parse_canonical(input) {
            return Ok(key);
        }
        let trimmed = input.trim();
        LEGACY_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
            .map(Self)
            .ok_or_else(|| InvalidDateKey(input.to_string()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DateKeyVisitor;

impl Visitor<'_> for DateKeyVisitor {
    type Value = DateKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date string such as 2024-12-20")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<DateKey, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DateKeyVisitor)
    }
}

/// Every date from `start` to `end`, inclusive. Empty when `start > end`.
pub fn days_in_range(start: DateKey, end: DateKey) -> Vec<DateKey> {
    let mut days = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current.filter(|day| *day <= end) {
        days.push(day);
        current = day.succ();
    }
    days
}

/// The Monday..Sunday week containing `date`, cut short at either end of the
/// representable calendar.
pub fn week_containing(date: DateKey) -> Vec<DateKey> {
    let offset = u64::from(date.0.weekday().num_days_from_monday());
    let monday = date.0.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN);
    let sunday = date.0.checked_add_days(Days::new(6 - offset)).unwrap_or(NaiveDate::MAX);
    days_in_range(DateKey(monday), DateKey(sunday))
}
