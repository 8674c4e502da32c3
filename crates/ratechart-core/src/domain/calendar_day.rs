use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// A date truncated to day granularity, identified as `YYYY-MM-DD`.
///
/// The identifier is zero-padded, so ordering identifiers as strings and
/// ordering days on the calendar agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(Date);

impl CalendarDay {
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: format!("{year:04}-{month:02}-{day:02}"),
        };
        let month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    /// Calendar day of `value` in UTC; the time of day is dropped.
    pub fn from_datetime(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC).date())
    }

    pub fn today() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc())
    }

    pub const fn date(self) -> Date {
        self.0
    }

    /// The following day, or `None` past the last representable date.
    pub fn next(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    pub fn checked_sub_days(self, days: i64) -> Option<Self> {
        self.0.checked_sub(Duration::days(days)).map(Self)
    }

    /// Whole days from `self` to `other`; negative when `other` is earlier.
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }

    pub fn identifier(self) -> String {
        self.to_string()
    }
}

impl Display for CalendarDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl FromStr for CalendarDay {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl From<Date> for CalendarDay {
    fn from(value: Date) -> Self {
        Self(value)
    }
}

impl Serialize for CalendarDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
