//! Wall-clock time of day.
//!
//! [`TimeOfDay`] is the single canonical representation: a 24-hour value
//! with minute precision. The 12-hour label shown to customers is derived
//! from it by [`TimeOfDay::display_12h`] and is never parsed back.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScheduleError;

/// Local time of day, minute precision, 24-hour canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Builds a time from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTime`] if `hour > 23` or `minute > 59`.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ScheduleError::InvalidTime(format!("{hour:02}:{minute:02}")))
    }

    /// Returns the hour (0..=23).
    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0..=59).
    #[must_use]
    pub fn minute(self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub fn minutes_since_midnight(self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Adds `minutes`, returning `None` if the result passes midnight.
    #[must_use]
    pub fn checked_add_minutes(self, minutes: u32) -> Option<Self> {
        let total = self.minutes_since_midnight().checked_add(minutes)?;
        if total >= 24 * 60 {
            return None;
        }
        NaiveTime::from_hms_opt(total / 60, total % 60, 0).map(Self)
    }

    /// Canonical 24-hour form, e.g. `"09:00"`, `"17:30"`.
    #[must_use]
    pub fn to_24h(self) -> String {
        self.0.format("%H:%M").to_string()
    }

    /// Customer-facing 12-hour label, e.g. `"9:00 AM"`, `"12:30 PM"`.
    #[must_use]
    pub fn display_12h(self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }

    /// Returns the underlying [`NaiveTime`].
    #[must_use]
    pub const fn as_naive(self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }
}

/// Accepts `HH:MM` and `HH:MM:SS` (seconds are dropped). Database time
/// columns come back in the latter form.
impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(Self::from)
            .map_err(|_| ScheduleError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_24h())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_24h())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
