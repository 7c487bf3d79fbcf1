//! ISO weekday numbering.
//!
//! The roster is keyed by [`DayOfWeek`], numbered 1 = Monday .. 7 = Sunday.
//! Many calendar libraries and browser APIs number Sunday as 0; anything
//! crossing that boundary goes through [`DayOfWeek::from_sunday_zero`] so
//! Sunday always lands on 7.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// A weekday in ISO numbering (Monday = 1, Sunday = 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

impl DayOfWeek {
    /// Monday (1).
    pub const MONDAY: Self = Self(1);
    /// Sunday (7).
    pub const SUNDAY: Self = Self(7);

    /// Validates an ISO weekday number.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidDayOfWeek`] outside 1..=7.
    pub const fn new(iso: u8) -> Result<Self, ScheduleError> {
        if iso >= 1 && iso <= 7 {
            Ok(Self(iso))
        } else {
            Err(ScheduleError::InvalidDayOfWeek(iso))
        }
    }

    /// Weekday of a calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let iso = date.weekday().number_from_monday() as u8;
        Self(iso)
    }

    /// Converts a Sunday-is-zero weekday (0 = Sunday .. 6 = Saturday).
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidDayOfWeek`] for values above 6.
    pub const fn from_sunday_zero(native: u8) -> Result<Self, ScheduleError> {
        match native {
            0 => Ok(Self::SUNDAY),
            1..=6 => Ok(Self(native)),
            other => Err(ScheduleError::InvalidDayOfWeek(other)),
        }
    }

    /// Returns the ISO number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// English day name, e.g. `"Monday"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        DAY_NAMES
            .get(usize::from(self.0.saturating_sub(1)))
            .copied()
            .unwrap_or("Unknown")
    }

    /// All seven days, Monday first.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=7).map(Self)
    }

    /// The seven dates of the ISO week (Monday..Sunday) containing `date`.
    #[must_use]
    pub fn week_of(date: NaiveDate) -> Vec<NaiveDate> {
        let offset = u64::from(Self::from_date(date).0 - 1);
        let monday = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
        monday.iter_days().take(7).collect()
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("valid date");
        };
        date
    }

    #[test]
    fn sunday_maps_to_seven() {
        // 2026-10-18 is a Sunday.
        assert_eq!(DayOfWeek::from_date(date(2026, 10, 18)), DayOfWeek::SUNDAY);
        assert_eq!(DayOfWeek::from_date(date(2026, 10, 19)), DayOfWeek::MONDAY);
    }

    #[test]
    fn sunday_zero_remap() {
        let Ok(sunday) = DayOfWeek::from_sunday_zero(0) else {
            panic!("0 is Sunday");
        };
        assert_eq!(sunday.number(), 7);
        let Ok(saturday) = DayOfWeek::from_sunday_zero(6) else {
            panic!("6 is Saturday");
        };
        assert_eq!(saturday.name(), "Saturday");
        assert!(DayOfWeek::from_sunday_zero(7).is_err());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(DayOfWeek::new(0).is_err());
        assert!(DayOfWeek::new(8).is_err());
        assert!(serde_json::from_str::<DayOfWeek>("9").is_err());
    }

    #[test]
    fn week_of_starts_on_monday() {
        let week = DayOfWeek::week_of(date(2026, 10, 18));
        assert_eq!(week.len(), 7);
        assert_eq!(week.first().copied(), Some(date(2026, 10, 12)));
        assert_eq!(week.last().copied(), Some(date(2026, 10, 18)));
    }

    #[test]
    fn all_lists_monday_to_sunday() {
        let names: Vec<&str> = DayOfWeek::all().map(DayOfWeek::name).collect();
        assert_eq!(names, DAY_NAMES.to_vec());
    }
}
