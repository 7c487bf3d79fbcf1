//! One weekday's assignment for one optometrist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BranchId, DayOfWeek, OptometristId, TimeOfDay};
use crate::error::ScheduleError;

/// Branch and working hours for a day the optometrist is available.
///
/// Only constructible through [`ShiftAssignment::new`] or
/// [`ShiftAssignment::from_parts`], so `start_time < end_time` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftAssignment {
    branch_id: BranchId,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
}

impl ShiftAssignment {
    /// Validates a shift.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if `start_time >= end_time`.
    pub fn new(
        branch_id: BranchId,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Result<Self, ScheduleError> {
        if start_time >= end_time {
            return Err(ScheduleError::Validation(format!(
                "start time {start_time} must be before end time {end_time}"
            )));
        }
        Ok(Self {
            branch_id,
            start_time,
            end_time,
        })
    }

    /// Builds an optional assignment from the nullable column triple.
    ///
    /// `branch_id = None` means "not available" and the times are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if a branch is given without
    /// both times, or the times are out of order.
    pub fn from_parts(
        branch_id: Option<BranchId>,
        start_time: Option<TimeOfDay>,
        end_time: Option<TimeOfDay>,
    ) -> Result<Option<Self>, ScheduleError> {
        let Some(branch_id) = branch_id else {
            return Ok(None);
        };
        match (start_time, end_time) {
            (Some(start), Some(end)) => Self::new(branch_id, start, end).map(Some),
            _ => Err(ScheduleError::Validation(
                "start and end time are required when a branch is assigned".to_string(),
            )),
        }
    }

    /// Branch the optometrist works at.
    #[must_use]
    pub const fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    /// Start of the working window.
    #[must_use]
    pub const fn start_time(&self) -> TimeOfDay {
        self.start_time
    }

    /// End of the working window.
    #[must_use]
    pub const fn end_time(&self) -> TimeOfDay {
        self.end_time
    }
}

/// A roster row: one optometrist, one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    /// Optometrist the row belongs to.
    pub optometrist_id: OptometristId,
    /// ISO weekday.
    pub day_of_week: DayOfWeek,
    /// `None` means not available that day.
    pub assignment: Option<ShiftAssignment>,
    /// Last write, `None` for the implicit default row.
    pub updated_at: Option<DateTime<Utc>>,
    /// User id of whoever made the last write, when known.
    pub updated_by: Option<u64>,
}

impl RosterEntry {
    /// The "not available" row returned for days never written.
    #[must_use]
    pub const fn unavailable(optometrist_id: OptometristId, day_of_week: DayOfWeek) -> Self {
        Self {
            optometrist_id,
            day_of_week,
            assignment: None,
            updated_at: None,
            updated_by: None,
        }
    }

    /// Whether the optometrist works this day.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.assignment.is_some()
    }

    /// Assigned branch, if any.
    #[must_use]
    pub fn branch_id(&self) -> Option<BranchId> {
        self.assignment.map(|a| a.branch_id())
    }

    /// Shift start, if any.
    #[must_use]
    pub fn start_time(&self) -> Option<TimeOfDay> {
        self.assignment.map(|a| a.start_time())
    }

    /// Shift end, if any.
    #[must_use]
    pub fn end_time(&self) -> Option<TimeOfDay> {
        self.assignment.map(|a| a.end_time())
    }
}

/// Raw, unvalidated roster values as they arrive from callers and seed files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShiftInput {
    /// Branch, or `None` for "not available".
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    /// Shift start.
    #[serde(default)]
    pub start_time: Option<TimeOfDay>,
    /// Shift end.
    #[serde(default)]
    pub end_time: Option<TimeOfDay>,
}

impl ShiftInput {
    /// Input that marks a day as not available.
    #[must_use]
    pub const fn off() -> Self {
        Self {
            branch_id: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Input assigning a branch and hours.
    #[must_use]
    pub const fn working(branch_id: BranchId, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            branch_id: Some(branch_id),
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }

    /// Validates into an optional [`ShiftAssignment`].
    ///
    /// # Errors
    ///
    /// See [`ShiftAssignment::from_parts`].
    pub fn validate(self) -> Result<Option<ShiftAssignment>, ScheduleError> {
        ShiftAssignment::from_parts(self.branch_id, self.start_time, self.end_time)
    }
}
