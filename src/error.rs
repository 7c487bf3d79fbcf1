//! Scheduling error types with caller-facing classification.
//!
//! [`ScheduleError`] is the central error type for the crate. Each variant
//! maps to one [`ErrorKind`] and a stable numeric code, so that whatever
//! transport the caller uses (JSON API, CLI, queue) can render it without
//! matching on message text.

use serde::Serialize;

use crate::domain::{BranchId, DayOfWeek, OptometristId, RequestId, RequestStatus};

/// Caller-visible error classification.
///
/// Callers branch on the kind, never on the message:
///
/// | Kind                | Caller reaction                              |
/// |---------------------|----------------------------------------------|
/// | `Validation`        | fix the input and resubmit                   |
/// | `NotFound`          | render an empty / "no schedule" state        |
/// | `Conflict`          | show a message; the action is not repeatable |
/// | `StaleAvailability` | re-resolve and ask the user to pick again    |
/// | `Internal`          | report; not caused by the caller             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// No active optometrist, branch, roster or request for the lookup.
    NotFound,
    /// Attempted transition is not allowed from the current state.
    Conflict,
    /// A booking no longer matches freshly resolved availability.
    StaleAvailability,
    /// Startup or seed data problem.
    Internal,
}

/// Structured error payload for collaborators that serialize errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Numeric error code (see [`ScheduleError::error_code`]).
    pub code: u32,
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
}

/// Scheduling error enum.
///
/// # Error Code Ranges
///
/// | Range     | Kind              |
/// |-----------|-------------------|
/// | 1000–1999 | Validation        |
/// | 2000–2999 | Not Found         |
/// | 3000–3999 | Conflict          |
/// | 4000–4999 | Stale Availability|
/// | 5000–5999 | Internal          |
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Day-of-week number outside 1..=7.
    #[error("invalid day of week: {0} (expected 1=Monday..7=Sunday)")]
    InvalidDayOfWeek(u8),

    /// Time-of-day string could not be parsed.
    #[error("invalid time of day: {0}")]
    InvalidTime(String),

    /// Optometrist is unknown, not approved, or has no working day.
    #[error("no active schedule for optometrist {0}")]
    NoActiveOptometrist(OptometristId),

    /// No optometrist in the directory qualifies as the default one.
    #[error("no approved optometrist has a schedule configured")]
    NoScheduleConfigured,

    /// Schedule change request with the given ID was not found.
    #[error("schedule change request not found: {0}")]
    RequestNotFound(RequestId),

    /// Branch is not in the clinic directory.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    /// Request was already approved or rejected.
    #[error("schedule change request {id} has already been {status}")]
    AlreadyDecided {
        /// Request identifier.
        id: RequestId,
        /// Terminal status the request is in.
        status: RequestStatus,
    },

    /// Another proposal for the same optometrist and day is awaiting review.
    #[error("a pending request already exists for optometrist {optometrist_id} on {day_of_week}")]
    PendingRequestExists {
        /// Optometrist the proposal targets.
        optometrist_id: OptometristId,
        /// Day the proposal targets.
        day_of_week: DayOfWeek,
    },

    /// Booking selection no longer matches the current roster.
    #[error("availability changed: {0}")]
    StaleAvailability(String),

    /// Seed data could not be read or applied.
    #[error("seed error: {0}")]
    Seed(String),
}

impl ScheduleError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidDayOfWeek(_) => 1002,
            Self::InvalidTime(_) => 1003,
            Self::NoActiveOptometrist(_) => 2001,
            Self::NoScheduleConfigured => 2002,
            Self::RequestNotFound(_) => 2003,
            Self::BranchNotFound(_) => 2004,
            Self::AlreadyDecided { .. } => 3001,
            Self::PendingRequestExists { .. } => 3002,
            Self::StaleAvailability(_) => 4001,
            Self::Seed(_) => 5001,
        }
    }

    /// Returns the classification for this variant.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidDayOfWeek(_) | Self::InvalidTime(_) => {
                ErrorKind::Validation
            }
            Self::NoActiveOptometrist(_)
            | Self::NoScheduleConfigured
            | Self::RequestNotFound(_)
            | Self::BranchNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyDecided { .. } | Self::PendingRequestExists { .. } => ErrorKind::Conflict,
            Self::StaleAvailability(_) => ErrorKind::StaleAvailability,
            Self::Seed(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the same call unchanged.
    ///
    /// Always `false`: every operation is a single-shot read or write and
    /// none of these failures are transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Builds the serializable error payload.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.error_code(),
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
