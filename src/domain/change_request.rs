//! Proposed roster mutations awaiting an administrator decision.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DayOfWeek, OptometristId, RequestId, ShiftInput};

/// Lifecycle state of a [`ScheduleChangeRequest`].
///
/// `Pending` moves to exactly one of the two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting review.
    Pending,
    /// Approved; the roster was updated.
    Approved,
    /// Rejected; the roster was left alone.
    Rejected,
}

impl RequestStatus {
    /// Lowercase status label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// `true` for `Approved` and `Rejected`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for a new proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedChange {
    /// Optometrist asking for the change.
    pub optometrist_id: OptometristId,
    /// Weekday to change.
    pub day_of_week: DayOfWeek,
    /// New branch and hours; an empty branch asks for the day off.
    #[serde(flatten)]
    pub shift: ShiftInput,
    /// Free-text justification. Required.
    pub reason: String,
}

/// Administrator decision input shared by approve and reject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Notes shown back to the optometrist, at most 1000 characters.
    #[serde(default)]
    pub admin_notes: Option<String>,
    /// Administrator user id, when the caller knows it.
    #[serde(default)]
    pub reviewed_by: Option<u64>,
}

impl Decision {
    /// A decision carrying only notes.
    #[must_use]
    pub fn with_notes(notes: impl Into<String>) -> Self {
        Self {
            admin_notes: Some(notes.into()),
            reviewed_by: None,
        }
    }
}

/// A stored change request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleChangeRequest {
    /// Request identifier.
    pub id: RequestId,
    /// Optometrist the change applies to.
    pub optometrist_id: OptometristId,
    /// Weekday the change applies to.
    pub day_of_week: DayOfWeek,
    /// Proposed branch and hours (already validated at proposal time).
    #[serde(flatten)]
    pub proposed: ShiftInput,
    /// Optometrist's justification.
    pub reason: String,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Administrator notes recorded with the decision.
    pub admin_notes: Option<String>,
    /// Administrator who decided, if known.
    pub reviewed_by: Option<u64>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Decision time, set once.
    pub decided_at: Option<DateTime<Utc>>,
}

impl ScheduleChangeRequest {
    /// Creates a pending request from a validated proposal.
    #[must_use]
    pub fn pending(change: ProposedChange, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RequestId::new(),
            optometrist_id: change.optometrist_id,
            day_of_week: change.day_of_week,
            proposed: change.shift,
            reason: change.reason,
            status: RequestStatus::Pending,
            admin_notes: None,
            reviewed_by: None,
            created_at,
            decided_at: None,
        }
    }

    /// Whether the request is still awaiting review.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, RequestStatus::Pending)
    }
}

/// Filter for listing requests. Empty filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RequestFilter {
    /// Only requests from this optometrist.
    #[serde(default)]
    pub optometrist_id: Option<OptometristId>,
    /// Only requests in this state.
    #[serde(default)]
    pub status: Option<RequestStatus>,
}

impl RequestFilter {
    /// Returns `true` if the request passes the filter.
    #[must_use]
    pub fn matches(&self, request: &ScheduleChangeRequest) -> bool {
        self.optometrist_id
            .is_none_or(|id| id == request.optometrist_id)
            && self.status.is_none_or(|status| status == request.status)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn proposal() -> ProposedChange {
        ProposedChange {
            optometrist_id: OptometristId::new(7),
            day_of_week: DayOfWeek::MONDAY,
            shift: ShiftInput::off(),
            reason: "conference".to_string(),
        }
    }

    #[test]
    fn new_request_is_pending() {
        let request = ScheduleChangeRequest::pending(proposal(), Utc::now());
        assert!(request.is_pending());
        assert!(!request.status.is_terminal());
        assert_eq!(request.decided_at, None);
    }

    #[test]
    fn filter_combines_fields() {
        let request = ScheduleChangeRequest::pending(proposal(), Utc::now());
        assert!(RequestFilter::default().matches(&request));
        let by_owner = RequestFilter {
            optometrist_id: Some(OptometristId::new(7)),
            status: Some(RequestStatus::Pending),
        };
        assert!(by_owner.matches(&request));
        let other_status = RequestFilter {
            optometrist_id: Some(OptometristId::new(7)),
            status: Some(RequestStatus::Approved),
        };
        assert!(!other_status.matches(&request));
    }

    #[test]
    fn serializes_flat_with_status_label() {
        let request = ScheduleChangeRequest::pending(proposal(), Utc::now());
        let json = serde_json::to_string(&request).unwrap_or_default();
        assert!(json.contains("\"status\":\"pending\""));
        assert!(json.contains("\"branch_id\":null"));
        assert!(json.contains("\"day_of_week\":1"));
    }
}
