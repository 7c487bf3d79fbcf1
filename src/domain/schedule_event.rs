//! Domain events reflecting roster and request mutations.
//!
//! Every state change emits a [`ScheduleEvent`] through the
//! [`super::EventBus`]. Notification delivery (mail, server-sent events)
//! subscribes to the bus; nothing in this crate depends on a subscriber
//! being present.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{BranchId, DayOfWeek, OptometristId, RequestId, TimeOfDay};

/// Who caused a roster update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSource {
    /// Administrator edited the roster directly.
    Direct,
    /// An approved change request was applied.
    ApprovedRequest,
    /// Seed data loaded at onboarding.
    Seed,
}

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ScheduleEvent {
    /// A roster row was replaced.
    RosterUpdated {
        /// Optometrist whose roster changed.
        optometrist_id: OptometristId,
        /// Weekday that changed.
        day_of_week: DayOfWeek,
        /// New branch, `None` when the day was cleared.
        branch_id: Option<BranchId>,
        /// New shift start.
        start_time: Option<TimeOfDay>,
        /// New shift end.
        end_time: Option<TimeOfDay>,
        /// What triggered the update.
        source: UpdateSource,
        /// Update timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An optometrist submitted a change request.
    ChangeProposed {
        /// Request identifier.
        request_id: RequestId,
        /// Requesting optometrist.
        optometrist_id: OptometristId,
        /// Weekday the request targets.
        day_of_week: DayOfWeek,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A change request was approved and applied.
    ChangeApproved {
        /// Request identifier.
        request_id: RequestId,
        /// Requesting optometrist.
        optometrist_id: OptometristId,
        /// Weekday the request targets.
        day_of_week: DayOfWeek,
        /// Decision timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A change request was rejected.
    ChangeRejected {
        /// Request identifier.
        request_id: RequestId,
        /// Requesting optometrist.
        optometrist_id: OptometristId,
        /// Weekday the request targets.
        day_of_week: DayOfWeek,
        /// Decision timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ScheduleEvent {
    /// Returns the optometrist associated with this event.
    #[must_use]
    pub const fn optometrist_id(&self) -> OptometristId {
        match self {
            Self::RosterUpdated { optometrist_id, .. }
            | Self::ChangeProposed { optometrist_id, .. }
            | Self::ChangeApproved { optometrist_id, .. }
            | Self::ChangeRejected { optometrist_id, .. } => *optometrist_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RosterUpdated { .. } => "roster_updated",
            Self::ChangeProposed { .. } => "change_proposed",
            Self::ChangeApproved { .. } => "change_approved",
            Self::ChangeRejected { .. } => "change_rejected",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn roster_updated_serializes_with_tag() {
        let event = ScheduleEvent::RosterUpdated {
            optometrist_id: OptometristId::new(3),
            day_of_week: DayOfWeek::SUNDAY,
            branch_id: None,
            start_time: None,
            end_time: None,
            source: UpdateSource::Direct,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"roster_updated\""));
        assert!(json.contains("\"day_of_week\":7"));
        assert!(json.contains("\"source\":\"direct\""));
    }

    #[test]
    fn accessors() {
        let event = ScheduleEvent::ChangeRejected {
            request_id: RequestId::new(),
            optometrist_id: OptometristId::new(8),
            day_of_week: DayOfWeek::MONDAY,
            timestamp: Utc::now(),
        };
        assert_eq!(event.optometrist_id(), OptometristId::new(8));
        assert_eq!(event.event_type_str(), "change_rejected");
    }
}
