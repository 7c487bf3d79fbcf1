//! Domain layer: roster and request types, storage, and the event system.
//!
//! This module contains the scheduling domain model: identifiers, ISO
//! weekdays, canonical times of day, roster rows and change requests, the
//! stores that hold them, the practitioner/branch directory used for
//! display, and the event bus that broadcasts every mutation.

pub mod change_request;
pub mod directory;
pub mod event_bus;
pub mod ids;
pub mod request_store;
pub mod roster_entry;
pub mod roster_store;
pub mod schedule_event;
pub mod time_of_day;
pub mod weekday;

pub use change_request::{
    Decision, ProposedChange, RequestFilter, RequestStatus, ScheduleChangeRequest,
};
pub use directory::{Branch, ClinicDirectory, Optometrist};
pub use event_bus::{EventBus, OptometristFeed};
pub use ids::{BranchId, OptometristId, RequestId};
pub use request_store::ChangeRequestStore;
pub use roster_entry::{RosterEntry, ShiftAssignment, ShiftInput};
pub use roster_store::WeeklyRosterStore;
pub use schedule_event::{ScheduleEvent, UpdateSource};
pub use time_of_day::TimeOfDay;
pub use weekday::DayOfWeek;
