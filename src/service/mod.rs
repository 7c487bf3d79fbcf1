//! Service layer: availability resolution and change orchestration.
//!
//! [`AvailabilityResolver`] answers "who is bookable when" from the roster;
//! [`ScheduleChangeCoordinator`] owns every roster mutation and emits
//! events through the [`crate::domain::EventBus`].

pub mod availability;
pub mod bookings;
pub mod change_coordinator;
pub mod pagination;
pub mod slot_policy;

pub use availability::{
    AvailabilityResolver, AvailabilityResult, BookingSelection, BranchOverview, BranchRef,
    ConfirmedSlot, DaySchedule, OptometristRef, TimeSlot, WeeklyOverview,
};
pub use bookings::{AppointmentLedger, InMemoryLedger};
pub use change_coordinator::ScheduleChangeCoordinator;
pub use pagination::{Page, PaginationMeta, PaginationParams};
pub use slot_policy::{ServiceCatalog, ServiceOffering, SlotPolicy};
