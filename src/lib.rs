//! # clinic-roster
//!
//! Weekly optometrist roster, date availability resolution, and
//! schedule-change approval for multi-branch optical clinics.
//!
//! Weekdays are numbered ISO style everywhere: 1 = Monday .. 7 = Sunday.
//! Times of day are carried as canonical 24-hour values; 12-hour labels
//! are display output only.
//!
//! ## Architecture
//!
//! ```text
//! Callers (booking form, admin queue, dashboards)
//!     │
//!     ├── AvailabilityResolver (service/)   resolve / resolve_week / confirm_selection
//!     ├── ScheduleChangeCoordinator (service/)   propose / approve / reject / update_directly
//!     │
//!     ├── WeeklyRosterStore, ChangeRequestStore (domain/)
//!     ├── ClinicDirectory, AppointmentLedger
//!     │
//!     └── EventBus → notification subscribers
//! ```

pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod seed;
pub mod service;
pub mod telemetry;
