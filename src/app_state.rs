//! Shared scheduling state handed to whatever transport fronts the crate.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::domain::{ChangeRequestStore, ClinicDirectory, EventBus, WeeklyRosterStore};
use crate::service::{AvailabilityResolver, InMemoryLedger, ScheduleChangeCoordinator};

/// Wired-up stores and services.
///
/// The resolver and the coordinator share one [`WeeklyRosterStore`], so an
/// approval is visible to the very next resolve.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Practitioner and branch display data.
    pub directory: Arc<ClinicDirectory>,
    /// Booked slots consulted by the resolver.
    pub ledger: Arc<InMemoryLedger>,
    /// Date → slot resolution.
    pub resolver: AvailabilityResolver<InMemoryLedger>,
    /// Roster mutations and change requests.
    pub coordinator: ScheduleChangeCoordinator,
    /// Event bus for notification subscribers.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds empty stores and the services over them.
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        let roster = Arc::new(WeeklyRosterStore::new());
        let requests = Arc::new(ChangeRequestStore::new());
        let directory = Arc::new(ClinicDirectory::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let event_bus = EventBus::new(config.event_bus_capacity);

        let resolver = AvailabilityResolver::new(
            Arc::clone(&roster),
            Arc::clone(&directory),
            Arc::clone(&ledger),
            config.slot_policy,
            config.services.clone(),
        );
        let coordinator = ScheduleChangeCoordinator::new(
            roster,
            requests,
            event_bus.clone(),
            config.enforce_single_pending,
        );

        Self {
            directory,
            ledger,
            resolver,
            coordinator,
            event_bus,
        }
    }
}
