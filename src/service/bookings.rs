//! Already-booked slots consulted when resolving availability.
//!
//! Appointments are created and stored by another service. The resolver
//! only needs to know which slot start times are taken for an optometrist
//! on a date, which is what [`AppointmentLedger`] answers.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::future::Future;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::{OptometristId, TimeOfDay};

/// Source of booked slot start times.
///
/// Implementations must be read-only from the resolver's point of view:
/// calling `booked_starts` never changes what a later call returns.
pub trait AppointmentLedger: Debug + Send + Sync {
    /// Start times of scheduled or confirmed appointments for the
    /// optometrist on `date`.
    fn booked_starts(
        &self,
        optometrist_id: OptometristId,
        date: NaiveDate,
    ) -> impl Future<Output = BTreeSet<TimeOfDay>> + Send;
}

/// In-memory ledger, empty by default.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    booked: RwLock<HashMap<(OptometristId, NaiveDate), BTreeSet<TimeOfDay>>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a slot as taken. Returns `false` if it already was.
    pub async fn book(&self, optometrist_id: OptometristId, date: NaiveDate, start: TimeOfDay) -> bool {
        self.booked
            .write()
            .await
            .entry((optometrist_id, date))
            .or_default()
            .insert(start)
    }

    /// Frees a slot. Returns `false` if it was not taken.
    pub async fn cancel(
        &self,
        optometrist_id: OptometristId,
        date: NaiveDate,
        start: TimeOfDay,
    ) -> bool {
        let mut map = self.booked.write().await;
        let Some(starts) = map.get_mut(&(optometrist_id, date)) else {
            return false;
        };
        let removed = starts.remove(&start);
        if starts.is_empty() {
            map.remove(&(optometrist_id, date));
        }
        removed
    }
}

impl AppointmentLedger for InMemoryLedger {
    async fn booked_starts(
        &self,
        optometrist_id: OptometristId,
        date: NaiveDate,
    ) -> BTreeSet<TimeOfDay> {
        self.booked
            .read()
            .await
            .get(&(optometrist_id, date))
            .cloned()
            .unwrap_or_default()
    }
}
