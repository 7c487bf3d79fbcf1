//! Weekly roster storage with point lookup.
//!
//! [`WeeklyRosterStore`] holds one [`RosterEntry`] per
//! (optometrist, weekday). Rows are never deleted: a day that was never
//! written, or was set to "not available", reads back as
//! [`RosterEntry::unavailable`].

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use super::{BranchId, DayOfWeek, OptometristId, RosterEntry, ShiftInput};
use crate::error::ScheduleError;

/// Durable-storage stand-in for the weekly roster table.
///
/// # Concurrency
///
/// All rows sit behind one [`tokio::sync::RwLock`]. An upsert replaces a
/// whole row under the write lock, so readers observe either the previous
/// or the new row, never a mix.
#[derive(Debug, Default)]
pub struct WeeklyRosterStore {
    entries: RwLock<BTreeMap<(OptometristId, DayOfWeek), RosterEntry>>,
}

impl WeeklyRosterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for the slot, or the "not available" default.
    pub async fn get_entry(
        &self,
        optometrist_id: OptometristId,
        day_of_week: DayOfWeek,
    ) -> RosterEntry {
        self.entries
            .read()
            .await
            .get(&(optometrist_id, day_of_week))
            .cloned()
            .unwrap_or_else(|| RosterEntry::unavailable(optometrist_id, day_of_week))
    }

    /// Returns seven entries, Monday through Sunday.
    pub async fn get_full_roster(&self, optometrist_id: OptometristId) -> Vec<RosterEntry> {
        let map = self.entries.read().await;
        DayOfWeek::all()
            .map(|day| {
                map.get(&(optometrist_id, day))
                    .cloned()
                    .unwrap_or_else(|| RosterEntry::unavailable(optometrist_id, day))
            })
            .collect()
    }

    /// Replaces the entry for the slot.
    ///
    /// The previous row is overwritten unconditionally; no history is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if a branch is given without
    /// both times or with `start_time >= end_time`. The stored row is left
    /// untouched in that case.
    pub async fn upsert_entry(
        &self,
        optometrist_id: OptometristId,
        day_of_week: DayOfWeek,
        shift: ShiftInput,
    ) -> Result<RosterEntry, ScheduleError> {
        self.upsert_entry_by(optometrist_id, day_of_week, shift, None)
            .await
    }

    /// [`WeeklyRosterStore::upsert_entry`] recording the acting user on the
    /// row.
    ///
    /// # Errors
    ///
    /// Same as [`WeeklyRosterStore::upsert_entry`].
    pub async fn upsert_entry_by(
        &self,
        optometrist_id: OptometristId,
        day_of_week: DayOfWeek,
        shift: ShiftInput,
        updated_by: Option<u64>,
    ) -> Result<RosterEntry, ScheduleError> {
        let assignment = shift.validate()?;
        let entry = RosterEntry {
            optometrist_id,
            day_of_week,
            assignment,
            updated_at: Some(Utc::now()),
            updated_by,
        };
        self.entries
            .write()
            .await
            .insert((optometrist_id, day_of_week), entry.clone());

        tracing::info!(
            %optometrist_id,
            day = day_of_week.number(),
            branch_id = ?entry.branch_id().map(|b| b.get()),
            ?updated_by,
            "roster entry updated"
        );
        Ok(entry)
    }

    /// Whether the optometrist works at least one day of the week.
    pub async fn has_working_day(&self, optometrist_id: OptometristId) -> bool {
        self.entries
            .read()
            .await
            .range((optometrist_id, DayOfWeek::MONDAY)..=(optometrist_id, DayOfWeek::SUNDAY))
            .any(|(_, entry)| entry.is_available())
    }

    /// Working rows assigned to `branch_id`, ordered by optometrist and then
    /// weekday. Days off never match.
    pub async fn entries_for_branch(&self, branch_id: BranchId) -> Vec<RosterEntry> {
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.branch_id() == Some(branch_id))
            .cloned()
            .collect()
    }

    /// Optometrists with at least one stored row, ascending.
    pub async fn optometrists(&self) -> Vec<OptometristId> {
        let map = self.entries.read().await;
        let mut ids: Vec<OptometristId> = map.keys().map(|(id, _)| *id).collect();
        ids.dedup();
        ids
    }
}
