//! Date → bookable-slot resolution.
//!
//! [`AvailabilityResolver`] maps a calendar date to the optometrist's roster
//! row for that ISO weekday and materializes the bookable slots. Every
//! method here is a pure read: resolving twice without an intervening
//! roster or ledger change yields equal results, which is what makes
//! [`AvailabilityResolver::confirm_selection`] a valid staleness check.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::bookings::{AppointmentLedger, InMemoryLedger};
use super::slot_policy::{ServiceCatalog, SlotPolicy};
use crate::domain::{
    BranchId, ClinicDirectory, DayOfWeek, Optometrist, OptometristId, RosterEntry, TimeOfDay,
    WeeklyRosterStore,
};
use crate::error::ScheduleError;

/// One bookable slot.
///
/// `time` is the canonical value submitted back on booking; `label` is a
/// display projection of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    /// Canonical 24-hour start time.
    pub time: TimeOfDay,
    /// 12-hour label, e.g. `"9:00 AM"`.
    pub label: String,
}

impl From<TimeOfDay> for TimeSlot {
    fn from(time: TimeOfDay) -> Self {
        Self {
            label: time.display_12h(),
            time,
        }
    }
}

/// Denormalized branch fields for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchRef {
    /// Branch id.
    pub id: BranchId,
    /// Branch name.
    pub name: String,
    /// Branch code.
    pub code: String,
    /// Branch address.
    pub address: String,
}

/// Denormalized optometrist fields for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptometristRef {
    /// Optometrist id.
    pub id: OptometristId,
    /// Display name.
    pub name: String,
}

impl From<&Optometrist> for OptometristRef {
    fn from(o: &Optometrist) -> Self {
        Self {
            id: o.id,
            name: o.name.clone(),
        }
    }
}

/// Availability answer for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityResult {
    /// Requested date.
    pub date: NaiveDate,
    /// ISO weekday of `date`.
    pub day_of_week: DayOfWeek,
    /// Whether any booking is possible on the roster for this day.
    pub available: bool,
    /// Optometrist the answer is for.
    pub optometrist: OptometristRef,
    /// Branch worked that day.
    pub branch: Option<BranchRef>,
    /// Shift start.
    pub start_time: Option<TimeOfDay>,
    /// Shift end.
    pub end_time: Option<TimeOfDay>,
    /// Free slots, ascending.
    pub available_times: Vec<TimeSlot>,
    /// Services that fit in one slot. Empty when unavailable.
    pub services: Vec<String>,
}

impl AvailabilityResult {
    /// Start times of the free slots.
    pub fn slot_times(&self) -> impl Iterator<Item = TimeOfDay> + '_ {
        self.available_times.iter().map(|s| s.time)
    }

    /// Builds the booking payload for one of the offered slots.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if the day is unavailable or
    /// `slot` is not one of the offered start times.
    pub fn select(&self, slot: TimeOfDay) -> Result<BookingSelection, ScheduleError> {
        let (Some(branch), Some(shift_start), Some(shift_end)) =
            (&self.branch, self.start_time, self.end_time)
        else {
            return Err(ScheduleError::Validation(format!(
                "{} is not bookable",
                self.date
            )));
        };
        if !self.slot_times().any(|t| t == slot) {
            return Err(ScheduleError::Validation(format!(
                "{slot} is not an offered slot on {}",
                self.date
            )));
        }
        Ok(BookingSelection {
            date: self.date,
            optometrist_id: self.optometrist.id,
            branch_id: branch.id,
            slot,
            shift_start,
            shift_end,
        })
    }
}

/// What a customer picked from a previous resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct BookingSelection {
    /// Appointment date.
    pub date: NaiveDate,
    /// Optometrist from the resolution.
    pub optometrist_id: OptometristId,
    /// Branch from the resolution.
    pub branch_id: BranchId,
    /// Chosen slot start.
    pub slot: TimeOfDay,
    /// Shift start seen at resolution time.
    pub shift_start: TimeOfDay,
    /// Shift end seen at resolution time.
    pub shift_end: TimeOfDay,
}

/// A selection that still matches the current roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedSlot {
    /// Appointment date.
    pub date: NaiveDate,
    /// Optometrist.
    pub optometrist_id: OptometristId,
    /// Branch.
    pub branch_id: BranchId,
    /// Appointment start.
    pub start_time: TimeOfDay,
    /// Appointment end (start plus slot length).
    pub end_time: TimeOfDay,
}

/// One day of the weekly overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    /// ISO weekday.
    pub day_of_week: DayOfWeek,
    /// Day name.
    pub day_name: &'static str,
    /// Whether the optometrist works this day.
    pub available: bool,
    /// Branch worked.
    pub branch: Option<BranchRef>,
    /// Shift start as a 12-hour label.
    pub start_label: Option<String>,
    /// Shift end as a 12-hour label.
    pub end_label: Option<String>,
}

/// An optometrist's full week, for the weekly schedule view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyOverview {
    /// Optometrist.
    pub optometrist: OptometristRef,
    /// Monday..Sunday.
    pub days: Vec<DaySchedule>,
}

/// Who works at one branch, for the branch staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchOverview {
    /// Branch.
    pub branch: BranchRef,
    /// One entry per optometrist, ascending by id. `days` lists only the
    /// weekdays worked at this branch.
    pub staff: Vec<WeeklyOverview>,
}

/// Resolves dates against the weekly roster.
#[derive(Debug)]
pub struct AvailabilityResolver<L = InMemoryLedger> {
    roster: Arc<WeeklyRosterStore>,
    directory: Arc<ClinicDirectory>,
    ledger: Arc<L>,
    policy: SlotPolicy,
    catalog: ServiceCatalog,
}

impl<L> Clone for AvailabilityResolver<L> {
    fn clone(&self) -> Self {
        Self {
            roster: Arc::clone(&self.roster),
            directory: Arc::clone(&self.directory),
            ledger: Arc::clone(&self.ledger),
            policy: self.policy,
            catalog: self.catalog.clone(),
        }
    }
}

impl<L: AppointmentLedger> AvailabilityResolver<L> {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        roster: Arc<WeeklyRosterStore>,
        directory: Arc<ClinicDirectory>,
        ledger: Arc<L>,
        policy: SlotPolicy,
        catalog: ServiceCatalog,
    ) -> Self {
        Self {
            roster,
            directory,
            ledger,
            policy,
            catalog,
        }
    }

    /// Returns the slot policy in use.
    #[must_use]
    pub const fn policy(&self) -> SlotPolicy {
        self.policy
    }

    /// Resolves one date for one optometrist.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoActiveOptometrist`] if the optometrist is
    /// unknown, not approved, or has no working day in the roster.
    pub async fn resolve(
        &self,
        date: NaiveDate,
        optometrist_id: OptometristId,
    ) -> Result<AvailabilityResult, ScheduleError> {
        let (optometrist, roster) = self.active_roster(optometrist_id).await?;
        let day = DayOfWeek::from_date(date);
        let entry = entry_for(&roster, optometrist_id, day);
        let result = self.materialize(date, &optometrist, &entry).await;
        tracing::debug!(
            %optometrist_id,
            %date,
            day = day.number(),
            available = result.available,
            slots = result.available_times.len(),
            "resolved availability"
        );
        Ok(result)
    }

    /// Resolves the seven days (Monday..Sunday) of the ISO week containing
    /// `date`, all from one roster snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`AvailabilityResolver::resolve`].
    pub async fn resolve_week(
        &self,
        date: NaiveDate,
        optometrist_id: OptometristId,
    ) -> Result<Vec<AvailabilityResult>, ScheduleError> {
        let (optometrist, roster) = self.active_roster(optometrist_id).await?;
        let mut week = Vec::with_capacity(7);
        for day_date in DayOfWeek::week_of(date) {
            let entry = entry_for(&roster, optometrist_id, DayOfWeek::from_date(day_date));
            week.push(self.materialize(day_date, &optometrist, &entry).await);
        }
        Ok(week)
    }

    /// Re-resolves a customer's selection just before the booking is
    /// written. `today` is the caller's current local date.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if `selection.date` is before
    /// `today`. Returns [`ScheduleError::StaleAvailability`] if the
    /// optometrist is no longer active, the day is no longer worked, the
    /// branch or shift hours changed, or the slot is no longer free.
    pub async fn confirm_selection(
        &self,
        selection: &BookingSelection,
        today: NaiveDate,
    ) -> Result<ConfirmedSlot, ScheduleError> {
        if selection.date < today {
            tracing::warn!(
                optometrist_id = %selection.optometrist_id,
                date = %selection.date,
                %today,
                "booking selection is in the past"
            );
            return Err(ScheduleError::Validation(format!(
                "appointment date {} is before today ({today})",
                selection.date
            )));
        }
        let fresh = match self.resolve(selection.date, selection.optometrist_id).await {
            Ok(fresh) => fresh,
            Err(err) => return Err(stale(selection, &err.to_string())),
        };
        if !fresh.available {
            return Err(stale(selection, "the optometrist no longer works this day"));
        }
        if fresh.branch.as_ref().map(|b| b.id) != Some(selection.branch_id) {
            return Err(stale(selection, "the branch for this day has changed"));
        }
        if fresh.start_time != Some(selection.shift_start)
            || fresh.end_time != Some(selection.shift_end)
        {
            return Err(stale(selection, "the working hours for this day have changed"));
        }
        if !fresh.slot_times().any(|t| t == selection.slot) {
            return Err(stale(selection, "the selected time is no longer available"));
        }
        let end_time = selection
            .slot
            .checked_add_minutes(self.policy.slot_minutes())
            .ok_or_else(|| stale(selection, "the selected time no longer fits the slot length"))?;
        Ok(ConfirmedSlot {
            date: selection.date,
            optometrist_id: selection.optometrist_id,
            branch_id: selection.branch_id,
            start_time: selection.slot,
            end_time,
        })
    }

    /// First approved optometrist (lowest id) with at least one working
    /// day. Convenience for single-practitioner deployments.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoScheduleConfigured`] if nobody qualifies.
    pub async fn default_optometrist(&self) -> Result<Optometrist, ScheduleError> {
        for optometrist in self.directory.approved_optometrists().await {
            if self.roster.has_working_day(optometrist.id).await {
                return Ok(optometrist);
            }
        }
        Err(ScheduleError::NoScheduleConfigured)
    }

    /// Weekly roster of every approved optometrist with a working day.
    pub async fn weekly_overview(&self) -> Vec<WeeklyOverview> {
        let mut overview = Vec::new();
        for optometrist in self.directory.approved_optometrists().await {
            let roster = self.roster.get_full_roster(optometrist.id).await;
            if !roster.iter().any(RosterEntry::is_available) {
                continue;
            }
            let mut days = Vec::with_capacity(roster.len());
            for entry in &roster {
                let branch = self.branch_ref(entry).await;
                days.push(day_schedule(entry, branch));
            }
            overview.push(WeeklyOverview {
                optometrist: OptometristRef::from(&optometrist),
                days,
            });
        }
        overview
    }

    /// Working days at one branch, grouped by optometrist and ordered by
    /// optometrist then weekday. Approval status is not filtered; an
    /// optometrist missing from the directory is shown by id.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::BranchNotFound`] if the branch is not in
    /// the directory.
    pub async fn branch_overview(
        &self,
        branch_id: BranchId,
    ) -> Result<BranchOverview, ScheduleError> {
        let branch = self
            .directory
            .branch(branch_id)
            .await
            .ok_or(ScheduleError::BranchNotFound(branch_id))?;
        let branch = BranchRef {
            id: branch_id,
            name: branch.name,
            code: branch.code,
            address: branch.address,
        };

        let mut staff: Vec<WeeklyOverview> = Vec::new();
        for entry in self.roster.entries_for_branch(branch_id).await {
            let day = day_schedule(&entry, Some(branch.clone()));
            match staff.last_mut() {
                Some(last) if last.optometrist.id == entry.optometrist_id => last.days.push(day),
                _ => {
                    let optometrist = match self.directory.optometrist(entry.optometrist_id).await
                    {
                        Some(o) => OptometristRef::from(&o),
                        None => OptometristRef {
                            id: entry.optometrist_id,
                            name: format!("Optometrist {}", entry.optometrist_id),
                        },
                    };
                    staff.push(WeeklyOverview {
                        optometrist,
                        days: vec![day],
                    });
                }
            }
        }
        tracing::debug!(%branch_id, staff = staff.len(), "built branch overview");
        Ok(BranchOverview { branch, staff })
    }

    async fn active_roster(
        &self,
        optometrist_id: OptometristId,
    ) -> Result<(Optometrist, Vec<RosterEntry>), ScheduleError> {
        let optometrist = self
            .directory
            .optometrist(optometrist_id)
            .await
            .filter(|o| o.is_approved)
            .ok_or(ScheduleError::NoActiveOptometrist(optometrist_id))?;
        let roster = self.roster.get_full_roster(optometrist_id).await;
        if !roster.iter().any(RosterEntry::is_available) {
            return Err(ScheduleError::NoActiveOptometrist(optometrist_id));
        }
        Ok((optometrist, roster))
    }

    async fn materialize(
        &self,
        date: NaiveDate,
        optometrist: &Optometrist,
        entry: &RosterEntry,
    ) -> AvailabilityResult {
        let day_of_week = DayOfWeek::from_date(date);
        let Some(shift) = entry.assignment else {
            return AvailabilityResult {
                date,
                day_of_week,
                available: false,
                optometrist: OptometristRef::from(optometrist),
                branch: None,
                start_time: None,
                end_time: None,
                available_times: Vec::new(),
                services: Vec::new(),
            };
        };
        let booked = self.ledger.booked_starts(optometrist.id, date).await;
        let available_times = self
            .policy
            .slot_starts(&shift)
            .into_iter()
            .filter(|start| !booked.contains(start))
            .map(TimeSlot::from)
            .collect();
        AvailabilityResult {
            date,
            day_of_week,
            available: true,
            optometrist: OptometristRef::from(optometrist),
            branch: self.branch_ref(entry).await,
            start_time: Some(shift.start_time()),
            end_time: Some(shift.end_time()),
            available_times,
            services: self.catalog.labels_for(self.policy),
        }
    }

    async fn branch_ref(&self, entry: &RosterEntry) -> Option<BranchRef> {
        let id = entry.branch_id()?;
        let branch = self.directory.branch(id).await;
        Some(match branch {
            Some(b) => BranchRef {
                id,
                name: b.name,
                code: b.code,
                address: b.address,
            },
            None => BranchRef {
                id,
                name: format!("Branch {id}"),
                code: String::new(),
                address: String::new(),
            },
        })
    }
}

fn entry_for(roster: &[RosterEntry], optometrist_id: OptometristId, day: DayOfWeek) -> RosterEntry {
    roster
        .iter()
        .find(|e| e.day_of_week == day)
        .cloned()
        .unwrap_or_else(|| RosterEntry::unavailable(optometrist_id, day))
}

fn day_schedule(entry: &RosterEntry, branch: Option<BranchRef>) -> DaySchedule {
    DaySchedule {
        day_of_week: entry.day_of_week,
        day_name: entry.day_of_week.name(),
        available: entry.is_available(),
        branch,
        start_label: entry.start_time().map(TimeOfDay::display_12h),
        end_label: entry.end_time().map(TimeOfDay::display_12h),
    }
}

fn stale(selection: &BookingSelection, why: &str) -> ScheduleError {
    tracing::warn!(
        optometrist_id = %selection.optometrist_id,
        date = %selection.date,
        slot = %selection.slot,
        why,
        "booking selection is stale"
    );
    ScheduleError::StaleAvailability(format!(
        "{} at {} on {}: {why}",
        selection.optometrist_id, selection.slot, selection.date
    ))
}
