//! Schedule change lifecycle: propose, approve, reject, direct update.

use std::sync::Arc;

use chrono::Utc;

use super::pagination::{Page, PaginationParams};
use crate::domain::{
    ChangeRequestStore, DayOfWeek, Decision, EventBus, OptometristId, ProposedChange,
    RequestFilter, RequestId, RequestStatus, RosterEntry, ScheduleChangeRequest, ScheduleEvent,
    ShiftInput, UpdateSource, WeeklyRosterStore,
};
use crate::error::ScheduleError;

/// Longest accepted proposal reason, in characters.
pub const MAX_REASON_LEN: usize = 1000;

/// Longest accepted administrator note, in characters.
pub const MAX_ADMIN_NOTES_LEN: usize = 1000;

/// Orchestrates roster mutations.
///
/// Optometrist proposals wait for an administrator decision; approval
/// applies the proposed values to the [`WeeklyRosterStore`]. Direct updates
/// skip the request queue entirely. Restricting direct updates to
/// administrators is the caller's job.
///
/// Every mutation follows the pattern: take the request lock → validate →
/// apply → release → emit events.
#[derive(Debug, Clone)]
pub struct ScheduleChangeCoordinator {
    roster: Arc<WeeklyRosterStore>,
    requests: Arc<ChangeRequestStore>,
    event_bus: EventBus,
    enforce_single_pending: bool,
}

impl ScheduleChangeCoordinator {
    /// Creates a coordinator.
    ///
    /// With `enforce_single_pending`, a second proposal for an
    /// (optometrist, day) that already has a pending request is refused.
    #[must_use]
    pub fn new(
        roster: Arc<WeeklyRosterStore>,
        requests: Arc<ChangeRequestStore>,
        event_bus: EventBus,
        enforce_single_pending: bool,
    ) -> Self {
        Self {
            roster,
            requests,
            event_bus,
            enforce_single_pending,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the roster store.
    #[must_use]
    pub fn roster(&self) -> &Arc<WeeklyRosterStore> {
        &self.roster
    }

    /// Records a pending change request. The roster is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for a blank or oversized reason
    /// or inconsistent times, and [`ScheduleError::PendingRequestExists`]
    /// when single-pending enforcement is on and the slot already has one.
    pub async fn propose(
        &self,
        mut change: ProposedChange,
    ) -> Result<ScheduleChangeRequest, ScheduleError> {
        change.reason = change.reason.trim().to_string();
        if change.reason.is_empty() {
            return Err(ScheduleError::Validation("a reason is required".to_string()));
        }
        if change.reason.chars().count() > MAX_REASON_LEN {
            return Err(ScheduleError::Validation(format!(
                "reason must be at most {MAX_REASON_LEN} characters"
            )));
        }
        change.shift.validate()?;

        let optometrist_id = change.optometrist_id;
        let day_of_week = change.day_of_week;

        let mut rows = self.requests.lock_mut().await;
        if self.enforce_single_pending && rows.has_pending(optometrist_id, day_of_week) {
            tracing::warn!(
                %optometrist_id,
                day = day_of_week.number(),
                "proposal refused: request already pending"
            );
            return Err(ScheduleError::PendingRequestExists {
                optometrist_id,
                day_of_week,
            });
        }
        let request = ScheduleChangeRequest::pending(change, Utc::now());
        rows.push(request.clone());
        drop(rows);

        let _ = self.event_bus.publish(ScheduleEvent::ChangeProposed {
            request_id: request.id,
            optometrist_id,
            day_of_week,
            timestamp: request.created_at,
        });

        tracing::info!(
            request_id = %request.id,
            %optometrist_id,
            day = day_of_week.number(),
            "schedule change proposed"
        );
        Ok(request)
    }

    /// Approves a pending request and applies it to the roster.
    ///
    /// The request update and the roster write happen under the request
    /// lock, so nobody observes an approved request whose values are not in
    /// the roster yet.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for oversized notes,
    /// [`ScheduleError::RequestNotFound`] for an unknown id and
    /// [`ScheduleError::AlreadyDecided`] if the request is not pending.
    pub async fn approve(
        &self,
        id: RequestId,
        decision: Decision,
    ) -> Result<ScheduleChangeRequest, ScheduleError> {
        let decision = checked_decision(decision)?;
        let mut rows = self.requests.lock_mut().await;
        let request = rows.find_mut(id)?;
        ensure_pending(request)?;

        let entry = self
            .roster
            .upsert_entry_by(
                request.optometrist_id,
                request.day_of_week,
                request.proposed,
                decision.reviewed_by,
            )
            .await?;
        let decided = record_decision(request, RequestStatus::Approved, decision);
        drop(rows);

        self.publish_roster_update(&entry, UpdateSource::ApprovedRequest);
        let _ = self.event_bus.publish(ScheduleEvent::ChangeApproved {
            request_id: decided.id,
            optometrist_id: decided.optometrist_id,
            day_of_week: decided.day_of_week,
            timestamp: decided.decided_at.unwrap_or_else(Utc::now),
        });

        tracing::info!(request_id = %id, optometrist_id = %decided.optometrist_id, "schedule change approved");
        Ok(decided)
    }

    /// Rejects a pending request. The roster is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for oversized notes,
    /// [`ScheduleError::RequestNotFound`] for an unknown id and
    /// [`ScheduleError::AlreadyDecided`] if the request is not pending.
    pub async fn reject(
        &self,
        id: RequestId,
        decision: Decision,
    ) -> Result<ScheduleChangeRequest, ScheduleError> {
        let decision = checked_decision(decision)?;
        let mut rows = self.requests.lock_mut().await;
        let request = rows.find_mut(id)?;
        ensure_pending(request)?;
        let decided = record_decision(request, RequestStatus::Rejected, decision);
        drop(rows);

        let _ = self.event_bus.publish(ScheduleEvent::ChangeRejected {
            request_id: decided.id,
            optometrist_id: decided.optometrist_id,
            day_of_week: decided.day_of_week,
            timestamp: decided.decided_at.unwrap_or_else(Utc::now),
        });

        tracing::info!(request_id = %id, optometrist_id = %decided.optometrist_id, "schedule change rejected");
        Ok(decided)
    }

    /// Administrator bypass: writes the roster immediately, creating no
    /// change request. `updated_by` is stored on the roster row.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for inconsistent times.
    pub async fn update_directly(
        &self,
        optometrist_id: OptometristId,
        day_of_week: DayOfWeek,
        shift: ShiftInput,
        updated_by: Option<u64>,
    ) -> Result<RosterEntry, ScheduleError> {
        self.write_roster(
            optometrist_id,
            day_of_week,
            shift,
            updated_by,
            UpdateSource::Direct,
        )
        .await
    }

    /// Writes a roster row from onboarding seed data.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for inconsistent times.
    pub async fn seed_entry(
        &self,
        optometrist_id: OptometristId,
        day_of_week: DayOfWeek,
        shift: ShiftInput,
    ) -> Result<RosterEntry, ScheduleError> {
        self.write_roster(optometrist_id, day_of_week, shift, None, UpdateSource::Seed)
            .await
    }

    /// Looks up one request.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RequestNotFound`] for an unknown id.
    pub async fn get_request(&self, id: RequestId) -> Result<ScheduleChangeRequest, ScheduleError> {
        self.requests.get(id).await
    }

    /// Requests matching the filter, most recent first.
    pub async fn list_requests(&self, filter: RequestFilter) -> Vec<ScheduleChangeRequest> {
        self.requests.list(filter).await
    }

    /// One page of [`ScheduleChangeCoordinator::list_requests`].
    pub async fn list_requests_page(
        &self,
        filter: RequestFilter,
        params: PaginationParams,
    ) -> Page<ScheduleChangeRequest> {
        params.paginate(self.requests.list(filter).await)
    }

    async fn write_roster(
        &self,
        optometrist_id: OptometristId,
        day_of_week: DayOfWeek,
        shift: ShiftInput,
        updated_by: Option<u64>,
        source: UpdateSource,
    ) -> Result<RosterEntry, ScheduleError> {
        let entry = self
            .roster
            .upsert_entry_by(optometrist_id, day_of_week, shift, updated_by)
            .await?;
        self.publish_roster_update(&entry, source);
        Ok(entry)
    }

    fn publish_roster_update(&self, entry: &RosterEntry, source: UpdateSource) {
        let _ = self.event_bus.publish(ScheduleEvent::RosterUpdated {
            optometrist_id: entry.optometrist_id,
            day_of_week: entry.day_of_week,
            branch_id: entry.branch_id(),
            start_time: entry.start_time(),
            end_time: entry.end_time(),
            source,
            timestamp: entry.updated_at.unwrap_or_else(Utc::now),
        });
    }
}

/// Blank notes are stored as no notes.
fn checked_decision(mut decision: Decision) -> Result<Decision, ScheduleError> {
    decision.admin_notes = decision
        .admin_notes
        .map(|notes| notes.trim().to_string())
        .filter(|notes| !notes.is_empty());
    if decision
        .admin_notes
        .as_ref()
        .is_some_and(|notes| notes.chars().count() > MAX_ADMIN_NOTES_LEN)
    {
        return Err(ScheduleError::Validation(format!(
            "admin notes must be at most {MAX_ADMIN_NOTES_LEN} characters"
        )));
    }
    Ok(decision)
}

fn ensure_pending(request: &ScheduleChangeRequest) -> Result<(), ScheduleError> {
    if request.is_pending() {
        Ok(())
    } else {
        Err(ScheduleError::AlreadyDecided {
            id: request.id,
            status: request.status,
        })
    }
}

fn record_decision(
    request: &mut ScheduleChangeRequest,
    status: RequestStatus,
    decision: Decision,
) -> ScheduleChangeRequest {
    request.status = status;
    request.admin_notes = decision.admin_notes;
    request.reviewed_by = decision.reviewed_by;
    request.decided_at = Some(Utc::now());
    request.clone()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{BranchId, TimeOfDay};
    use crate::error::ErrorKind;

    fn t(s: &str) -> TimeOfDay {
        let Ok(time) = s.parse() else {
            panic!("valid time {s}");
        };
        time
    }

    const OPT: OptometristId = OptometristId::new(3);

    fn make_coordinator(enforce: bool) -> ScheduleChangeCoordinator {
        ScheduleChangeCoordinator::new(
            Arc::new(WeeklyRosterStore::new()),
            Arc::new(ChangeRequestStore::new()),
            EventBus::new(64),
            enforce,
        )
    }

    fn proposal(day: DayOfWeek, reason: &str) -> ProposedChange {
        ProposedChange {
            optometrist_id: OPT,
            day_of_week: day,
            shift: ShiftInput::working(BranchId::new(2), t("10:00"), t("15:00")),
            reason: reason.to_string(),
        }
    }

    #[tokio::test]
    async fn propose_then_approve_updates_roster() {
        let coordinator = make_coordinator(true);
        let Ok(request) = coordinator.propose(proposal(DayOfWeek::MONDAY, "moving branch")).await
        else {
            panic!("proposal should succeed");
        };
        let before = coordinator.roster().get_entry(OPT, DayOfWeek::MONDAY).await;
        assert!(!before.is_available());

        let Ok(approved) = coordinator
            .approve(request.id, Decision::with_notes("ok"))
            .await
        else {
            panic!("approval should succeed");
        };
        assert_eq!(approved.status, RequestStatus::Approved);
        assert!(approved.decided_at.is_some());
        assert_eq!(approved.admin_notes.as_deref(), Some("ok"));

        let after = coordinator.roster().get_entry(OPT, DayOfWeek::MONDAY).await;
        assert_eq!(after.branch_id(), Some(BranchId::new(2)));
        assert_eq!(after.start_time(), Some(t("10:00")));
        assert_eq!(after.end_time(), Some(t("15:00")));
    }

    #[tokio::test]
    async fn reject_leaves_roster_unchanged() {
        let coordinator = make_coordinator(true);
        let seeded = ShiftInput::working(BranchId::new(1), t("09:00"), t("17:00"));
        let _ = coordinator.update_directly(OPT, DayOfWeek::MONDAY, seeded, None).await;
        let before = coordinator.roster().get_entry(OPT, DayOfWeek::MONDAY).await;

        let Ok(request) = coordinator.propose(proposal(DayOfWeek::MONDAY, "personal")).await else {
            panic!("proposal should succeed");
        };
        let Ok(rejected) = coordinator.reject(request.id, Decision::default()).await else {
            panic!("rejection should succeed");
        };
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert!(rejected.decided_at.is_some());

        let after = coordinator.roster().get_entry(OPT, DayOfWeek::MONDAY).await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn deciding_twice_conflicts_without_side_effects() {
        let coordinator = make_coordinator(true);
        let Ok(request) = coordinator.propose(proposal(DayOfWeek::SUNDAY, "weekend")).await else {
            panic!("proposal should succeed");
        };
        let Ok(rejected) = coordinator.reject(request.id, Decision::default()).await else {
            panic!("rejection should succeed");
        };

        let Err(err) = coordinator.approve(request.id, Decision::default()).await else {
            panic!("second decision must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let Err(err) = coordinator.reject(request.id, Decision::default()).await else {
            panic!("second decision must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let Ok(stored) = coordinator.get_request(request.id).await else {
            panic!("request still stored");
        };
        assert_eq!(stored, rejected);
        assert!(!coordinator.roster().get_entry(OPT, DayOfWeek::SUNDAY).await.is_available());
    }

    #[tokio::test]
    async fn blank_reason_and_bad_times_are_invalid() {
        let coordinator = make_coordinator(true);
        let Err(err) = coordinator.propose(proposal(DayOfWeek::MONDAY, "   ")).await else {
            panic!("blank reason must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut inverted = proposal(DayOfWeek::MONDAY, "swap hours");
        inverted.shift = ShiftInput::working(BranchId::new(2), t("15:00"), t("10:00"));
        let Err(err) = coordinator.propose(inverted).await else {
            panic!("inverted times must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Validation);

        let too_long = "x".repeat(MAX_REASON_LEN + 1);
        assert!(coordinator.propose(proposal(DayOfWeek::MONDAY, &too_long)).await.is_err());
        assert!(coordinator.list_requests(RequestFilter::default()).await.is_empty());
    }

    #[tokio::test]
    async fn second_pending_proposal_conflicts_when_enforced() {
        let coordinator = make_coordinator(true);
        let first = coordinator.propose(proposal(DayOfWeek::MONDAY, "first")).await;
        assert!(first.is_ok());
        let Err(err) = coordinator.propose(proposal(DayOfWeek::MONDAY, "second")).await else {
            panic!("second pending proposal must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        // A different day is fine.
        assert!(coordinator.propose(proposal(DayOfWeek::SUNDAY, "other")).await.is_ok());
    }

    #[tokio::test]
    async fn duplicates_allowed_when_not_enforced() {
        let coordinator = make_coordinator(false);
        assert!(coordinator.propose(proposal(DayOfWeek::MONDAY, "a")).await.is_ok());
        assert!(coordinator.propose(proposal(DayOfWeek::MONDAY, "b")).await.is_ok());
        let filter = RequestFilter {
            optometrist_id: Some(OPT),
            status: Some(RequestStatus::Pending),
        };
        assert_eq!(coordinator.list_requests(filter).await.len(), 2);
    }

    #[tokio::test]
    async fn direct_update_creates_no_request() {
        let coordinator = make_coordinator(true);
        let mut rx = coordinator.event_bus().subscribe();
        let shift = ShiftInput::working(BranchId::new(5), t("08:00"), t("12:00"));
        let result = coordinator
            .update_directly(OPT, DayOfWeek::MONDAY, shift, Some(900))
            .await;
        let Ok(entry) = result else {
            panic!("direct update should succeed");
        };
        assert_eq!(entry.updated_by, Some(900));
        assert!(coordinator.list_requests(RequestFilter::default()).await.is_empty());

        let Ok(event) = rx.recv().await else {
            panic!("expected roster event");
        };
        assert_eq!(event.event_type_str(), "roster_updated");
    }

    #[tokio::test]
    async fn approve_emits_roster_and_decision_events() {
        let coordinator = make_coordinator(true);
        let mut rx = coordinator.event_bus().subscribe();
        let Ok(request) = coordinator.propose(proposal(DayOfWeek::MONDAY, "clinic hours")).await
        else {
            panic!("proposal should succeed");
        };
        let _ = coordinator.approve(request.id, Decision::default()).await;

        let mut kinds = Vec::new();
        for _ in 0..3 {
            let Ok(event) = rx.recv().await else {
                panic!("expected event");
            };
            kinds.push(event.event_type_str());
        }
        assert_eq!(kinds, vec!["change_proposed", "roster_updated", "change_approved"]);
    }

    #[tokio::test]
    async fn oversized_notes_leave_request_pending() {
        let coordinator = make_coordinator(true);
        let Ok(request) = coordinator.propose(proposal(DayOfWeek::MONDAY, "new hours")).await
        else {
            panic!("proposal should succeed");
        };
        let long_notes = Decision::with_notes("n".repeat(MAX_ADMIN_NOTES_LEN + 1));

        let Err(err) = coordinator.approve(request.id, long_notes.clone()).await else {
            panic!("oversized notes must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        let Err(err) = coordinator.reject(request.id, long_notes).await else {
            panic!("oversized notes must fail");
        };
        assert_eq!(err.kind(), ErrorKind::Validation);

        let Ok(stored) = coordinator.get_request(request.id).await else {
            panic!("request still stored");
        };
        assert!(stored.is_pending());
        assert!(!coordinator.roster().get_entry(OPT, DayOfWeek::MONDAY).await.is_available());

        let at_limit = Decision::with_notes("n".repeat(MAX_ADMIN_NOTES_LEN));
        assert!(coordinator.reject(request.id, at_limit).await.is_ok());
    }

    #[tokio::test]
    async fn blank_notes_are_dropped() {
        let coordinator = make_coordinator(true);
        let Ok(request) = coordinator.propose(proposal(DayOfWeek::MONDAY, "new hours")).await
        else {
            panic!("proposal should succeed");
        };
        let Ok(rejected) = coordinator.reject(request.id, Decision::with_notes("  ")).await else {
            panic!("rejection should succeed");
        };
        assert_eq!(rejected.admin_notes, None);
    }

    #[tokio::test]
    async fn approval_records_reviewer_on_roster_row() {
        let coordinator = make_coordinator(true);
        let Ok(request) = coordinator.propose(proposal(DayOfWeek::MONDAY, "new hours")).await
        else {
            panic!("proposal should succeed");
        };
        let decision = Decision {
            admin_notes: None,
            reviewed_by: Some(77),
        };
        let Ok(_) = coordinator.approve(request.id, decision).await else {
            panic!("approval should succeed");
        };
        let entry = coordinator.roster().get_entry(OPT, DayOfWeek::MONDAY).await;
        assert_eq!(entry.updated_by, Some(77));
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let coordinator = make_coordinator(true);
        let Err(err) = coordinator.approve(RequestId::new(), Decision::default()).await else {
            panic!("unknown request must fail");
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn paged_listing() {
        let coordinator = make_coordinator(false);
        for reason in ["a", "b", "c"] {
            let _ = coordinator.propose(proposal(DayOfWeek::MONDAY, reason)).await;
        }
        let page = coordinator
            .list_requests_page(RequestFilter::default(), PaginationParams::new(1, 2))
            .await;
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);
    }
}
