//! Insertion-ordered storage for schedule change requests.

use tokio::sync::{RwLock, RwLockWriteGuard};

use super::{DayOfWeek, OptometristId, RequestFilter, RequestId, ScheduleChangeRequest};
use crate::error::ScheduleError;

/// Request rows in submission order.
#[derive(Debug, Default)]
pub(crate) struct RequestRows {
    rows: Vec<ScheduleChangeRequest>,
}

impl RequestRows {
    pub(crate) fn push(&mut self, request: ScheduleChangeRequest) {
        self.rows.push(request);
    }

    pub(crate) fn find_mut(
        &mut self,
        id: RequestId,
    ) -> Result<&mut ScheduleChangeRequest, ScheduleError> {
        self.rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ScheduleError::RequestNotFound(id))
    }

    pub(crate) fn has_pending(&self, optometrist_id: OptometristId, day_of_week: DayOfWeek) -> bool {
        self.rows.iter().any(|r| {
            r.is_pending() && r.optometrist_id == optometrist_id && r.day_of_week == day_of_week
        })
    }
}

/// Store for [`ScheduleChangeRequest`] rows.
///
/// Rows are kept in submission order; listings sort newest first with a
/// stable sort, so requests sharing a `created_at` keep submission order.
#[derive(Debug, Default)]
pub struct ChangeRequestStore {
    rows: RwLock<RequestRows>,
}

impl ChangeRequestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access for read-modify-write sequences.
    pub(crate) async fn lock_mut(&self) -> RwLockWriteGuard<'_, RequestRows> {
        self.rows.write().await
    }

    /// Looks up one request.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::RequestNotFound`] if the id is unknown.
    pub async fn get(&self, id: RequestId) -> Result<ScheduleChangeRequest, ScheduleError> {
        self.rows
            .read()
            .await
            .rows
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(ScheduleError::RequestNotFound(id))
    }

    /// Requests matching `filter`, most recent first.
    pub async fn list(&self, filter: RequestFilter) -> Vec<ScheduleChangeRequest> {
        let mut matched: Vec<ScheduleChangeRequest> = self
            .rows
            .read()
            .await
            .rows
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }

    /// Total number of stored requests.
    pub async fn len(&self) -> usize {
        self.rows.read().await.rows.len()
    }

    /// Returns `true` if no request was ever stored.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.rows.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{ProposedChange, RequestStatus, ShiftInput};

    fn request(opt: u64, day: DayOfWeek, reason: &str) -> ProposedChange {
        ProposedChange {
            optometrist_id: OptometristId::new(opt),
            day_of_week: day,
            shift: ShiftInput::off(),
            reason: reason.to_string(),
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_with_stable_ties() {
        let store = ChangeRequestStore::new();
        let now = Utc::now();
        {
            let mut rows = store.lock_mut().await;
            rows.push(ScheduleChangeRequest::pending(
                request(1, DayOfWeek::MONDAY, "a"),
                now - Duration::minutes(5),
            ));
            rows.push(ScheduleChangeRequest::pending(request(1, DayOfWeek::SUNDAY, "b"), now));
            rows.push(ScheduleChangeRequest::pending(request(2, DayOfWeek::SUNDAY, "c"), now));
        }
        let reasons: Vec<String> = store
            .list(RequestFilter::default())
            .await
            .into_iter()
            .map(|r| r.reason)
            .collect();
        assert_eq!(reasons, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn filters_by_owner_and_status() {
        let store = ChangeRequestStore::new();
        {
            let mut rows = store.lock_mut().await;
            rows.push(ScheduleChangeRequest::pending(
                request(1, DayOfWeek::MONDAY, "a"),
                Utc::now(),
            ));
            rows.push(ScheduleChangeRequest::pending(
                request(2, DayOfWeek::MONDAY, "b"),
                Utc::now(),
            ));
        }
        let filter = RequestFilter {
            optometrist_id: Some(OptometristId::new(2)),
            status: None,
        };
        assert_eq!(store.list(filter).await.len(), 1);
        let approved = RequestFilter {
            optometrist_id: None,
            status: Some(RequestStatus::Approved),
        };
        assert!(store.list(approved).await.is_empty());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn pending_detection_is_per_slot() {
        let store = ChangeRequestStore::new();
        let mut rows = store.lock_mut().await;
        rows.push(ScheduleChangeRequest::pending(
            request(1, DayOfWeek::MONDAY, "a"),
            Utc::now(),
        ));
        assert!(rows.has_pending(OptometristId::new(1), DayOfWeek::MONDAY));
        assert!(!rows.has_pending(OptometristId::new(1), DayOfWeek::SUNDAY));
        assert!(!rows.has_pending(OptometristId::new(2), DayOfWeek::MONDAY));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = ChangeRequestStore::new();
        assert!(store.is_empty().await);
        let Err(err) = store.get(RequestId::new()).await else {
            panic!("empty store has no requests");
        };
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }
}
