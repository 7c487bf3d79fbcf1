//! Broadcast channel for schedule events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every roster
//! write and request transition publishes a [`ScheduleEvent`]. Admin
//! dashboards subscribe to everything; an optometrist's notification
//! worker uses [`EventBus::subscribe_optometrist`] to hear only about
//! their own roster and requests.

use tokio::sync::broadcast;

use super::{OptometristId, ScheduleEvent};

/// Broadcast bus for [`ScheduleEvent`]s.
///
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers. Publishing never blocks the caller.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ScheduleEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: ScheduleEvent) -> usize {
        tracing::debug!(event_type = event.event_type_str(), "publishing schedule event");
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ScheduleEvent> {
        self.sender.subscribe()
    }

    /// Creates a receiver that yields only events about `optometrist_id`.
    #[must_use]
    pub fn subscribe_optometrist(&self, optometrist_id: OptometristId) -> OptometristFeed {
        OptometristFeed {
            optometrist_id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One optometrist's slice of the event stream.
///
/// Events that were overwritten before this feed read them are skipped
/// with a warning; the roster itself is the source of truth.
#[derive(Debug)]
pub struct OptometristFeed {
    optometrist_id: OptometristId,
    receiver: broadcast::Receiver<ScheduleEvent>,
}

impl OptometristFeed {
    /// Optometrist this feed follows.
    #[must_use]
    pub const fn optometrist_id(&self) -> OptometristId {
        self.optometrist_id
    }

    /// Waits for the next event about this optometrist.
    ///
    /// Returns `None` once every [`EventBus`] handle has been dropped.
    pub async fn recv(&mut self) -> Option<ScheduleEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.optometrist_id() == self.optometrist_id => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        optometrist_id = %self.optometrist_id,
                        skipped,
                        "schedule feed lagged, events dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
