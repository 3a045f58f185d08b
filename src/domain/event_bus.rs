//! Broadcast channel for schedule events.
//!
//! The service publishes after releasing its state lock; each WebSocket
//! connection holds one receiver and filters by username.

use tokio::sync::broadcast;

use super::ScheduleEvent;

/// Fan-out of [`ScheduleEvent`]s to every live subscriber.
///
/// Receivers that fall more than `capacity` events behind lose the oldest
/// ones and observe `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ScheduleEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events (at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes one event. Returns how many receivers got it; with nobody
    /// listening the event is dropped.
    pub fn publish(&self, event: ScheduleEvent) -> usize {
        tracing::trace!(
            event = event.event_type_str(),
            title = event.title().unwrap_or_default(),
            "publishing"
        );
        self.sender.send(event).unwrap_or(0)
    }

    /// Publishes a cascade in order, e.g. the events of a user removal.
    /// Returns the total number of deliveries.
    pub fn publish_all(&self, events: impl IntoIterator<Item = ScheduleEvent>) -> usize {
        events.into_iter().map(|event| self.publish(event)).sum()
    }

    /// New receiver for all events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ScheduleEvent> {
        self.sender.subscribe()
    }
}
