//! In-memory event bus implementation.
//!
//! Captures every published envelope in order. Tests assert on the capture;
//! embedding callers can drain it after each command.

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventPublisher;

/// In-memory event bus.
///
/// Features:
/// - Synchronous, ordered capture (deterministic for tests)
/// - Query helpers for assertions
///
/// A poisoned lock is recovered rather than propagated; the capture is a
/// plain `Vec` that a panicking writer cannot leave half-updated.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.publish(envelope).await?;
///
/// assert_eq!(bus.event_count(), 1);
/// assert!(bus.has_event("group.activated.v1"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns events for a specific aggregate.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    /// Removes and returns everything captured so far.
    pub fn drain(&self) -> Vec<EventEnvelope> {
        std::mem::take(&mut *self.published.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Clears all published events (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns count of published events.
    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Checks if a specific event type was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::{CycleStatus, CycleStatusChanged};
    use crate::domain::foundation::{CycleId, EventId, GroupId, SerializableDomainEvent, Timestamp};

    fn status_changed(cycle_id: CycleId) -> EventEnvelope {
        CycleStatusChanged {
            event_id: EventId::new(),
            cycle_id,
            group_id: GroupId::new(),
            cycle_number: 1,
            from: CycleStatus::Upcoming,
            to: CycleStatus::Open,
            occurred_at: Timestamp::now(),
        }
        .to_envelope()
        .unwrap()
    }

    #[tokio::test]
    async fn publish_captures_event() {
        let bus = InMemoryEventBus::new();
        bus.publish(status_changed(CycleId::new())).await.unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event("cycle.status_changed.v1"));
        assert!(!bus.has_event("group.activated.v1"));
    }

    #[tokio::test]
    async fn publish_all_keeps_order() {
        let bus = InMemoryEventBus::new();
        let first = CycleId::new();
        let second = CycleId::new();

        bus.publish_all(vec![status_changed(first), status_changed(second)])
            .await
            .unwrap();

        let events = bus.published_events();
        assert_eq!(events[0].aggregate_id, first.to_string());
        assert_eq!(events[1].aggregate_id, second.to_string());
        assert_eq!(bus.events_for_aggregate(&second.to_string()).len(), 1);
    }

    #[tokio::test]
    async fn drain_empties_the_capture() {
        let bus = InMemoryEventBus::new();
        bus.publish(status_changed(CycleId::new())).await.unwrap();

        assert_eq!(bus.drain().len(), 1);
        assert_eq!(bus.event_count(), 0);
    }
}
