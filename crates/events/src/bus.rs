//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Shared as `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use companion_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Something that happened on the platform.
///
/// Built with [`PlatformEvent::new`] plus the `with_*` builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// See [`crate::names`].
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    /// Account that triggered the event, if any.
    pub actor_account_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_account_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, account_id: DbId) -> Self {
        self.actor_account_id = Some(account_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out bus: every subscriber receives every event.
///
/// ```rust
/// use companion_events::bus::{EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// bus.publish(PlatformEvent::new("account.created"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers see `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when there are none.
    pub fn publish(&self, event: PlatformEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;

    #[tokio::test]
    async fn subscriber_receives_enriched_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new(names::CONTENT_UNLOCKED)
                .with_source("companion", 3)
                .with_actor(9)
                .with_payload(serde_json::json!({ "item_id": "saree", "cost": 50 })),
        );

        let received = rx.recv().await.expect("event delivered");
        assert_eq!(received.event_type, "content.unlocked");
        assert_eq!(received.source_entity_type.as_deref(), Some("companion"));
        assert_eq!(received.source_entity_id, Some(3));
        assert_eq!(received.actor_account_id, Some(9));
        assert_eq!(received.payload["cost"], 50);
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::new(names::PAYMENT_SUBMITTED));

        assert_eq!(rx1.recv().await.unwrap().event_type, "payment.submitted");
        assert_eq!(rx2.recv().await.unwrap().event_type, "payment.submitted");
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new(names::ACCOUNT_CREATED));
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.publish(PlatformEvent::new(names::COMPANION_UPDATED));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
    }
}
