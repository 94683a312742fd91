//! In-process notification bus backed by a `tokio::sync::broadcast` channel.

use campus_core::types::DbId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Lifecycle event kinds
// ---------------------------------------------------------------------------

pub const EVENT_SUBMITTED: &str = "event.submitted";
pub const EVENT_APPROVED: &str = "event.approved";
pub const EVENT_REJECTED: &str = "event.rejected";
pub const EVENT_ESCALATED: &str = "event.escalated";
pub const EVENT_FULL: &str = "event.full";

/// A lifecycle notification emitted by the moderation and registration
/// paths. Delivery is advisory; nothing in the core depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Dot-separated kind, e.g. `"event.approved"`.
    pub kind: String,
    pub event_id: DbId,
    pub college_id: String,
    /// Principal that triggered the transition, when there is one (the
    /// escalation sweep has no actor).
    pub actor_id: Option<String>,
    /// Kind-specific payload (title, reason, assignee, ...).
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn new(kind: impl Into<String>, event_id: DbId, college_id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            event_id,
            college_id: college_id.into(),
            actor_id: None,
            payload: serde_json::Value::Object(Default::default()),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// NotifyBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out hub shared via `Arc<NotifyBus>` across the application.
pub struct NotifyBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl NotifyBus {
    /// Create a bus with a specific channel capacity. When the buffer is
    /// full the oldest unconsumed messages are dropped and slow receivers
    /// observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers. With zero receivers
    /// the event is silently dropped; publishing never fails.
    pub fn publish(&self, event: LifecycleEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }
}

impl Default for NotifyBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
