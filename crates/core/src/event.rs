//! Domain event system — decoupled communication with observers.
//!
//! Events are published as the engine moves through its graph. Dashboards,
//! audit logs, and tests can subscribe without coupling to the Loop Driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::state::StopReason;
use crate::tool::ToolName;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A Validator pass finished.
    ValidatorPassed {
        request_id: String,
        iteration: u32,
        complete: bool,
        confidence: f64,
        missing_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tool was invoked through the Registry.
    ToolInvoked {
        request_id: String,
        tool: ToolName,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// One enrichment iteration (Planner → Executor → Validator) completed.
    IterationCompleted {
        request_id: String,
        iteration: u32,
        tokens_used: u64,
        questions_open: usize,
        timestamp: DateTime<Utc>,
    },

    /// The engine reached a terminal transition.
    RequestFinished {
        request_id: String,
        stop_reason: StopReason,
        iterations: u32,
        tokens_used: u64,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Components
/// subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::ToolInvoked {
            request_id: "req-1".into(),
            tool: ToolName::FormDetect,
            success: true,
            duration_ms: 42,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::ToolInvoked { tool, success, .. } => {
                assert_eq!(*tool, ToolName::FormDetect);
                assert!(success);
            }
            _ => panic!("Expected ToolInvoked event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::RequestFinished {
            request_id: "req-1".into(),
            stop_reason: StopReason::Complete,
            iterations: 1,
            tokens_used: 1200,
            timestamp: Utc::now(),
        });
    }
}
