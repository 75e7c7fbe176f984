//! # Event Sinks
//!
//! Sink implementations for [`RelayEvent`]s: a tracing-backed sink for
//! deployments and an in-memory sink tests can inspect.

use crate::events::RelayEvent;
use crate::ports::outbound::EventSink;
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::info;

// =============================================================================
// TRACING SINK
// =============================================================================

/// Publishes events as structured log lines with a JSON payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: RelayEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(%payload, "relay event"),
            Err(_) => info!(event = ?event, "relay event"),
        }
    }
}

// =============================================================================
// IN-MEMORY SINK
// =============================================================================

/// Collects events for test assertions.
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    events: RwLock<Vec<RelayEvent>>,
}

impl InMemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<RelayEvent> {
        self.events.read().unwrap().clone()
    }

    /// Number of events published so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// True if nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventSink for InMemoryEventSink {
    async fn publish(&self, event: RelayEvent) {
        self.events.write().unwrap().push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
