//! # Driven Ports (SPI - Outbound)
//!
//! These are the interfaces the relay depends on. External adapters implement
//! them to provide:
//! - The host protocol's flow ledger (query and mutate streams)
//! - An event sink for governance/mirroring notifications
//!
//! The host-side ledger is the single source of truth for flow rates; the
//! relay holds no flow records of its own.

use crate::domain::value_objects::{Address, FlowRate, Token};
use crate::errors::LedgerError;
use crate::events::RelayEvent;
use async_trait::async_trait;

// =============================================================================
// FLOW LEDGER (Host Protocol Dependency)
// =============================================================================

/// Interface to the host protocol's flow ledger.
///
/// `create_flow` and `update_flow` act on flows the relay itself sends, so
/// they take only the receiving endpoint; `delete_flow` addresses either
/// direction explicitly, since the relay may close inbound flows it receives.
///
/// Every method can fail adversarially - a counterparty token may revert or
/// burn gas on receipt - and callers inside callback phases must contain
/// those failures rather than let them escape.
#[async_trait]
pub trait FlowLedger: Send + Sync {
    /// Current rate between two endpoints for a token.
    ///
    /// Returns [`FlowRate::ZERO`] when no flow exists.
    async fn flow_rate(
        &self,
        token: Token,
        sender: Address,
        receiver: Address,
    ) -> Result<FlowRate, LedgerError>;

    /// Opens a flow from the relay to `receiver` at `rate`.
    async fn create_flow(
        &self,
        token: Token,
        receiver: Address,
        rate: FlowRate,
    ) -> Result<(), LedgerError>;

    /// Sets the relay's existing flow to `receiver` to `rate`.
    async fn update_flow(
        &self,
        token: Token,
        receiver: Address,
        rate: FlowRate,
    ) -> Result<(), LedgerError>;

    /// Deletes the flow between `sender` and `receiver`.
    async fn delete_flow(
        &self,
        token: Token,
        sender: Address,
        receiver: Address,
    ) -> Result<(), LedgerError>;
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Destination for relay events.
///
/// Publishing is fire-and-forget: a sink that cannot deliver must swallow the
/// problem itself, because notification failures may never surface into a
/// callback.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes one event.
    async fn publish(&self, event: RelayEvent);
}

// =============================================================================
// TESTS
// =============================================================================
