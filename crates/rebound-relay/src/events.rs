//! # Relay Events
//!
//! Notification payloads published through the [`EventSink`] outbound port
//! whenever the relay mirrors, drops, or re-governs something. Sinks decide
//! transport; delivery failure never surfaces into a callback.
//!
//! [`EventSink`]: crate::ports::outbound::EventSink

use crate::domain::value_objects::{Address, FlowRate, Token};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// EVENT PAYLOADS
// =============================================================================

/// Everything the relay announces to the outside world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayEvent {
    /// An outbound mirror was established or adjusted.
    FlowMirrored {
        /// Token being mirrored.
        token: Token,
        /// Counterparty whose inbound flow is mirrored.
        counterparty: Address,
        /// Rate the mirror now runs at.
        rate: FlowRate,
    },

    /// A mirror (or its inbound pair) was torn down.
    FlowUnmirrored {
        /// Token of the closed pair.
        token: Token,
        /// Counterparty of the closed pair.
        counterparty: Address,
    },

    /// A host-facing call failed inside a callback and was contained.
    MirrorDropped {
        /// Token involved.
        token: Token,
        /// Counterparty involved.
        counterparty: Address,
        /// Description of the contained failure.
        reason: String,
    },

    /// The allow-list was updated in one atomic batch.
    AllowListUpdated {
        /// Applied `(token, status)` pairs, in input order.
        entries: Vec<(Token, bool)>,
    },

    /// The lock flag changed.
    LockChanged {
        /// New flag value.
        locked: bool,
    },

    /// The rarity table was replaced.
    RarityReconfigured {
        /// New weights, parts-per-thousand.
        weights: [u16; 6],
    },

    /// An emergency sweep finished.
    EmergencySweepCompleted {
        /// Correlation ID shared with the sweep's log lines.
        sweep_id: Uuid,
        /// Pairs requested.
        pairs: usize,
        /// Flow directions actually closed.
        closed: usize,
        /// Failures contained along the way.
        contained: usize,
    },

    /// Ownership moved to a new admin.
    OwnershipTransferred {
        /// Previous owner.
        previous: Address,
        /// New owner.
        new_owner: Address,
    },
}

// =============================================================================
// TESTS
// =============================================================================
