//! # Core Domain Entities
//!
//! Main business entities for the flow-mirroring relay.
//!
//! The relay deliberately owns no flow records: the host ledger is the single
//! source of truth for rates, and the only durable state here is governance
//! data ([`GovernanceState`]).

use crate::domain::value_objects::{Address, FlowRate, RarityTable, Token};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// GOVERNANCE STATE
// =============================================================================

/// The relay's durable state: owner identity, lock flag, token allow-list,
/// and the rarity weight table.
///
/// Constructed once at initialization and owned exclusively by the service
/// behind a single lock; all mutation is owner-gated, all reads unrestricted.
#[derive(Clone, Debug)]
pub struct GovernanceState {
    /// Admin identity. Changes only via an explicit ownership transfer.
    pub owner: Address,
    /// When true, creation of new mirrored flows is rejected. Updates and
    /// terminations on already-open flows stay permitted.
    pub locked: bool,
    /// Tokens the relay will mirror. Entries are created on first write and
    /// only ever toggled, never removed.
    pub allow_list: HashMap<Token, bool>,
    /// Weight table consumed by the rarity randomizer.
    pub rarity: RarityTable,
}

impl GovernanceState {
    /// Creates the initial state: unlocked, empty allow-list, default rarity
    /// table.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            locked: false,
            allow_list: HashMap::new(),
            rarity: RarityTable::DEFAULT,
        }
    }

    /// Returns true if the token is currently allow-listed.
    ///
    /// Tokens never written to the allow-list are disallowed.
    #[must_use]
    pub fn is_allowed(&self, token: Token) -> bool {
        self.allow_list.get(&token).copied().unwrap_or(false)
    }

    /// Toggles a token's allow-list status.
    pub fn set_allowed(&mut self, token: Token, allowed: bool) {
        self.allow_list.insert(token, allowed);
    }
}

// =============================================================================
// CALLBACK CONTEXT
// =============================================================================

/// Opaque context payload threaded through every host callback.
///
/// The host owns its meaning; the relay's only obligation is to hand it back
/// unchanged from each callback phase.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct CallbackContext(pub Vec<u8>);

impl CallbackContext {
    /// An empty context.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wraps host-provided context bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw context bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

// =============================================================================
// FLOW TERMINATION
// =============================================================================

/// The endpoints of a flow being terminated.
///
/// A termination callback may concern the inbound flow (counterparty closed
/// their stream into the relay) or the outbound mirror (a rogue beneficiary
/// closed the stream *from* the relay while keeping their own open). The
/// relay classifies which by comparing these endpoints to its own address.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FlowTermination {
    /// Token the terminated flow streamed.
    pub token: Token,
    /// Sender of the terminated flow.
    pub sender: Address,
    /// Receiver of the terminated flow.
    pub receiver: Address,
}

impl FlowTermination {
    /// True if the terminated flow was the outbound mirror (relay was the
    /// sender), i.e. a rogue-beneficiary termination.
    #[must_use]
    pub fn is_outbound_from(&self, relay: Address) -> bool {
        self.sender == relay
    }

    /// The non-relay endpoint of the terminated flow.
    #[must_use]
    pub fn counterparty(&self, relay: Address) -> Address {
        if self.sender == relay {
            self.receiver
        } else {
            self.sender
        }
    }
}

// =============================================================================
// MIRROR OUTCOME
// =============================================================================

/// The internal result of one mirroring action.
///
/// Host-facing failures are folded into this type instead of propagating:
/// from the host's perspective every callback succeeds, and `Dropped` records
/// what was absorbed along the way.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MirrorOutcome {
    /// The outbound mirror now runs at this rate.
    Mirrored {
        /// Rate the mirror was set to.
        rate: FlowRate,
    },
    /// Nothing to do - e.g. terminating a mirror that was never established.
    NothingToDo,
    /// The host-facing call failed and the failure was contained.
    Dropped {
        /// Human-readable description of the contained failure.
        reason: String,
    },
}

impl MirrorOutcome {
    /// True if a failure was contained while producing this outcome.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
