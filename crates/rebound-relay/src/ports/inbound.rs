//! # Driving Ports (API - Inbound)
//!
//! These are the interfaces exposed by the relay. The host protocol drives
//! [`FlowLifecycleApi`] on every flow lifecycle change; operators drive
//! [`RelayAdminApi`].
//!
//! Every callback entry point takes the raw `caller` so the implementation
//! can enforce that only the designated host drives the lifecycle surface,
//! and threads the host's opaque context through unchanged.

use crate::domain::entities::{CallbackContext, FlowTermination};
use crate::domain::value_objects::{Address, FlowRate, RarityTier, Token, U256};
use crate::errors::{AdminError, CallbackError};
use async_trait::async_trait;

// =============================================================================
// FLOW LIFECYCLE API (Primary Driving Port)
// =============================================================================

/// Callback surface invoked by the host on every flow lifecycle event.
///
/// Each event has a before-phase (read-only, may reject through the normal
/// rejection channel) and an after-phase (effectful). After-phases and both
/// termination phases must contain every internal failure: the only error a
/// conforming implementation may return from them is
/// [`CallbackError::UnauthorizedHost`], raised when the caller is not the
/// host at all. Anything else escaping a callback gets the relay jailed.
#[async_trait]
pub trait FlowLifecycleApi: Send + Sync {
    /// Pre-creation check. Rejects disallowed tokens and, while the relay is
    /// locked, all new flows.
    async fn before_flow_created(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError>;

    /// Establishes the outbound mirror at exactly `new_rate`.
    ///
    /// The rate comes from the event payload, never from re-querying the
    /// ledger.
    async fn after_flow_created(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        new_rate: FlowRate,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError>;

    /// Pre-update check. Rejects disallowed tokens; the lock does not apply
    /// to updates of already-open flows.
    async fn before_flow_updated(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError>;

    /// Adjusts the outbound mirror to exactly `new_rate`.
    async fn after_flow_updated(
        &self,
        caller: Address,
        token: Token,
        sender: Address,
        old_rate: FlowRate,
        new_rate: FlowRate,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError>;

    /// Pre-termination phase. Always proceeds: the relay accepts closure of
    /// any flow, including on tokens it no longer trusts.
    async fn before_flow_terminated(
        &self,
        caller: Address,
        termination: FlowTermination,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError>;

    /// Tears down the other half of the pair: the outbound mirror when the
    /// inbound flow closed, or the inbound flow when a rogue beneficiary
    /// closed the outbound mirror.
    async fn after_flow_terminated(
        &self,
        caller: Address,
        termination: FlowTermination,
        ctx: CallbackContext,
    ) -> Result<CallbackContext, CallbackError>;
}

// =============================================================================
// RELAY ADMIN API (Governance Driving Port)
// =============================================================================

/// Administrative and read surface of the relay.
///
/// Mutations are owner-gated; reads are open to any caller.
#[async_trait]
pub trait RelayAdminApi: Send + Sync {
    /// Applies `(token, status)` pairs to the allow-list as one atomic set.
    ///
    /// Rejects non-owners and mismatched lengths before any write; on
    /// success every pair has been applied. Newly-disallowed tokens keep
    /// their open flows - closure happens only via termination callbacks or
    /// [`Self::emergency_close_stream`].
    async fn set_allow_list_batch(
        &self,
        caller: Address,
        tokens: Vec<Token>,
        statuses: Vec<bool>,
    ) -> Result<(), AdminError>;

    /// Sets the lock flag. Unconditional overwrite, owner-only.
    async fn set_lock(&self, caller: Address, locked: bool) -> Result<(), AdminError>;

    /// Replaces the rarity table. Weights must sum to exactly 1000.
    async fn set_rarity(&self, caller: Address, weights: [u16; 6]) -> Result<(), AdminError>;

    /// Force-terminates both flow directions for each `(counterparty, token)`
    /// pair, outside the normal callback path.
    ///
    /// Pairs are processed independently; a hostile token or an
    /// already-closed direction never aborts the rest of the sweep, and the
    /// sweep itself never fails once authorized.
    async fn emergency_close_stream(
        &self,
        caller: Address,
        counterparties: Vec<Address>,
        tokens: Vec<Token>,
    ) -> Result<(), AdminError>;

    /// Hands ownership to `new_owner`. Rejects the zero address.
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), AdminError>;

    /// Maps a seed to its rarity tier against the current table.
    /// Read-only, any caller, deterministic per seed.
    async fn get_rarity_tier(&self, seed: U256) -> RarityTier;

    /// Draws a tier for `caller` from fresh entropy, mixing in an internal
    /// counter so repeated draws in one context diverge.
    async fn draw_rarity(&self, caller: Address, entropy: [u8; 32]) -> RarityTier;

    /// Current rarity weights, parts-per-thousand.
    async fn rarity_weights(&self) -> [u16; 6];

    /// Current owner.
    async fn owner(&self) -> Address;

    /// Current lock flag.
    async fn is_locked(&self) -> bool;

    /// Current allow-list status for a token.
    async fn is_token_allowed(&self, token: Token) -> bool;
}

// =============================================================================
// TESTS
// =============================================================================
