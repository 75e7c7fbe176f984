//! # Error Types
//!
//! All error types for the relay, split by propagation policy: admin and
//! before-phase errors may reject outright; ledger errors raised inside an
//! effectful callback phase are always contained and never reach the host.

use crate::domain::value_objects::{Address, Token};
use thiserror::Error;

// =============================================================================
// ADMIN ERRORS
// =============================================================================

/// Errors from owner-gated administrative operations.
///
/// These occur before any host-observable callback is entered, so surfacing
/// them as outright rejections is safe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// A non-owner invoked an owner-gated operation.
    #[error("unauthorized: {caller} is not the owner")]
    Unauthorized {
        /// Who made the call.
        caller: Address,
    },

    /// Paired batch inputs have different lengths.
    #[error("length mismatch: {left} items vs {right} statuses")]
    LengthMismatch {
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// Rarity weights do not sum to exactly 1000 parts-per-thousand.
    #[error("invalid weights: sum {sum} != 1000")]
    InvalidWeights {
        /// The offending sum.
        sum: u32,
    },

    /// Ownership transfer to the zero address.
    #[error("new owner is the zero address")]
    ZeroAddressOwner,
}

// =============================================================================
// CALLBACK ERRORS
// =============================================================================

/// Rejections surfaced through a callback's normal rejection channel.
///
/// Only before-phases (and the host-identity check) produce these. Once an
/// effectful after-phase has begun, failures are contained instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// A caller other than the designated host invoked a callback.
    #[error("unauthorized host: callback from {caller}")]
    UnauthorizedHost {
        /// Who made the call.
        caller: Address,
    },

    /// Flow creation/update attempted on a token outside the allow-list.
    #[error("token not allow-listed: {0}")]
    DisallowedToken(Token),

    /// Flow creation attempted while the relay is locked.
    #[error("relay is locked")]
    Locked,
}

impl CallbackError {
    /// True for the admission rejections (allow-list / lock), which are legal
    /// only in before-phases. The host-identity rejection may occur anywhere.
    #[must_use]
    pub fn is_admission_rejection(&self) -> bool {
        matches!(self, Self::DisallowedToken(_) | Self::Locked)
    }
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Failures from the host's flow ledger.
///
/// Inside a callback or emergency sweep every one of these is contained:
/// caught, logged, counted, and folded into a successful callback result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No flow exists between the given endpoints for the token.
    #[error("no flow of {token} from {sender} to {receiver}")]
    FlowNotFound {
        /// Token of the missing flow.
        token: Token,
        /// Sender endpoint queried.
        sender: Address,
        /// Receiver endpoint queried.
        receiver: Address,
    },

    /// A flow between the endpoints already exists.
    #[error("flow of {token} to {receiver} already exists")]
    FlowAlreadyExists {
        /// Token of the existing flow.
        token: Token,
        /// Receiver endpoint.
        receiver: Address,
    },

    /// The counterparty token rejected the operation (poison token).
    #[error("counterparty rejected: {0}")]
    CounterpartyRejected(String),

    /// The host ledger could not be reached.
    #[error("ledger unavailable")]
    Unavailable,

    /// Other ledger failure.
    #[error("ledger error: {0}")]
    Other(String),
}

impl LedgerError {
    /// True if this error means "nothing to terminate" - the idempotent no-op
    /// case for terminations, treated as success rather than contained.
    #[must_use]
    pub fn is_missing_flow(&self) -> bool {
        matches!(self, Self::FlowNotFound { .. })
    }
}

// =============================================================================
// TESTS
// =============================================================================
