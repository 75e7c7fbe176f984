//! # Rebound Relay - Flow-Mirroring Subsystem
//!
//! ## Purpose
//!
//! A money-streaming relay: for as long as a counterparty streams an
//! allow-listed token into the relay, the relay streams it back at the same
//! rate (or on to a designated beneficiary). The host protocol drives the
//! relay through lifecycle callbacks and permanently jails any handler whose
//! callback fails, so the relay's defining property is that no internal
//! failure ever escapes a callback.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Mirror Parity | `domain/invariants.rs` - `check_mirror_parity()` |
//! | INVARIANT-2 | Callback Containment | `domain/invariants.rs` - `check_callback_containment()` |
//! | INVARIANT-3 | Lock Admission | `domain/invariants.rs` - `check_lock_admission()` |
//! | INVARIANT-4 | Termination Acceptance | `domain/invariants.rs` - `check_termination_acceptance()` |
//! | INVARIANT-5 | Weight Conservation | `domain/invariants.rs` - `check_weight_conservation()` |
//!
//! ## Governance Surface
//!
//! | Operation | Access | Purpose |
//! |-----------|--------|---------|
//! | `set_allow_list_batch` | Owner | Atomic batch toggle of mirrorable tokens |
//! | `set_lock` | Owner | Gate creation of new mirrors |
//! | `set_rarity` | Owner | Replace the rarity weight table |
//! | `emergency_close_stream` | Owner | Force-close flow pairs outside callbacks |
//! | `transfer_ownership` | Owner | Hand the admin role over |
//! | `get_rarity_tier` / `draw_rarity` | Any caller | Weighted tier selection |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Host protocol | `FlowLedger` | Query and mutate flows (source of truth) |
//! | Notification transport | `EventSink` | Deliver `RelayEvent`s |
//!
//! ## Usage Example
//!
//! ```ignore
//! use rebound_relay::prelude::*;
//!
//! let service = RelayService::new(ledger, sink, config);
//!
//! // Host drives the lifecycle surface
//! let ctx = service.before_flow_created(host, token, sender, ctx).await?;
//! let ctx = service.after_flow_created(host, token, sender, rate, ctx).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        CallbackContext, FlowTermination, GovernanceState, MirrorOutcome,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        Address, FlowRate, RarityTable, RarityTier, Token, U256,
    };

    // Domain services
    pub use crate::domain::services::{derive_seed, keccak256, select_tier};

    // Invariants
    pub use crate::domain::invariants::{
        check_callback_containment, check_lock_admission, check_mirror_parity,
        check_pair_invariants, check_termination_acceptance, check_weight_conservation,
        InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::{FlowLifecycleApi, RelayAdminApi};
    pub use crate::ports::outbound::{EventSink, FlowLedger};

    // Events
    pub use crate::events::RelayEvent;

    // Errors
    pub use crate::errors::{AdminError, CallbackError, LedgerError};

    // Adapters
    pub use crate::adapters::{InMemoryEventSink, InMemoryLedger, TracingEventSink};

    // Service
    pub use crate::service::{create_test_service, RelayService, ServiceConfig, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Flow Mirroring Relay";

// =============================================================================
// TESTS
// =============================================================================
