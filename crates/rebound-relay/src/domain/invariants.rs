//! # Domain Invariants
//!
//! Critical invariants that MUST hold for the relay to stay un-jailed and
//! solvent. The test harness checks these after every scenario step.
//!
//! - INVARIANT-1: Mirror Parity
//! - INVARIANT-2: Callback Containment
//! - INVARIANT-3: Lock Admission
//! - INVARIANT-4: Termination Acceptance
//! - INVARIANT-5: Weight Conservation

use crate::domain::entities::{CallbackContext, MirrorOutcome};
use crate::domain::value_objects::{FlowRate, RarityTable};
use crate::errors::CallbackError;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// INVARIANT-1: Mirror Parity
///
/// At quiescence, the inbound rate from a counterparty equals the outbound
/// rate back to it (or the designated beneficiary), per token.
#[must_use]
pub fn check_mirror_parity(inbound: FlowRate, outbound: FlowRate) -> bool {
    inbound == outbound
}

/// INVARIANT-2: Callback Containment
///
/// An effectful callback phase may only fail for a wrong-caller reason.
/// Admission rejections belong to before-phases, and ledger failures must
/// have been folded into the successful result - either escaping here would
/// jail the relay.
#[must_use]
pub fn check_callback_containment(result: &Result<CallbackContext, CallbackError>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => !err.is_admission_rejection(),
    }
}

/// INVARIANT-3: Lock Admission
///
/// While locked, no create may establish a mirror.
#[must_use]
pub fn check_lock_admission(locked: bool, create_outcome: &MirrorOutcome) -> bool {
    if locked {
        !matches!(create_outcome, MirrorOutcome::Mirrored { .. })
    } else {
        true
    }
}

/// INVARIANT-4: Termination Acceptance
///
/// A termination callback must never be rejected for allow-list or lock
/// reasons: the relay always accepts closure of a flow, including on tokens
/// it no longer trusts.
#[must_use]
pub fn check_termination_acceptance(result: &Result<CallbackContext, CallbackError>) -> bool {
    !matches!(
        result,
        Err(CallbackError::DisallowedToken(_)) | Err(CallbackError::Locked)
    )
}

/// INVARIANT-5: Weight Conservation
///
/// The rarity table's weights sum to exactly 1000 parts-per-thousand.
/// Held tables guarantee this by construction; the check exists so the test
/// harness can audit state snapshots.
#[must_use]
pub fn check_weight_conservation(table: &RarityTable) -> bool {
    RarityTable::weight_sum(&table.weights()) == RarityTable::TOTAL_WEIGHT
}

// =============================================================================
// AGGREGATE CHECK
// =============================================================================

/// A detected invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Inbound and outbound rates diverged at quiescence.
    MirrorDivergence {
        /// Observed inbound rate.
        inbound: FlowRate,
        /// Observed outbound rate.
        outbound: FlowRate,
    },
    /// Rarity weights no longer sum to 1000.
    WeightDrift {
        /// The observed sum.
        sum: u32,
    },
}

/// Result of checking a quiescent (token, counterparty) pair snapshot.
#[derive(Debug, Clone, Default)]
pub struct InvariantCheckResult {
    /// Violations found, empty when all checks passed.
    pub violations: Vec<InvariantViolation>,
}

impl InvariantCheckResult {
    /// True when no violations were found.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks the state-level invariants for one pair snapshot.
#[must_use]
pub fn check_pair_invariants(
    inbound: FlowRate,
    outbound: FlowRate,
    table: &RarityTable,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_mirror_parity(inbound, outbound) {
        violations.push(InvariantViolation::MirrorDivergence { inbound, outbound });
    }

    if !check_weight_conservation(table) {
        violations.push(InvariantViolation::WeightDrift {
            sum: RarityTable::weight_sum(&table.weights()),
        });
    }

    InvariantCheckResult { violations }
}

// =============================================================================
// TESTS
// =============================================================================
