//! # Domain Services
//!
//! Pure business logic for the relay: seed derivation and weighted tier
//! selection. These functions are deterministic and have no side effects.

use crate::domain::value_objects::{Address, RarityTable, RarityTier, U256};
use sha3::{Digest, Keccak256};

// =============================================================================
// RARITY SEED DERIVATION
// =============================================================================

/// Derives a rarity seed from block-level entropy, the caller's identity, and
/// an internal draw counter.
///
/// seed = keccak256(entropy ++ caller ++ counter)
///
/// Mixing in the caller and a counter keeps repeated draws by the same caller
/// in the same block from collapsing onto one seed. The entropy input is
/// opaque to this function; no entropy source is assumed safe against
/// manipulation by whoever supplies it.
#[must_use]
pub fn derive_seed(entropy: &[u8; 32], caller: Address, counter: u64) -> U256 {
    let mut hasher = Keccak256::new();
    hasher.update(entropy);
    hasher.update(caller.as_bytes());
    hasher.update(counter.to_be_bytes());
    let digest = hasher.finalize();
    U256::from_big_endian(&digest)
}

/// Keccak-256 convenience wrapper.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

// =============================================================================
// TIER SELECTION
// =============================================================================

/// Reduces a seed to parts-per-thousand space and walks the cumulative weight
/// table: the first tier whose cumulative sum exceeds the reduced value wins.
///
/// Deterministic: the same seed against the same table always selects the
/// same tier.
#[must_use]
pub fn select_tier(seed: U256, table: &RarityTable) -> RarityTier {
    let v = (seed % U256::from(RarityTable::TOTAL_WEIGHT)).low_u32();
    // v < 1000, so the u16 cast is lossless
    table.tier_for(v as u16)
}

// =============================================================================
// TESTS
// =============================================================================
