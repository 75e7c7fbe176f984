//! # Value Objects
//!
//! Immutable domain primitives for the flow-mirroring relay.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for rarity seed arithmetic
pub use primitive_types::U256;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account address.
///
/// Identifies the host, the relay, counterparties, and token contracts alike.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == 20 {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(slice);
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// TOKEN
// =============================================================================

/// A streamable token, identified by its contract address.
///
/// Tokens come into existence for the relay on their first allow-list write;
/// the relay never stores anything else about them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Token(pub Address);

impl Token {
    /// Creates a token handle from its contract address.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Returns the token's contract address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?})", self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Address> for Token {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

// =============================================================================
// FLOW RATE
// =============================================================================

/// An unsigned flow rate in token units per second.
///
/// The relay mirrors rates 1:1 - no fee skim, no rounding - so the only
/// arithmetic this type needs is equality and the zero check.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct FlowRate(pub u128);

impl FlowRate {
    /// The zero rate (no flow).
    pub const ZERO: Self = Self(0);

    /// Creates a flow rate from raw units-per-second.
    #[must_use]
    pub const fn new(units_per_second: u128) -> Self {
        Self(units_per_second)
    }

    /// Returns the raw units-per-second value.
    #[must_use]
    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// Returns true if this rate is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FlowRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowRate({}/s)", self.0)
    }
}

impl fmt::Display for FlowRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for FlowRate {
    fn from(units_per_second: u128) -> Self {
        Self(units_per_second)
    }
}

// =============================================================================
// RARITY TIER
// =============================================================================

/// A weighted-random classification bucket, index 0 (most common) through 5
/// (rarest).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum RarityTier {
    /// Tier 0, ~50% with the default table.
    Common,
    /// Tier 1, ~30% with the default table.
    Uncommon,
    /// Tier 2, ~10% with the default table.
    Rare,
    /// Tier 3, ~7% with the default table.
    Epic,
    /// Tier 4, ~2% with the default table.
    Legendary,
    /// Tier 5, ~1% with the default table.
    Primordial,
}

impl RarityTier {
    /// All tiers in index order.
    pub const ALL: [Self; 6] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
        Self::Primordial,
    ];

    /// Returns the tier index in [0, 5].
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Looks a tier up by index. Returns None for indices outside [0, 5].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for RarityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Primordial => "Primordial",
        };
        write!(f, "{name}")
    }
}

// =============================================================================
// RARITY TABLE
// =============================================================================

/// Six tier weights in parts-per-thousand, index 0 most common.
///
/// A table is only constructible when its weights sum to exactly
/// [`RarityTable::TOTAL_WEIGHT`], so every held table is valid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RarityTable([u16; 6]);

impl RarityTable {
    /// Weights must sum to this (parts-per-thousand).
    pub const TOTAL_WEIGHT: u32 = 1000;

    /// The reference table: 50% / 30% / 10% / 7% / 2% / 1%.
    pub const DEFAULT: Self = Self([500, 300, 100, 70, 20, 10]);

    /// Creates a table from six weights. Returns None unless the weights sum
    /// to exactly [`Self::TOTAL_WEIGHT`].
    #[must_use]
    pub fn new(weights: [u16; 6]) -> Option<Self> {
        if Self::weight_sum(&weights) == Self::TOTAL_WEIGHT {
            Some(Self(weights))
        } else {
            None
        }
    }

    /// Sums a candidate weight array without constructing a table.
    #[must_use]
    pub fn weight_sum(weights: &[u16; 6]) -> u32 {
        weights.iter().map(|w| u32::from(*w)).sum()
    }

    /// Returns the raw weights.
    #[must_use]
    pub const fn weights(&self) -> [u16; 6] {
        self.0
    }

    /// Maps a value in parts-per-thousand space to its tier: walk the
    /// cumulative weights in index order and return the first tier whose
    /// cumulative sum exceeds the value. Values >= 1000 are reduced first.
    #[must_use]
    pub fn tier_for(&self, value: u16) -> RarityTier {
        let v = u32::from(value) % Self::TOTAL_WEIGHT;
        let mut cumulative = 0u32;
        for (index, weight) in self.0.iter().enumerate() {
            cumulative += u32::from(*weight);
            if v < cumulative {
                // from_index is total over 0..6
                return RarityTier::from_index(index).unwrap_or(RarityTier::Primordial);
            }
        }
        RarityTier::Primordial
    }
}

impl Default for RarityTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// TESTS
// =============================================================================
