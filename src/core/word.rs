//! Condition words: the per-event bit vector of subsystem trigger flags.
//!
//! Each detector subsystem contributes one or more bits. The low five bits
//! are the physics conditions; bits 5-7 are reserved for externally
//! supplied conditions (periodic, solicited, external) and pass through
//! the engine tables unchanged.

use serde::{Deserialize, Serialize};

/// Bit assignments within a [`ConditionWord`].
pub mod bits {
    /// Region-of-interest / throttle veto.
    pub const ROI: u8 = 1 << 0;
    /// Tracker three-in-a-row coincidence.
    pub const TRACK: u8 = 1 << 1;
    /// Calorimeter low threshold.
    pub const CAL_LO: u8 = 1 << 2;
    /// Calorimeter high threshold.
    pub const CAL_HI: u8 = 1 << 3;
    /// Anticoincidence shield high threshold (cosmic nuclei).
    pub const CNO: u8 = 1 << 4;
    /// Reserved: periodic trigger.
    pub const PERIODIC: u8 = 1 << 5;
    /// Reserved: solicited trigger.
    pub const SOLICITED: u8 = 1 << 6;
    /// Reserved: external trigger.
    pub const EXTERNAL: u8 = 1 << 7;

    /// Mask selecting the five physics condition bits.
    pub const PHYSICS_MASK: u8 = ROI | TRACK | CAL_LO | CAL_HI | CNO;
    /// Mask selecting the reserved pass-through bits.
    pub const RESERVED_MASK: u8 = PERIODIC | SOLICITED | EXTERNAL;
}

/// Number of distinct condition words.
pub const WORD_COUNT: usize = 256;

/// Bit vector of per-subsystem trigger flags for one event.
///
/// A missing subsystem contributes zero bits; there is no error path for
/// absent input.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ConditionWord(pub u8);

impl ConditionWord {
    /// Create a condition word from raw bits.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Get the raw bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// True if every bit of `mask` is set.
    #[must_use]
    pub const fn has(self, mask: u8) -> bool {
        self.0 & mask == mask
    }

    /// True if any bit of `mask` is set.
    #[must_use]
    pub const fn intersects(self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    /// Return a copy with the bits of `mask` set.
    #[must_use]
    pub const fn with(self, mask: u8) -> Self {
        Self(self.0 | mask)
    }

    /// The five physics condition bits only.
    #[must_use]
    pub const fn physics(self) -> u8 {
        self.0 & bits::PHYSICS_MASK
    }

    /// Iterate over all 256 possible condition words.
    pub fn all() -> impl Iterator<Item = ConditionWord> {
        (0..=u8::MAX).map(ConditionWord)
    }

    /// Name of a single condition bit, for diagnostics.
    #[must_use]
    pub fn bit_name(bit: u8) -> &'static str {
        match 1u8 << bit {
            bits::ROI => "ROI",
            bits::TRACK => "TKR",
            bits::CAL_LO => "CALLO",
            bits::CAL_HI => "CALHI",
            bits::CNO => "CNO",
            bits::PERIODIC => "period",
            bits::SOLICITED => "solic",
            bits::EXTERNAL => "Ext",
            _ => "?",
        }
    }
}

impl From<u8> for ConditionWord {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

impl std::fmt::Display for ConditionWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}
