//! The packed output trigger word and per-event hardware summary.

use serde::{Deserialize, Serialize};

use crate::core::ConditionWord;

/// Derive the hardware condition-summary byte from a software condition
/// word. The five physics conditions occupy the same bit positions in
/// both words; reserved bits do not propagate.
#[must_use]
pub const fn derive_hardware_summary(condition: ConditionWord) -> u8 {
    condition.physics()
}

/// Packed per-event trigger word: the original condition byte, the
/// hardware condition-summary byte, and the selected engine number, in
/// fixed-width 8-bit fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerWord(pub u32);

impl TriggerWord {
    const HARDWARE_SHIFT: u32 = 8;
    const ENGINE_SHIFT: u32 = 16;

    /// Pack the three fields.
    #[must_use]
    pub const fn pack(condition: ConditionWord, hardware: u8, engine: u8) -> Self {
        Self(
            condition.raw() as u32
                | (hardware as u32) << Self::HARDWARE_SHIFT
                | (engine as u32) << Self::ENGINE_SHIFT,
        )
    }

    /// The raw packed word.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The original condition byte.
    #[must_use]
    pub const fn condition(self) -> ConditionWord {
        ConditionWord::new(self.0 as u8)
    }

    /// The hardware condition-summary byte.
    #[must_use]
    pub const fn hardware(self) -> u8 {
        (self.0 >> Self::HARDWARE_SHIFT) as u8
    }

    /// The selected engine number.
    #[must_use]
    pub const fn engine(self) -> u8 {
        (self.0 >> Self::ENGINE_SHIFT) as u8
    }
}

impl std::fmt::Display for TriggerWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#08x}", self.0)
    }
}

/// Simulation-only record of the electronics state at an accepted
/// trigger: the hardware condition summary, the saturating 16-bit
/// tick deltas, and the running busy/deadzone scalers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSummary {
    /// Hardware condition-summary byte.
    pub condition_summary: u8,

    /// Ticks since the previous accepted trigger, saturated at `0xffff`.
    pub delta_event_ticks: u16,

    /// Ticks since the readout window last opened, saturated at `0xffff`.
    pub delta_window_ticks: u16,

    /// Triggers rejected while busy, so far this run.
    pub busy_count: u64,

    /// Triggers lost in the deadzone, so far this run.
    pub deadzone_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bits;

    #[test]
    fn test_pack_fields() {
        let condition = ConditionWord::new(bits::ROI | bits::TRACK | bits::CAL_LO);
        let word = TriggerWord::pack(condition, 0x07, 8);
        assert_eq!(word.raw(), 0x08_0707);
        assert_eq!(word.condition(), condition);
        assert_eq!(word.hardware(), 0x07);
        assert_eq!(word.engine(), 8);
    }

    #[test]
    fn test_derived_summary_strips_reserved_bits() {
        let condition = ConditionWord::new(bits::EXTERNAL | bits::TRACK);
        assert_eq!(derive_hardware_summary(condition), bits::TRACK);
    }

    #[test]
    fn test_display() {
        let word = TriggerWord::pack(ConditionWord::new(0x1f), 0x1f, 11);
        assert_eq!(format!("{}", word), "0x0b1f1f");
    }
}
