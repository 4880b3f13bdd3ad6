//! A single trigger engine: a ternary condition pattern with prescaling.

use serde::{Deserialize, Serialize};

use crate::core::{ConditionWord, ConfigError};

/// Requirement placed on one bit of the condition word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitCheck {
    /// Bit must be 0 (`0` / `N` in pattern strings).
    Zero,
    /// Bit must be 1 (`1` / `Y` in pattern strings).
    One,
    /// Don't care (`x` / `X` in pattern strings).
    Any,
}

impl BitCheck {
    /// True if `bit` (0 or 1) satisfies this requirement.
    #[must_use]
    pub const fn accepts(self, bit: u8) -> bool {
        match self {
            BitCheck::Zero => bit == 0,
            BitCheck::One => bit == 1,
            BitCheck::Any => true,
        }
    }

    const fn code(self) -> char {
        match self {
            BitCheck::Zero => '0',
            BitCheck::One => '1',
            BitCheck::Any => 'x',
        }
    }
}

/// One rule of a trigger table: an 8-entry ternary pattern, a marker code
/// returned when the rule fires, a prescale factor, and the owned scaler
/// counter the prescale runs on.
///
/// The scaler is mutated only through [`check`](ConditionEngine::check)
/// and [`reset`](ConditionEngine::reset); sharing an engine across
/// threads requires an external lock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConditionEngine {
    /// Per-bit requirements, indexed by condition-word bit number
    /// (index 0 = bit 0 = ROI).
    condition: [BitCheck; 8],
    marker: u8,
    prescale: i32,
    four_range: bool,
    scaler: i32,
}

impl ConditionEngine {
    /// Build from an explicit ternary vector, indexed by bit number.
    #[must_use]
    pub fn new(condition: [BitCheck; 8], marker: u8, prescale: i32) -> Self {
        Self {
            condition,
            marker,
            prescale,
            four_range: false,
            scaler: 0,
        }
    }

    /// Parse a pattern string of exactly 8 tokens, most significant bit
    /// first. Whitespace is ignored; `0`/`N` require 0, `1`/`Y` require 1,
    /// `x`/`X` are don't-care. Anything else is a fatal parse error.
    pub fn parse(pattern: &str, marker: u8, prescale: i32) -> Result<Self, ConfigError> {
        let mut condition = [BitCheck::Any; 8];
        let mut count = 0usize;
        for c in pattern.chars() {
            let check = match c {
                c if c.is_whitespace() => continue,
                '0' | 'N' => BitCheck::Zero,
                '1' | 'Y' => BitCheck::One,
                'x' | 'X' => BitCheck::Any,
                other => {
                    return Err(ConfigError::BadPatternChar {
                        pattern: pattern.to_owned(),
                        found: other,
                    })
                }
            };
            if count < 8 {
                condition[7 - count] = check;
            }
            count += 1;
        }
        if count != 8 {
            return Err(ConfigError::BadPatternLength {
                pattern: pattern.to_owned(),
                count,
            });
        }
        Ok(Self::new(condition, marker, prescale))
    }

    /// Mark this engine as requiring four-range (long) readout.
    #[must_use]
    pub fn with_four_range(mut self) -> Self {
        self.four_range = true;
        self
    }

    /// Pure predicate: true iff every bit of `word` satisfies the
    /// corresponding ternary entry.
    #[must_use]
    pub fn matches(&self, word: ConditionWord) -> bool {
        let mut bits = word.raw();
        for check in &self.condition {
            if !check.accepts(bits & 1) {
                return false;
            }
            bits >>= 1;
        }
        true
    }

    /// Stateful prescale check, called once per matched event.
    ///
    /// - prescale 0: fires (returns the marker) on every call;
    /// - prescale < 0: permanently disabled, never fires;
    /// - prescale N > 0: fires on every (N+1)th call, starting with call
    ///   N+1, and resets the scaler when it fires.
    pub fn check(&mut self) -> Option<u8> {
        if self.prescale < 0 {
            return None;
        }
        if self.prescale == 0 {
            return Some(self.marker);
        }
        if self.scaler == self.prescale {
            self.scaler = 0;
            Some(self.marker)
        } else {
            self.scaler += 1;
            None
        }
    }

    /// Zero the scaler.
    pub fn reset(&mut self) {
        self.scaler = 0;
    }

    /// Marker code returned when this engine fires.
    #[must_use]
    pub const fn marker(&self) -> u8 {
        self.marker
    }

    /// Configured prescale factor.
    #[must_use]
    pub const fn prescale(&self) -> i32 {
        self.prescale
    }

    /// True if accepting through this engine implies a long (four-range)
    /// readout window.
    #[must_use]
    pub const fn four_range(&self) -> bool {
        self.four_range
    }

    /// The per-bit requirements, indexed by bit number.
    #[must_use]
    pub const fn condition(&self) -> &[BitCheck; 8] {
        &self.condition
    }
}

impl std::fmt::Display for ConditionEngine {
    /// One table row, most significant bit first, using `0 1 x` codes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for check in self.condition.iter().rev() {
            write!(f, "{:<7}", check.code())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_matches_explicit_vector() {
        // "0 0 0 0 0 1 1 1": bits 7..3 zero, bits 2..0 one.
        let parsed = ConditionEngine::parse("0 0 0 0 0 1 1 1", 3, 0).unwrap();
        let explicit = ConditionEngine::new(
            [
                BitCheck::One,
                BitCheck::One,
                BitCheck::One,
                BitCheck::Zero,
                BitCheck::Zero,
                BitCheck::Zero,
                BitCheck::Zero,
                BitCheck::Zero,
            ],
            3,
            0,
        );
        for word in ConditionWord::all() {
            assert_eq!(parsed.matches(word), explicit.matches(word), "word {word}");
        }
    }

    #[test]
    fn test_parse_token_aliases() {
        let a = ConditionEngine::parse("N N N N N Y Y Y", 0, 0).unwrap();
        let b = ConditionEngine::parse("00000111", 0, 0).unwrap();
        for word in ConditionWord::all() {
            assert_eq!(a.matches(word), b.matches(word));
        }
    }

    #[test]
    fn test_parse_rejects_bad_character() {
        let err = ConditionEngine::parse("0 0 0 0 0 1 1 q", 0, 0).unwrap_err();
        assert!(matches!(err, ConfigError::BadPatternChar { found: 'q', .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = ConditionEngine::parse("0 1 x", 0, 0).unwrap_err();
        assert!(matches!(err, ConfigError::BadPatternLength { count: 3, .. }));

        let err = ConditionEngine::parse("0 1 x 0 1 x 0 1 x", 0, 0).unwrap_err();
        assert!(matches!(err, ConfigError::BadPatternLength { count: 9, .. }));
    }

    #[test]
    fn test_matches_msb_orientation() {
        // Pattern requires bit 7 set, everything else free.
        let engine = ConditionEngine::parse("1 x x x x x x x", 0, 0).unwrap();
        assert!(engine.matches(ConditionWord::new(0x80)));
        assert!(engine.matches(ConditionWord::new(0xff)));
        assert!(!engine.matches(ConditionWord::new(0x7f)));
    }

    #[test]
    fn test_check_prescale_zero_always_fires() {
        let mut engine = ConditionEngine::parse("x x x x x x x x", 7, 0).unwrap();
        for _ in 0..10 {
            assert_eq!(engine.check(), Some(7));
        }
    }

    #[test]
    fn test_check_prescale_negative_never_fires() {
        let mut engine = ConditionEngine::parse("x x x x x x x x", 7, -1).unwrap();
        for _ in 0..10 {
            assert_eq!(engine.check(), None);
        }
    }

    #[test]
    fn test_check_prescale_two_fires_every_third_call() {
        let mut engine = ConditionEngine::parse("x x x x x x x x", 7, 2).unwrap();
        let fired: Vec<bool> = (0..9).map(|_| engine.check().is_some()).collect();
        assert_eq!(
            fired,
            vec![false, false, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_reset_restarts_period() {
        let mut engine = ConditionEngine::parse("x x x x x x x x", 7, 2).unwrap();
        assert_eq!(engine.check(), None);
        assert_eq!(engine.check(), None);
        engine.reset();
        assert_eq!(engine.check(), None);
        assert_eq!(engine.check(), None);
        assert_eq!(engine.check(), Some(7));
    }

    #[test]
    fn test_display_row() {
        let engine = ConditionEngine::parse("0 0 0 1 x 1 1 1", 1, 0).unwrap();
        let row = format!("{}", engine);
        assert_eq!(row.split_whitespace().collect::<Vec<_>>(), vec![
            "0", "0", "0", "1", "x", "1", "1", "1"
        ]);
    }

    #[test]
    fn test_four_range_builder() {
        let engine = ConditionEngine::parse("x x x x x x x x", 0, 0)
            .unwrap()
            .with_four_range();
        assert!(engine.four_range());
    }
}
