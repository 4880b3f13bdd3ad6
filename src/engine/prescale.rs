//! Per-engine-number down-counters for configuration-driven prescaling.
//!
//! This is the second, deliberately distinct prescale strategy: counters
//! reload on underflow from the live configuration (or an explicit
//! override list), where [`ConditionEngine::check`] counts up from match
//! time. The two are NOT interchangeable in their phase behavior and are
//! kept separate on purpose.
//!
//! [`ConditionEngine::check`]: super::condition::ConditionEngine::check

use serde::{Deserialize, Serialize};

use crate::config::TriggerConfig;
use crate::core::{ConditionWord, ConfigError};

use super::table::EngineTable;

/// Number of hardware engine counter slots.
pub const ENGINE_SLOTS: usize = 16;

/// Fixed array of per-engine down-counters, plus an optional override
/// prescale list that takes precedence over the configuration's values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrescaleCounter {
    counters: [i32; ENGINE_SLOTS],
    overrides: Vec<i32>,
}

impl PrescaleCounter {
    /// Create with an override prescale list; an empty list means
    /// prescales come from the configuration at check time. A non-empty
    /// list must cover all counter slots that can be addressed.
    pub fn new(overrides: Vec<i32>) -> Result<Self, ConfigError> {
        if !overrides.is_empty() && overrides.len() < ENGINE_SLOTS {
            return Err(ConfigError::ListTooShort {
                what: "prescale override",
                need: ENGINE_SLOTS,
                got: overrides.len(),
            });
        }
        Ok(Self {
            counters: [0; ENGINE_SLOTS],
            overrides,
        })
    }

    /// Zero all counters. Invoked when the live configuration key
    /// changes.
    pub fn reset(&mut self) {
        self.counters = [0; ENGINE_SLOTS];
    }

    /// Decrement the counter for the engine matching `word`, reloading on
    /// underflow from the override list if present, else from the
    /// configuration's per-engine prescale. Returns true iff the counter
    /// is exactly zero afterwards and the engine is not inhibited.
    pub fn decrement_and_check(
        &mut self,
        word: ConditionWord,
        table: &EngineTable,
        config: &TriggerConfig,
    ) -> bool {
        let engine = table.engine_number(word).min(ENGINE_SLOTS - 1);
        self.counters[engine] -= 1;
        if self.counters[engine] < 0 {
            self.counters[engine] = if self.overrides.is_empty() {
                config.prescale(engine)
            } else {
                self.overrides[engine]
            };
        }
        self.counters[engine] == 0 && !config.inhibited(engine)
    }
}

impl Default for PrescaleCounter {
    fn default() -> Self {
        Self {
            counters: [0; ENGINE_SLOTS],
            overrides: Vec::new(),
        }
    }
}
