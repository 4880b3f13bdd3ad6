//! Trigger configuration types.
//!
//! A [`TriggerConfig`] carries everything the decision pipeline needs at
//! startup:
//! - `EngineDef`: one ternary rule of the trigger table
//! - `DeadtimeConfig`: deadtime windows, clock rate, background model
//! - strategy and ROI-coverage selectors
//!
//! Configurations are plain serde-serializable data; the pipeline
//! compiles them into runtime structures ([`build_table`]) and detects
//! swaps by comparing the `key` field.
//!
//! [`build_table`]: TriggerConfig::build_table

use serde::{Deserialize, Serialize};

use crate::core::{bits, ConfigError};
use crate::engine::{
    ConditionEngine, EngineTable, DEFAULT_PATTERNS, DEFAULT_PRESCALES, ENGINE_SLOTS,
};

/// One rule of the trigger table: a ternary pattern string plus the
/// marker code reported when it fires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDef {
    /// Ternary pattern, 8 tokens most significant bit first
    /// (`Ext solic period CNO CALHI CALLO TKR ROI`).
    pub pattern: String,

    /// Marker code returned when this rule fires.
    pub marker: u8,

    /// Accepting through this rule forces a long (four-range) readout.
    pub four_range: bool,
}

impl EngineDef {
    /// Create a rule with the given pattern and marker.
    pub fn new(pattern: impl Into<String>, marker: u8) -> Self {
        Self {
            pattern: pattern.into(),
            marker,
            four_range: false,
        }
    }

    /// Mark this rule as forcing four-range readout.
    #[must_use]
    pub fn four_range(mut self) -> Self {
        self.four_range = true;
        self
    }
}

/// Which prescale strategy the pipeline runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Compiled table; engines count matched events up to their prescale.
    Table,
    /// Hardware-style down-counters reloaded on underflow, with
    /// per-engine inhibit flags.
    Countdown,
}

/// How many detector rows feed the shield-veto region of interest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoiCoverage {
    /// Outer two tracker rows (flight default).
    TwoRow,
    /// Outer three tracker rows (wider veto acceptance).
    ThreeRow,
}

/// Deadtime windows and the clock/background model they run against.
///
/// Times are seconds; the defaults are the flight values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeadtimeConfig {
    /// Deadtime of a short (one-range) readout.
    pub short: f64,

    /// Deadtime of a long (four-range) readout.
    pub long: f64,

    /// Window after a trigger in which a second trigger is silently lost.
    pub deadzone: f64,

    /// Model invisible background triggers statistically instead of
    /// replaying recorded deadtime.
    pub interleave: bool,

    /// Background trigger rate (Hz) for the interleave model.
    pub background_rate: f64,

    /// Elapsed-time counter frequency (Hz).
    pub clock_hz: f64,
}

impl Default for DeadtimeConfig {
    fn default() -> Self {
        Self {
            short: 26.45e-6,
            long: 65.4e-6,
            deadzone: 2.0e-6,
            interleave: false,
            background_rate: 2000.0,
            clock_hz: 20.0e6,
        }
    }
}

/// Complete trigger configuration.
///
/// The `key` identifies a configuration revision: the pipeline compares
/// keys on [`set_config`](crate::decision::TriggerDecision::set_config)
/// and resets prescale state only when the key changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Configuration revision key.
    pub key: u32,

    /// Trigger table rules in priority order.
    pub engines: Vec<EngineDef>,

    /// Per-engine prescale factors, indexed by priority position.
    pub prescales: Vec<i32>,

    /// Per-engine inhibit flags (countdown strategy only).
    pub inhibited: Vec<bool>,

    /// Condition bits whose assertion opens the readout window.
    pub window_open_mask: u8,

    /// Which prescale strategy to run.
    pub strategy: StrategyKind,

    /// Shield-veto region-of-interest coverage.
    pub roi_coverage: RoiCoverage,

    /// Deadtime model.
    pub deadtime: DeadtimeConfig,

    /// Seed for the deterministic deadtime RNG.
    pub rng_seed: u64,
}

impl TriggerConfig {
    /// The canonical flight configuration: the 12-rule default table,
    /// its default prescales, nothing inhibited, and the flight deadtime
    /// windows. The CAL-HI rule forces four-range readout.
    #[must_use]
    pub fn default_flight() -> Self {
        let engines = DEFAULT_PATTERNS
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let def = EngineDef::new(*pattern, i as u8);
                if i == 6 {
                    def.four_range()
                } else {
                    def
                }
            })
            .collect();
        Self {
            key: 0,
            engines,
            prescales: DEFAULT_PRESCALES.to_vec(),
            inhibited: vec![false; DEFAULT_PATTERNS.len()],
            window_open_mask: bits::PHYSICS_MASK,
            strategy: StrategyKind::Table,
            roi_coverage: RoiCoverage::TwoRow,
            deadtime: DeadtimeConfig::default(),
            rng_seed: 0,
        }
    }

    /// Check list lengths and engine count. Pattern syntax and word
    /// coverage are checked when the table is compiled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engines.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        if self.engines.len() > ENGINE_SLOTS {
            return Err(ConfigError::TooManyEngines {
                count: self.engines.len(),
                limit: ENGINE_SLOTS,
            });
        }
        if self.prescales.len() < self.engines.len() {
            return Err(ConfigError::ListTooShort {
                what: "prescale",
                need: self.engines.len(),
                got: self.prescales.len(),
            });
        }
        if self.inhibited.len() < self.engines.len() {
            return Err(ConfigError::ListTooShort {
                what: "inhibit flag",
                need: self.engines.len(),
                got: self.inhibited.len(),
            });
        }
        Ok(())
    }

    /// Compile the engine definitions into a dispatch table.
    pub fn build_table(&self) -> Result<EngineTable, ConfigError> {
        self.validate()?;
        let engines = self
            .engines
            .iter()
            .enumerate()
            .map(|(i, def)| {
                let engine = ConditionEngine::parse(&def.pattern, def.marker, self.prescales[i])?;
                Ok(if def.four_range {
                    engine.with_four_range()
                } else {
                    engine
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        EngineTable::from_engines(engines)
    }

    /// Prescale factor for engine number `n` (0 beyond the table).
    #[must_use]
    pub fn prescale(&self, n: usize) -> i32 {
        self.prescales.get(n).copied().unwrap_or(0)
    }

    /// Inhibit flag for engine number `n` (false beyond the table).
    #[must_use]
    pub fn inhibited(&self, n: usize) -> bool {
        self.inhibited.get(n).copied().unwrap_or(false)
    }

    /// Set the revision key.
    #[must_use]
    pub fn with_key(mut self, key: u32) -> Self {
        self.key = key;
        self
    }

    /// Set the inhibit flag for engine number `n`.
    #[must_use]
    pub fn with_inhibited(mut self, n: usize, inhibited: bool) -> Self {
        if self.inhibited.len() <= n {
            self.inhibited.resize(n + 1, false);
        }
        self.inhibited[n] = inhibited;
        self
    }

    /// Select the prescale strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Select the ROI coverage.
    #[must_use]
    pub fn with_roi_coverage(mut self, coverage: RoiCoverage) -> Self {
        self.roi_coverage = coverage;
        self
    }

    /// Set the deadtime model.
    #[must_use]
    pub fn with_deadtime(mut self, deadtime: DeadtimeConfig) -> Self {
        self.deadtime = deadtime;
        self
    }

    /// Set the deadtime RNG seed.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self::default_flight()
    }
}
