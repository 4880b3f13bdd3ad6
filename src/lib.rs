//! # trigger-core
//!
//! The trigger-decision core of a gamma-ray telescope's event filter:
//! given per-event condition bits contributed by the detector
//! subsystems, decide whether to accept the event, apply configurable
//! prescaling, and account for the readout electronics' dead time.
//!
//! ## Design Principles
//!
//! 1. **Configuration Over Literals**: Engine tables, prescales, and
//!    adjacency masks are named configuration data, loaded and validated
//!    at startup. A defective configuration refuses to start.
//!
//! 2. **Deterministic by Default**: Non-interleave processing is fully
//!    deterministic; interleave mode draws from a seeded, injectable RNG
//!    so simulated runs reproduce exactly.
//!
//! 3. **Strictly Event-Ordered**: Prescale and dead-time state depend on
//!    arrival order. One pipeline owns all per-event mutable state;
//!    concurrent use requires external serialization.
//!
//! ## Modules
//!
//! - `core`: Condition words, tower identifiers, errors, RNG
//! - `engine`: Ternary condition rules, priority tables, prescale strategies
//! - `config`: Trigger configuration types
//! - `livetime`: Dead-time/busy/live-time state machine
//! - `throttle`: Spatial shield-veto (ROI) computation
//! - `decision`: The per-event pipeline and its input/output types

pub mod config;
pub mod core;
pub mod decision;
pub mod engine;
pub mod livetime;
pub mod throttle;

// Re-export commonly used types
pub use crate::core::{
    bits, ConditionWord, ConfigError, DeadtimeDraws, ScriptedDraws, TowerId, TowerSet, TriggerRng,
    TriggerRngState, TOWER_COUNT, WORD_COUNT,
};

pub use crate::config::{
    DeadtimeConfig, EngineDef, RoiCoverage, StrategyKind, TriggerConfig,
};

pub use crate::engine::{
    build_strategy, BitCheck, ConditionEngine, CountdownStrategy, DecisionStrategy, EngineTable,
    PrescaleCounter, TableStrategy, DEFAULT_PATTERNS, DEFAULT_PRESCALES, ENGINE_SLOTS,
};

pub use crate::livetime::{LivetimeAccumulator, LivetimeState};

pub use crate::throttle::{
    RoiResult, ShieldFace, ThrottleMap, TileBitmaps, TileId, TowerMasks, THREE_ROW_MASKS,
    TWO_ROW_MASKS,
};

pub use crate::decision::{
    derive_hardware_summary, EventInput, HardwareSummary, TriggerDecision, TriggerWord, Verdict,
    VerdictStatus,
};
