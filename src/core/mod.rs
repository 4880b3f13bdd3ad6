//! Core types: condition words, tower identifiers, errors, RNG.

pub mod error;
pub mod ids;
pub mod rng;
pub mod word;

pub use error::ConfigError;
pub use ids::{TowerId, TowerSet, TOWER_COUNT};
pub use rng::{DeadtimeDraws, ScriptedDraws, TriggerRng, TriggerRngState};
pub use word::{bits, ConditionWord, WORD_COUNT};
