//! Trigger engines: ternary condition rules, priority tables, prescaling.

pub mod condition;
pub mod prescale;
pub mod strategy;
pub mod table;

pub use condition::{BitCheck, ConditionEngine};
pub use prescale::{PrescaleCounter, ENGINE_SLOTS};
pub use strategy::{build_strategy, CountdownStrategy, DecisionStrategy, TableStrategy};
pub use table::{EngineTable, DEFAULT_PATTERNS, DEFAULT_PRESCALES};
