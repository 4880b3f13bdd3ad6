//! Selectable decision strategies.
//!
//! The pipeline supports two configuration-source paths with deliberately
//! different prescale semantics:
//!
//! - [`TableStrategy`]: a compiled priority table whose engines count
//!   matched events up to their prescale ([`ConditionEngine::check`]).
//! - [`CountdownStrategy`]: hardware-style down-counters reloaded on
//!   underflow from the live configuration
//!   ([`PrescaleCounter::decrement_and_check`]), honoring per-engine
//!   inhibit flags.
//!
//! Both sit behind [`DecisionStrategy`]; the pipeline picks one from
//! [`StrategyKind`] at construction.
//!
//! [`ConditionEngine::check`]: super::condition::ConditionEngine::check
//! [`PrescaleCounter::decrement_and_check`]: super::prescale::PrescaleCounter::decrement_and_check

use crate::config::{StrategyKind, TriggerConfig};
use crate::core::{ConditionWord, ConfigError};

use super::prescale::PrescaleCounter;
use super::table::EngineTable;

/// A prescaled accept/reject decision over condition words.
pub trait DecisionStrategy {
    /// Decide whether an event with this condition word passes.
    fn decide(&mut self, word: ConditionWord) -> bool;

    /// Priority index of the engine that handles this word.
    fn engine_number(&self, word: ConditionWord) -> usize;

    /// Whether the engine handling this word forces a long (four-range)
    /// readout.
    fn four_range(&self, word: ConditionWord) -> bool;

    /// Zero all prescale state.
    fn reset(&mut self);

    /// React to a configuration swap. Prescale state resets; dispatch
    /// tables are rebuilt where they derive from the configuration.
    fn on_config_change(&mut self, config: &TriggerConfig) -> Result<(), ConfigError>;
}

/// Compiled-table path: engine scalers count matched events.
#[derive(Clone, Debug)]
pub struct TableStrategy {
    table: EngineTable,
}

impl TableStrategy {
    /// Build from a configuration's engine definitions.
    pub fn new(config: &TriggerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            table: config.build_table()?,
        })
    }

    /// Wrap an existing table.
    #[must_use]
    pub fn from_table(table: EngineTable) -> Self {
        Self { table }
    }

    /// The underlying table.
    #[must_use]
    pub fn table(&self) -> &EngineTable {
        &self.table
    }
}

impl DecisionStrategy for TableStrategy {
    fn decide(&mut self, word: ConditionWord) -> bool {
        self.table.check(word).is_some()
    }

    fn engine_number(&self, word: ConditionWord) -> usize {
        self.table.engine_number(word)
    }

    fn four_range(&self, word: ConditionWord) -> bool {
        self.table.engine(word).four_range()
    }

    fn reset(&mut self) {
        self.table.reset();
    }

    fn on_config_change(&mut self, config: &TriggerConfig) -> Result<(), ConfigError> {
        self.table = config.build_table()?;
        Ok(())
    }
}

/// Configuration-service path: down-counters reloaded on underflow.
#[derive(Clone, Debug)]
pub struct CountdownStrategy {
    table: EngineTable,
    counter: PrescaleCounter,
    config: TriggerConfig,
}

impl CountdownStrategy {
    /// Build from a configuration, with an optional override prescale
    /// list (empty means use the configuration's prescales).
    pub fn new(config: &TriggerConfig, overrides: Vec<i32>) -> Result<Self, ConfigError> {
        Ok(Self {
            table: config.build_table()?,
            counter: PrescaleCounter::new(overrides)?,
            config: config.clone(),
        })
    }
}

impl DecisionStrategy for CountdownStrategy {
    fn decide(&mut self, word: ConditionWord) -> bool {
        self.counter
            .decrement_and_check(word, &self.table, &self.config)
    }

    fn engine_number(&self, word: ConditionWord) -> usize {
        self.table.engine_number(word)
    }

    fn four_range(&self, word: ConditionWord) -> bool {
        self.table.engine(word).four_range()
    }

    fn reset(&mut self) {
        self.counter.reset();
    }

    fn on_config_change(&mut self, config: &TriggerConfig) -> Result<(), ConfigError> {
        self.table = config.build_table()?;
        self.config = config.clone();
        self.counter.reset();
        Ok(())
    }
}

/// Build the strategy a configuration selects.
pub fn build_strategy(
    config: &TriggerConfig,
    overrides: Vec<i32>,
) -> Result<Box<dyn DecisionStrategy + Send>, ConfigError> {
    match config.strategy {
        StrategyKind::Table => Ok(Box::new(TableStrategy::new(config)?)),
        StrategyKind::Countdown => Ok(Box::new(CountdownStrategy::new(config, overrides)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bits;

    #[test]
    fn test_table_strategy_worked_examples() {
        let config = TriggerConfig::default_flight();
        let mut strategy = TableStrategy::new(&config).unwrap();

        let vetoed = ConditionWord::new(bits::CAL_LO);
        let open = ConditionWord::new(bits::ROI | bits::TRACK | bits::CAL_LO);
        for _ in 0..10 {
            assert!(!strategy.decide(vetoed));
            assert!(strategy.decide(open));
        }
        assert_eq!(strategy.engine_number(vetoed), 11);
        assert_eq!(strategy.engine_number(open), 8);
    }

    #[test]
    fn test_strategies_agree_on_engine_numbers() {
        let config = TriggerConfig::default_flight();
        let table = TableStrategy::new(&config).unwrap();
        let countdown = CountdownStrategy::new(&config, Vec::new()).unwrap();
        for word in ConditionWord::all() {
            assert_eq!(
                table.engine_number(word),
                countdown.engine_number(word),
                "word {word}"
            );
        }
    }

    #[test]
    fn test_strategies_differ_in_phase_not_rate() {
        // Same prescale-49 engine: the table path fires first on call 50,
        // the countdown path also on call 50, but after a reset mid-period
        // both restart. The semantics stay separate implementations.
        let config = TriggerConfig::default_flight();
        let mut table = TableStrategy::new(&config).unwrap();
        let mut countdown = CountdownStrategy::new(&config, Vec::new()).unwrap();
        let word = ConditionWord::new(bits::ROI | bits::TRACK);

        let table_fires: Vec<u32> = (1..=100u32).filter(|_| table.decide(word)).collect();
        let countdown_fires = (1..=100u32)
            .filter(|_| countdown.decide(word))
            .count();
        assert_eq!(table_fires.len(), 2);
        assert_eq!(countdown_fires, 2);
    }

    #[test]
    fn test_build_strategy_respects_kind() {
        let mut config = TriggerConfig::default_flight();
        config.strategy = StrategyKind::Table;
        let mut strategy = build_strategy(&config, Vec::new()).unwrap();
        assert!(strategy.decide(ConditionWord::new(bits::CAL_HI)));

        config.strategy = StrategyKind::Countdown;
        let mut strategy = build_strategy(&config, Vec::new()).unwrap();
        assert!(strategy.decide(ConditionWord::new(bits::CAL_HI)));
    }

    #[test]
    fn test_config_change_resets_countdown() {
        let config = TriggerConfig::default_flight();
        let mut strategy = CountdownStrategy::new(&config, Vec::new()).unwrap();
        let word = ConditionWord::new(bits::ROI | bits::TRACK);
        for _ in 0..30 {
            strategy.decide(word);
        }
        strategy.on_config_change(&config).unwrap();
        // Full period again after the reset.
        for call in 1..=50u32 {
            let fired = strategy.decide(word);
            assert_eq!(fired, call == 50, "call {call}");
        }
    }
}
