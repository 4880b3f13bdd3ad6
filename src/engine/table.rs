//! Priority-ordered engine tables with a precomputed dispatch cache.
//!
//! A table is an ordered list of [`ConditionEngine`]s; list position is
//! priority. At construction every one of the 256 possible condition
//! words is resolved to the first matching engine and cached, so the
//! per-event path is a single array lookup. A word no engine matches is
//! a configuration error: well-formed tables end in don't-care
//! catch-alls.

use serde::{Deserialize, Serialize};

use crate::core::{ConditionWord, ConfigError, WORD_COUNT};

use super::condition::ConditionEngine;

/// The canonical default table: 12 rules in fixed priority order, most
/// significant bit first (`Ext solic period CNO CALHI CALLO TKR ROI`).
///
/// Priority runs: reserved-bit pass-throughs, ROI without track, the CNO
/// rules, CAL-HI, track without ROI, the remaining low-bit combinations,
/// and last a pure-CAL-LO rule that the default prescales veto outright.
/// This is configuration data; do not re-derive it.
pub const DEFAULT_PATTERNS: [&str; 12] = [
    "1 x x x x x x x", //  0: external
    "0 1 x x x x x x", //  1: solicited
    "0 0 1 x x x x x", //  2: periodic
    "0 x x x x x 0 1", //  3: ROI without track
    "0 0 0 1 x 1 1 1", //  4: CNO + CAL-LO + track + ROI
    "0 0 0 1 x x x x", //  5: CNO, anything else
    "0 0 0 0 1 x x x", //  6: CAL-HI
    "0 0 0 0 0 x 1 0", //  7: track without ROI
    "0 0 0 0 0 1 1 1", //  8: CAL-LO + track + ROI
    "0 0 0 0 0 0 0 0", //  9: nothing set
    "0 0 0 0 0 0 1 1", // 10: track + ROI
    "0 0 0 0 0 1 0 0", // 11: pure CAL-LO
];

/// Default per-engine prescales matching [`DEFAULT_PATTERNS`] by index.
pub const DEFAULT_PRESCALES: [i32; 12] = [0, 0, 0, 0, 0, 249, 0, 0, 0, 0, 49, -1];

/// Ordered collection of engines plus the 256-entry dispatch cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineTable {
    engines: Vec<ConditionEngine>,
    /// Word -> index of the first matching engine.
    dispatch: Vec<u8>,
}

impl EngineTable {
    /// Build a table from an ordered engine list, computing the dispatch
    /// cache. Fails if the list is empty or leaves any word uncovered.
    pub fn from_engines(engines: Vec<ConditionEngine>) -> Result<Self, ConfigError> {
        if engines.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        let mut dispatch = Vec::with_capacity(WORD_COUNT);
        for word in ConditionWord::all() {
            let index = engines
                .iter()
                .position(|engine| engine.matches(word))
                .ok_or(ConfigError::UncoveredWord { word: word.raw() })?;
            dispatch.push(index as u8);
        }
        Ok(Self { engines, dispatch })
    }

    /// Build a table from pattern strings and matching prescales; the
    /// marker of each engine is its priority index.
    pub fn from_patterns(patterns: &[&str], prescales: &[i32]) -> Result<Self, ConfigError> {
        if prescales.len() < patterns.len() {
            return Err(ConfigError::ListTooShort {
                what: "prescale",
                need: patterns.len(),
                got: prescales.len(),
            });
        }
        let engines = patterns
            .iter()
            .zip(prescales)
            .enumerate()
            .map(|(i, (pattern, &prescale))| ConditionEngine::parse(pattern, i as u8, prescale))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_engines(engines)
    }

    /// The canonical default table with its default prescales.
    #[must_use]
    pub fn default_table() -> Self {
        Self::from_patterns(&DEFAULT_PATTERNS, &DEFAULT_PRESCALES)
            .expect("default trigger table is well formed")
    }

    /// Run the matched engine's prescale check for `word`; returns the
    /// engine's marker when it fires.
    pub fn check(&mut self, word: ConditionWord) -> Option<u8> {
        let index = self.dispatch[word.raw() as usize] as usize;
        self.engines[index].check()
    }

    /// Priority index of the engine matching `word`.
    #[must_use]
    pub fn engine_number(&self, word: ConditionWord) -> usize {
        self.dispatch[word.raw() as usize] as usize
    }

    /// The engine matching `word`.
    #[must_use]
    pub fn engine(&self, word: ConditionWord) -> &ConditionEngine {
        &self.engines[self.engine_number(word)]
    }

    /// Zero every engine's scaler.
    pub fn reset(&mut self) {
        for engine in &mut self.engines {
            engine.reset();
        }
    }

    /// Number of engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// True if the table holds no engines (never true after construction).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Iterate engines in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &ConditionEngine> {
        self.engines.iter()
    }
}

impl Default for EngineTable {
    fn default() -> Self {
        Self::default_table()
    }
}

impl std::fmt::Display for EngineTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "num    Ext    solic  period CNO    CALHI  CALLO  TKR    ROI    prescale"
        )?;
        for (i, engine) in self.engines.iter().enumerate() {
            writeln!(f, "{:<7}{}{}", i, engine, engine.prescale())?;
        }
        Ok(())
    }
}
