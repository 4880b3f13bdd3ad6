//! Per-event input assembled by the subsystem decoders.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ConditionWord, TowerSet};
use crate::throttle::TileId;

/// Everything the decision pipeline consumes for one event.
///
/// Absent subsystem input is zero bits and empty lists, never an error.
/// Events must be offered in non-decreasing timestamp order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventInput {
    /// Event timestamp in seconds.
    pub time: f64,

    /// Condition bits contributed by the subsystem decoders.
    pub condition: ConditionWord,

    /// Towers reporting a tracker three-in-a-row coincidence.
    pub triggered_towers: TowerSet,

    /// Shield tiles above veto threshold.
    pub tiles: SmallVec<[TileId; 8]>,

    /// Hardware condition summary present in replayed data. When set it
    /// is authoritative; a disagreement with the recomputed word is a
    /// diagnostic only.
    pub replay_summary: Option<u8>,
}

impl EventInput {
    /// Event at the given timestamp with no subsystem input.
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Set the decoded condition bits.
    #[must_use]
    pub fn with_condition(mut self, condition: ConditionWord) -> Self {
        self.condition = condition;
        self
    }

    /// Set additional condition bits (periodic/solicited/external).
    #[must_use]
    pub fn with_bits(mut self, mask: u8) -> Self {
        self.condition = self.condition.with(mask);
        self
    }

    /// Set the triggered-tower mask.
    #[must_use]
    pub fn with_towers(mut self, towers: TowerSet) -> Self {
        self.triggered_towers = towers;
        self
    }

    /// Add one struck shield tile.
    #[must_use]
    pub fn with_tile(mut self, tile: TileId) -> Self {
        self.tiles.push(tile);
        self
    }

    /// Add struck shield tiles.
    #[must_use]
    pub fn with_tiles(mut self, tiles: impl IntoIterator<Item = TileId>) -> Self {
        self.tiles.extend(tiles);
        self
    }

    /// Attach the replayed hardware condition summary.
    #[must_use]
    pub fn with_replay_summary(mut self, summary: u8) -> Self {
        self.replay_summary = Some(summary);
        self
    }
}
