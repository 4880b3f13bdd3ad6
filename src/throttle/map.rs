//! Tower-to-shield-tile adjacency masks and the ROI computation.
//!
//! Each of the 16 tracker towers is shadowed by a fixed set of shield
//! tiles: a patch of the top face plus, for edge and corner towers, the
//! upper rows of the adjacent side faces. The masks are packed exactly
//! like [`TileBitmaps`]: top-face tiles in one word, side tiles with
//! the "+" face in the low 16 bits and the "-" face in the high 16
//! bits. A trigger spatially coincident with a struck tile raises the
//! throttle.

use serde::{Deserialize, Serialize};

use crate::config::RoiCoverage;
use crate::core::{TowerId, TowerSet, TOWER_COUNT};

use super::tile::TileBitmaps;

/// Adjacency masks for one tower: top face, X-side plane, Y-side plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerMasks {
    pub top: u32,
    pub x: u32,
    pub y: u32,
}

impl TowerMasks {
    /// True if any struck tile falls inside this tower's shadow.
    #[must_use]
    pub const fn intersects(&self, tiles: &TileBitmaps) -> bool {
        (self.top & tiles.top) != 0 || (self.x & tiles.x) != 0 || (self.y & tiles.y) != 0
    }
}

const fn masks(top: u32, x: u32, y: u32) -> TowerMasks {
    TowerMasks { top, x, y }
}

/// Flight coverage: the top face plus the top two side rows, up to 12
/// tiles per tower. Literal configuration data; do not re-derive.
pub const TWO_ROW_MASKS: [TowerMasks; TOWER_COUNT] = [
    masks(0x0031_8000, 0x0318_0000, 0x0063_0000), //  0: -X/-Y corner
    masks(0x0001_8C00, 0x0000_0000, 0x00C6_0000), //  1: -Y edge
    masks(0x0000_0C60, 0x0000_0000, 0x018C_0000), //  2: -Y edge
    masks(0x0000_0063, 0x0000_0063, 0x0318_0000), //  3: +X/-Y corner
    masks(0x0063_0000, 0x018C_0000, 0x0000_0000), //  4: -X edge
    masks(0x0003_1800, 0x0000_0000, 0x0000_0000), //  5: center
    masks(0x0000_18C0, 0x0000_0000, 0x0000_0000), //  6: center
    masks(0x0000_00C6, 0x0000_00C6, 0x0000_0000), //  7: +X edge
    masks(0x00C6_0000, 0x00C6_0000, 0x0000_0000), //  8: -X edge
    masks(0x0006_3000, 0x0000_0000, 0x0000_0000), //  9: center
    masks(0x0000_3180, 0x0000_0000, 0x0000_0000), // 10: center
    masks(0x0000_018C, 0x0000_018C, 0x0000_0000), // 11: +X edge
    masks(0x018C_0000, 0x0063_0000, 0x0000_0318), // 12: -X/+Y corner
    masks(0x000C_6000, 0x0000_0000, 0x0000_018C), // 13: +Y edge
    masks(0x0000_6300, 0x0000_0000, 0x0000_00C6), // 14: +Y edge
    masks(0x0000_0318, 0x0000_0318, 0x0000_0063), // 15: +X/+Y corner
];

/// Wider coverage variant: the top face plus the top three side rows,
/// up to 16 tiles per tower.
pub const THREE_ROW_MASKS: [TowerMasks; TOWER_COUNT] = [
    masks(0x0031_8000, 0x6318_0000, 0x0C63_0000),
    masks(0x0001_8C00, 0x0000_0000, 0x18C6_0000),
    masks(0x0000_0C60, 0x0000_0000, 0x318C_0000),
    masks(0x0000_0063, 0x0000_0C63, 0x6318_0000),
    masks(0x0063_0000, 0x318C_0000, 0x0000_0000),
    masks(0x0003_1800, 0x0000_0000, 0x0000_0000),
    masks(0x0000_18C0, 0x0000_0000, 0x0000_0000),
    masks(0x0000_00C6, 0x0000_18C6, 0x0000_0000),
    masks(0x00C6_0000, 0x18C6_0000, 0x0000_0000),
    masks(0x0006_3000, 0x0000_0000, 0x0000_0000),
    masks(0x0000_3180, 0x0000_0000, 0x0000_0000),
    masks(0x0000_018C, 0x0000_318C, 0x0000_0000),
    masks(0x018C_0000, 0x0C63_0000, 0x0000_6318),
    masks(0x000C_6000, 0x0000_0000, 0x0000_318C),
    masks(0x0000_6300, 0x0000_0000, 0x0000_18C6),
    masks(0x0000_0318, 0x0000_6318, 0x0000_0C63),
];

/// Outcome of the ROI computation: the aggregate throttle bit plus the
/// per-tower veto set downstream consumers need.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiResult {
    /// Any triggered tower was adjacent to a struck tile.
    pub throttled: bool,
    /// Exactly which triggered towers were.
    pub towers: TowerSet,
}

/// Static tower-to-tile adjacency table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleMap {
    coverage: RoiCoverage,
}

impl ThrottleMap {
    /// Select a coverage variant.
    #[must_use]
    pub const fn new(coverage: RoiCoverage) -> Self {
        Self { coverage }
    }

    /// The active coverage variant.
    #[must_use]
    pub const fn coverage(&self) -> RoiCoverage {
        self.coverage
    }

    /// Adjacency masks for one tower.
    #[must_use]
    pub fn tower_masks(&self, tower: TowerId) -> &'static TowerMasks {
        let table = match self.coverage {
            RoiCoverage::TwoRow => &TWO_ROW_MASKS,
            RoiCoverage::ThreeRow => &THREE_ROW_MASKS,
        };
        &table[tower.index()]
    }

    /// Check every triggered tower against the struck-tile bitmaps.
    ///
    /// All triggered towers are visited; the result carries both the
    /// aggregate bit and the full vetoed-tower set.
    #[must_use]
    pub fn roi(&self, triggered: TowerSet, tiles: &TileBitmaps) -> RoiResult {
        let mut vetoed = TowerSet::default();
        if tiles.is_empty() {
            return RoiResult::default();
        }
        for tower in triggered.iter() {
            if self.tower_masks(tower).intersects(tiles) {
                vetoed.insert(tower);
            }
        }
        RoiResult {
            throttled: !vetoed.is_empty(),
            towers: vetoed,
        }
    }
}

impl Default for ThrottleMap {
    fn default() -> Self {
        Self::new(RoiCoverage::TwoRow)
    }
}
