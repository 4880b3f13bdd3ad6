//! Spatial shield-veto (ROI) computation.

pub mod map;
pub mod tile;

pub use map::{RoiResult, ThrottleMap, TowerMasks, THREE_ROW_MASKS, TWO_ROW_MASKS};
pub use tile::{ShieldFace, TileBitmaps, TileId};
