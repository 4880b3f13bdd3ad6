//! Anticoincidence-shield tile identifiers and hit bitmaps.

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// One face of the anticoincidence shield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShieldFace {
    /// Top face (25 tiles, 5x5).
    Top,
    /// -X side face.
    MinusX,
    /// -Y side face.
    MinusY,
    /// +X side face.
    PlusX,
    /// +Y side face.
    PlusY,
}

impl ShieldFace {
    /// Decode the telemetry face code (0=top, 1=-X, 2=-Y, 3=+X, 4=+Y).
    pub const fn from_code(code: u8) -> Result<Self, ConfigError> {
        match code {
            0 => Ok(ShieldFace::Top),
            1 => Ok(ShieldFace::MinusX),
            2 => Ok(ShieldFace::MinusY),
            3 => Ok(ShieldFace::PlusX),
            4 => Ok(ShieldFace::PlusY),
            _ => Err(ConfigError::BadFaceCode { code }),
        }
    }

    /// The telemetry face code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            ShieldFace::Top => 0,
            ShieldFace::MinusX => 1,
            ShieldFace::MinusY => 2,
            ShieldFace::PlusX => 3,
            ShieldFace::PlusY => 4,
        }
    }

    /// True for the four side faces.
    #[must_use]
    pub const fn is_side(self) -> bool {
        !matches!(self, ShieldFace::Top)
    }
}

/// A struck shield tile, face/row/column encoded as in the detector
/// identifier scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub face: ShieldFace,
    pub row: u8,
    pub column: u8,
}

impl TileId {
    /// Create a tile identifier.
    #[must_use]
    pub const fn new(face: ShieldFace, row: u8, column: u8) -> Self {
        Self { face, row, column }
    }

    /// Flatten to the per-face tile number used by the throttle masks.
    ///
    /// Top face: `(4 - column) * 5 + row`. Side faces: rows 0-2 are
    /// `row * 5 + column` (or mirrored in column for -X/+Y); the long
    /// bottom tile spanning row 3 is always number 15.
    #[must_use]
    pub const fn tile_number(self) -> u8 {
        match self.face {
            ShieldFace::Top => (4 - self.column) * 5 + self.row,
            ShieldFace::MinusY | ShieldFace::PlusX => {
                if self.row < 3 {
                    self.row * 5 + self.column
                } else {
                    15
                }
            }
            ShieldFace::MinusX | ShieldFace::PlusY => {
                if self.row < 3 {
                    self.row * 5 + (4 - self.column)
                } else {
                    15
                }
            }
        }
    }
}

/// Struck-tile bitmaps, packed the way the throttle masks are: one
/// 32-bit word for the top face, one per side plane with the "+" face
/// in the low 16 bits and the "-" face in the high 16 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBitmaps {
    pub top: u32,
    pub x: u32,
    pub y: u32,
}

impl TileBitmaps {
    /// Empty bitmaps.
    #[must_use]
    pub const fn new() -> Self {
        Self { top: 0, x: 0, y: 0 }
    }

    /// Build from a list of struck tiles.
    pub fn from_tiles<'a>(tiles: impl IntoIterator<Item = &'a TileId>) -> Self {
        let mut bitmaps = Self::new();
        for tile in tiles {
            bitmaps.insert(*tile);
        }
        bitmaps
    }

    /// Set the bit for a struck tile.
    pub fn insert(&mut self, tile: TileId) {
        let n = tile.tile_number();
        match tile.face {
            ShieldFace::Top => self.top |= 1 << n,
            ShieldFace::PlusX => self.x |= 1 << n,
            ShieldFace::MinusX => self.x |= 1 << (n + 16),
            ShieldFace::PlusY => self.y |= 1 << n,
            ShieldFace::MinusY => self.y |= 1 << (n + 16),
        }
    }

    /// True if no tile is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.top == 0 && self.x == 0 && self.y == 0
    }
}
