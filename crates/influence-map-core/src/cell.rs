use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest supported grid side, in cells. Bounds the dense slot table.
pub const MAX_GRID_SIDE: u32 = 4096;

/// Packed tile coordinate: `y` in the high 32 bits, `x` in the low 32 bits.
///
/// The packing is a bijection over every `(u32, u32)` pair, so keys never
/// collide and the coordinates are always recoverable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellKey(u64);

impl CellKey {
    pub const fn from_xy(x: u32, y: u32) -> Self {
        Self(((y as u64) << 32) | x as u64)
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn x(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    pub const fn y(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub const fn xy(self) -> (u32, u32) {
        (self.x(), self.y())
    }

    /// True when the cell lies in `[0, width) × [0, height)`.
    pub fn in_bounds(self, width: u32, height: u32) -> bool {
        self.x() < width && self.y() < height
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}
