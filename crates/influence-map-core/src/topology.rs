use crate::cell::CellKey;
use crate::kernel::KERNEL_OFFSETS;

const NO_SLOT: u32 = u32::MAX;

/// Orthogonal offsets: N, S, E, W.
pub const ORTHOGONAL_OFFSETS: [(i64, i64); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// Registered cells of a grid and their neighborhood lookup.
///
/// Cells get dense slots `0..n` in registration order; a `width × height`
/// table maps coordinates back to slots.
#[derive(Clone, Debug)]
pub struct Layout {
    width: u32,
    height: u32,
    cells: Vec<CellKey>,
    slot_of: Vec<u32>,
}

impl Layout {
    /// Caller guarantees every key is in bounds and `width * height` fits the
    /// slot table. Duplicate keys keep their first slot.
    pub(crate) fn new(width: u32, height: u32, keys: impl IntoIterator<Item = CellKey>) -> Self {
        let mut slot_of = vec![NO_SLOT; width as usize * height as usize];
        let mut cells = Vec::new();
        for key in keys {
            let idx = key.y() as usize * width as usize + key.x() as usize;
            if slot_of[idx] == NO_SLOT {
                slot_of[idx] = cells.len() as u32;
                cells.push(key);
            }
        }
        Self {
            width,
            height,
            cells,
            slot_of,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[CellKey] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn slot(&self, key: CellKey) -> Option<usize> {
        if !key.in_bounds(self.width, self.height) {
            return None;
        }
        self.slot_at(key.x() as i64, key.y() as i64)
    }

    /// Slot of the registered cell at `(x, y)`, or `None` when the position
    /// is outside the grid or was never registered.
    pub fn slot_at(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        match self.slot_of[y as usize * self.width as usize + x as usize] {
            NO_SLOT => None,
            slot => Some(slot as usize),
        }
    }

    /// Neighbor slots of `slot` in kernel index order, center included.
    pub fn kernel_neighbors(&self, slot: usize) -> [Option<usize>; 9] {
        self.offsets_from(slot, &KERNEL_OFFSETS)
    }

    /// Registered N, S, E, W neighbors of `slot`.
    pub fn orthogonal_neighbors(&self, slot: usize) -> [Option<usize>; 4] {
        self.offsets_from(slot, &ORTHOGONAL_OFFSETS)
    }

    fn offsets_from<const N: usize>(
        &self,
        slot: usize,
        offsets: &[(i64, i64); N],
    ) -> [Option<usize>; N] {
        let (x, y) = self.cells[slot].xy();
        let mut out = [None; N];
        for (dst, &(dx, dy)) in out.iter_mut().zip(offsets.iter()) {
            *dst = self.slot_at(x as i64 + dx, y as i64 + dy);
        }
        out
    }
}
