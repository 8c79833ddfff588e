use crate::cell::CellKey;

/// Supplies the fresh base influence of a cell for one tick.
///
/// Implementations should be pure functions of `(cell, snapshot)`; the grid
/// only produces reproducible fields when they are.
pub trait BaseInfluence<S: ?Sized> {
    fn base_influence(&self, cell: CellKey, snapshot: &S) -> f64;
}

impl<S: ?Sized, F> BaseInfluence<S> for F
where
    F: Fn(CellKey, &S) -> f64,
{
    fn base_influence(&self, cell: CellKey, snapshot: &S) -> f64 {
        self(cell, snapshot)
    }
}

/// Source that never injects anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInjection;

impl<S: ?Sized> BaseInfluence<S> for NoInjection {
    fn base_influence(&self, _cell: CellKey, _snapshot: &S) -> f64 {
        0.0
    }
}
