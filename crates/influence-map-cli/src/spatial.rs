use crate::scenario::Unit;
use rstar::{RTree, RTreeObject, AABB};

impl RTreeObject for Unit {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Build an R*-tree from units via bulk_load (O(n log n)).
pub fn build_index(units: &[Unit]) -> RTree<Unit> {
    RTree::bulk_load(units.to_vec())
}

/// Units within `radius` of `center`, paired with their distance.
/// Uses AABB envelope query then filters by Euclidean distance.
pub fn query_neighbors(tree: &RTree<Unit>, center: [f64; 2], radius: f64) -> Vec<(&Unit, f64)> {
    let envelope = AABB::from_corners(
        [center[0] - radius, center[1] - radius],
        [center[0] + radius, center[1] + radius],
    );

    tree.locate_in_envelope(&envelope)
        .map(|unit| {
            let dx = unit.position[0] - center[0];
            let dy = unit.position[1] - center[1];
            (unit, (dx * dx + dy * dy).sqrt())
        })
        .filter(|(_, d)| *d <= radius)
        .collect()
}
