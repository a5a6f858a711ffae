//! The proximity-list collaborator named in the design (§6): "given a
//! coordinate and a radius, list stop points within it". Internals of a
//! production spatial index are out of scope; this is the trait the
//! path finder depends on, plus a small `RTree`-backed reference
//! implementation so the rest of the crate is exercisable standalone.

use geo::Point;
use rstar::{RTree, RTreeObject, AABB};

/// Index of a stop point into whatever table the caller maintains
/// (not interpreted by this crate).
pub type StopPointIdx = usize;

/// Anything that can answer "which stop points are within `meters` of
/// `coord`".
pub trait ProximityList {
    fn find_within(&self, coord: Point<f64>, meters: f64) -> Vec<(StopPointIdx, Point<f64>)>;
}

#[derive(Debug, Clone, Copy)]
struct IndexedStopPoint {
    idx: StopPointIdx,
    coord: Point<f64>,
}

impl RTreeObject for IndexedStopPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.coord.x(), self.coord.y()])
    }
}

impl rstar::PointDistance for IndexedStopPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        (self.coord.x() - point[0]).powi(2) + (self.coord.y() - point[1]).powi(2)
    }
}

/// Reference `ProximityList` over a fixed set of stop-point coordinates,
/// bulk-loaded into an `RTree` for range queries.
pub struct RTreeProximityList {
    tree: RTree<IndexedStopPoint>,
}

impl RTreeProximityList {
    #[must_use]
    pub fn build(stop_points: &[(StopPointIdx, Point<f64>)]) -> Self {
        let entries = stop_points
            .iter()
            .map(|&(idx, coord)| IndexedStopPoint { idx, coord })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }
}

impl ProximityList for RTreeProximityList {
    fn find_within(&self, coord: Point<f64>, meters: f64) -> Vec<(StopPointIdx, Point<f64>)> {
        use geo::HaversineDistance;

        // `rstar` range queries key on planar distance; the index is
        // bulk-loaded in lon/lat so a generous planar envelope is queried
        // first and then filtered by true geodesic distance.
        let degrees = meters / 111_000.0 * 1.5;
        let envelope = AABB::from_corners(
            [coord.x() - degrees, coord.y() - degrees],
            [coord.x() + degrees, coord.y() + degrees],
        );

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|p| coord.haversine_distance(&p.coord) <= meters)
            .map(|p| (p.idx, p.coord))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_points_within_radius() {
        let points = vec![
            (0, Point::new(0.0, 0.0)),
            (1, Point::new(0.0, 0.002)),  // ~222m north
            (2, Point::new(1.0, 1.0)),    // far away
        ];
        let list = RTreeProximityList::build(&points);

        let mut found = list.find_within(Point::new(0.0, 0.0), 300.0);
        found.sort_by_key(|(idx, _)| *idx);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 0);
        assert_eq!(found[1].0, 1);
    }

    #[test]
    fn empty_list_finds_nothing() {
        let list = RTreeProximityList::build(&[]);
        assert!(list.find_within(Point::new(0.0, 0.0), 1000.0).is_empty());
    }
}
