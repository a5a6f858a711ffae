//! Nearest-edge projection (§4.1): map an arbitrary coordinate onto the
//! nearest edge of a mode's sub-graph, producing the two incident vertices
//! and the geodesic distances from the projected point to each of them.

use geo::{prelude::*, Point};
use petgraph::graph::{EdgeIndex, NodeIndex};
use rstar::{RTree, RTreeObject, AABB};

use crate::graph::StreetGraph;

/// A projection lands closer to one of the two edge endpoints; this tags
/// which one, and doubles as the "which half of the stub" selector during
/// path reconstruction (§4.6) and target resolution (§4.3).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Source,
    Target,
}

impl Direction {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Source => Direction::Target,
            Direction::Target => Direction::Source,
        }
    }
}

/// A coordinate projected onto the nearest edge of a sub-graph (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionData {
    pub found: bool,
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub edge: EdgeIndex,
    pub projected: Point<f64>,
    pub real_coord: Point<f64>,
    /// Geodesic distance in meters from `projected` to `source` and to
    /// `target`, indexed by [`Direction`].
    pub distances: [f64; 2],
    pub way_idx: Option<usize>,
    pub geom_idx: Option<usize>,
    pub duration: f64,
}

impl ProjectionData {
    /// A projection that found nothing in range.
    #[must_use]
    pub fn not_found(real_coord: Point<f64>) -> Self {
        Self {
            found: false,
            source: NodeIndex::end(),
            target: NodeIndex::end(),
            edge: EdgeIndex::end(),
            projected: real_coord,
            real_coord,
            distances: [f64::INFINITY, f64::INFINITY],
            way_idx: None,
            geom_idx: None,
            duration: 0.0,
        }
    }

    #[must_use]
    pub fn distance(&self, dir: Direction) -> f64 {
        self.distances[dir as usize]
    }

    /// True when the projection coincides with the endpoint in `dir`
    /// (within 1 cm), per the on-node optimization in §4.1/§4.2.
    #[must_use]
    pub fn is_on_node(&self, dir: Direction) -> bool {
        self.distance(dir) < 0.01
    }
}

/// One entry of the edge spatial index: an edge's endpoints, kept as a flat
/// segment for `rstar`'s envelope/distance queries.
#[derive(Debug, Clone, Copy)]
struct IndexedEdge {
    edge: EdgeIndex,
    source: NodeIndex,
    target: NodeIndex,
    a: Point<f64>,
    b: Point<f64>,
}

impl RTreeObject for IndexedEdge {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.a.x().min(self.b.x()), self.a.y().min(self.b.y())],
            [self.a.x().max(self.b.x()), self.a.y().max(self.b.y())],
        )
    }
}

impl rstar::PointDistance for IndexedEdge {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (_, d2) = foot_and_sq_distance(self.a, self.b, Point::new(point[0], point[1]));
        d2
    }
}

/// Orthogonal projection of `p` onto segment `a`-`b` in the (lon, lat)
/// plane, clamped to the segment, plus the squared planar distance. Planar,
/// not latitude-corrected — matches the turn-angle computation's documented
/// limitation (§9).
fn foot_and_sq_distance(a: Point<f64>, b: Point<f64>, p: Point<f64>) -> (Point<f64>, f64) {
    let (ax, ay) = a.x_y();
    let (bx, by) = b.x_y();
    let (px, py) = p.x_y();

    let (dx, dy) = (bx - ax, by - ay);
    let len2 = dx * dx + dy * dy;

    let t = if len2 == 0.0 {
        0.0
    } else {
        (((px - ax) * dx) + ((py - ay) * dy)) / len2
    }
    .clamp(0.0, 1.0);

    let foot = Point::new(ax + t * dx, ay + t * dy);
    let sq_dist = (foot.x() - px).powi(2) + (foot.y() - py).powi(2);
    (foot, sq_dist)
}

/// Spatial index over one mode's edges, supporting nearest-edge projection.
pub struct EdgeIndex2D {
    tree: RTree<IndexedEdge>,
}

impl EdgeIndex2D {
    /// Build the index over every edge in `graph`. Graph construction is the
    /// build pipeline's responsibility; this just indexes what it's given.
    #[must_use]
    pub fn build(graph: &StreetGraph) -> Self {
        Self::build_filtered(graph, |_, _| true)
    }

    /// Build the index over the subset of `graph`'s edges whose endpoints
    /// both satisfy `keep` — used to scope the index to one mode's vertex
    /// range within the unified, offset-partitioned graph (§3).
    #[must_use]
    pub fn build_filtered(graph: &StreetGraph, keep: impl Fn(NodeIndex, NodeIndex) -> bool) -> Self {
        let entries: Vec<IndexedEdge> = graph
            .edge_indices()
            .filter_map(|e| {
                let (source, target) = graph.edge_endpoints(e)?;
                if !keep(source, target) {
                    return None;
                }
                let a = graph.node_weight(source)?.coord;
                let b = graph.node_weight(target)?.coord;
                Some(IndexedEdge {
                    edge: e,
                    source,
                    target,
                    a,
                    b,
                })
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Project `coord` onto the nearest indexed edge. `found = false` when
    /// the index is empty.
    #[must_use]
    pub fn project(&self, graph: &StreetGraph, coord: Point<f64>) -> ProjectionData {
        let Some(nearest) = self.tree.nearest_neighbor(&[coord.x(), coord.y()]) else {
            return ProjectionData::not_found(coord);
        };

        let (foot, _) = foot_and_sq_distance(nearest.a, nearest.b, coord);
        let dist_source = foot.haversine_distance(&nearest.a);
        let dist_target = foot.haversine_distance(&nearest.b);

        let weight = graph
            .edge_weight(nearest.edge)
            .expect("indexed edge must exist in the graph it was built from");

        ProjectionData {
            found: true,
            source: nearest.source,
            target: nearest.target,
            edge: nearest.edge,
            projected: foot,
            real_coord: coord,
            distances: [dist_source, dist_target],
            way_idx: weight.way_idx,
            geom_idx: weight.geom_idx,
            duration: weight.duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{StreetEdge, Vertex};
    use crate::mode::TransportCaracteristic;

    fn line_graph() -> StreetGraph {
        let mut g = StreetGraph::new();
        let a = g.add_node(Vertex::new(Point::new(0.0, 0.0)));
        let b = g.add_node(Vertex::new(Point::new(0.0, 0.001)));
        g.add_edge(
            a,
            b,
            StreetEdge::new(72.0, Some(0), Some(0), TransportCaracteristic::Walk),
        );
        g
    }

    #[test]
    fn projects_onto_segment_midpoint() {
        let g = line_graph();
        let idx = EdgeIndex2D::build(&g);
        let p = idx.project(&g, Point::new(0.0005, 0.0005));
        assert!(p.found);
        assert!(p.distance(Direction::Source) > 0.0);
        assert!(p.distance(Direction::Target) > 0.0);
    }

    #[test]
    fn projects_onto_vertex_when_coincident() {
        let g = line_graph();
        let idx = EdgeIndex2D::build(&g);
        let p = idx.project(&g, Point::new(0.0, 0.0));
        assert!(p.found);
        assert!(p.is_on_node(Direction::Source));
        assert!(!p.is_on_node(Direction::Target));
    }

    #[test]
    fn empty_index_is_not_found() {
        let g = StreetGraph::new();
        let idx = EdgeIndex2D::build(&g);
        let p = idx.project(&g, Point::new(1.0, 1.0));
        assert!(!p.found);
    }
}
