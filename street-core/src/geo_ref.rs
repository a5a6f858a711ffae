//! `GeoRef`: the aggregate that binds the graph, the ways table, the
//! per-mode vertex offsets, the transition-duration configuration, and the
//! per-stop-point projection cache. Everything the path finder needs to
//! run, bundled into one read-only, shareable struct (§6).

use geo::Point;
use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::graph::{StreetGraph, Way};
use crate::mode::{Mode, TransportCaracteristic};
use crate::projection::{EdgeIndex2D, ProjectionData};
use crate::proximity::StopPointIdx;

/// Configured durations for the four mode transitions (§6). The forward and
/// reverse transition of a pair (take/putback, leave/park) are allowed to
/// differ, which is why the arrival-direction adapter re-reads these rather
/// than negating a single stored value (§4.7).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDurations {
    pub bss_pickup: f64,
    pub bss_putback: f64,
    pub parking_leave: f64,
    pub parking_park: f64,
}

impl TransitionDurations {
    #[must_use]
    pub const fn duration_for(&self, caracteristic: TransportCaracteristic) -> f64 {
        match caracteristic {
            TransportCaracteristic::BssTake => self.bss_pickup,
            TransportCaracteristic::BssPutBack => self.bss_putback,
            TransportCaracteristic::CarLeaveParking => self.parking_leave,
            TransportCaracteristic::CarPark => self.parking_park,
            TransportCaracteristic::Walk
            | TransportCaracteristic::Bike
            | TransportCaracteristic::Car => 0.0,
        }
    }
}

impl Default for TransitionDurations {
    fn default() -> Self {
        Self {
            bss_pickup: 30.0,
            bss_putback: 45.0,
            parking_leave: 5.0,
            parking_park: 120.0,
        }
    }
}

/// Bundles everything the routing core needs as read-only, shared state.
pub struct GeoRef {
    graph: StreetGraph,
    ways: Vec<Way>,
    /// Vertex-index offset for each mode's sub-graph within the unified
    /// `graph` (§3).
    offsets: [usize; 4],
    pub durations: TransitionDurations,
    /// Nearest-edge spatial index, scoped to each mode's vertex range.
    edge_index: [EdgeIndex2D; 4],
    /// Precomputed projection of each stop point, by mode, so
    /// nearest-stop-points queries avoid projecting on the fly (§4.8).
    projected_stop_points: HashMap<StopPointIdx, [ProjectionData; 4]>,
}

impl GeoRef {
    /// `offsets` must partition `graph`'s vertex indices: mode `m`'s
    /// vertices are `[offsets[m], offsets[m] + vertices_per_mode)`.
    #[must_use]
    pub fn new(
        graph: StreetGraph,
        ways: Vec<Way>,
        offsets: [usize; 4],
        vertices_per_mode: usize,
        durations: TransitionDurations,
    ) -> Self {
        let edge_index = std::array::from_fn(|m| {
            let lo = offsets[m];
            let hi = offsets[m] + vertices_per_mode;
            EdgeIndex2D::build_filtered(&graph, move |source, target| {
                (lo..hi).contains(&source.index()) && (lo..hi).contains(&target.index())
            })
        });

        Self {
            graph,
            ways,
            offsets,
            durations,
            edge_index,
            projected_stop_points: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &StreetGraph {
        &self.graph
    }

    #[must_use]
    pub fn way(&self, idx: usize) -> Option<&Way> {
        self.ways.get(idx)
    }

    #[must_use]
    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    #[must_use]
    pub const fn offset(&self, mode: Mode) -> usize {
        self.offsets[mode.index()]
    }

    #[must_use]
    pub fn get_caracteristic(&self, edge: EdgeIndex) -> Option<TransportCaracteristic> {
        self.graph.edge_weight(edge).map(|e| e.caracteristic)
    }

    /// Project `coord` onto the nearest edge of `mode`'s sub-graph (§4.1).
    #[must_use]
    pub fn project(&self, coord: Point<f64>, mode: Mode) -> ProjectionData {
        self.edge_index[mode.index()].project(&self.graph, coord)
    }

    /// Look up a stop point's precomputed projection for `mode`, if the
    /// cache has been populated for it (§4.8, §6).
    #[must_use]
    pub fn cached_projection(&self, stop: StopPointIdx, mode: Mode) -> Option<&ProjectionData> {
        self.projected_stop_points
            .get(&stop)
            .map(|per_mode| &per_mode[mode.index()])
    }

    /// Populate the projection cache for one stop point across all modes.
    /// Ordinarily done once, ahead of any queries, by the build pipeline.
    pub fn cache_stop_point_projection(&mut self, stop: StopPointIdx, coord: Point<f64>) {
        let projections = std::array::from_fn(|m| self.project(coord, Mode::ALL[m]));
        self.projected_stop_points.insert(stop, projections);
    }

    #[must_use]
    pub fn vertex_in_mode(&self, idx: NodeIndex, mode: Mode) -> bool {
        let base = self.offset(mode);
        idx.index() >= base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{StreetEdge, Vertex};

    fn tiny_georef() -> GeoRef {
        let mut graph = StreetGraph::new();
        let a = graph.add_node(Vertex::new(Point::new(0.0, 0.0)));
        let b = graph.add_node(Vertex::new(Point::new(0.0, 0.001)));
        graph.add_edge(
            a,
            b,
            StreetEdge::new(72.0, Some(0), Some(0), TransportCaracteristic::Walk),
        );
        graph.add_edge(
            b,
            a,
            StreetEdge::new(72.0, Some(0), Some(0), TransportCaracteristic::Walk),
        );

        GeoRef::new(graph, vec![], [0, 2, 4, 6], 2, TransitionDurations::default())
    }

    #[test]
    fn projects_within_mode_offset_range() {
        let georef = tiny_georef();
        let p = georef.project(Point::new(0.0, 0.0005), Mode::Walking);
        assert!(p.found);
    }

    #[test]
    fn transition_durations_differ_by_direction() {
        let durations = TransitionDurations::default();
        assert_ne!(
            durations.duration_for(TransportCaracteristic::BssTake),
            durations.duration_for(TransportCaracteristic::BssPutBack)
        );
    }
}
