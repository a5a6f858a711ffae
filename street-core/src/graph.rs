//! The street graph: an immutable directed multigraph over [`petgraph`],
//! plus the `Way` table edges reference for display names and polyline
//! geometry.

use std::ops::{Deref, DerefMut};

use geo::{LineString, Point};
use petgraph::graph::DiGraph;

use crate::mode::TransportCaracteristic;

/// A named street. Edges reference a way by index; several edges (and
/// several directions) may share one way.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub name: String,
    /// Polyline geometries belonging to this way, indexed by an edge's
    /// `geom_idx`.
    pub geometries: Vec<LineString<f64>>,
}

/// A graph vertex: just a coordinate. Stop points, bike-share stations, and
/// parking lots are external concepts resolved through projection and the
/// proximity list, not separate vertex kinds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub coord: Point<f64>,
}

impl Vertex {
    #[must_use]
    pub const fn new(coord: Point<f64>) -> Self {
        Self { coord }
    }
}

/// A directed edge: a travel-time cost plus the way/geometry it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetEdge {
    /// Travel duration in seconds at the edge's reference speed.
    pub duration: f64,
    pub way_idx: Option<usize>,
    pub geom_idx: Option<usize>,
    pub caracteristic: TransportCaracteristic,
}

impl StreetEdge {
    #[must_use]
    pub const fn new(
        duration: f64,
        way_idx: Option<usize>,
        geom_idx: Option<usize>,
        caracteristic: TransportCaracteristic,
    ) -> Self {
        Self {
            duration,
            way_idx,
            geom_idx,
            caracteristic,
        }
    }

    /// A zero-geometry transition edge (bike pickup/putback, car park/leave)
    /// with a fixed configured duration.
    #[must_use]
    pub const fn transition(duration: f64, caracteristic: TransportCaracteristic) -> Self {
        Self::new(duration, None, None, caracteristic)
    }
}

/// The unified street graph, backed by [`petgraph::graph::DiGraph`].
///
/// Wrapped (rather than used directly) so callers get the crate's own
/// construction helpers while still having full access to every `DiGraph`
/// method through `Deref`/`DerefMut`.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    graph: DiGraph<Vertex, StreetEdge>,
}

impl StreetGraph {
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
        }
    }

    #[must_use]
    pub const fn from_parts(graph: DiGraph<Vertex, StreetEdge>) -> Self {
        Self { graph }
    }

    #[must_use]
    pub const fn inner(&self) -> &DiGraph<Vertex, StreetEdge> {
        &self.graph
    }
}

impl Default for StreetGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for StreetGraph {
    type Target = DiGraph<Vertex, StreetEdge>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl DerefMut for StreetGraph {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_digraph_operations() {
        let mut g = StreetGraph::new();
        let a = g.add_node(Vertex::new(Point::new(0.0, 0.0)));
        let b = g.add_node(Vertex::new(Point::new(1.0, 1.0)));
        g.add_edge(
            a,
            b,
            StreetEdge::new(10.0, Some(0), Some(0), TransportCaracteristic::Walk),
        );

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.find_edge(a, b).is_some());
    }
}
