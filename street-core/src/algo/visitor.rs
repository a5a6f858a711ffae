//! Pluggable Dijkstra termination (§4.2, §9). The original engine unwinds
//! the search with a thrown `DestinationFound` exception when a visitor's
//! condition is met; here the same three policies are expressed as a small
//! trait returning [`ControlFlow`], polled once per finished vertex.

use std::ops::ControlFlow;

use hashbrown::HashSet;
use petgraph::graph::NodeIndex;

/// Inspects each vertex as Dijkstra finishes it (assigns its final
/// distance) and decides whether the search should stop.
pub trait Visitor {
    /// Called with the vertex just finished and its final distance.
    /// Returning `ControlFlow::Break(())` stops the search immediately;
    /// the partial `distances`/`predecessors` arrays remain valid for every
    /// vertex already finished.
    fn finish(&mut self, vertex: NodeIndex, distance: f64) -> ControlFlow<()>;
}

/// Stops once the finished vertex's distance exceeds `radius` (§4.2.1).
/// Since Dijkstra finishes vertices in non-decreasing distance order, this
/// is equivalent to "every remaining vertex is also out of radius".
pub struct DistanceVisitor {
    pub radius: f64,
}

impl Visitor for DistanceVisitor {
    fn finish(&mut self, _vertex: NodeIndex, distance: f64) -> ControlFlow<()> {
        if distance > self.radius {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Stops once every vertex in the target set has been finished (§4.2.2).
pub struct TargetAllVisitor {
    remaining: HashSet<NodeIndex>,
}

impl TargetAllVisitor {
    #[must_use]
    pub fn new(targets: impl IntoIterator<Item = NodeIndex>) -> Self {
        Self {
            remaining: targets.into_iter().collect(),
        }
    }
}

impl Visitor for TargetAllVisitor {
    fn finish(&mut self, vertex: NodeIndex, _distance: f64) -> ControlFlow<()> {
        self.remaining.remove(&vertex);
        if self.remaining.is_empty() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Stops on whichever of the radius cutoff or the target set condition
/// triggers first (§4.2.3).
pub struct DistanceOrTargetVisitor {
    distance: DistanceVisitor,
    target: TargetAllVisitor,
}

impl DistanceOrTargetVisitor {
    #[must_use]
    pub fn new(radius: f64, targets: impl IntoIterator<Item = NodeIndex>) -> Self {
        Self {
            distance: DistanceVisitor { radius },
            target: TargetAllVisitor::new(targets),
        }
    }
}

impl Visitor for DistanceOrTargetVisitor {
    fn finish(&mut self, vertex: NodeIndex, distance: f64) -> ControlFlow<()> {
        self.distance.finish(vertex, distance)?;
        self.target.finish(vertex, distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: u32) -> NodeIndex {
        NodeIndex::new(i as usize)
    }

    #[test]
    fn distance_visitor_stops_past_radius() {
        let mut v = DistanceVisitor { radius: 100.0 };
        assert_eq!(v.finish(n(0), 50.0), ControlFlow::Continue(()));
        assert_eq!(v.finish(n(1), 100.0), ControlFlow::Continue(()));
        assert_eq!(v.finish(n(2), 100.1), ControlFlow::Break(()));
    }

    #[test]
    fn target_all_visitor_stops_when_drained() {
        let mut v = TargetAllVisitor::new([n(1), n(2)]);
        assert_eq!(v.finish(n(0), 1.0), ControlFlow::Continue(()));
        assert_eq!(v.finish(n(1), 2.0), ControlFlow::Continue(()));
        assert_eq!(v.finish(n(2), 3.0), ControlFlow::Break(()));
    }

    #[test]
    fn distance_or_target_stops_on_first_trigger() {
        let mut v = DistanceOrTargetVisitor::new(5.0, [n(9)]);
        assert_eq!(v.finish(n(0), 1.0), ControlFlow::Continue(()));
        assert_eq!(v.finish(n(1), 6.0), ControlFlow::Break(()));
    }
}
