//! The two-source label-setting Dijkstra core (§4.2). Seeds both endpoints
//! of the origin's projected edge simultaneously, then relaxes through the
//! graph under a pluggable [`Visitor`] until it signals termination.

use std::collections::BinaryHeap;
use std::ops::ControlFlow;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::algo::visitor::Visitor;
use crate::algo::MinScored;
use crate::graph::StreetGraph;

/// A seed vertex: its crow-fly distance from the projected point and its
/// own predecessor (itself, for a genuine origin endpoint, or the other
/// endpoint in the zero-crossing case — see §4.2).
#[derive(Debug, Clone, Copy)]
pub struct Seed {
    pub vertex: NodeIndex,
    pub distance: f64,
    pub predecessor: NodeIndex,
}

/// Run Dijkstra from `seeds`, relaxing edges at cost `edge.duration /
/// speed_factor`, writing results into `distances`/`predecessors` (both
/// pre-sized to `graph.node_count()` and pre-filled with `f64::INFINITY`
/// and a sentinel respectively by the caller — see
/// [`crate::algo::path_finder::PathFinder`]).
///
/// `finished` is the reusable color map (§9): it must be `false` for every
/// vertex on entry and is left `true` for every vertex the search finished.
pub fn run(
    graph: &StreetGraph,
    speed_factor: f64,
    seeds: &[Seed],
    distances: &mut [f64],
    predecessors: &mut [NodeIndex],
    finished: &mut [bool],
    visitor: &mut dyn Visitor,
) {
    let mut heap = BinaryHeap::new();

    for seed in seeds {
        let v = seed.vertex.index();
        if seed.distance < distances[v] {
            distances[v] = seed.distance;
            predecessors[v] = seed.predecessor;
            heap.push(MinScored(seed.distance, seed.vertex));
        }
    }

    while let Some(MinScored(dist, node)) = heap.pop() {
        let idx = node.index();
        if finished[idx] {
            continue;
        }
        // Stale heap entry: a better distance was already relaxed in.
        if dist > distances[idx] {
            continue;
        }
        finished[idx] = true;

        #[cfg(feature = "trace-dijkstra")]
        log::trace!("finished vertex {node:?} at distance {dist}");

        if visitor.finish(node, dist) == ControlFlow::Break(()) {
            break;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_idx = next.index();
            if finished[next_idx] {
                continue;
            }

            let cost = edge.weight().duration / speed_factor;
            let candidate = dist + cost;

            if candidate < distances[next_idx] {
                distances[next_idx] = candidate;
                predecessors[next_idx] = node;
                heap.push(MinScored(candidate, next));
            }
        }
    }
}
