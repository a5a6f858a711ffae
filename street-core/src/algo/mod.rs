pub mod dijkstra;
pub mod path;
pub mod path_finder;
pub mod same_edge;
pub mod visitor;

pub use path::{Path, PathItem};
pub use path_finder::PathFinder;

use std::cmp::Ordering;

/// `MinScored<K>` holds a score `f64` and a scored object `K` for use with
/// a `BinaryHeap`. Compares in reverse order by score so `BinaryHeap`
/// behaves as a min-heap.
#[derive(Copy, Clone, PartialEq)]
pub(crate) struct MinScored<K>(pub f64, pub K);

impl<K: Eq> Eq for MinScored<K> {}

impl<K: PartialOrd> PartialOrd for MinScored<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.0.partial_cmp(&self.0)
    }
}

impl<K: Ord> Ord for MinScored<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.partial_cmp(&self.0).unwrap()
    }
}
