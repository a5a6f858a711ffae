use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::mode::TransportCaracteristic;

/// Error type for `street_core`.
///
/// Only the two failure kinds named in the routing design are represented
/// here. `Unreachable` and `UnprojectedOrigin` are *not* variants: they are
/// normal results (an empty [`crate::algo::path::Path`], or a crow-fly
/// fallback) and never propagate as an `Err`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Path reconstruction could not find any edge between two adjacent
    /// vertices on the predecessor chain. This is an invariant violation:
    /// every predecessor link was produced by relaxing a real edge.
    #[error("no edge between {from:?} and {to:?} during path reconstruction")]
    MissingEdge {
        from: NodeIndex,
        to: NodeIndex,
    },

    /// A transport caracteristic outside the known stub-splicing table was
    /// encountered while extending a path with a projection stub.
    #[error("unhandled transport caracteristic in stub splicing: {0:?}")]
    UnhandledTransportCaracteristic(TransportCaracteristic),
}
