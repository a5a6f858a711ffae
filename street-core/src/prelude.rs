//! Convenience re-exports of the crate's public surface.

pub use crate::algo::path::{Path, PathItem};
pub use crate::algo::path_finder::PathFinder;
pub use crate::error::Error;
pub use crate::geo_ref::{GeoRef, TransitionDurations};
pub use crate::graph::{StreetEdge, StreetGraph, Vertex, Way};
pub use crate::mode::{Mode, TransportCaracteristic};
pub use crate::projection::{Direction, ProjectionData};
pub use crate::proximity::{ProximityList, RTreeProximityList, StopPointIdx};
pub use crate::street_network::StreetNetwork;
