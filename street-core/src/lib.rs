/*!
# street_core

Street-network path-finding core for a multimodal journey planner.

Given a street graph (pedestrian, bike, car, and bike-share sub-graphs
composed into one weighted graph via [`geo_ref::GeoRef`]), a starting
coordinate, a travel mode, and a speed factor, this crate projects the
coordinate onto the graph, runs a label-setting Dijkstra search under a
pluggable early-termination [`algo::visitor::Visitor`], and reconstructs
travel-time paths — including the partial "stub" at each end connecting
the user's real coordinate to the graph, and the geometry/turn-angle
detail needed to describe a route.

Graph construction, configuration-file loading, RPC/protobuf plumbing, and
timetable/RAPTOR routing are all out of scope here: this crate consumes an
already-built [`graph::StreetGraph`] and exposes the routing primitives a
caller wires into those surrounding systems.

# Example
```ignore
use geo::Point;
use street_core::prelude::*;

let georef: GeoRef = todo!("built by the graph pipeline");
let mut network = StreetNetwork::init(
    &georef,
    Point::new(2.349, 48.853),
    None,
    Mode::Walking,
    1.0,
);

let stop_points = network.find_nearest_stop_points(900.0, &proximity_list, false)?;
# Ok::<(), street_core::Error>(())
```
*/

pub mod algo;
pub mod error;
pub mod geo_ref;
pub mod graph;
pub mod mode;
pub mod prelude;
pub mod projection;
pub mod proximity;
pub mod street_network;

pub use error::Error;
