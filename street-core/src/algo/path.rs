//! Path reconstruction (§4.5) and projection-stub splicing (§4.6): turning
//! a Dijkstra predecessor chain into an ordered sequence of [`PathItem`]s,
//! each grouped by way and transport caracteristic, with turn angles and
//! the origin/destination stubs spliced in.

use geo::{Coord, LineString, Point};
use itertools::Itertools;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::Error;
use crate::graph::{StreetGraph, Way};
use crate::mode::TransportCaracteristic;
use crate::projection::{Direction, ProjectionData};

/// A contiguous run of the path sharing one way and one transport
/// caracteristic (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    pub way_idx: Option<usize>,
    pub duration: f64,
    pub coordinates: LineString<f64>,
    /// Turn angle at this item's junction with the previous one, in
    /// degrees; positive = left, negative = right. Zero for the first item.
    pub angle: f64,
    pub transportation: TransportCaracteristic,
}

/// A full reconstructed path (§3). Never shared: built and returned by
/// value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub items: Vec<PathItem>,
    pub duration: f64,
}

impl Path {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reverse a forward path into an arrival-direction one (§4.7):
    /// reverses item and coordinate order, shifts and negates turn angles,
    /// and swaps transition caracteristics (bike pickup/putback, car
    /// park/leave). Transition durations are the caller's responsibility to
    /// re-read from configuration after this call, since forward and
    /// reverse transitions may differ.
    #[must_use]
    pub fn into_reversed(mut self) -> Self {
        self.items.reverse();
        for item in &mut self.items {
            item.coordinates = LineString::new(item.coordinates.0.iter().rev().copied().collect());
            item.transportation = item.transportation.reversed();
        }

        // Shift angles forward by one position and negate; first item's
        // angle becomes zero.
        let mut shifted = vec![0.0; self.items.len()];
        for i in 1..self.items.len() {
            shifted[i] = -self.items[i - 1].angle;
        }
        for (item, angle) in self.items.iter_mut().zip(shifted) {
            item.angle = angle;
        }

        self
    }

    #[cfg(feature = "geojson_export")]
    #[must_use]
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        use geojson::{Feature, Geometry, Value};
        use serde_json::{json, Map};

        let features = self
            .items
            .iter()
            .map(|item| {
                let coords: Vec<Vec<f64>> = item
                    .coordinates
                    .points()
                    .map(|p| vec![p.x(), p.y()])
                    .collect();
                let geometry = Geometry::new(Value::LineString(coords));

                let mut properties = Map::new();
                properties.insert("way_idx".into(), json!(item.way_idx));
                properties.insert("duration".into(), json!(item.duration));
                properties.insert("angle".into(), json!(item.angle));
                properties.insert("transportation".into(), json!(format!("{:?}", item.transportation)));

                Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Walk `predecessors` back from `target` to an origin endpoint
/// (self-predecessor), returning the vertex sequence in forward order
/// (origin-first).
fn vertex_sequence(predecessors: &[NodeIndex], target: NodeIndex) -> Vec<NodeIndex> {
    let mut rev = vec![target];
    let mut current = target;
    loop {
        let pred = predecessors[current.index()];
        if pred == current {
            break;
        }
        rev.push(pred);
        current = pred;
    }
    rev.reverse();
    rev
}

/// The same traversal as [`vertex_sequence`], stopping at just the root
/// (self-predecessor) vertex — the actual endpoint of the starting edge the
/// predecessor chain bottomed out on (§4.6: needed to pick which of the
/// starting edge's two endpoints the origin stub must be oriented towards).
#[must_use]
pub fn root_vertex(predecessors: &[NodeIndex], target: NodeIndex) -> NodeIndex {
    let mut current = target;
    loop {
        let pred = predecessors[current.index()];
        if pred == current {
            return current;
        }
        current = pred;
    }
}

/// The minimum-duration edge between `u` and `w`, tie-broken by edge index
/// (§4.5, §5's ordering guarantee).
fn best_edge(graph: &StreetGraph, u: NodeIndex, w: NodeIndex) -> Option<EdgeIndex> {
    graph
        .edges_connecting(u, w)
        .min_by(|a, b| {
            a.weight()
                .duration
                .partial_cmp(&b.weight().duration)
                .unwrap()
                .then(a.id().index().cmp(&b.id().index()))
        })
        .map(|e| e.id())
}

/// Turn angle in degrees at junction `a`, formed by the incoming direction
/// `b -> a` and the outgoing direction `a -> c`: `180 - angle(b, a, c)`,
/// signed by the cross product of the two direction vectors (§4.5).
/// Planar, not latitude-corrected (§9).
fn turn_angle(b: Point<f64>, a: Point<f64>, c: Point<f64>) -> f64 {
    let u = (a.x() - b.x(), a.y() - b.y());
    let w = (c.x() - a.x(), c.y() - a.y());

    let u_len = (u.0 * u.0 + u.1 * u.1).sqrt();
    let w_len = (w.0 * w.0 + w.1 * w.1).sqrt();
    if u_len == 0.0 || w_len == 0.0 {
        return 0.0;
    }

    let cos_angle = ((u.0 * w.0 + u.1 * w.1) / (u_len * w_len)).clamp(-1.0, 1.0);
    let interior = cos_angle.acos().to_degrees();
    let cross = u.0 * w.1 - u.1 * w.0;

    let turn = 180.0 - interior;
    if cross < 0.0 {
        -turn
    } else {
        turn
    }
}

/// Append the geometry an edge contributes to a path item's running
/// coordinate list (§4.5): its way's polyline, in stored order, when
/// `way_idx`/`geom_idx` resolve to one, otherwise just `w_coord`.
fn append_edge_coords(coords: &mut LineString<f64>, ways: &[Way], edge_way_idx: Option<usize>, edge_geom_idx: Option<usize>, w_coord: Point<f64>) {
    if let (Some(way_idx), Some(geom_idx)) = (edge_way_idx, edge_geom_idx) {
        if let Some(geometry) = ways.get(way_idx).and_then(|way| way.geometries.get(geom_idx)) {
            coords.0.extend(geometry.0.iter().copied());
            return;
        }
    }
    coords.0.push(Coord::from(w_coord));
}

/// Rebuild an ordered sequence of [`PathItem`]s from a finished Dijkstra's
/// `predecessors`, grouping consecutive edges sharing a way and transport
/// caracteristic (§4.5). Does not include the origin/destination
/// projection stubs; see [`splice_stubs`].
pub fn create_path(
    graph: &StreetGraph,
    ways: &[Way],
    distances: &[f64],
    predecessors: &[NodeIndex],
    target: NodeIndex,
) -> Result<Path, Error> {
    let vertices = vertex_sequence(predecessors, target);
    if vertices.len() < 2 {
        return Ok(Path::empty());
    }

    let origin_coord = graph.node_weight(vertices[0]).expect("origin vertex on reconstructed path").coord;
    let mut items: Vec<PathItem> = Vec::new();
    let mut current: Option<PathItem> = None;

    for (u, w) in vertices.iter().copied().tuple_windows() {
        let edge_idx = best_edge(graph, u, w).ok_or(Error::MissingEdge { from: u, to: w })?;
        let edge = graph.edge_weight(edge_idx).expect("edge just looked up by id");
        let w_coord = graph.node_weight(w).expect("vertex on reconstructed path").coord;

        let starts_new_item = match &current {
            Some(item) => item.way_idx != edge.way_idx || item.transportation != edge.caracteristic,
            None => true,
        };

        if starts_new_item {
            if let Some(finished) = current.take() {
                items.push(finished);
            }
            let angle = items
                .last()
                .and_then(|last| {
                    let coords = &last.coordinates.0;
                    if coords.len() >= 2 {
                        let b = Point::from(coords[coords.len() - 2]);
                        let a = Point::from(coords[coords.len() - 1]);
                        Some(turn_angle(b, a, w_coord))
                    } else {
                        None
                    }
                })
                .unwrap_or(0.0);

            // The very first item starts from the origin vertex; every
            // subsequent one picks up wherever the previous item's last
            // coordinate left off, so it starts empty and is filled in below.
            let mut coordinates = if items.is_empty() {
                LineString::new(vec![Coord::from(origin_coord)])
            } else {
                LineString::new(vec![])
            };
            append_edge_coords(&mut coordinates, ways, edge.way_idx, edge.geom_idx, w_coord);

            current = Some(PathItem {
                way_idx: edge.way_idx,
                duration: edge.duration,
                coordinates,
                angle,
                transportation: edge.caracteristic,
            });
        } else {
            let item = current.as_mut().expect("starts_new_item false implies an item exists");
            item.duration += edge.duration;
            append_edge_coords(&mut item.coordinates, ways, edge.way_idx, edge.geom_idx, w_coord);
        }
    }
    if let Some(last) = current.take() {
        items.push(last);
    }

    let duration = distances[target.index()];
    Ok(Path { items, duration })
}

/// Extend `path` with origin and destination projection stubs (§4.6). If a
/// stub shares its neighbor's way it is merged in; otherwise a new item is
/// prepended/appended, with its transportation derived from the neighbor's
/// caracteristic per the stub-splicing table.
pub fn splice_stubs(
    mut path: Path,
    origin: &ProjectionData,
    origin_dir: Direction,
    origin_stub_duration: f64,
    origin_stub_geometry: LineString<f64>,
    dest: &ProjectionData,
    dest_dir: Direction,
    dest_stub_duration: f64,
    dest_stub_geometry: LineString<f64>,
) -> Result<Path, Error> {
    prepend_stub(
        &mut path,
        origin.way_idx,
        origin_stub_duration,
        origin_stub_geometry,
        origin_dir,
    )?;
    append_stub(
        &mut path,
        dest.way_idx,
        dest_stub_duration,
        dest_stub_geometry,
        dest_dir,
    )?;
    path.duration += origin_stub_duration + dest_stub_duration;
    Ok(path)
}

fn stub_caracteristic_at_origin(neighbor: TransportCaracteristic) -> Result<TransportCaracteristic, Error> {
    use TransportCaracteristic::{Bike, BssPutBack, BssTake, Car, CarLeaveParking, CarPark, Walk};
    Ok(match neighbor {
        Walk => Walk,
        Bike => Bike,
        Car => Car,
        BssTake => Walk,
        BssPutBack => Bike,
        CarLeaveParking => Walk,
        CarPark => Car,
    })
}

fn stub_caracteristic_at_destination(neighbor: TransportCaracteristic) -> Result<TransportCaracteristic, Error> {
    use TransportCaracteristic::{Bike, BssPutBack, BssTake, Car, CarLeaveParking, CarPark, Walk};
    Ok(match neighbor {
        Walk => Walk,
        Bike => Bike,
        Car => Car,
        BssTake => Bike,
        BssPutBack => Walk,
        CarLeaveParking => Car,
        CarPark => Walk,
    })
}

fn prepend_stub(
    path: &mut Path,
    way_idx: Option<usize>,
    duration: f64,
    geometry: LineString<f64>,
    _dir: Direction,
) -> Result<(), Error> {
    if let Some(first) = path.items.first_mut() {
        if first.way_idx == way_idx {
            first.duration += duration;
            let mut coords = geometry.0;
            coords.extend(first.coordinates.0.drain(..).skip(1));
            first.coordinates = LineString::new(coords);
            return Ok(());
        }
        let transportation = stub_caracteristic_at_origin(first.transportation)?;
        path.items.insert(
            0,
            PathItem {
                way_idx,
                duration,
                coordinates: geometry,
                angle: 0.0,
                transportation,
            },
        );
    } else {
        path.items.push(PathItem {
            way_idx,
            duration,
            coordinates: geometry,
            angle: 0.0,
            transportation: TransportCaracteristic::Walk,
        });
    }
    Ok(())
}

fn append_stub(
    path: &mut Path,
    way_idx: Option<usize>,
    duration: f64,
    geometry: LineString<f64>,
    _dir: Direction,
) -> Result<(), Error> {
    if let Some(last) = path.items.last_mut() {
        if last.way_idx == way_idx {
            last.duration += duration;
            last.coordinates.0.extend(geometry.0.into_iter().skip(1));
            return Ok(());
        }
        let transportation = stub_caracteristic_at_destination(last.transportation)?;
        path.items.push(PathItem {
            way_idx,
            duration,
            coordinates: geometry,
            angle: 0.0,
            transportation,
        });
    } else {
        path.items.push(PathItem {
            way_idx,
            duration,
            coordinates: geometry,
            angle: 0.0,
            transportation: TransportCaracteristic::Walk,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{StreetEdge, Vertex};
    use crate::mode::TransportCaracteristic;

    fn tri_graph() -> StreetGraph {
        let mut g = StreetGraph::new();
        let a = g.add_node(Vertex::new(Point::new(0.0, 0.0)));
        let b = g.add_node(Vertex::new(Point::new(0.0, 0.001)));
        let c = g.add_node(Vertex::new(Point::new(0.001, 0.001)));
        g.add_edge(a, b, StreetEdge::new(72.0, Some(0), Some(0), TransportCaracteristic::Walk));
        g.add_edge(b, c, StreetEdge::new(72.0, Some(1), Some(0), TransportCaracteristic::Walk));
        g
    }

    #[test]
    fn reconstructs_single_item_straight_walk() {
        let g = tri_graph();
        let a = NodeIndex::new(0);
        let b = NodeIndex::new(1);
        let n = g.node_count();
        let mut distances = vec![f64::INFINITY; n];
        let mut predecessors = vec![NodeIndex::end(); n];
        distances[a.index()] = 0.0;
        predecessors[a.index()] = a;
        distances[b.index()] = 72.0;
        predecessors[b.index()] = a;

        let path = create_path(&g, &[], &distances, &predecessors, b).unwrap();
        assert_eq!(path.items.len(), 1);
        assert_eq!(path.duration, 72.0);
        assert_eq!(path.items[0].coordinates.0.len(), 2);
    }

    #[test]
    fn new_way_starts_a_new_item() {
        let g = tri_graph();
        let a = NodeIndex::new(0);
        let b = NodeIndex::new(1);
        let c = NodeIndex::new(2);
        let n = g.node_count();
        let mut distances = vec![f64::INFINITY; n];
        let mut predecessors = vec![NodeIndex::end(); n];
        distances[a.index()] = 0.0;
        predecessors[a.index()] = a;
        distances[b.index()] = 72.0;
        predecessors[b.index()] = a;
        distances[c.index()] = 144.0;
        predecessors[c.index()] = b;

        let path = create_path(&g, &[], &distances, &predecessors, c).unwrap();
        assert_eq!(path.items.len(), 2);
        assert_eq!(path.items[0].way_idx, Some(0));
        assert_eq!(path.items[1].way_idx, Some(1));
    }

    #[test]
    fn splices_way_geometry_when_present() {
        let g = tri_graph();
        let a = NodeIndex::new(0);
        let b = NodeIndex::new(1);
        let n = g.node_count();
        let mut distances = vec![f64::INFINITY; n];
        let mut predecessors = vec![NodeIndex::end(); n];
        distances[a.index()] = 0.0;
        predecessors[a.index()] = a;
        distances[b.index()] = 72.0;
        predecessors[b.index()] = a;

        // way 0's geom_idx 0 is a 3-point polyline (a bend midway), not just
        // the two vertex endpoints.
        let ways = vec![Way {
            name: "bent street".into(),
            geometries: vec![LineString::new(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.0001, y: 0.0005 },
                Coord { x: 0.0, y: 0.001 },
            ])],
        }];

        let path = create_path(&g, &ways, &distances, &predecessors, b).unwrap();
        assert_eq!(path.items.len(), 1);
        // origin coord + the full 3-point way polyline.
        assert_eq!(path.items[0].coordinates.0.len(), 4);
        assert_eq!(path.items[0].coordinates.0[2], Coord { x: 0.0001, y: 0.0005 });
    }

    #[test]
    fn missing_edge_is_reported() {
        let g = tri_graph();
        let a = NodeIndex::new(0);
        let c = NodeIndex::new(2);
        let n = g.node_count();
        let mut distances = vec![f64::INFINITY; n];
        let mut predecessors = vec![NodeIndex::end(); n];
        distances[a.index()] = 0.0;
        predecessors[a.index()] = a;
        distances[c.index()] = 10.0;
        // Bogus predecessor: no edge a -> c exists.
        predecessors[c.index()] = a;

        let err = create_path(&g, &[], &distances, &predecessors, c).unwrap_err();
        assert_eq!(err, Error::MissingEdge { from: a, to: c });
    }

    #[test]
    fn reversal_negates_and_shifts_angles() {
        let mut path = Path {
            items: vec![
                PathItem {
                    way_idx: Some(0),
                    duration: 10.0,
                    coordinates: LineString::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }]),
                    angle: 0.0,
                    transportation: TransportCaracteristic::Walk,
                },
                PathItem {
                    way_idx: Some(1),
                    duration: 5.0,
                    coordinates: LineString::new(vec![Coord { x: 1.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }]),
                    angle: 42.0,
                    transportation: TransportCaracteristic::BssTake,
                },
            ],
            duration: 15.0,
        };
        path = path.into_reversed();

        assert_eq!(path.items[0].transportation, TransportCaracteristic::BssPutBack);
        assert_eq!(path.items[1].angle, -42.0);
    }
}
