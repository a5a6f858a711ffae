//! `PathFinder`: the per-query mutable state and orchestration (§3, §4.8,
//! §4.9). One instance is constructed per query and discarded; the graph
//! and [`GeoRef`] it reads are shared read-only across concurrently running
//! instances (§5).

use geo::{prelude::*, Point};
use hashbrown::HashMap;
use petgraph::graph::NodeIndex;

use crate::algo::dijkstra::{self, Seed};
use crate::algo::path::{self, Path};
use crate::algo::same_edge;
use crate::algo::visitor::{DistanceOrTargetVisitor, DistanceVisitor, Visitor};
use crate::error::Error;
use crate::geo_ref::GeoRef;
use crate::mode::Mode;
use crate::projection::{Direction, ProjectionData};
use crate::proximity::{ProximityList, StopPointIdx};

/// Per-search mutable state (§3). Distances/predecessors/the finished
/// color map are sized to the graph's vertex count and reset before each
/// Dijkstra run rather than reallocated (§9).
pub struct PathFinder {
    mode: Mode,
    speed_factor: f64,
    start_coord: Point<f64>,
    starting_edge: ProjectionData,
    distances: Vec<f64>,
    predecessors: Vec<NodeIndex>,
    finished: Vec<bool>,
    computation_launch: bool,
}

impl PathFinder {
    /// Project `start_coord` onto `mode`'s sub-graph and allocate the
    /// per-query state arrays (§4.1's projection step).
    #[must_use]
    pub fn init(georef: &GeoRef, start_coord: Point<f64>, mode: Mode, speed_factor: f64) -> Self {
        let starting_edge = georef.project(start_coord, mode);
        let n = georef.graph().node_count();

        Self {
            mode,
            speed_factor,
            start_coord,
            starting_edge,
            distances: vec![f64::INFINITY; n],
            predecessors: (0..n).map(NodeIndex::new).collect(),
            finished: vec![false; n],
            computation_launch: false,
        }
    }

    #[must_use]
    pub const fn starting_edge(&self) -> &ProjectionData {
        &self.starting_edge
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    fn reset_state(&mut self) {
        self.distances.fill(f64::INFINITY);
        for (i, pred) in self.predecessors.iter_mut().enumerate() {
            *pred = NodeIndex::new(i);
        }
        self.finished.fill(false);
    }

    /// Seed both endpoints of the starting edge simultaneously, applying
    /// the zero-crossing optimization when the projection lands within 1cm
    /// of one endpoint (§4.2).
    fn seeds(&self) -> Vec<Seed> {
        let p = &self.starting_edge;
        let walk_speed = Mode::Walking.default_speed();

        if p.is_on_node(Direction::Source) {
            vec![
                Seed { vertex: p.source, distance: 0.0, predecessor: p.source },
                Seed { vertex: p.target, distance: f64::INFINITY, predecessor: p.source },
            ]
        } else if p.is_on_node(Direction::Target) {
            vec![
                Seed { vertex: p.source, distance: f64::INFINITY, predecessor: p.target },
                Seed { vertex: p.target, distance: 0.0, predecessor: p.target },
            ]
        } else {
            vec![
                Seed {
                    vertex: p.source,
                    distance: same_edge::crow_fly_duration(p.distance(Direction::Source), walk_speed, self.speed_factor),
                    predecessor: p.source,
                },
                Seed {
                    vertex: p.target,
                    distance: same_edge::crow_fly_duration(p.distance(Direction::Target), walk_speed, self.speed_factor),
                    predecessor: p.target,
                },
            ]
        }
    }

    fn run(&mut self, georef: &GeoRef, visitor: &mut dyn Visitor) {
        self.reset_state();
        let seeds = self.seeds();
        dijkstra::run(
            georef.graph(),
            self.speed_factor,
            &seeds,
            &mut self.distances,
            &mut self.predecessors,
            &mut self.finished,
            visitor,
        );
        self.computation_launch = true;
    }

    /// Run Dijkstra bounded by a radius cutoff (§4.2.1).
    pub fn start_distance_dijkstra(&mut self, georef: &GeoRef, radius: f64) {
        if !self.starting_edge.found {
            return;
        }
        let mut visitor = DistanceVisitor { radius };
        self.run(georef, &mut visitor);
    }

    /// Run Dijkstra bounded by whichever of a radius or a target set
    /// triggers first (§4.2.3, §4.9).
    pub fn start_distance_or_target_dijkstra(
        &mut self,
        georef: &GeoRef,
        radius: f64,
        targets: impl IntoIterator<Item = NodeIndex>,
    ) {
        if !self.starting_edge.found {
            return;
        }
        let mut visitor = DistanceOrTargetVisitor::new(radius, targets);
        self.run(georef, &mut visitor);
    }

    /// Target resolution (§4.3): the better of the two endpoints of
    /// `target`'s edge, plus which endpoint won.
    #[must_use]
    pub fn resolve_target(&self, target: &ProjectionData) -> Option<(f64, Direction)> {
        if !target.found {
            return None;
        }
        let d_source = self.distances[target.source.index()];
        let d_target = self.distances[target.target.index()];
        if d_source.is_infinite() && d_target.is_infinite() {
            return None;
        }

        if target.is_on_node(Direction::Source) {
            return Some((d_source, Direction::Source));
        }
        if target.is_on_node(Direction::Target) {
            return Some((d_target, Direction::Target));
        }

        let walk_speed = Mode::Walking.default_speed();
        let via_source = d_source + same_edge::crow_fly_duration(target.distance(Direction::Source), walk_speed, self.speed_factor);
        let via_target = d_target + same_edge::crow_fly_duration(target.distance(Direction::Target), walk_speed, self.speed_factor);

        if via_source <= via_target {
            Some((via_source, Direction::Source))
        } else {
            Some((via_target, Direction::Target))
        }
    }

    /// `get_distance` (§6): the resolved duration to `target`, or `None`
    /// when unreachable (not an error — §7).
    #[must_use]
    pub fn get_distance(&self, target: &ProjectionData) -> Option<f64> {
        self.resolve_target(target).map(|(d, _)| d)
    }

    /// `get_path` (§6, §4.4, §4.5, §4.6): the full reconstructed path to
    /// `target`, including the same-edge shortcut and both projection
    /// stubs. Returns an empty `Path` when unreachable.
    pub fn get_path(&self, georef: &GeoRef, target: &ProjectionData) -> Result<Path, Error> {
        let walk_speed = Mode::Walking.default_speed();

        if same_edge::is_projected_on_same_edge(&self.starting_edge, target) {
            let duration = same_edge::path_duration_on_same_edge(
                &self.starting_edge,
                target,
                walk_speed,
                self.speed_factor,
            );
            let way = self.starting_edge.way_idx.and_then(|w| georef.way(w));
            let coordinates = if let Some(way) = way {
                same_edge::path_coordinates_on_same_edge(way, &self.starting_edge, target)
            } else {
                geo::LineString::new(vec![self.starting_edge.projected.into(), target.projected.into()])
            };

            let edge_caracteristic = georef
                .get_caracteristic(self.starting_edge.edge)
                .unwrap_or(crate::mode::TransportCaracteristic::Walk);

            let dijkstra_duration = self
                .resolve_target(target)
                .map(path_with_dijkstra_duration_placeholder)
                .unwrap_or(f64::INFINITY);

            if duration <= dijkstra_duration || dijkstra_duration == 0.0 {
                return Ok(Path {
                    items: vec![path::PathItem {
                        way_idx: self.starting_edge.way_idx,
                        duration,
                        coordinates,
                        angle: 0.0,
                        transportation: edge_caracteristic,
                    }],
                    duration,
                });
            }
        }

        let Some((_, dir)) = self.resolve_target(target) else {
            return Ok(Path::empty());
        };

        let target_vertex = match dir {
            Direction::Source => target.source,
            Direction::Target => target.target,
        };

        let reconstructed =
            path::create_path(georef.graph(), georef.ways(), &self.distances, &self.predecessors, target_vertex)?;
        if reconstructed.is_empty() && target_vertex != self.origin_vertex() {
            return Ok(Path::empty());
        }

        let origin_way = self.starting_edge.way_idx.and_then(|w| georef.way(w));
        let dest_way = target.way_idx.and_then(|w| georef.way(w));

        // Which endpoint of the starting edge the reconstructed path's
        // predecessor chain actually bottomed out on: not a static
        // on-node check, since on an edge strictly interior to the
        // projection both endpoints are seeded as independent Dijkstra
        // roots and either may win depending on the graph's real
        // distances (mirrors `add_projections_to_path`'s coordinate match
        // in the original engine).
        let origin_dir = if self.starting_edge.source == self.starting_edge.target {
            if self.starting_edge.distance(Direction::Source) < self.starting_edge.distance(Direction::Target) {
                Direction::Source
            } else {
                Direction::Target
            }
        } else {
            let root = path::root_vertex(&self.predecessors, target_vertex);
            if root == self.starting_edge.target {
                Direction::Target
            } else {
                Direction::Source
            }
        };

        let origin_stub_duration = same_edge::crow_fly_duration(
            self.starting_edge.real_coord.haversine_distance(&self.starting_edge.projected),
            walk_speed,
            self.speed_factor,
        );
        let dest_stub_duration = same_edge::crow_fly_duration(
            target.projected.haversine_distance(&target.real_coord),
            walk_speed,
            self.speed_factor,
        );

        // `stub_geometry` always runs from the projected point to the named
        // endpoint. The origin stub is prepended, so it must end where the
        // reconstructed path begins (`origin_dir`'s endpoint) — passed as
        // is. The destination stub is appended, so it must instead *start*
        // where the reconstructed path ends; reverse it so its first point
        // is the `dir`-endpoint vertex, not the projected point.
        let origin_stub_geometry = same_edge::stub_geometry(origin_way, &self.starting_edge, origin_dir);
        let dest_stub_geometry = {
            let mut geometry = same_edge::stub_geometry(dest_way, target, dir);
            geometry.0.reverse();
            geometry
        };

        path::splice_stubs(
            reconstructed,
            &self.starting_edge,
            origin_dir,
            origin_stub_duration,
            origin_stub_geometry,
            target,
            dir,
            dest_stub_duration,
            dest_stub_geometry,
        )
    }

    fn origin_vertex(&self) -> NodeIndex {
        if self.starting_edge.is_on_node(Direction::Source) {
            self.starting_edge.source
        } else {
            self.starting_edge.target
        }
    }

    /// `find_nearest_stop_points` (§4.8): every stop point within
    /// `max_duration`, keyed by stop index.
    pub fn find_nearest_stop_points(
        &mut self,
        georef: &GeoRef,
        max_duration: f64,
        proximity: &dyn ProximityList,
    ) -> Result<HashMap<StopPointIdx, f64>, Error> {
        if max_duration <= 0.0 {
            return Ok(HashMap::new());
        }

        let radius_meters = max_duration * self.speed_factor * self.mode.default_speed();
        let shortlist = proximity.find_within(self.start_coord, radius_meters);

        if !self.starting_edge.found {
            log::debug!("starting_edge not found, falling back to crow-fly distances");
            return Ok(self.crow_fly_find_nearest_stop_points(max_duration, &shortlist));
        }

        self.start_distance_dijkstra(georef, max_duration);

        let mut results = HashMap::new();
        for (idx, _coord) in shortlist {
            let Some(target) = georef.cached_projection(idx, self.mode) else {
                continue;
            };
            if !target.found {
                continue;
            }

            let duration = if same_edge::is_projected_on_same_edge(&self.starting_edge, target) {
                same_edge::path_duration_on_same_edge(
                    &self.starting_edge,
                    target,
                    Mode::Walking.default_speed(),
                    self.speed_factor,
                )
            } else {
                match self.get_distance(target) {
                    Some(d) => d,
                    None => continue,
                }
            };

            if duration <= max_duration {
                results.insert(idx, duration);
            }
        }
        Ok(results)
    }

    /// The free-form variant of `find_nearest_stop_points` (§4.8): takes raw
    /// destination coordinates instead of stop-point indices, projecting
    /// each on the fly rather than reading the precomputed stop-point
    /// projection cache. Car queries project destinations onto the walking
    /// sub-graph, since a car-direct path always ends on foot. Results are
    /// keyed by `destinations`' index.
    pub fn find_nearest_coordinates(
        &mut self,
        georef: &GeoRef,
        max_duration: f64,
        destinations: &[Point<f64>],
    ) -> Result<HashMap<StopPointIdx, f64>, Error> {
        if max_duration <= 0.0 {
            return Ok(HashMap::new());
        }

        let shortlist: Vec<(StopPointIdx, Point<f64>)> = destinations.iter().copied().enumerate().collect();

        if !self.starting_edge.found {
            log::debug!("starting_edge not found, falling back to crow-fly distances");
            return Ok(self.crow_fly_find_nearest_stop_points(max_duration, &shortlist));
        }

        self.start_distance_dijkstra(georef, max_duration);

        let dest_mode = if matches!(self.mode, Mode::Car) { Mode::Walking } else { self.mode };

        let mut results = HashMap::new();
        for (idx, coord) in shortlist {
            let target = georef.project(coord, dest_mode);
            if !target.found {
                continue;
            }

            let duration = if same_edge::is_projected_on_same_edge(&self.starting_edge, &target) {
                same_edge::path_duration_on_same_edge(
                    &self.starting_edge,
                    &target,
                    Mode::Walking.default_speed(),
                    self.speed_factor,
                )
            } else {
                match self.get_distance(&target) {
                    Some(d) => d,
                    None => continue,
                }
            };

            if duration <= max_duration {
                results.insert(idx, duration);
            }
        }
        Ok(results)
    }

    /// Crow-fly fallback (§4.8.3) used when the origin coordinate has no
    /// projection: a safety factor of sqrt(2) is applied to the straight-line
    /// duration to compensate for the unknown detour a real street path
    /// would take.
    fn crow_fly_find_nearest_stop_points(
        &self,
        max_duration: f64,
        shortlist: &[(StopPointIdx, Point<f64>)],
    ) -> HashMap<StopPointIdx, f64> {
        let mut results = HashMap::new();
        if self.start_coord.x() == 0.0 && self.start_coord.y() == 0.0 {
            return results;
        }

        let walk_speed = self.mode.default_speed();
        for &(idx, coord) in shortlist {
            let meters = self.start_coord.haversine_distance(&coord);
            let duration = same_edge::crow_fly_duration(meters, walk_speed, self.speed_factor) * std::f64::consts::SQRT_2;
            if duration < max_duration {
                results.insert(idx, duration);
            }
        }
        results
    }
}

/// `resolve_target` already returns the Dijkstra-side duration; this just
/// names the projection so `get_path`'s same-edge comparison reads clearly.
fn path_with_dijkstra_duration_placeholder((duration, _dir): (f64, Direction)) -> f64 {
    duration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_ref::TransitionDurations;
    use crate::graph::{StreetEdge, StreetGraph, Vertex};
    use crate::mode::TransportCaracteristic;

    fn straight_line_georef() -> GeoRef {
        let mut g = StreetGraph::new();
        let a = g.add_node(Vertex::new(Point::new(0.0, 0.0)));
        let b = g.add_node(Vertex::new(Point::new(0.0, 0.0009)));
        g.add_edge(a, b, StreetEdge::new(72.0, None, None, TransportCaracteristic::Walk));
        g.add_edge(b, a, StreetEdge::new(72.0, None, None, TransportCaracteristic::Walk));

        GeoRef::new(g, vec![], [0, 2, 4, 6], 2, TransitionDurations::default())
    }

    #[test]
    fn straight_walk_between_vertices() {
        let georef = straight_line_georef();
        let mut pf = PathFinder::init(&georef, Point::new(0.0, 0.0), Mode::Walking, 1.0);
        assert!(pf.starting_edge().found);

        let dest = georef.project(Point::new(0.0, 0.0009), Mode::Walking);
        pf.start_distance_dijkstra(&georef, 1000.0);

        let distance = pf.get_distance(&dest);
        assert!(distance.is_some());
    }

    #[test]
    fn find_nearest_coordinates_projects_destinations_on_the_fly() {
        let georef = straight_line_georef();
        let mut pf = PathFinder::init(&georef, Point::new(0.0, 0.0), Mode::Walking, 1.0);

        let destinations = [Point::new(0.0, 0.0009), Point::new(5.0, 5.0)];
        let results = pf.find_nearest_coordinates(&georef, 1000.0, &destinations).unwrap();

        assert!(results.contains_key(&0));
        assert!(!results.contains_key(&1));
    }

    #[test]
    fn unprojected_origin_returns_none_distance() {
        let georef = straight_line_georef();
        // Build a finder whose origin is far from any edge, beyond the
        // index's reach only conceptually here (rtree always finds the
        // nearest edge); this exercises the `found=false` short-circuits
        // on an index with no edges instead.
        let empty = GeoRef::new(StreetGraph::new(), vec![], [0, 0, 0, 0], 0, TransitionDurations::default());
        let pf = PathFinder::init(&empty, Point::new(5.0, 5.0), Mode::Walking, 1.0);
        assert!(!pf.starting_edge().found);

        let dest = ProjectionData::not_found(Point::new(5.0, 5.0));
        assert!(pf.get_distance(&dest).is_none());
    }
}
