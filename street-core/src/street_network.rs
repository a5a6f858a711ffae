//! `StreetNetwork`: the public facade (§6) binding a forward [`PathFinder`]
//! (and, for arrival queries, a reverse one) to a shared [`GeoRef`].

use geo::Point;
use hashbrown::HashMap;

use crate::algo::path::Path;
use crate::algo::path_finder::PathFinder;
use crate::error::Error;
use crate::geo_ref::GeoRef;
use crate::mode::{Mode, TransportCaracteristic};
use crate::proximity::{ProximityList, StopPointIdx};

/// Binds a departure-direction [`PathFinder`] and, optionally, an
/// arrival-direction one rooted at a destination coordinate (§4.7).
pub struct StreetNetwork<'g> {
    georef: &'g GeoRef,
    forward: PathFinder,
    reverse: Option<PathFinder>,
}

impl<'g> StreetNetwork<'g> {
    /// `init` (§6): project `start` (and, if given, `end`) and prepare both
    /// directions' per-query state.
    #[must_use]
    pub fn init(
        georef: &'g GeoRef,
        start: Point<f64>,
        end: Option<Point<f64>>,
        mode: Mode,
        speed_factor: f64,
    ) -> Self {
        let forward = PathFinder::init(georef, start, mode, speed_factor);
        let reverse = end.map(|e| PathFinder::init(georef, e, mode, speed_factor));
        Self { georef, forward, reverse }
    }

    fn finder(&self, use_arrival: bool) -> Option<&PathFinder> {
        if use_arrival {
            self.reverse.as_ref()
        } else {
            Some(&self.forward)
        }
    }

    fn finder_mut(&mut self, use_arrival: bool) -> Option<&mut PathFinder> {
        if use_arrival {
            self.reverse.as_mut()
        } else {
            Some(&mut self.forward)
        }
    }

    /// `find_nearest_stop_points` (§6, §4.8).
    pub fn find_nearest_stop_points(
        &mut self,
        radius: f64,
        proximity: &dyn ProximityList,
        use_arrival: bool,
    ) -> Result<HashMap<StopPointIdx, f64>, Error> {
        let georef = self.georef;
        match self.finder_mut(use_arrival) {
            Some(finder) => finder.find_nearest_stop_points(georef, radius, proximity),
            None => Ok(HashMap::new()),
        }
    }

    /// The free-form variant of `find_nearest_stop_points` (§4.8, §6):
    /// destinations are raw coordinates rather than stop-point indices,
    /// projected on the fly. Results are keyed by `destinations`' index.
    pub fn find_nearest_coordinates(
        &mut self,
        max_duration: f64,
        destinations: &[Point<f64>],
        use_arrival: bool,
    ) -> Result<HashMap<StopPointIdx, f64>, Error> {
        let georef = self.georef;
        match self.finder_mut(use_arrival) {
            Some(finder) => finder.find_nearest_coordinates(georef, max_duration, destinations),
            None => Ok(HashMap::new()),
        }
    }

    /// `get_distance` (§6).
    #[must_use]
    pub fn get_distance(&self, stop: StopPointIdx, use_arrival: bool) -> Option<f64> {
        let finder = self.finder(use_arrival)?;
        let target = self.georef.cached_projection(stop, finder.mode())?;
        finder.get_distance(target)
    }

    /// `get_path` (§6, §4.7). For arrival queries, the reverse `PathFinder`
    /// (rooted at the destination) computes the path *to* the stop point,
    /// which is then inverted: item and coordinate order reversed, turn
    /// angles shifted and negated, and transition caracteristics swapped
    /// with their canonical duration re-read from `georef`'s configuration
    /// (forward and reverse transitions may take different amounts of
    /// time, so the stored duration cannot simply be reused).
    pub fn get_path(&self, stop: StopPointIdx, use_arrival: bool) -> Result<Path, Error> {
        let Some(finder) = self.finder(use_arrival) else {
            return Ok(Path::empty());
        };
        let Some(target) = self.georef.cached_projection(stop, finder.mode()) else {
            return Ok(Path::empty());
        };

        let path = finder.get_path(self.georef, target)?;
        if !use_arrival {
            return Ok(path);
        }

        let mut reversed = path.into_reversed();
        for item in &mut reversed.items {
            if matches!(
                item.transportation,
                TransportCaracteristic::BssTake
                    | TransportCaracteristic::BssPutBack
                    | TransportCaracteristic::CarLeaveParking
                    | TransportCaracteristic::CarPark
            ) {
                item.duration = self.georef.durations.duration_for(item.transportation);
            }
        }
        reversed.duration = reversed.items.iter().map(|i| i.duration).sum();
        Ok(reversed)
    }

    /// `get_direct_path` (§6, §4.9): a standalone origin-to-destination
    /// query, independent of this `StreetNetwork`'s own forward/reverse
    /// finders. Cars resolve their destination on the walking sub-graph,
    /// since a car-direct path always ends on foot.
    #[must_use = "check whether the returned path is empty before assuming a route was found"]
    pub fn get_direct_path(
        georef: &GeoRef,
        origin: Point<f64>,
        destination: Point<f64>,
        mode: Mode,
        speed_factor: f64,
        max_origin_duration: f64,
        max_destination_duration: f64,
    ) -> Result<Path, Error> {
        let dest_mode = if matches!(mode, Mode::Car) { Mode::Walking } else { mode };
        let dest_projection = georef.project(destination, dest_mode);
        if !dest_projection.found {
            return Ok(Path::empty());
        }

        let mut finder = PathFinder::init(georef, origin, mode, speed_factor);
        if !finder.starting_edge().found {
            return Ok(Path::empty());
        }

        let max_total = max_origin_duration + max_destination_duration;
        finder.start_distance_or_target_dijkstra(
            georef,
            max_total,
            [dest_projection.source, dest_projection.target],
        );

        let Some((total_duration, _)) = finder.resolve_target(&dest_projection) else {
            log::warn!("unable to find a way from start edge to the requested destination");
            return Ok(Path::empty());
        };
        if total_duration > max_total {
            return Ok(Path::empty());
        }

        finder.get_path(georef, &dest_projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_ref::TransitionDurations;
    use crate::graph::{StreetEdge, StreetGraph, Vertex};
    use crate::proximity::RTreeProximityList;
    use approx::assert_relative_eq;

    /// Two vertices 100m apart connected by a single walkable edge.
    fn single_edge_georef(duration: f64) -> (GeoRef, Point<f64>, Point<f64>) {
        let mut g = StreetGraph::new();
        let a_coord = Point::new(2.349, 48.853);
        let b_coord = Point::new(2.349, 48.8539); // ~100m north
        let a = g.add_node(Vertex::new(a_coord));
        let b = g.add_node(Vertex::new(b_coord));
        g.add_edge(a, b, StreetEdge::new(duration, None, None, TransportCaracteristic::Walk));
        g.add_edge(b, a, StreetEdge::new(duration, None, None, TransportCaracteristic::Walk));

        let georef = GeoRef::new(g, vec![], [0, 2, 4, 6], 2, TransitionDurations::default());
        (georef, a_coord, b_coord)
    }

    #[test]
    fn single_edge_straight_walk() {
        let (mut georef, a, b) = single_edge_georef(72.0);
        georef.cache_stop_point_projection(0, b);
        let mut network = StreetNetwork::init(&georef, a, None, Mode::Walking, 1.0);

        let stops = vec![(0usize, b)];
        let proximity = RTreeProximityList::build(&stops);

        let results = network.find_nearest_stop_points(200.0, &proximity, false).unwrap();
        assert_eq!(results.len(), 1);
        let duration = *results.get(&0).unwrap();
        assert!(duration >= 0.0 && duration <= 80.0, "duration {duration} out of expected range");

        let path = network.get_path(0, false).unwrap();
        assert!(!path.is_empty());
    }

    #[test]
    fn crow_fly_duration_matches_speed() {
        use crate::algo::same_edge::crow_fly_duration;
        assert_relative_eq!(crow_fly_duration(139.0, 1.39, 1.0), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_max_duration_returns_nothing() {
        let (mut georef, a, b) = single_edge_georef(72.0);
        georef.cache_stop_point_projection(0, b);
        let mut network = StreetNetwork::init(&georef, a, None, Mode::Walking, 1.0);
        let stops = vec![(0usize, b)];
        let proximity = RTreeProximityList::build(&stops);

        let results = network.find_nearest_stop_points(0.0, &proximity, false).unwrap();
        assert!(results.is_empty());
    }
}
