use std::path::PathBuf;

use geo::Point;
use serde::Deserialize;
use street_core::prelude::*;

/// Tunables the binary loads from a TOML file (or falls back to defaults
/// for). The core itself never reads files; this is the file-based
/// configuration layer sitting in front of it.
#[derive(Debug, Deserialize)]
struct RoutingConfig {
    #[serde(default = "default_speed_factor")]
    speed_factor: f64,
    #[serde(default)]
    durations: TransitionDurationsConfig,
}

#[derive(Debug, Default, Deserialize)]
struct TransitionDurationsConfig {
    bss_pickup: Option<f64>,
    bss_putback: Option<f64>,
    parking_leave: Option<f64>,
    parking_park: Option<f64>,
}

fn default_speed_factor() -> f64 {
    1.0
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            speed_factor: default_speed_factor(),
            durations: TransitionDurationsConfig::default(),
        }
    }
}

fn load_config(path: &PathBuf) -> RoutingConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
            log::warn!("failed to parse {path:?}: {e}, using defaults");
            RoutingConfig::default()
        }),
        Err(_) => {
            log::debug!("no config file at {path:?}, using defaults");
            RoutingConfig::default()
        }
    }
}

/// A tiny demo graph: two streets meeting at a corner, walkable in both
/// directions, with one stop point a short walk away.
fn demo_georef(durations: TransitionDurations) -> (GeoRef, Point<f64>, Point<f64>) {
    let mut graph = StreetGraph::new();

    let corner = Point::new(2.3490, 48.8530);
    let north = Point::new(2.3490, 48.8539);
    let east = Point::new(2.3502, 48.8530);

    let a = graph.add_node(Vertex::new(corner));
    let b = graph.add_node(Vertex::new(north));
    let c = graph.add_node(Vertex::new(east));

    graph.add_edge(a, b, StreetEdge::new(72.0, Some(0), Some(0), TransportCaracteristic::Walk));
    graph.add_edge(b, a, StreetEdge::new(72.0, Some(0), Some(0), TransportCaracteristic::Walk));
    graph.add_edge(a, c, StreetEdge::new(65.0, Some(1), Some(0), TransportCaracteristic::Walk));
    graph.add_edge(c, a, StreetEdge::new(65.0, Some(1), Some(0), TransportCaracteristic::Walk));

    let mut georef = GeoRef::new(graph, vec![], [0, 3, 6, 9], 3, durations);
    georef.cache_stop_point_projection(0, north);
    (georef, corner, east)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config_path: PathBuf = std::env::args().nth(1).map_or_else(|| "street.toml".into(), PathBuf::from);
    let config = load_config(&config_path);

    let durations = TransitionDurations {
        bss_pickup: config.durations.bss_pickup.unwrap_or(30.0),
        bss_putback: config.durations.bss_putback.unwrap_or(45.0),
        parking_leave: config.durations.parking_leave.unwrap_or(5.0),
        parking_park: config.durations.parking_park.unwrap_or(120.0),
    };

    let (georef, start, _east) = demo_georef(durations);

    let stops = vec![(0usize, Point::new(2.3490, 48.8539))];
    let proximity = RTreeProximityList::build(&stops);

    let mut network = StreetNetwork::init(&georef, start, None, Mode::Walking, config.speed_factor);

    let instant = std::time::Instant::now();
    let nearest = network.find_nearest_stop_points(600.0, &proximity, false)?;
    println!("find_nearest_stop_points: {:?} ({:?})", nearest, instant.elapsed());

    let path = network.get_path(0, false)?;
    println!("get_path(0): {} item(s), {:.1}s total", path.items.len(), path.duration);

    Ok(())
}
