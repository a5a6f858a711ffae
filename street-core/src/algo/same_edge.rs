//! The same-edge shortcut (§4.4): when origin and destination project onto
//! the same physical edge, walking straight between the two projected
//! points can be strictly cheaper than the Dijkstra round trip via both
//! endpoints.
//!
//! `is_projected_on_same_edge` and `path_duration_on_same_edge` disagree on
//! whether `geom_idx` participates in "same edge" — the first ignores it,
//! the second uses it to decide orientation. This mirrors the original
//! engine and is preserved deliberately rather than unified (§9, DESIGN.md).

use geo::{prelude::*, LineString, Point};

use crate::graph::Way;
use crate::projection::{Direction, ProjectionData};

/// True when `orig` and `dest` project onto the same undirected edge
/// (same way, same endpoint pair in either order, same duration).
/// Does *not* compare `geom_idx`.
#[must_use]
pub fn is_projected_on_same_edge(orig: &ProjectionData, dest: &ProjectionData) -> bool {
    if !orig.found || !dest.found {
        return false;
    }
    let same_pair = (orig.source == dest.source && orig.target == dest.target)
        || (orig.source == dest.target && orig.target == dest.source);

    same_pair && orig.way_idx == dest.way_idx && (orig.duration - dest.duration).abs() < 1e-6
}

/// Crow-fly walking duration in seconds for `meters`, at walking speed
/// adjusted by `speed_factor` (§4.3's `crow_fly_walk`).
#[must_use]
pub fn crow_fly_duration(meters: f64, walk_speed: f64, speed_factor: f64) -> f64 {
    meters / (walk_speed * speed_factor)
}

/// The along-edge duration of walking from `orig.real_coord` to
/// `dest.real_coord`, entirely via the shared edge (§4.4). Callers compare
/// this against the Dijkstra-reconstructed duration and keep whichever is
/// smaller.
#[must_use]
pub fn path_duration_on_same_edge(
    orig: &ProjectionData,
    dest: &ProjectionData,
    walk_speed: f64,
    speed_factor: f64,
) -> f64 {
    let stub_orig = crow_fly_duration(
        orig.real_coord.haversine_distance(&orig.projected),
        walk_speed,
        speed_factor,
    );
    let stub_dest = crow_fly_duration(
        dest.projected.haversine_distance(&dest.real_coord),
        walk_speed,
        speed_factor,
    );

    // `orig`'s node-index pair decides orientation, with `geom_idx` only as
    // a tiebreak on a self-loop edge (source == target). This is the same
    // primary/tiebreak split as `is_projected_on_same_edge`'s `geom_idx`
    // blindness, just the opposite priority — preserved from the original
    // engine rather than unified (§9, DESIGN.md).
    let reversed = orig.source != dest.source || (orig.source == orig.target && orig.geom_idx != dest.geom_idx);

    let middle = if reversed {
        (orig.distance(Direction::Target) - dest.distance(Direction::Source)).abs()
    } else {
        (orig.distance(Direction::Target) - dest.distance(Direction::Target)).abs()
    };

    stub_orig + crow_fly_duration(middle, walk_speed, speed_factor) + stub_dest
}

/// Clip `way`'s polyline between `orig.projected` and `dest.projected`,
/// oriented to run from origin to destination (§4.4's geometry splice).
#[must_use]
pub fn path_coordinates_on_same_edge(
    way: &Way,
    orig: &ProjectionData,
    dest: &ProjectionData,
) -> LineString<f64> {
    let Some(geom_idx) = orig.geom_idx.or(dest.geom_idx) else {
        return LineString::new(vec![orig.projected.into(), dest.projected.into()]);
    };
    let Some(geometry) = way.geometries.get(geom_idx) else {
        return LineString::new(vec![orig.projected.into(), dest.projected.into()]);
    };

    let orig_offset = cumulative_length_to_nearest(geometry, orig.projected);
    let dest_offset = cumulative_length_to_nearest(geometry, dest.projected);

    let (lo, hi, swap) = if orig_offset <= dest_offset {
        (orig_offset, dest_offset, false)
    } else {
        (dest_offset, orig_offset, true)
    };

    let mut coords = vec![orig.projected];
    let mut cumulative = 0.0;
    for window in geometry.lines() {
        let seg_len = Point::from(window.start).euclidean_distance(&Point::from(window.end));
        let next = cumulative + seg_len;
        if next > lo && cumulative < hi {
            coords.push(window.end.into());
        }
        cumulative = next;
    }
    coords.push(dest.projected);

    if swap {
        coords.reverse();
    }
    LineString::new(coords.into_iter().map(Into::into).collect())
}

/// The clipped half of a projection's edge geometry running from the
/// projected point to whichever endpoint `dir` names (§4.6's stub
/// geometry). Degenerates to a single point when the edge carries no
/// polyline (a virtual transition edge).
#[must_use]
pub fn stub_geometry(way: Option<&Way>, p: &ProjectionData, dir: Direction) -> LineString<f64> {
    let (Some(geom_idx), Some(way)) = (p.geom_idx, way) else {
        return LineString::new(vec![p.projected.into()]);
    };
    let Some(geometry) = way.geometries.get(geom_idx) else {
        return LineString::new(vec![p.projected.into()]);
    };

    let offset = cumulative_length_to_nearest(geometry, p.projected);
    match dir {
        Direction::Source => {
            let mut pts = points_up_to(geometry, offset);
            pts.push(p.projected);
            pts.reverse();
            LineString::new(pts.into_iter().map(Into::into).collect())
        }
        Direction::Target => {
            let mut pts = vec![p.projected];
            pts.extend(points_from(geometry, offset));
            LineString::new(pts.into_iter().map(Into::into).collect())
        }
    }
}

fn points_up_to(line: &LineString<f64>, offset: f64) -> Vec<Point<f64>> {
    let mut cumulative = 0.0;
    let mut pts = vec![Point::from(line.0[0])];
    for window in line.lines() {
        let seg_len = Point::from(window.start).euclidean_distance(&Point::from(window.end));
        if cumulative + seg_len > offset {
            break;
        }
        pts.push(Point::from(window.end));
        cumulative += seg_len;
    }
    pts
}

fn points_from(line: &LineString<f64>, offset: f64) -> Vec<Point<f64>> {
    let mut cumulative = 0.0;
    let mut pts = vec![];
    for window in line.lines() {
        let seg_len = Point::from(window.start).euclidean_distance(&Point::from(window.end));
        if cumulative + seg_len > offset {
            pts.push(Point::from(window.end));
        }
        cumulative += seg_len;
    }
    pts
}

/// Distance along `line` (planar, cumulative segment length) to the point
/// on `line` nearest `target` — used only to order the two projected points
/// along the shared geometry, not as a physical distance.
fn cumulative_length_to_nearest(line: &LineString<f64>, target: Point<f64>) -> f64 {
    let mut cumulative = 0.0;
    let mut best = (f64::INFINITY, 0.0);

    for window in line.lines() {
        let a = Point::from(window.start);
        let b = Point::from(window.end);
        let seg_len = a.euclidean_distance(&b);

        let d_a = a.euclidean_distance(&target);
        if d_a < best.0 {
            best = (d_a, cumulative);
        }
        let d_b = b.euclidean_distance(&target);
        if d_b < best.0 {
            best = (d_b, cumulative + seg_len);
        }

        cumulative += seg_len;
    }
    best.1
}
