//! Travel modes and the per-edge transport caracteristic tags.
//!
//! `Mode` partitions the unified graph into four sub-graphs (walk, bike,
//! car, bike-share) via [`crate::geo_ref::GeoRef`]'s per-mode vertex
//! offsets. `TransportCaracteristic` tags each edge with either a travel
//! mode or a mode-transition (bike pickup/putback, car park/leave).

use serde::{Deserialize, Serialize};

/// Walking speed used for the "last few meters" crow-fly stub even when the
/// query mode is Bike, Car, or Bss (the rider always leaves the vehicle to
/// walk the final stretch off the graph).
pub const WALK_SPEED: f64 = 1.39;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Walking,
    Bike,
    Car,
    Bss,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Walking, Mode::Bike, Mode::Car, Mode::Bss];

    /// Index of this mode into per-mode arrays (offsets, projection cache).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Mode::Walking => 0,
            Mode::Bike => 1,
            Mode::Car => 2,
            Mode::Bss => 3,
        }
    }

    /// Reference speed in meters/second.
    #[must_use]
    pub const fn default_speed(self) -> f64 {
        match self {
            Mode::Walking => WALK_SPEED,
            Mode::Bike => 4.1,
            Mode::Car => 11.1,
            Mode::Bss => 4.1,
        }
    }
}

/// Per-edge semantic tag: a travel mode, or a transition between modes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportCaracteristic {
    Walk,
    Bike,
    Car,
    BssTake,
    BssPutBack,
    CarLeaveParking,
    CarPark,
}

impl TransportCaracteristic {
    /// The caracteristic this one becomes when a path is reversed for an
    /// arrival-direction query (§4.7). Plain travel caracteristics are
    /// unaffected; transitions invert.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::BssTake => Self::BssPutBack,
            Self::BssPutBack => Self::BssTake,
            Self::CarLeaveParking => Self::CarPark,
            Self::CarPark => Self::CarLeaveParking,
            other => other,
        }
    }
}
