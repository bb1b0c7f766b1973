//! Geometry primitives for turning OSM center-lines into lane geometry. Everything here works in
//! one of two frames: `LonLat` for WGS84 degrees straight from OSM, and `Pt2D` for a planar,
//! metric frame produced by some `Projector`.

#[macro_use]
extern crate log;

mod angle;
mod distance;
mod error;
mod gps;
mod line;
mod polyline;
mod projection;
mod pt;

pub use crate::angle::Angle;
pub use crate::distance::Distance;
pub use crate::error::GeomError;
pub use crate::gps::{GPSBounds, LonLat};
pub use crate::line::Line;
pub use crate::polyline::PolyLine;
pub use crate::projection::{IdentityProjection, Projector, UtmProjection, UtmZone};
pub use crate::pt::Pt2D;

/// Segments shorter than this are considered to have coincident endpoints.
pub const EPSILON_DIST: Distance = Distance::const_meters(1e-9);

/// When a miter join at a sharp turn would push an offset point further than this multiple of the
/// offset distance, clamp it.
pub const DEFAULT_MAX_MITER_SCALE: f64 = 4.0;
