//! Derives lane-level geometry from OSM center-lines. Each road's nodes get offset into a full
//! cross-section of lanes, and nodes shared between roads become junctions.
//!
//! Everything here works on an immutable `RoadNetwork`. All distance and angle math happens in the
//! planar frame of an explicitly passed `Projector`; results go back to WGS84.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod junctions;
mod lanes;
mod network;
mod offset;
mod options;
pub mod osm;
mod pipeline;
mod to_geojson;

pub use crate::junctions::{build_junctions, junction_outline, Approach, Junction};
pub use crate::lanes::{
    build_lanes, effective_lane_count, Direction, Lane, LaneID, LaneSection, LaneType, MAX_LANES,
};
pub use crate::network::{Node, Road, RoadAttributes, RoadNetwork};
pub use crate::offset::{offset, Side};
pub use crate::options::GeometryOptions;
pub use crate::pipeline::{build, RoadFailure, RoadGeometry};
