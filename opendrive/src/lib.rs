//! Renders `RoadGeometry` as an OpenDRIVE document, in the flavor that Apollo's HD map tooling
//! reads: every lane is described by explicit point sets in WGS84, not by analytic reference line
//! geometry.

#[macro_use]
extern crate log;

mod writer;

pub use crate::writer::{format_coord, to_string, write, write_to_file, Options};
