//! Reads an .osm file into a `RoadNetwork`, keeping only the ways that cars drive on. Anything
//! that would trip up geometry later (ways that are too short or reference missing nodes) is
//! dropped here with a warning.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod reader;

pub use crate::reader::{parse_network, read_network};
