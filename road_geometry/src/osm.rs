use std::fmt;

use serde::{Deserialize, Serialize};

// These are the OSM keys interpreted directly. Anything else is carried along as extra tags.
pub const NAME: &str = "name";
pub const HIGHWAY: &str = "highway";
pub const LANES: &str = "lanes";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeID(pub i64);
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WayID(pub i64);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/node/{}", self.0)
    }
}
impl fmt::Display for WayID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/way/{}", self.0)
    }
}

/// Values of `highway` that are meant for cars. Each of these also has a `_link` variant.
const DRIVABLE_HIGHWAYS: [&str; 11] = [
    "motorway",
    "trunk",
    "primary",
    "secondary",
    "tertiary",
    "residential",
    "service",
    "living_street",
    "track",
    "road",
    "unclassified",
];

pub fn is_drivable(highway: &str) -> bool {
    let base = highway.strip_suffix("_link").unwrap_or(highway);
    DRIVABLE_HIGHWAYS.contains(&base)
}
