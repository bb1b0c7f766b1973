use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use abstutil::Tags;
use geom::{GPSBounds, LonLat};

use crate::osm::{self, NodeID, WayID};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeID,
    pub pt: LonLat,
}

/// A drivable OSM way. Always references at least 2 nodes, all of which exist in the
/// `RoadNetwork` that owns it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Road {
    pub id: WayID,
    pub nodes: Vec<NodeID>,
    pub attributes: RoadAttributes,
}

/// The few tags that influence geometry are parsed up-front; everything else is kept around
/// verbatim in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadAttributes {
    /// The total number of lanes, as declared. Negative values are tolerated here and normalized
    /// later.
    pub lanes: Option<i64>,
    pub name: Option<String>,
    pub highway: String,
    pub extra: Tags,
}

impl RoadAttributes {
    pub fn from_tags(mut tags: Tags) -> RoadAttributes {
        let highway = tags.remove(osm::HIGHWAY).unwrap_or_default();
        let name = tags.remove(osm::NAME);
        let lanes = tags.remove(osm::LANES).and_then(|raw| match raw.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!("Ignoring unparsable lanes={}", raw);
                None
            }
        });
        RoadAttributes {
            lanes,
            name,
            highway,
            extra: tags,
        }
    }

    /// The declared lane count, with an absent value meaning a single lane.
    pub fn declared_lanes(&self) -> i64 {
        self.lanes.unwrap_or(1)
    }
}

/// An arena of nodes and roads. Roads refer to nodes by ID. Once constructed, nothing here
/// changes; every geometry step only borrows it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoadNetwork {
    pub nodes: BTreeMap<NodeID, Node>,
    pub roads: BTreeMap<WayID, Road>,
    pub gps_bounds: GPSBounds,
}

impl RoadNetwork {
    pub fn new() -> RoadNetwork {
        RoadNetwork::default()
    }

    pub fn insert_node(&mut self, id: NodeID, pt: LonLat) -> Result<()> {
        if self.nodes.contains_key(&id) {
            bail!("Duplicate {}", id);
        }
        if !pt.longitude.is_finite() || !pt.latitude.is_finite() {
            bail!("{} has a bad position {}", id, pt);
        }
        self.gps_bounds.update(pt);
        self.nodes.insert(id, Node { id, pt });
        Ok(())
    }

    /// Fails if the road is too short or references nodes that haven't been inserted yet.
    pub fn insert_road(
        &mut self,
        id: WayID,
        nodes: Vec<NodeID>,
        attributes: RoadAttributes,
    ) -> Result<()> {
        if self.roads.contains_key(&id) {
            bail!("Duplicate {}", id);
        }
        if nodes.len() < 2 {
            bail!("{} only has {} nodes", id, nodes.len());
        }
        if let Some(missing) = nodes.iter().find(|n| !self.nodes.contains_key(*n)) {
            bail!("{} references {}, which doesn't exist", id, missing);
        }
        self.roads.insert(
            id,
            Road {
                id,
                nodes,
                attributes,
            },
        );
        Ok(())
    }

    pub fn pt(&self, id: NodeID) -> LonLat {
        self.nodes[&id].pt
    }

    /// The positions of a road's nodes, in order.
    pub fn road_pts(&self, road: &Road) -> Vec<LonLat> {
        road.nodes.iter().map(|n| self.pt(*n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_from_tags() {
        let mut tags = Tags::empty();
        tags.insert("highway", "primary");
        tags.insert("name", "Karl Johans gate");
        tags.insert("lanes", "4");
        tags.insert("maxspeed", "50");
        let attribs = RoadAttributes::from_tags(tags);
        assert_eq!(attribs.highway, "primary");
        assert_eq!(attribs.name.as_deref(), Some("Karl Johans gate"));
        assert_eq!(attribs.lanes, Some(4));
        assert_eq!(attribs.extra.len(), 1);
        assert!(attribs.extra.is("maxspeed", "50"));

        let mut tags = Tags::empty();
        tags.insert("highway", "service");
        tags.insert("lanes", "2;3");
        let attribs = RoadAttributes::from_tags(tags);
        assert_eq!(attribs.lanes, None);
        assert_eq!(attribs.declared_lanes(), 1);
        assert!(attribs.extra.is_empty());
    }

    #[test]
    fn rejects_malformed_roads() {
        let attribs = RoadAttributes::from_tags(Tags::empty());
        let mut network = RoadNetwork::new();
        network.insert_node(NodeID(1), LonLat::new(10.0, 60.0)).unwrap();
        network.insert_node(NodeID(2), LonLat::new(10.1, 60.0)).unwrap();
        assert!(network.insert_node(NodeID(2), LonLat::new(10.1, 60.0)).is_err());

        assert!(network
            .insert_road(WayID(1), vec![NodeID(1)], attribs.clone())
            .is_err());
        assert!(network
            .insert_road(WayID(1), vec![NodeID(1), NodeID(3)], attribs.clone())
            .is_err());
        network
            .insert_road(WayID(1), vec![NodeID(1), NodeID(2)], attribs.clone())
            .unwrap();
        assert!(network
            .insert_road(WayID(1), vec![NodeID(2), NodeID(1)], attribs)
            .is_err());

        assert_eq!(network.roads.len(), 1);
        let road = &network.roads[&WayID(1)];
        assert_eq!(
            network.road_pts(road),
            vec![LonLat::new(10.0, 60.0), LonLat::new(10.1, 60.0)]
        );
        assert!(network.gps_bounds.contains(LonLat::new(10.05, 60.0)));
    }
}
