use std::collections::{BTreeMap, BTreeSet};

use geo::ConvexHull;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use abstutil::MultiMap;
use geom::{Angle, GeomError, LonLat, Pt2D, Projector, EPSILON_DIST};

use crate::osm::{NodeID, WayID};
use crate::{GeometryOptions, LaneSection, RoadNetwork};

/// A node shared by at least two different roads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    /// Dense, assigned in order of the node ID
    pub id: usize,
    pub node: NodeID,
    pub pt: LonLat,
    pub roads: BTreeSet<WayID>,
    /// One per incident road ending here, two per road passing through. Approaches toward nodes
    /// that can't be projected are missing.
    pub approaches: Vec<Approach>,
    /// Empty until the lane geometry of the incident roads is known
    pub outline: Vec<LonLat>,
}

/// The direction from a junction towards the next node along one incident road.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Approach {
    pub road: WayID,
    pub toward: NodeID,
    /// Planar meters, in the frame of the `Projector` used to build the junction
    pub dx: f64,
    pub dy: f64,
}

/// Finds every node shared by multiple roads. Topology only depends on node IDs. A junction whose
/// node can't be projected is skipped, and so is any approach toward a neighbor that can't be
/// projected; the roads involved fail to lay out for the same reason.
pub fn build_junctions(
    network: &RoadNetwork,
    opts: &GeometryOptions,
    projector: &dyn Projector,
) -> BTreeMap<NodeID, Junction> {
    let incident = incident_roads(network, opts.parallel);

    let mut junctions = BTreeMap::new();
    for (node, roads) in incident.consume() {
        if roads.len() < 2 {
            continue;
        }
        let pt = network.pt(node);
        let planar = match projector.forward(pt) {
            Ok(planar) => planar,
            Err(err) => {
                warn!("Skipping the junction at {}: {}", node, err);
                continue;
            }
        };

        let mut approaches = Vec::new();
        for r in &roads {
            let road = &network.roads[r];
            let last = road.nodes.len() - 1;
            for (idx, _) in road.nodes.iter().enumerate().filter(|(_, n)| **n == node) {
                let mut neighbors = Vec::new();
                if idx > 0 {
                    neighbors.push(road.nodes[idx - 1]);
                }
                if idx < last {
                    neighbors.push(road.nodes[idx + 1]);
                }
                for toward in neighbors {
                    match projector.forward(network.pt(toward)) {
                        Ok(next) => {
                            let (dx, dy) = planar.delta_to(next);
                            approaches.push(Approach {
                                road: *r,
                                toward,
                                dx,
                                dy,
                            });
                        }
                        Err(err) => {
                            debug!("No approach from {} toward {}: {}", node, toward, err);
                        }
                    }
                }
            }
        }

        let id = junctions.len();
        junctions.insert(
            node,
            Junction {
                id,
                node,
                pt,
                roads,
                approaches,
                outline: Vec::new(),
            },
        );
    }
    junctions
}

/// Indexes which roads reference each node. In parallel, every worker builds a partial index
/// and these get merged at the end.
fn incident_roads(network: &RoadNetwork, parallel: bool) -> MultiMap<NodeID, WayID> {
    let add = |mut acc: MultiMap<NodeID, WayID>, (id, road): (&WayID, &crate::Road)| {
        for node in &road.nodes {
            acc.insert(*node, *id);
        }
        acc
    };

    if parallel {
        network
            .roads
            .par_iter()
            .fold(MultiMap::new, add)
            .reduce(MultiMap::new, |mut acc, partial| {
                acc.merge(partial);
                acc
            })
    } else {
        network.roads.iter().fold(MultiMap::new(), add)
    }
}

/// Approximates the area of a junction by the convex hull of where the boundaries of every
/// incident road touch it. If there isn't enough to work with, falls back to a small square
/// around the node.
///
/// This doesn't try to find where roads actually start to overlap, and it doesn't produce
/// connecting roads.
pub fn junction_outline(
    junction: &Junction,
    network: &RoadNetwork,
    lane_sections: &BTreeMap<WayID, LaneSection>,
    opts: &GeometryOptions,
    projector: &dyn Projector,
) -> Result<Vec<LonLat>, GeomError> {
    let mut corners: Vec<Pt2D> = Vec::new();
    for r in &junction.roads {
        let section = match lane_sections.get(r) {
            Some(section) => section,
            None => continue,
        };
        let road = &network.roads[r];
        for (idx, _) in road
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| **n == junction.node)
        {
            for pt in [section.left_boundary[idx], section.right_boundary[idx]] {
                let pt = projector.forward(pt)?;
                if !corners.iter().any(|c| c.approx_eq(pt, EPSILON_DIST)) {
                    corners.push(pt);
                }
            }
        }
    }

    if corners.len() >= 3 {
        let hull = geo::MultiPoint::from(
            corners
                .into_iter()
                .map(|pt| pt.to_geo())
                .collect::<Vec<_>>(),
        )
        .convex_hull();
        let mut pts: Vec<Pt2D> = hull
            .exterior()
            .coords()
            .map(|c| Pt2D::new(c.x, c.y))
            .collect();
        // The ring is closed
        pts.pop();
        // Collinear corners collapse into a line
        if pts.len() >= 3 {
            return projector.inverse_all(&pts);
        }
    }

    debug!(
        "Junction {} doesn't have enough boundary points, using a square outline",
        junction.id
    );
    let center = projector.forward(junction.pt)?;
    let corners: Vec<Pt2D> = [45.0, 135.0, 225.0, 315.0]
        .into_iter()
        .map(|degrees| center.project_away(opts.lane_width, Angle::degrees(degrees)))
        .collect();
    projector.inverse_all(&corners)
}
