use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use abstutil::{prettyprint_usize, Timer};
use geom::{GPSBounds, GeomError, Projector};

use crate::osm::{NodeID, WayID};
use crate::{
    build_junctions, build_lanes, junction_outline, GeometryOptions, Junction, LaneSection,
    RoadNetwork,
};

/// Everything derived from a `RoadNetwork`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadGeometry {
    pub lane_sections: BTreeMap<WayID, LaneSection>,
    pub junctions: BTreeMap<NodeID, Junction>,
    /// Roads that couldn't be laid out. They're missing from `lane_sections`.
    pub failures: Vec<RoadFailure>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadFailure {
    pub road: WayID,
    pub error: GeomError,
}

impl fmt::Display for RoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.road, self.error)
    }
}

impl RoadGeometry {
    /// The extent of every road's reference line.
    pub fn reference_bounds(&self) -> GPSBounds {
        let mut bounds = GPSBounds::new();
        for section in self.lane_sections.values() {
            for pt in &section.reference.centerline {
                bounds.update(*pt);
            }
        }
        bounds
    }
}

/// Lays out the lanes of every road, then finds junctions between them. A road with bad geometry
/// is skipped and recorded in `failures`, but a problem outlining a junction fails everything.
pub fn build(
    network: &RoadNetwork,
    opts: &GeometryOptions,
    projector: &dyn Projector,
    timer: &mut Timer,
) -> Result<RoadGeometry> {
    opts.validate()?;

    for road in network.roads.values() {
        if let Some(lanes) = road.attributes.lanes {
            if lanes < 0 {
                warn!(
                    "{} has lanes={}, treating it as a single lane",
                    road.id, lanes
                );
            }
        }
    }

    timer.start("lay out lanes");
    let layout = |road: &crate::Road| {
        let pts = network.road_pts(road);
        (
            road.id,
            build_lanes(&pts, road.attributes.declared_lanes(), opts, projector),
        )
    };
    let results: Vec<(WayID, Result<LaneSection, GeomError>)> = if opts.parallel {
        network.roads.par_iter().map(|(_, road)| layout(road)).collect()
    } else {
        timer.start_iter("roads", network.roads.len());
        network
            .roads
            .values()
            .map(|road| {
                timer.next();
                layout(road)
            })
            .collect()
    };

    let mut lane_sections = BTreeMap::new();
    let mut failures = Vec::new();
    for (road, result) in results {
        match result {
            Ok(section) => {
                lane_sections.insert(road, section);
            }
            Err(error) => {
                let failure = RoadFailure { road, error };
                timer.warn(format!("Skipping {}", failure));
                failures.push(failure);
            }
        }
    }
    timer.stop("lay out lanes");
    timer.note(format!(
        "{} roads laid out, {} skipped",
        prettyprint_usize(lane_sections.len()),
        prettyprint_usize(failures.len())
    ));

    timer.start("find junctions");
    let mut junctions = build_junctions(network, opts, projector);
    timer.stop("find junctions");

    timer.start("junction outlines");
    for junction in junctions.values_mut() {
        junction.outline = junction_outline(junction, network, &lane_sections, opts, projector)
            .with_context(|| format!("couldn't outline junction around {}", junction.node))?;
    }
    timer.stop("junction outlines");

    Ok(RoadGeometry {
        lane_sections,
        junctions,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use abstutil::Tags;
    use geom::{Distance, IdentityProjection, LonLat, UtmProjection};

    use super::*;
    use crate::{Direction, LaneID, RoadAttributes};

    fn attribs(lanes: Option<&str>) -> RoadAttributes {
        let mut tags = Tags::empty();
        tags.insert("highway", "residential");
        if let Some(lanes) = lanes {
            tags.insert("lanes", lanes);
        }
        RoadAttributes::from_tags(tags)
    }

    fn network(
        nodes: Vec<(i64, f64, f64)>,
        roads: Vec<(i64, Vec<i64>, Option<&str>)>,
    ) -> RoadNetwork {
        let mut network = RoadNetwork::new();
        for (id, lon, lat) in nodes {
            network.insert_node(NodeID(id), LonLat::new(lon, lat)).unwrap();
        }
        for (id, nodes, lanes) in roads {
            network
                .insert_road(
                    WayID(id),
                    nodes.into_iter().map(NodeID).collect(),
                    attribs(lanes),
                )
                .unwrap();
        }
        network
    }

    #[test]
    fn straight_two_lane_road() {
        let network = network(
            vec![(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 20.0, 0.0)],
            vec![(100, vec![1, 2, 3], Some("2"))],
        );
        let geometry = build(
            &network,
            &GeometryOptions::default(),
            &IdentityProjection,
            &mut Timer::throwaway(),
        )
        .unwrap();
        assert!(geometry.failures.is_empty());
        assert!(geometry.junctions.is_empty());

        let section = &geometry.lane_sections[&WayID(100)];
        assert_eq!(
            section.reference.centerline,
            network.road_pts(&network.roads[&WayID(100)])
        );
        assert_eq!(section.right.len(), 1);
        assert_eq!(section.left.len(), 1);
        assert_eq!(section.right[0].direction, Direction::Forward);
        assert_eq!(section.left[0].direction, Direction::Backward);
        for idx in 0..3 {
            assert!((section.left_boundary[idx].latitude - 3.0).abs() < 1e-9);
            assert!((section.right_boundary[idx].latitude + 3.0).abs() < 1e-9);
        }

        let bounds = geometry.reference_bounds();
        assert_eq!((bounds.min_lon, bounds.max_lon), (0.0, 20.0));
    }

    #[test]
    fn bad_roads_are_skipped() {
        // Road 200 doubles back onto the same position
        let network = network(
            vec![
                (1, 0.0, 0.0),
                (2, 10.0, 0.0),
                (3, 20.0, 0.0),
                (4, 20.0, 0.0),
                (5, 10.0, 10.0),
            ],
            vec![
                (100, vec![1, 2], None),
                (200, vec![2, 3, 4], None),
                (300, vec![2, 5], Some("-4")),
            ],
        );
        let geometry = build(
            &network,
            &GeometryOptions::default(),
            &IdentityProjection,
            &mut Timer::throwaway(),
        )
        .unwrap();
        assert_eq!(
            geometry.failures,
            vec![RoadFailure {
                road: WayID(200),
                error: GeomError::DegenerateGeometry { index: 1 },
            }]
        );
        assert_eq!(
            geometry.lane_sections.keys().cloned().collect::<Vec<_>>(),
            vec![WayID(100), WayID(300)]
        );
        assert_eq!(geometry.lane_sections[&WayID(300)].num_lanes, 1);

        // Junctions only care about node IDs, so the failed road still counts
        let junction = &geometry.junctions[&NodeID(2)];
        assert_eq!(junction.roads.len(), 3);
        assert!(junction.outline.len() >= 3);
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut nodes = Vec::new();
        let mut roads = Vec::new();
        // A grid of 5x5 nodes, with roads along every row and column
        for row in 0..5 {
            for col in 0..5 {
                nodes.push((
                    row * 5 + col,
                    10.7 + 0.001 * col as f64,
                    59.9 + 0.001 * row as f64,
                ));
            }
        }
        for i in 0..5 {
            roads.push((100 + i, (0..5).map(|col| i * 5 + col).collect(), Some("2")));
            roads.push((200 + i, (0..5).map(|row| row * 5 + i).collect(), Some("3")));
        }
        let network = network(nodes, roads);
        let projector = UtmProjection::new("32V".parse().unwrap());

        let parallel = build(
            &network,
            &GeometryOptions::default(),
            &projector,
            &mut Timer::throwaway(),
        )
        .unwrap();
        let sequential = build(
            &network,
            &GeometryOptions {
                parallel: false,
                ..Default::default()
            },
            &projector,
            &mut Timer::throwaway(),
        )
        .unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.lane_sections.len(), 10);
        assert_eq!(parallel.junctions.len(), 25);
        assert_eq!(
            parallel.junctions.values().map(|j| j.id).collect::<Vec<_>>(),
            (0..25).collect::<Vec<_>>()
        );
    }

    #[test]
    fn invalid_options() {
        let network = network(
            vec![(1, 0.0, 0.0), (2, 10.0, 0.0)],
            vec![(1, vec![1, 2], None)],
        );
        let opts = GeometryOptions {
            lane_width: Distance::meters(-3.0),
            ..Default::default()
        };
        assert!(build(&network, &opts, &IdentityProjection, &mut Timer::throwaway()).is_err());
    }

    #[test]
    fn out_of_zone_roads_are_skipped() {
        // Roads 2 and 3 are far outside zone 32V, and meet at node 4
        let network = network(
            vec![
                (1, 10.7, 59.9),
                (2, 10.71, 59.9),
                (3, 30.0, 59.9),
                (4, 30.01, 59.9),
                (5, 30.02, 59.9),
            ],
            vec![
                (1, vec![1, 2], None),
                (2, vec![3, 4], None),
                (3, vec![4, 5], None),
            ],
        );
        let projector = UtmProjection::new("32V".parse().unwrap());
        let geometry = build(
            &network,
            &GeometryOptions::default(),
            &projector,
            &mut Timer::throwaway(),
        )
        .unwrap();
        assert_eq!(
            geometry.lane_sections.keys().cloned().collect::<Vec<_>>(),
            vec![WayID(1)]
        );
        assert_eq!(
            geometry.failures.iter().map(|f| f.road).collect::<Vec<_>>(),
            vec![WayID(2), WayID(3)]
        );
        assert!(geometry
            .failures
            .iter()
            .all(|f| matches!(f.error, GeomError::ProjectionFailure(_))));
        assert!(geometry.junctions.is_empty());
    }

    #[test]
    fn implausible_lane_counts_are_skipped() {
        let network = network(
            vec![(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 10.0, 10.0)],
            vec![
                (1, vec![1, 2], Some("9223372036854775807")),
                (2, vec![2, 3], Some("1000000000")),
                (3, vec![3, 1], Some("64")),
            ],
        );
        for parallel in [true, false] {
            let opts = GeometryOptions {
                parallel,
                ..Default::default()
            };
            let geometry =
                build(&network, &opts, &IdentityProjection, &mut Timer::throwaway()).unwrap();
            assert_eq!(
                geometry.failures,
                vec![
                    RoadFailure {
                        road: WayID(1),
                        error: GeomError::InvalidLaneCount { count: i64::MAX },
                    },
                    RoadFailure {
                        road: WayID(2),
                        error: GeomError::InvalidLaneCount { count: 1_000_000_000 },
                    },
                ]
            );
            let section = &geometry.lane_sections[&WayID(3)];
            assert_eq!(section.num_lanes, 64);
            assert_eq!(section.right.last().unwrap().id, LaneID(-32));
        }
    }
}
