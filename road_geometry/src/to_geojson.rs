use geojson::{Feature, FeatureCollection, Geometry, Value};

use geom::LonLat;

use crate::{Direction, Lane, RoadGeometry};

impl RoadGeometry {
    /// For debugging in a GeoJSON viewer. Every lane contributes its centerline and borders, every
    /// road its two boundaries, and every junction its outline.
    pub fn to_geojson(&self) -> FeatureCollection {
        let mut features = Vec::new();
        for (road, section) in &self.lane_sections {
            for lane in section.all_lanes() {
                features.extend(lane_features(road.0, lane));
            }
            for (kind, pts) in [
                ("left boundary", &section.left_boundary),
                ("right boundary", &section.right_boundary),
            ] {
                let mut f = Feature::from(Geometry::new(Value::LineString(to_coords(pts))));
                f.set_property("road", road.0);
                f.set_property("kind", kind);
                features.push(f);
            }
        }

        for junction in self.junctions.values() {
            if junction.outline.is_empty() {
                continue;
            }
            let mut ring = to_coords(&junction.outline);
            ring.push(ring[0].clone());
            let mut f = Feature::from(Geometry::new(Value::Polygon(vec![ring])));
            f.set_property("junction", junction.id);
            f.set_property("node", junction.node.0);
            f.set_property(
                "roads",
                junction.roads.iter().map(|r| r.0).collect::<Vec<_>>(),
            );
            features.push(f);
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn lane_features(road: i64, lane: &Lane) -> Vec<Feature> {
    let direction = match lane.direction {
        Direction::Forward => "forward",
        Direction::Backward => "backward",
        Direction::Bidirectional => "both",
    };
    let mut features = Vec::new();
    for (kind, pts) in [
        ("centerline", &lane.centerline),
        ("inner border", &lane.inner_border),
        ("outer border", &lane.outer_border),
    ] {
        // The reference lane's borders are all the same line
        if lane.id.side().is_none() && kind != "centerline" {
            continue;
        }
        let mut f = Feature::from(Geometry::new(Value::LineString(to_coords(pts))));
        f.set_property("road", road);
        f.set_property("lane", lane.id.0);
        f.set_property("kind", kind);
        f.set_property("direction", direction);
        features.push(f);
    }
    features
}

fn to_coords(pts: &[LonLat]) -> Vec<Vec<f64>> {
    pts.iter().map(|pt| vec![pt.longitude, pt.latitude]).collect()
}
