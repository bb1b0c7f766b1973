use std::fmt;

use serde::{Deserialize, Serialize};

use geom::{Distance, GeomError, LonLat, Projector};

use crate::{offset, GeometryOptions, Side};

/// Lanes are numbered outwards from the reference line at 0. Right lanes are negative, left lanes
/// positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LaneID(pub i32);

impl LaneID {
    pub const REFERENCE: LaneID = LaneID(0);

    pub fn new(side: Side, index: usize) -> LaneID {
        let index = index as i32;
        match side {
            Side::Left => LaneID(index),
            Side::Right => LaneID(-index),
        }
    }

    /// None for the reference lane
    pub fn side(self) -> Option<Side> {
        match self.0 {
            0 => None,
            x if x < 0 => Some(Side::Right),
            _ => Some(Side::Left),
        }
    }

    /// Counting from 1 at the reference line
    pub fn index(self) -> usize {
        self.0.unsigned_abs() as usize
    }
}

impl fmt::Display for LaneID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneType {
    /// Only the reference line has no type
    None,
    Driving,
}

/// Relative to the direction the road's nodes are listed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Bidirectional,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneID,
    pub lane_type: LaneType,
    pub direction: Direction,
    pub centerline: Vec<LonLat>,
    /// The border shared with the next lane towards the reference line.
    pub inner_border: Vec<LonLat>,
    /// The border furthest from the reference line.
    pub outer_border: Vec<LonLat>,
}

/// The complete cross-section of one road. Every polyline has exactly as many points as the
/// road has nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneSection {
    pub reference: Lane,
    /// Ordered outwards from the reference line
    pub right: Vec<Lane>,
    /// Ordered outwards from the reference line. Empty for single-lane roads.
    pub left: Vec<Lane>,
    pub left_boundary: Vec<LonLat>,
    pub right_boundary: Vec<LonLat>,
    pub num_lanes: usize,
    pub lane_width: Distance,
}

impl LaneSection {
    /// The reference lane first, then right lanes, then left lanes.
    pub fn all_lanes(&self) -> impl Iterator<Item = &Lane> {
        std::iter::once(&self.reference)
            .chain(self.right.iter())
            .chain(self.left.iter())
    }

    pub fn lane(&self, id: LaneID) -> Option<&Lane> {
        match id.side() {
            None => Some(&self.reference),
            Some(Side::Right) => self.right.get(id.index() - 1),
            Some(Side::Left) => self.left.get(id.index() - 1),
        }
    }
}

/// Declared lane counts above this are treated as broken data.
pub const MAX_LANES: i64 = 64;

/// Only an even number of lanes can be split evenly between both directions, so an odd count
/// above 1 loses a lane. 0 and negative counts mean a single lane.
pub fn effective_lane_count(declared: i64) -> usize {
    if declared <= 1 {
        return 1;
    }
    let count = declared as usize;
    if count % 2 == 1 {
        count - 1
    } else {
        count
    }
}

/// Lays out all lanes of one road, given the positions of its nodes. Fails for more than
/// `MAX_LANES` lanes.
pub fn build_lanes(
    pts: &[LonLat],
    declared_lanes: i64,
    opts: &GeometryOptions,
    projector: &dyn Projector,
) -> Result<LaneSection, GeomError> {
    if declared_lanes > MAX_LANES {
        return Err(GeomError::InvalidLaneCount {
            count: declared_lanes,
        });
    }
    let num_lanes = effective_lane_count(declared_lanes);
    let width = opts.lane_width;
    let shift =
        |dist: Distance, side: Side| offset(pts, dist, side, projector, opts.max_miter_scale);

    if num_lanes == 1 {
        // The single lane is centered on the road, but its outer border is a full lane width away
        let reference = shift(width / 2.0, Side::Left)?;
        let outer_border = shift(width, Side::Right)?;
        let lane = Lane {
            id: LaneID::new(Side::Right, 1),
            lane_type: LaneType::Driving,
            direction: Direction::Bidirectional,
            centerline: pts.to_vec(),
            inner_border: reference.clone(),
            outer_border: outer_border.clone(),
        };
        return Ok(LaneSection {
            reference: reference_lane(reference.clone()),
            right: vec![lane],
            left: Vec::new(),
            left_boundary: reference,
            right_boundary: outer_border,
            num_lanes,
            lane_width: width,
        });
    }

    let per_side = num_lanes / 2;
    let half = width * (per_side as f64);
    let left_boundary = shift(half, Side::Left)?;
    let right_boundary = shift(half, Side::Right)?;

    let mut right = Vec::with_capacity(per_side);
    let mut left = Vec::with_capacity(per_side);
    for (side, direction, lanes) in [
        (Side::Right, Direction::Forward, &mut right),
        (Side::Left, Direction::Backward, &mut left),
    ] {
        let mut inner_border = pts.to_vec();
        for i in 0..per_side {
            let centerline = shift(width * (i as f64) + width / 2.0, side)?;
            let outer_border = shift(width * ((i + 1) as f64), side)?;
            lanes.push(Lane {
                id: LaneID::new(side, i + 1),
                lane_type: LaneType::Driving,
                direction,
                centerline,
                inner_border: std::mem::replace(&mut inner_border, outer_border.clone()),
                outer_border,
            });
        }
    }

    Ok(LaneSection {
        reference: reference_lane(pts.to_vec()),
        right,
        left,
        left_boundary,
        right_boundary,
        num_lanes,
        lane_width: width,
    })
}

fn reference_lane(pts: Vec<LonLat>) -> Lane {
    Lane {
        id: LaneID::REFERENCE,
        lane_type: LaneType::None,
        direction: Direction::Bidirectional,
        centerline: pts.clone(),
        inner_border: pts.clone(),
        outer_border: pts,
    }
}
