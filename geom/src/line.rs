use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D, EPSILON_DIST};

/// A line segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    /// Creates a line segment between two points, which must not be the same.
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Option<Line> {
        if pt1.dist_to(pt2) <= EPSILON_DIST {
            return None;
        }
        Some(Line(pt1, pt2))
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn length(&self) -> Distance {
        self.pt1().dist_to(self.pt2())
    }

    /// The direction of travel, as (dx, dy). Never zero-length.
    pub fn direction(&self) -> (f64, f64) {
        self.pt1().delta_to(self.pt2())
    }

    /// Perpendicular distance from a point to the infinite line through this segment.
    pub fn perp_dist_to_pt(&self, pt: Pt2D) -> Distance {
        let (dx, dy) = self.direction();
        let (px, py) = self.pt1().delta_to(pt);
        Distance::meters((dx * py - dy * px).abs() / (dx * dx + dy * dy).sqrt())
    }

    /// Positive if the point is to the left of the direction of travel, negative if right.
    pub fn side_of(&self, pt: Pt2D) -> f64 {
        let (dx, dy) = self.direction();
        let (px, py) = self.pt1().delta_to(pt);
        dx * py - dy * px
    }
}
