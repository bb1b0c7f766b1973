use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, GeomError, Line, Pt2D};

/// An ordered sequence of at least 2 points, with no two consecutive points on top of each other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
}

impl PolyLine {
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine, GeomError> {
        if pts.len() < 2 {
            return Err(GeomError::InsufficientPoints { count: pts.len() });
        }
        if let Some(index) = pts
            .windows(2)
            .position(|pair| Line::new(pair[0], pair[1]).is_none())
        {
            return Err(GeomError::DegenerateGeometry { index });
        }
        Ok(PolyLine { pts })
    }

    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine::new(pts).unwrap()
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        // Checked in the constructor
        self.pts
            .windows(2)
            .map(|pair| Line::new(pair[0], pair[1]).unwrap())
    }

    pub fn length(&self) -> Distance {
        self.lines().map(|l| l.length()).sum()
    }

    // Things to remember about shifting polylines:
    // - the length before and after probably don't match up
    // - the number of points does match
    // - the result isn't a valid PolyLine in general; a sharp enough turn can fold points onto
    //   each other
    pub fn shift_right(&self, width: Distance, max_miter_scale: f64) -> Vec<Pt2D> {
        self.shift_either_direction(width, max_miter_scale)
    }

    pub fn shift_left(&self, width: Distance, max_miter_scale: f64) -> Vec<Pt2D> {
        self.shift_either_direction(-width, max_miter_scale)
    }

    /// Positive width shifts to the right of the direction of travel, negative to the left.
    ///
    /// The two endpoints are moved perpendicular to their segment. Every interior point is moved
    /// along the bisector of its two segments, far enough that both offset segments stay exactly
    /// `width` away from the originals (a miter join). Near a hairpin that distance blows up, so
    /// it's clamped to `max_miter_scale * width`.
    pub fn shift_either_direction(&self, width: Distance, max_miter_scale: f64) -> Vec<Pt2D> {
        let width = width.inner_meters();
        let n = self.pts.len();
        let mut result = Vec::with_capacity(n);

        for idx in 0..n {
            let pt = self.pts[idx];
            let (dx, dy, scale) = if idx == 0 || idx == n - 1 {
                let (dx, dy) = if idx == 0 {
                    self.pts[0].delta_to(self.pts[1])
                } else {
                    self.pts[n - 2].delta_to(self.pts[n - 1])
                };
                // Butt cap: rotate the segment clockwise by 90 degrees
                (dy, -dx, 1.0)
            } else {
                let (in_x, in_y) = self.pts[idx - 1].delta_to(pt);
                let (out_x, out_y) = pt.delta_to(self.pts[idx + 1]);
                let turn = Angle::turn_between(in_x, in_y, out_x, out_y);
                let half_angle = -(std::f64::consts::PI + turn.inner_radians()) / 2.0;
                let (bisector_x, bisector_y) =
                    Angle::new_rads(half_angle).rotate_vector(out_x, out_y);

                let miter = 1.0 / half_angle.sin().abs();
                let scale = if miter > max_miter_scale {
                    debug!(
                        "Clamping miter at point {} ({}) from {}x to {}x",
                        idx, turn, miter, max_miter_scale
                    );
                    max_miter_scale
                } else {
                    miter
                };
                (bisector_x, bisector_y, scale)
            };

            let len = (dx * dx + dy * dy).sqrt();
            result.push(pt.offset(width * scale * dx / len, width * scale * dy / len));
        }

        result
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for (idx, pt) in self.pts.iter().enumerate() {
            write!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
            if idx > 0 {
                write!(
                    f,
                    "    // {}, {}",
                    pt.x() - self.pts[idx - 1].x(),
                    pt.y() - self.pts[idx - 1].y()
                )?;
            }
            writeln!(f)?;
        }
        write!(f, "])")
    }
}
