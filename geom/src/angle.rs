use std::fmt;

use serde::{Deserialize, Serialize};

/// An angle, stored in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn new_rads(rads: f64) -> Angle {
        Angle(rads)
    }

    pub fn degrees(degs: f64) -> Angle {
        Angle(degs.to_radians())
    }

    /// The signed angle needed to turn from the direction (dx1, dy1) to (dx2, dy2), in (-pi, pi].
    /// Positive means counter-clockwise.
    pub fn turn_between(dx1: f64, dy1: f64, dx2: f64, dy2: f64) -> Angle {
        let cross = dx1 * dy2 - dy1 * dx2;
        let dot = dx1 * dx2 + dy1 * dy2;
        Angle(cross.atan2(dot))
    }

    pub fn inner_radians(self) -> f64 {
        self.0
    }

    pub fn normalized_radians(self) -> f64 {
        let two_pi = 2.0 * std::f64::consts::PI;
        self.0.rem_euclid(two_pi)
    }

    pub fn normalized_degrees(self) -> f64 {
        self.normalized_radians().to_degrees()
    }

    /// Rotates the vector (dx, dy) by this angle.
    pub fn rotate_vector(self, dx: f64, dy: f64) -> (f64, f64) {
        let (sin, cos) = self.0.sin_cos();
        (dx * cos - dy * sin, dx * sin + dy * cos)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.normalized_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_directions() {
        let left = Angle::turn_between(1.0, 0.0, 0.0, 1.0);
        assert!((left.inner_radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let right = Angle::turn_between(1.0, 0.0, 0.0, -1.0);
        assert!((right.inner_radians() + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(Angle::turn_between(1.0, 0.0, 5.0, 0.0).inner_radians(), 0.0);
    }

    #[test]
    fn rotate_vector_quarter_turn() {
        let (x, y) = Angle::degrees(90.0).rotate_vector(2.0, 0.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 2.0).abs() < 1e-12);
        assert!((Angle::degrees(-90.0).normalized_degrees() - 270.0).abs() < 1e-9);
    }
}
