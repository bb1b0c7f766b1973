use serde::{Deserialize, Serialize};

use geom::{Distance, GeomError, LonLat, PolyLine, Projector};

/// Which side of a road, relative to the direction its nodes are listed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Calculates a curve parallel to `pts`, `distance` away on one side. The result has exactly as
/// many points as the input, each one corresponding to the input point at the same position.
///
/// The math happens in the planar frame of `projector`; see `PolyLine::shift_either_direction`.
pub fn offset(
    pts: &[LonLat],
    distance: Distance,
    side: Side,
    projector: &dyn Projector,
    max_miter_scale: f64,
) -> Result<Vec<LonLat>, GeomError> {
    let planar = PolyLine::new(projector.forward_all(pts)?)?;
    if distance == Distance::ZERO {
        return Ok(pts.to_vec());
    }
    let shifted = match side {
        Side::Left => planar.shift_left(distance, max_miter_scale),
        Side::Right => planar.shift_right(distance, max_miter_scale),
    };
    projector.inverse_all(&shifted)
}

#[cfg(test)]
mod tests {
    use geom::{IdentityProjection, UtmProjection, DEFAULT_MAX_MITER_SCALE};

    use super::*;

    #[test]
    fn failures() {
        let proj = IdentityProjection;
        let d = Distance::meters(1.0);
        assert_eq!(
            offset(&[LonLat::new(0.0, 0.0)], d, Side::Left, &proj, 4.0),
            Err(GeomError::InsufficientPoints { count: 1 })
        );
        assert_eq!(
            offset(
                &[
                    LonLat::new(0.0, 0.0),
                    LonLat::new(0.0, 0.0),
                    LonLat::new(1.0, 0.0)
                ],
                d,
                Side::Right,
                &proj,
                4.0
            ),
            Err(GeomError::DegenerateGeometry { index: 0 })
        );

        let utm = UtmProjection::new("32V".parse().unwrap());
        assert!(matches!(
            offset(
                &[LonLat::new(-122.3, 47.6), LonLat::new(-122.3, 47.7)],
                d,
                Side::Left,
                &utm,
                4.0
            ),
            Err(GeomError::ProjectionFailure(_))
        ));
    }

    #[test]
    fn zero_distance_is_a_no_op() {
        let pts = vec![
            LonLat::new(0.0, 0.0),
            LonLat::new(5.0, 1.0),
            LonLat::new(7.0, 9.0),
        ];
        let result = offset(
            &pts,
            Distance::ZERO,
            Side::Left,
            &IdentityProjection,
            DEFAULT_MAX_MITER_SCALE,
        )
        .unwrap();
        assert_eq!(result, pts);
    }

    #[test]
    fn straight_road_in_utm() {
        // A road heading due north-east out of Oslo
        let pts = vec![
            LonLat::new(10.75, 59.91),
            LonLat::new(10.752, 59.911),
            LonLat::new(10.754, 59.912),
        ];
        let utm = UtmProjection::new("32V".parse().unwrap());
        for side in [Side::Left, Side::Right] {
            let shifted = offset(
                &pts,
                Distance::meters(3.0),
                side,
                &utm,
                DEFAULT_MAX_MITER_SCALE,
            )
            .unwrap();
            assert_eq!(shifted.len(), pts.len());
            for (orig, pt) in pts.iter().zip(shifted.iter()) {
                // UTM scale distortion and haversine's spherical earth both contribute some error
                let dist = orig.gps_dist(*pt).inner_meters();
                assert!((dist - 3.0).abs() < 0.05, "{} vs {} is {}m", orig, pt, dist);
            }
            // Left of a road heading east-ish is north-ish
            let north = shifted[0].latitude > pts[0].latitude;
            assert_eq!(north, side == Side::Left);
        }
    }

    #[test]
    fn hairpin_respects_cap() {
        let pts = vec![
            LonLat::new(0.0, 0.0),
            LonLat::new(1.0, 0.0),
            LonLat::new(0.0, 0.001),
        ];
        let d = Distance::meters(0.5);
        for cap in [1.0, 2.0, DEFAULT_MAX_MITER_SCALE] {
            for side in [Side::Left, Side::Right] {
                let shifted = offset(&pts, d, side, &IdentityProjection, cap).unwrap();
                for (orig, pt) in pts.iter().zip(shifted.iter()) {
                    let dist = (pt.longitude - orig.longitude).hypot(pt.latitude - orig.latitude);
                    assert!(dist <= cap * 0.5 + 1e-9);
                }
            }
        }
    }
}
