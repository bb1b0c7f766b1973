//! Converting between WGS84 degrees and a planar, metric frame. All the offset math happens in the
//! planar frame, so every geometry call is handed a `Projector` explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{GeomError, LonLat, Pt2D};

/// Maps between geographic and planar coordinates. Implementations must be consistent:
/// `inverse(forward(pt))` should be `pt` within the projection's tolerance.
pub trait Projector: Send + Sync {
    fn forward(&self, pt: LonLat) -> Result<Pt2D, GeomError>;
    fn inverse(&self, pt: Pt2D) -> Result<LonLat, GeomError>;

    fn forward_all(&self, pts: &[LonLat]) -> Result<Vec<Pt2D>, GeomError> {
        pts.iter().map(|pt| self.forward(*pt)).collect()
    }

    fn inverse_all(&self, pts: &[Pt2D]) -> Result<Vec<LonLat>, GeomError> {
        pts.iter().map(|pt| self.inverse(*pt)).collect()
    }
}

/// Treats longitude as x and latitude as y, both in meters. Only useful to construct test maps
/// and synthetic inputs directly in a planar frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityProjection;

impl Projector for IdentityProjection {
    fn forward(&self, pt: LonLat) -> Result<Pt2D, GeomError> {
        Ok(Pt2D::new(pt.longitude, pt.latitude))
    }

    fn inverse(&self, pt: Pt2D) -> Result<LonLat, GeomError> {
        Ok(LonLat::new(pt.x(), pt.y()))
    }
}

// Latitude bands, 8 degrees each starting at 80S. X is stretched to 84N.
const BANDS: &str = "CDEFGHJKLMNPQRSTUVWX";

/// A UTM zone, like "32V".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmZone {
    number: u8,
    band: char,
}

impl UtmZone {
    pub fn new(number: u8, band: char) -> Result<UtmZone, GeomError> {
        let band = band.to_ascii_uppercase();
        if !(1..=60).contains(&number) {
            return Err(GeomError::InvalidZone(format!(
                "{}{}: the zone number must be between 1 and 60",
                number, band
            )));
        }
        if !BANDS.contains(band) {
            return Err(GeomError::InvalidZone(format!(
                "{}{}: the latitude band must be between C and X, excluding I and O",
                number, band
            )));
        }
        Ok(UtmZone { number, band })
    }

    /// The standard zone for a point, including the exceptions around Norway and Svalbard.
    pub fn containing(pt: LonLat) -> Result<UtmZone, GeomError> {
        let (lon, lat) = (pt.longitude, pt.latitude);
        if !(-80.0..=84.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(GeomError::ProjectionFailure(format!(
                "{} isn't covered by any UTM zone",
                pt
            )));
        }

        let band_idx = (((lat + 80.0) / 8.0).floor() as usize).min(BANDS.len() - 1);
        let band = BANDS.as_bytes()[band_idx] as char;

        let mut number = (((lon + 180.0) / 6.0).floor() as u8 + 1).min(60);
        if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
            number = 32;
        }
        if (72.0..=84.0).contains(&lat) && lon >= 0.0 {
            if lon < 9.0 {
                number = 31;
            } else if lon < 21.0 {
                number = 33;
            } else if lon < 33.0 {
                number = 35;
            } else if lon < 42.0 {
                number = 37;
            }
        }

        UtmZone::new(number, band)
    }

    pub fn number(self) -> u8 {
        self.number
    }

    pub fn band(self) -> char {
        self.band
    }

    pub fn is_northern(self) -> bool {
        self.band >= 'N'
    }

    pub fn central_meridian_degrees(self) -> f64 {
        f64::from(self.number - 1) * 6.0 - 180.0 + 3.0
    }
}

impl FromStr for UtmZone {
    type Err = GeomError;

    fn from_str(raw: &str) -> Result<UtmZone, GeomError> {
        let raw = raw.trim();
        let band = raw
            .chars()
            .last()
            .ok_or_else(|| GeomError::InvalidZone("empty string".to_string()))?;
        if !band.is_ascii_alphabetic() {
            return Err(GeomError::InvalidZone(format!(
                "{} doesn't end with a latitude band letter",
                raw
            )));
        }
        let number = raw[..raw.len() - 1]
            .parse::<u8>()
            .map_err(|_| GeomError::InvalidZone(format!("{} doesn't start with a number", raw)))?;
        UtmZone::new(number, band)
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.number, self.band)
    }
}

// WGS84
const EQUATORIAL_RADIUS: f64 = 6_378_137.0;
const ECC_SQUARED: f64 = 0.006_694_379_990_14;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING: f64 = 10_000_000.0;
// The series below are only accurate within a few degrees of the central meridian.
const MAX_DEGREES_FROM_MERIDIAN: f64 = 9.0;

/// Transverse Mercator for one fixed UTM zone, using the series expansions from Snyder's "Map
/// Projections: A Working Manual". Every point is projected into the same zone, even when it
/// technically falls into a neighboring one, so geometry spanning a zone border stays consistent.
#[derive(Clone, Copy, Debug)]
pub struct UtmProjection {
    zone: UtmZone,
}

impl UtmProjection {
    pub fn new(zone: UtmZone) -> UtmProjection {
        UtmProjection { zone }
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    fn meridian_arc(lat: f64) -> f64 {
        let e2 = ECC_SQUARED;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        EQUATORIAL_RADIUS
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
    }
}

/// Wraps an angle in radians into [-pi, pi).
fn wrap_radians(x: f64) -> f64 {
    let pi = std::f64::consts::PI;
    (x + pi).rem_euclid(2.0 * pi) - pi
}

impl Projector for UtmProjection {
    fn forward(&self, pt: LonLat) -> Result<Pt2D, GeomError> {
        let central = self.zone.central_meridian_degrees();
        let dlon_degrees = wrap_radians((pt.longitude - central).to_radians()).to_degrees();
        if !pt.latitude.is_finite()
            || !pt.longitude.is_finite()
            || !(-80.0..=84.0).contains(&pt.latitude)
            || dlon_degrees.abs() > MAX_DEGREES_FROM_MERIDIAN
        {
            return Err(GeomError::ProjectionFailure(format!(
                "{} is outside the valid domain of UTM zone {}",
                pt, self.zone
            )));
        }

        let ep2 = ECC_SQUARED / (1.0 - ECC_SQUARED);
        let lat = pt.latitude.to_radians();
        let (sin, cos) = lat.sin_cos();
        let tan = sin / cos;
        let t = tan * tan;
        let n = EQUATORIAL_RADIUS / (1.0 - ECC_SQUARED * sin * sin).sqrt();
        let c = ep2 * cos * cos;
        let a = cos * dlon_degrees.to_radians();
        let m = UtmProjection::meridian_arc(lat);

        let x = SCALE_FACTOR
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
            + FALSE_EASTING;
        let mut y = SCALE_FACTOR
            * (m + n
                * tan
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
        if !self.zone.is_northern() {
            y += FALSE_NORTHING;
        }
        Ok(Pt2D::new(x, y))
    }

    fn inverse(&self, pt: Pt2D) -> Result<LonLat, GeomError> {
        let e2 = ECC_SQUARED;
        let ep2 = e2 / (1.0 - e2);
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let x = pt.x() - FALSE_EASTING;
        let mut y = pt.y();
        if !self.zone.is_northern() {
            y -= FALSE_NORTHING;
        }

        let m = y / SCALE_FACTOR;
        let mu = m
            / (EQUATORIAL_RADIUS
                * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));
        let footprint_lat = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin, cos) = footprint_lat.sin_cos();
        let tan = sin / cos;
        let t = tan * tan;
        let c = ep2 * cos * cos;
        let denom = 1.0 - e2 * sin * sin;
        let n = EQUATORIAL_RADIUS / denom.sqrt();
        let r = EQUATORIAL_RADIUS * (1.0 - e2) / denom.powf(1.5);
        let d = x / (n * SCALE_FACTOR);

        let lat = footprint_lat
            - (n * tan / r)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t + 10.0 * c - 4.0 * c * c - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t + 298.0 * c + 45.0 * t * t - 252.0 * ep2 - 3.0 * c * c)
                        * d.powi(6)
                        / 720.0);
        let dlon = (d - (1.0 + 2.0 * t + c) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c + 28.0 * t - 3.0 * c * c + 8.0 * ep2 + 24.0 * t * t) * d.powi(5)
                / 120.0)
            / cos;

        let lon = wrap_radians(dlon + self.zone.central_meridian_degrees().to_radians());
        let result = LonLat::new(lon.to_degrees(), lat.to_degrees());
        if !result.longitude.is_finite()
            || !result.latitude.is_finite()
            || result.latitude.abs() > 90.0
        {
            return Err(GeomError::ProjectionFailure(format!(
                "{} can't be mapped back from UTM zone {}",
                pt, self.zone
            )));
        }
        Ok(result)
    }
}
