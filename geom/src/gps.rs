use std::fmt;

use geo::HaversineDistance;
use serde::{Deserialize, Serialize};

use crate::Distance;

/// longitude is x, latitude is y
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    pub fn x(&self) -> f64 {
        self.longitude
    }

    pub fn y(&self) -> f64 {
        self.latitude
    }

    /// Great-circle distance along the ground.
    pub fn gps_dist(self, other: LonLat) -> Distance {
        Distance::meters(self.to_geo().haversine_distance(&other.to_geo()))
    }

    /// The ground length of a path through these points.
    pub fn path_length(pts: &[LonLat]) -> Distance {
        pts.windows(2).map(|pair| pair[0].gps_dist(pair[1])).sum()
    }

    pub fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GPSBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GPSBounds {
    pub fn new() -> GPSBounds {
        GPSBounds {
            min_lon: f64::MAX,
            min_lat: f64::MAX,
            max_lon: f64::MIN,
            max_lat: f64::MIN,
        }
    }

    pub fn update(&mut self, pt: LonLat) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lat = self.max_lat.max(pt.latitude);
    }

    /// True if nothing has been added yet
    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

impl Default for GPSBounds {
    fn default() -> Self {
        GPSBounds::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        let mut b = GPSBounds::new();
        assert!(b.is_empty());
        b.update(LonLat::new(10.0, 60.0));
        b.update(LonLat::new(10.2, 59.8));
        assert!(!b.is_empty());
        assert!(b.contains(LonLat::new(10.1, 59.9)));
        assert!(!b.contains(LonLat::new(10.3, 59.9)));
        assert_eq!(b.center(), LonLat::new(10.1, 59.9));
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = LonLat::new(10.0, 60.0).gps_dist(LonLat::new(10.0, 61.0));
        // Roughly 111km, depending on the earth radius used
        assert!((d.inner_meters() - 111_195.0).abs() < 100.0);
    }
}
