//! Geographic points and the common location interface.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::GeoBound;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a new point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle (haversine) distance in kilometres.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    /// Clamps this point into the bound.
    pub fn clamp_to_bound(&mut self, bound: &GeoBound) {
        self.lat = self.lat.clamp(bound.lat_min, bound.lat_max);
        self.lon = self.lon.clamp(bound.lon_min, bound.lon_max);
    }

    /// Returns a copy of this point clamped into the bound.
    pub fn clamped(mut self, bound: &GeoBound) -> Self {
        self.clamp_to_bound(bound);
        self
    }

    /// Arithmetic mean of a set of points, `None` when empty.
    pub fn centroid<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<GeoPoint> {
        let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
        for p in points {
            lat += p.lat;
            lon += p.lon;
            n += 1;
        }
        if n == 0 {
            None
        } else {
            Some(GeoPoint::new(lat / n as f64, lon / n as f64))
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Anything with a stable id and a position on the map.
pub trait Location {
    /// Identifier, unique within a [`State`](crate::state::State).
    fn id(&self) -> usize;

    /// Current coordinates.
    fn position(&self) -> GeoPoint;

    /// Haversine distance from this location to a coordinate, in kilometres.
    fn distance(&self, lat: f64, lon: f64) -> f64 {
        self.position().distance_to(&GeoPoint::new(lat, lon))
    }

    /// Haversine distance between two locations, in kilometres.
    fn distance_to_location(&self, other: &dyn Location) -> f64 {
        self.position().distance_to(&other.position())
    }
}
