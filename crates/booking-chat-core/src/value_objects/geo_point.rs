//! Geographic coordinate pair carried by location messages

use serde::{Deserialize, Serialize};

/// A validated latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub const MAX_LATITUDE: f64 = 90.0;
    pub const MAX_LONGITUDE: f64 = 180.0;

    /// Returns `None` unless both values are finite and inside
    /// [-90, 90] / [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && latitude.abs() <= Self::MAX_LATITUDE;
        let lng_ok = longitude.is_finite() && longitude.abs() <= Self::MAX_LONGITUDE;
        (lat_ok && lng_ok).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a pair of textual coordinates, e.g. from a form field
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let lat = latitude.trim().parse::<f64>().ok()?;
        let lng = longitude.trim().parse::<f64>().ok()?;
        Self::new(lat, lng)
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
