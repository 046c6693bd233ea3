use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance in kilometres between two points, via the haversine formula.
///
/// Inputs are degrees. Non-finite inputs produce a non-finite result.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// A latitude/longitude pair as typed by a client, e.g. `"41.99 21.43"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatesError {
    #[error("coordinates are required")]
    Empty,
    #[error("coordinates must be \"<latitude> <longitude>\"")]
    Malformed,
    #[error("latitude must be within [-90, 90] and longitude within [-180, 180]")]
    OutOfRange,
}

impl Coordinates {
    pub fn is_valid(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
    }
}

impl FromStr for Coordinates {
    type Err = CoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref COORDS_RE: Regex =
                Regex::new(r"^([+-]?\d+(?:\.\d+)?)\s+([+-]?\d+(?:\.\d+)?)$").unwrap();
        }
        let s = s.trim();
        if s.is_empty() {
            return Err(CoordinatesError::Empty);
        }
        let caps = COORDS_RE.captures(s).ok_or(CoordinatesError::Malformed)?;
        let latitude: f64 = caps[1].parse().map_err(|_| CoordinatesError::Malformed)?;
        let longitude: f64 = caps[2].parse().map_err(|_| CoordinatesError::Malformed)?;
        if !Self::is_valid(latitude, longitude) {
            return Err(CoordinatesError::OutOfRange);
        }
        Ok(Self { latitude, longitude })
    }
}
