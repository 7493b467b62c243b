//! Geographic coordinates and waypoint validation.
//!
//! Coordinates are stored as (longitude, latitude), the order used by the
//! routing backend and by the fingerprint format.

use serde::{Deserialize, Serialize};

use crate::error::InvalidCoordinate;

/// Legal longitude range in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Legal latitude range in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// A validated (longitude, latitude) pair.
///
/// Serialises as a two-element array `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, InvalidCoordinate> {
        let lon_ok = longitude.is_finite()
            && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&longitude);
        let lat_ok =
            latitude.is_finite() && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&latitude);

        if lon_ok && lat_ok {
            Ok(Self {
                longitude,
                latitude,
            })
        } else {
            Err(InvalidCoordinate::OutOfRange {
                longitude,
                latitude,
            })
        }
    }

    /// Parses a JSON `[lon, lat]` array.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, InvalidCoordinate> {
        let pair = value.as_array().ok_or(InvalidCoordinate::Malformed)?;
        match pair.as_slice() {
            [lon, lat] => {
                let lon = lon.as_f64().ok_or(InvalidCoordinate::Malformed)?;
                let lat = lat.as_f64().ok_or(InvalidCoordinate::Malformed)?;
                Self::new(lon, lat)
            }
            _ => Err(InvalidCoordinate::Malformed),
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Renders `lon,lat` with a fixed number of decimals, see [`to_fixed`].
    pub fn key(&self, decimals: usize) -> String {
        format!(
            "{},{}",
            to_fixed(self.longitude, decimals),
            to_fixed(self.latitude, decimals)
        )
    }
}

/// Renders `value` with `decimals` fraction digits the way the web client's
/// `toFixed` does: exact ties round away from zero and negative zero prints
/// as zero.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    let value = value + 0.0;
    let exp = decimals as i32;
    // exact ties are the odd multiples of 2^-(decimals + 1)
    let scaled = value * 2f64.powi(exp + 1);
    if value.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 != 0.0 {
        let magnitude = (value.abs() * 10f64.powi(exp)).ceil() / 10f64.powi(exp);
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}{magnitude:.decimals$}");
    }
    format!("{value:.decimals$}")
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from((longitude, latitude): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(longitude, latitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coord: Coordinate) -> Self {
        (coord.longitude, coord.latitude)
    }
}

/// A resolved address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    pub formatted_address: String,
}

/// Keeps the valid subset of raw `(lon, lat)` pairs, preserving order.
pub fn validate_waypoints(raw: &[(f64, f64)]) -> Vec<Coordinate> {
    let valid: Vec<Coordinate> = raw
        .iter()
        .filter_map(|&pair| Coordinate::try_from(pair).ok())
        .collect();

    let dropped = raw.len() - valid.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = valid.len(), "dropped invalid waypoints");
    }
    valid
}

/// Same as [`validate_waypoints`] for JSON-sourced entries, where malformed
/// shapes are also dropped.
pub fn validate_json_waypoints(raw: &[serde_json::Value]) -> Vec<Coordinate> {
    let valid: Vec<Coordinate> = raw
        .iter()
        .filter_map(|value| Coordinate::from_json(value).ok())
        .collect();

    let dropped = raw.len() - valid.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = valid.len(), "dropped malformed waypoints");
    }
    valid
}
