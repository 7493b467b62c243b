//! Great-circle distance and near-duplicate waypoint helpers.
//!
//! Callers use these to thin an itinerary before handing it to the route
//! planner. The planner itself never applies them, so the cache key always
//! reflects exactly the sequence that was routed.

use std::collections::HashSet;

use crate::geo::Coordinate;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default merge radius for [`merge_nearby`] (100 m).
pub const DEFAULT_MERGE_THRESHOLD_KM: f64 = 0.1;

/// Decimal places used by [`dedupe_by_precision`] for itinerary points.
pub const DEDUPE_PRECISION: usize = 4;

/// Calculate haversine distance between two points in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude().to_radians();
    let lat2_rad = to.latitude().to_radians();
    let delta_lat = (to.latitude() - from.latitude()).to_radians();
    let delta_lng = (to.longitude() - from.longitude()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Drops each point closer than `threshold_km` to the last kept point.
pub fn merge_nearby(points: &[Coordinate], threshold_km: f64) -> Vec<Coordinate> {
    let mut merged: Vec<Coordinate> = Vec::with_capacity(points.len());
    for &point in points {
        match merged.last() {
            Some(&last) if haversine_km(last, point) < threshold_km => continue,
            _ => merged.push(point),
        }
    }
    merged
}

/// Keeps the first occurrence of each point at `decimals` precision.
pub fn dedupe_by_precision(points: &[Coordinate], decimals: usize) -> Vec<Coordinate> {
    let mut seen = HashSet::new();
    points
        .iter()
        .filter(|point| seen.insert(point.key(decimals)))
        .copied()
        .collect()
}
