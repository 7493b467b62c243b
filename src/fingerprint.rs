//! Order-sensitive fingerprint of a waypoint sequence.
//!
//! Each point is rendered as `lon,lat` with six decimals, the points are
//! joined with `|`, and the text is folded with the 31-multiplier polynomial
//! rolling hash wrapped to a signed 32-bit integer. The result is a cheap
//! change detector for the route cache, not a cryptographic digest.

use std::fmt;

use serde::Serialize;

use crate::geo::Coordinate;

/// Decimal places used when rendering coordinates for hashing.
pub const FINGERPRINT_PRECISION: usize = 6;

const SEPARATOR: char = '|';

/// Fingerprint of a non-empty waypoint sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct RouteFingerprint(i32);

impl RouteFingerprint {
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for RouteFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RouteFingerprint> for String {
    fn from(fingerprint: RouteFingerprint) -> Self {
        fingerprint.to_string()
    }
}

/// Computes the fingerprint of `waypoints`; `None` means "no route".
pub fn fingerprint(waypoints: &[Coordinate]) -> Option<RouteFingerprint> {
    if waypoints.is_empty() {
        return None;
    }
    Some(RouteFingerprint(rolling_hash(&canonical_text(waypoints))))
}

fn canonical_text(waypoints: &[Coordinate]) -> String {
    let mut text = String::with_capacity(waypoints.len() * 24);
    for (i, point) in waypoints.iter().enumerate() {
        if i > 0 {
            text.push(SEPARATOR);
        }
        text.push_str(&point_key(point));
    }
    text
}

/// One point as it appears in the fingerprint text. Equality of these keys
/// is what the cache compares on a fingerprint hit.
pub(crate) fn point_key(point: &Coordinate) -> String {
    point.key(FINGERPRINT_PRECISION)
}

fn rolling_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
