//! Polyline representation for route geometries.
//!
//! The routing service returns geometry as an array of `[lon, lat]` pairs.
//! This type keeps the decoded points; drawing happens behind the display
//! port.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A route geometry as an ordered list of coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Wraps already-validated route points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Points in travel order.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
