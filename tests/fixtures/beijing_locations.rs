//! Real Beijing landmarks for itinerary fixtures.
//!
//! Coordinates are (longitude, latitude), GCJ-02 as returned by the
//! geocoder.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lng: f64,
    pub lat: f64,
}

impl Location {
    pub const fn new(name: &'static str, lng: f64, lat: f64) -> Self {
        Self { name, lng, lat }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lng, self.lat)
    }
}

pub const LANDMARKS: &[Location] = &[
    Location::new("Forbidden City", 116.397128, 39.916527),
    Location::new("Tiananmen Square", 116.397755, 39.903179),
    Location::new("Jingshan Park", 116.396630, 39.925380),
    Location::new("Beihai Park", 116.389480, 39.925530),
    Location::new("Temple of Heaven", 116.410829, 39.881913),
    Location::new("Lama Temple", 116.417260, 39.947330),
    Location::new("Summer Palace", 116.275500, 39.999900),
    Location::new("Old Summer Palace", 116.310320, 40.008800),
    Location::new("Olympic Park", 116.395850, 39.993820),
    Location::new("798 Art District", 116.495310, 39.984260),
];

pub fn landmark_coords(n: usize) -> Vec<(f64, f64)> {
    LANDMARKS.iter().take(n).map(Location::coords).collect()
}
