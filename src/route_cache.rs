//! Single-slot cache for the route of the displayed itinerary.
//!
//! The cache holds at most one entry. Storing a route evicts whatever was
//! there before. Visibility is tracked separately from validity so a route
//! can be hidden and shown again without being recomputed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fingerprint::{RouteFingerprint, fingerprint, point_key};
use crate::geo::Coordinate;
use crate::polyline::Polyline;

/// A planned route as returned by the routing service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub polyline: Polyline,
    pub distance_km: f64,
    pub duration_min: f64,
    pub waypoint_count: usize,
}

/// The cached route together with the waypoints it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCacheEntry {
    pub fingerprint: RouteFingerprint,
    pub result: RouteResult,
    pub original_waypoints: Vec<Coordinate>,
    pub created_at: DateTime<Utc>,
}

impl RouteCacheEntry {
    /// True when `waypoints` render identically to the stored waypoints at
    /// fingerprint precision.
    fn matches(&self, waypoints: &[Coordinate]) -> bool {
        self.original_waypoints.len() == waypoints.len()
            && self
                .original_waypoints
                .iter()
                .zip(waypoints)
                .all(|(a, b)| point_key(a) == point_key(b))
    }
}

/// Diagnostic view of the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheStatus {
    Empty,
    Cached {
        waypoint_count: usize,
        distance_km: f64,
        duration_min: f64,
        cached_at: DateTime<Utc>,
        fingerprint: RouteFingerprint,
        visible: bool,
    },
}

#[derive(Debug, Default)]
pub struct RouteCache {
    entry: Option<RouteCacheEntry>,
    visible: bool,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entry when it was computed for `waypoints` and a
    /// refresh is not forced. `waypoints` must already be sampled.
    pub fn try_reuse(
        &self,
        waypoints: &[Coordinate],
        force_refresh: bool,
    ) -> Option<&RouteCacheEntry> {
        if force_refresh {
            return None;
        }
        let wanted = fingerprint(waypoints)?;
        let entry = self.entry.as_ref()?;

        if entry.fingerprint != wanted {
            return None;
        }
        if !entry.matches(waypoints) {
            tracing::warn!(fingerprint = %wanted, "fingerprint collision, ignoring cached route");
            return None;
        }
        Some(entry)
    }

    /// Replaces any existing entry.
    pub fn store(
        &mut self,
        fingerprint: RouteFingerprint,
        result: RouteResult,
        original_waypoints: Vec<Coordinate>,
    ) -> &RouteCacheEntry {
        if let Some(previous) = &self.entry {
            if previous.fingerprint != fingerprint {
                tracing::debug!(
                    old = %previous.fingerprint,
                    new = %fingerprint,
                    "evicting cached route"
                );
            }
        }
        tracing::debug!(%fingerprint, waypoints = original_waypoints.len(), "route cached");

        self.entry.insert(RouteCacheEntry {
            fingerprint,
            result,
            original_waypoints,
            created_at: Utc::now(),
        })
    }

    /// Drops the entry and hides the route.
    pub fn clear(&mut self) {
        if self.entry.take().is_some() {
            tracing::debug!("route cache cleared");
        }
        self.visible = false;
    }

    pub fn has_valid(&self) -> bool {
        self.entry.is_some()
    }

    pub fn entry(&self) -> Option<&RouteCacheEntry> {
        self.entry.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Marks the cached route visible and returns it for drawing. With no
    /// entry this is a no-op returning `None`.
    pub fn show(&mut self) -> Option<&RouteCacheEntry> {
        match &self.entry {
            Some(entry) => {
                self.visible = true;
                Some(entry)
            }
            None => {
                tracing::warn!("no cached route to show");
                None
            }
        }
    }

    /// Hides the route but keeps the entry for a later [`RouteCache::show`].
    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn status(&self) -> CacheStatus {
        match &self.entry {
            None => CacheStatus::Empty,
            Some(entry) => CacheStatus::Cached {
                waypoint_count: entry.result.waypoint_count,
                distance_km: entry.result.distance_km,
                duration_min: entry.result.duration_min,
                cached_at: entry.created_at,
                fingerprint: entry.fingerprint,
                visible: self.visible,
            },
        }
    }
}
