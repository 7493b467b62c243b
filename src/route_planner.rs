//! Route planning with cache reuse.
//!
//! The client validates and samples the waypoints, consults the route cache
//! and only calls the external routing service on a miss or a forced
//! refresh. Failed calls leave the cache untouched.

use crate::error::RouteError;
use crate::fingerprint::fingerprint;
use crate::geo::{Coordinate, validate_waypoints};
use crate::route_cache::{RouteCache, RouteCacheEntry};
use crate::sampler::sample;
use crate::traits::{RouteSource, RoutingService};

/// Minimum number of valid waypoints for a route.
pub const MIN_WAYPOINTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlannerConfig {
    /// Sequences longer than this are sampled before routing.
    pub sample_threshold: usize,
    /// Target size of a sampled sequence.
    pub sample_max_points: usize,
}

impl Default for RoutePlannerConfig {
    fn default() -> Self {
        Self {
            sample_threshold: 8,
            sample_max_points: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Skip the cache and always call the routing service.
    pub force_refresh: bool,
}

impl RouteOptions {
    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

/// A route ready to draw, borrowed from the cache.
#[derive(Debug, Clone, Copy)]
pub struct PlannedRoute<'a> {
    pub source: RouteSource,
    pub entry: &'a RouteCacheEntry,
}

pub struct RoutePlannerClient<R> {
    routing: R,
    config: RoutePlannerConfig,
}

impl<R: RoutingService> RoutePlannerClient<R> {
    pub fn new(routing: R) -> Self {
        Self::with_config(routing, RoutePlannerConfig::default())
    }

    pub fn with_config(routing: R, config: RoutePlannerConfig) -> Self {
        Self { routing, config }
    }

    pub fn routing(&self) -> &R {
        &self.routing
    }

    /// The sequence that will actually be fingerprinted and routed.
    pub fn prepare(&self, waypoints: &[Coordinate]) -> Vec<Coordinate> {
        if waypoints.len() > self.config.sample_threshold {
            let sampled = sample(waypoints, self.config.sample_max_points);
            tracing::debug!(
                from = waypoints.len(),
                to = sampled.len(),
                "sampled waypoints for routing"
            );
            sampled
        } else {
            waypoints.to_vec()
        }
    }

    /// Plans a route for raw `(lon, lat)` pairs, dropping invalid entries.
    pub async fn plan_raw_route<'c>(
        &self,
        cache: &'c mut RouteCache,
        raw: &[(f64, f64)],
        options: RouteOptions,
    ) -> Result<PlannedRoute<'c>, RouteError> {
        let valid = validate_waypoints(raw);
        self.plan_route(cache, &valid, options).await
    }

    /// Plans a route, reusing the cached one when the sampled sequence is
    /// unchanged. On success the route is cached and marked visible.
    pub async fn plan_route<'c>(
        &self,
        cache: &'c mut RouteCache,
        waypoints: &[Coordinate],
        options: RouteOptions,
    ) -> Result<PlannedRoute<'c>, RouteError> {
        if waypoints.len() < MIN_WAYPOINTS {
            tracing::warn!(valid = waypoints.len(), "not enough waypoints for routing");
            return Err(RouteError::InsufficientWaypoints {
                valid: waypoints.len(),
            });
        }

        let sampled = self.prepare(waypoints);
        let fp = fingerprint(&sampled).ok_or(RouteError::InsufficientWaypoints { valid: 0 })?;

        let source = if cache.try_reuse(&sampled, options.force_refresh).is_some() {
            tracing::debug!(fingerprint = %fp, "reusing cached route");
            RouteSource::Cached
        } else {
            tracing::info!(
                fingerprint = %fp,
                waypoints = sampled.len(),
                force_refresh = options.force_refresh,
                "requesting route"
            );
            let result = match self.routing.plan_external_route(&sampled).await {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(error = %err, "route planning failed");
                    return Err(err.into());
                }
            };
            tracing::info!(
                distance_km = result.distance_km,
                duration_min = result.duration_min,
                "route planned"
            );
            cache.store(fp, result, sampled);
            RouteSource::Fresh
        };

        cache
            .show()
            .map(|entry| PlannedRoute { source, entry })
            .ok_or_else(|| RouteError::Planning("route cache empty after planning".to_string()))
    }
}
