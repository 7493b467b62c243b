//! Map display component for one itinerary.
//!
//! Owns the route cache and clears it whenever the itinerary changes, so a
//! cached route never outlives the itinerary it was computed for.

use crate::error::RouteError;
use crate::geo::Coordinate;
use crate::itinerary::TravelPlan;
use crate::route_cache::{CacheStatus, RouteCache};
use crate::route_planner::{RouteOptions, RoutePlannerClient};
use crate::traits::{RouteDisplay, RouteSource, RoutingService};

pub struct ItineraryMap<R, D> {
    planner: RoutePlannerClient<R>,
    display: D,
    cache: RouteCache,
    waypoints: Vec<Coordinate>,
}

impl<R: RoutingService, D: RouteDisplay> ItineraryMap<R, D> {
    pub fn new(planner: RoutePlannerClient<R>, display: D) -> Self {
        Self {
            planner,
            display,
            cache: RouteCache::new(),
            waypoints: Vec::new(),
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn planner(&self) -> &RoutePlannerClient<R> {
        &self.planner
    }

    pub fn waypoints(&self) -> &[Coordinate] {
        &self.waypoints
    }

    pub fn route_visible(&self) -> bool {
        self.cache.is_visible()
    }

    pub fn has_cached_route(&self) -> bool {
        self.cache.has_valid()
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }

    /// Replaces the displayed itinerary, dropping any route drawn for the
    /// previous one.
    pub fn show_itinerary(&mut self, plan: &TravelPlan) {
        self.display.clear_route();
        self.cache.clear();
        self.waypoints = plan.waypoints();
        tracing::info!(waypoints = self.waypoints.len(), "itinerary updated");
    }

    /// Draws the route for the current itinerary, reusing the cached one
    /// unless `options.force_refresh` is set.
    pub async fn draw_route(&mut self, options: RouteOptions) -> Result<RouteSource, RouteError> {
        match self
            .planner
            .plan_route(&mut self.cache, &self.waypoints, options)
            .await
        {
            Ok(planned) => {
                self.display.draw_route(&planned.entry.result, planned.source);
                Ok(planned.source)
            }
            Err(err) => {
                self.display.show_route_error(&err.to_string());
                Err(err)
            }
        }
    }

    pub async fn force_refresh_route(&mut self) -> Result<RouteSource, RouteError> {
        self.draw_route(RouteOptions::refresh()).await
    }

    /// Redraws the cached route without recomputing. Returns false when
    /// nothing is cached.
    pub fn show_cached_route(&mut self) -> bool {
        match self.cache.show() {
            Some(entry) => {
                self.display.draw_route(&entry.result, RouteSource::Cached);
                true
            }
            None => false,
        }
    }

    /// Removes the drawn route but keeps it cached.
    pub fn hide_route(&mut self) {
        self.display.clear_route();
        self.cache.hide();
    }

    /// Flips route visibility. With a cached route this never recomputes;
    /// without one the route is planned.
    pub async fn toggle_route(&mut self) -> Result<bool, RouteError> {
        if self.cache.has_valid() {
            if self.cache.is_visible() {
                self.hide_route();
                return Ok(false);
            }
            return Ok(self.show_cached_route());
        }
        self.draw_route(RouteOptions::default()).await?;
        Ok(true)
    }
}
