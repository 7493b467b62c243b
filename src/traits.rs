//! Ports between the planner core and the outside world.
//!
//! The core never talks to a transport or a map widget directly. Concrete
//! adapters (see [`crate::backend`]) and test fakes implement these.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{BackendError, GeocodeError, RouteServiceError};
use crate::geo::{Coordinate, GeocodeResult};
use crate::itinerary::PlanRequest;
use crate::poller::{TaskId, TaskStatusReport};
use crate::route_cache::RouteResult;

/// The plan-generation job backend.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Starts a generation job and returns its id.
    async fn submit_plan(&self, request: &PlanRequest) -> Result<TaskId, BackendError>;

    /// Reads the current state of a job.
    async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatusReport, BackendError>;
}

/// External route planning between ordered waypoints.
#[async_trait]
pub trait RoutingService: Send + Sync {
    async fn plan_external_route(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<RouteResult, RouteServiceError>;
}

/// Address to coordinate lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError>;
}

/// Timer used between polls, injectable so tests run without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Where a drawn route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Fresh,
    Cached,
}

/// Rendering surface for routes (a map widget, a terminal, a test recorder).
pub trait RouteDisplay {
    /// Draws `route`, replacing whatever route is currently drawn.
    fn draw_route(&mut self, route: &RouteResult, source: RouteSource);

    /// Removes the drawn route and its info panel.
    fn clear_route(&mut self);

    /// Shows a user-facing routing error.
    fn show_route_error(&mut self, message: &str);
}
