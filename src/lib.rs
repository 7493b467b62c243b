//! travel-planner client core
//!
//! Waypoint sampling, route fingerprinting, single-slot route caching and
//! background plan-generation polling for an itinerary map client.

pub mod backend;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod geo;
pub mod haversine;
pub mod itinerary;
pub mod map_view;
pub mod poller;
pub mod polyline;
pub mod route_cache;
pub mod route_planner;
pub mod sampler;
pub mod telemetry;
pub mod traits;

pub use error::{RouteError, RouteServiceError};
pub use geo::Coordinate;
pub use poller::{PollOutcome, TaskPoller};
pub use route_cache::{RouteCache, RouteResult};
pub use route_planner::{RouteOptions, RoutePlannerClient};
