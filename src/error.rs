//! Error types shared across the planner.

use thiserror::Error;

/// A coordinate that failed validation.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinate {
    #[error("coordinate out of range: longitude {longitude}, latitude {latitude}")]
    OutOfRange { longitude: f64, latitude: f64 },

    #[error("malformed coordinate entry")]
    Malformed,
}

/// Failure reported by the external routing capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteServiceError {
    /// The call did not complete; retrying may succeed.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered but could not plan the route.
    #[error("route planning failed: {0}")]
    Planning(String),
}

/// Failure surfaced by [`crate::route_planner::RoutePlannerClient`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("at least 2 valid waypoints are required, got {valid}")]
    InsufficientWaypoints { valid: usize },

    #[error("network error, could not fetch route: {0}")]
    Network(String),

    #[error("route planning failed: {0}")]
    Planning(String),
}

impl RouteError {
    /// Only transport faults are worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RouteError::Network(_))
    }
}

impl From<RouteServiceError> for RouteError {
    fn from(err: RouteServiceError) -> Self {
        match err {
            RouteServiceError::Network(message) => RouteError::Network(message),
            RouteServiceError::Planning(message) => RouteError::Planning(message),
        }
    }
}

/// Failure talking to the plan-generation backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("not logged in")]
    Unauthorized,

    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("failed to parse backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure resolving an address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("address not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Invalid configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
