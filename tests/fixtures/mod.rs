//! Test fixtures for travel-planner.
//!
//! Provides real Beijing locations plus scripted fakes for the backend,
//! routing and sleeper ports. Fakes share their state through an `Arc` so a
//! test can keep a clone after handing one to the component under test.

#![allow(dead_code)]

pub mod beijing_locations;

pub use beijing_locations::*;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use travel_planner::error::{BackendError, RouteServiceError};
use travel_planner::geo::Coordinate;
use travel_planner::itinerary::{DayPlan, PlanItem, PlanPayload, PlanRequest, TravelPlan};
use travel_planner::poller::{CancelToken, TaskId, TaskStatus, TaskStatusReport};
use travel_planner::polyline::Polyline;
use travel_planner::route_cache::RouteResult;
use travel_planner::traits::{RoutingService, Sleeper, TaskBackend};

// ============================================================================
// Task backend
// ============================================================================

#[derive(Default)]
struct BackendState {
    submit_error: Option<BackendError>,
    responses: VecDeque<Result<TaskStatusReport, BackendError>>,
    submitted: Vec<PlanRequest>,
    polls: Vec<TaskId>,
}

/// Replays scripted poll responses in order, then answers `pending`.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<BackendState>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<Result<TaskStatusReport, BackendError>>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().responses = responses.into();
        backend
    }

    pub fn statuses(statuses: &[TaskStatus]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|&status| Ok(TaskStatusReport::status(status)))
                .collect(),
        )
    }

    pub fn rejecting_submit(error: BackendError) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().submit_error = Some(error);
        backend
    }

    pub fn poll_count(&self) -> usize {
        self.state.lock().unwrap().polls.len()
    }

    pub fn polled_ids(&self) -> Vec<TaskId> {
        self.state.lock().unwrap().polls.clone()
    }

    pub fn submitted(&self) -> Vec<PlanRequest> {
        self.state.lock().unwrap().submitted.clone()
    }
}

#[async_trait]
impl TaskBackend for ScriptedBackend {
    async fn submit_plan(&self, request: &PlanRequest) -> Result<TaskId, BackendError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.submit_error.take() {
            return Err(error);
        }
        state.submitted.push(request.clone());
        Ok(TaskId::new("task-1"))
    }

    async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatusReport, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.polls.push(task_id.clone());
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(TaskStatusReport::status(TaskStatus::Pending)))
    }
}

pub fn unavailable() -> BackendError {
    BackendError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

// ============================================================================
// Sleeper
// ============================================================================

/// Records requested waits without waiting. Optionally cancels a token once
/// a given number of sleeps has happened.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl RecordingSleeper {
    pub fn cancelling_after(sleeps: usize, token: CancelToken) -> Self {
        Self {
            cancel_after: Some((sleeps, token)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(duration);
            calls.len()
        };
        if let Some((after, token)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }
    }
}

// ============================================================================
// Routing
// ============================================================================

#[derive(Default)]
struct RoutingState {
    calls: Vec<Vec<Coordinate>>,
    failures: VecDeque<RouteServiceError>,
}

/// Returns a straight-line route through the requested waypoints unless a
/// scripted failure is queued.
#[derive(Clone, Default)]
pub struct ScriptedRouting {
    state: Arc<Mutex<RoutingState>>,
}

impl ScriptedRouting {
    pub fn failing_first(errors: Vec<RouteServiceError>) -> Self {
        let routing = Self::default();
        routing.state.lock().unwrap().failures = errors.into();
        routing
    }

    pub fn fail_next(&self, error: RouteServiceError) {
        self.state.lock().unwrap().failures.push_back(error);
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn calls(&self) -> Vec<Vec<Coordinate>> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl RoutingService for ScriptedRouting {
    async fn plan_external_route(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<RouteResult, RouteServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(waypoints.to_vec());
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        Ok(RouteResult {
            polyline: Polyline::new(waypoints.to_vec()),
            distance_km: 4.2 * waypoints.len() as f64,
            duration_min: 11.0 * waypoints.len() as f64,
            waypoint_count: waypoints.len(),
        })
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
    points
        .iter()
        .map(|&pair| Coordinate::try_from(pair).unwrap())
        .collect()
}

/// A one-day plan visiting `locations` in order.
pub fn plan_through(locations: &[Location]) -> PlanPayload {
    PlanPayload {
        plan_id: Some(1),
        plan: TravelPlan {
            title: "Beijing highlights".to_string(),
            days: vec![DayPlan {
                day: 1,
                items: locations
                    .iter()
                    .map(|location| PlanItem {
                        activity: location.name.to_string(),
                        longitude: Some(location.lng),
                        latitude: Some(location.lat),
                        ..PlanItem::default()
                    })
                    .collect(),
                ..DayPlan::default()
            }],
            ..TravelPlan::default()
        },
    }
}
