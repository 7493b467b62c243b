//! HTTP adapter for the travel backend.
//!
//! Implements the job, routing and geocoding ports over the backend's JSON
//! endpoints. Authentication rides on the session cookie kept by the
//! client's cookie store.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, GeocodeError, RouteServiceError};
use crate::geo::{Coordinate, GeocodeResult, validate_json_waypoints};
use crate::itinerary::{PlanPayload, PlanRequest, TravelPlan};
use crate::poller::{TaskId, TaskStatus, TaskStatusReport};
use crate::polyline::Polyline;
use crate::route_cache::RouteResult;
use crate::traits::{Geocoder, RoutingService, TaskBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    config: BackendConfig,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl TaskBackend for BackendClient {
    async fn submit_plan(&self, request: &PlanRequest) -> Result<TaskId, BackendError> {
        let url = self.url("/api/generate-plan");
        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }

        let text = response.text().await?;
        parse_submit(status, &text)
    }

    async fn task_status(&self, task_id: &TaskId) -> Result<TaskStatusReport, BackendError> {
        let url = self.url(&format!("/api/task/{}", task_id));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                %url,
                status = status.as_u16(),
                body = %text,
                "task status request failed"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_task_status(&text)
    }
}

#[async_trait]
impl RoutingService for BackendClient {
    async fn plan_external_route(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<RouteResult, RouteServiceError> {
        let url = self.url("/api/route-planning");
        let body = RoutePlanningRequest { waypoints };

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(%url, error = %e, "failed to send route planning request");
                return Err(RouteServiceError::Network(e.to_string()));
            }
        };

        let text = response
            .text()
            .await
            .map_err(|e| RouteServiceError::Network(e.to_string()))?;
        parse_route(&text)
    }
}

#[async_trait]
impl Geocoder for BackendClient {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodeError> {
        let url = self.url("/api/geocode");
        let response = self
            .client
            .get(&url)
            .query(&[("address", address)])
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let text = response
            .text()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;
        parse_geocode(address, &text)
    }
}

#[derive(Serialize)]
struct RoutePlanningRequest<'a> {
    waypoints: &'a [Coordinate],
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    task_id: Option<String>,
    error: Option<String>,
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskStatusResponse {
    status: TaskStatus,
    error: Option<String>,
    plan_id: Option<i64>,
    plan: Option<TravelPlan>,
}

#[derive(Debug, Deserialize)]
struct RoutePlanningResponse {
    #[serde(default)]
    success: bool,
    route: Option<RouteBody>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    #[serde(default)]
    polyline: Vec<serde_json::Value>,
    distance: f64,
    duration: f64,
    waypoints_count: usize,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    formatted_address: Option<String>,
    error: Option<String>,
}

fn parse_submit(status: StatusCode, text: &str) -> Result<TaskId, BackendError> {
    let body: SubmitResponse = serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            status = status.as_u16(),
            error = %e,
            body = %text,
            "unparseable submit response"
        );
        e
    })?;

    match body {
        SubmitResponse {
            success: true,
            task_id: Some(task_id),
            ..
        } => Ok(TaskId::new(task_id)),
        SubmitResponse { error, msg, .. } => Err(BackendError::Rejected(
            error
                .or(msg)
                .unwrap_or_else(|| format!("plan submission failed with status {}", status)),
        )),
    }
}

fn parse_task_status(text: &str) -> Result<TaskStatusReport, BackendError> {
    let body: TaskStatusResponse = serde_json::from_str(text)?;
    let payload = match (body.plan_id, body.plan) {
        (None, None) => None,
        (plan_id, plan) => Some(PlanPayload {
            plan_id,
            plan: plan.unwrap_or_default(),
        }),
    };

    Ok(TaskStatusReport {
        status: body.status,
        payload,
        error: body.error,
    })
}

fn parse_route(text: &str) -> Result<RouteResult, RouteServiceError> {
    let body: RoutePlanningResponse = serde_json::from_str(text).map_err(|e| {
        tracing::error!(error = %e, body = %text, "unparseable route planning response");
        RouteServiceError::Planning(format!("unreadable routing response: {}", e))
    })?;

    match body {
        RoutePlanningResponse {
            success: true,
            route: Some(route),
            ..
        } => Ok(RouteResult {
            polyline: Polyline::new(validate_json_waypoints(&route.polyline)),
            distance_km: route.distance,
            duration_min: route.duration,
            waypoint_count: route.waypoints_count,
        }),
        RoutePlanningResponse { error, .. } => Err(RouteServiceError::Planning(
            error.unwrap_or_else(|| "route planning failed".to_string()),
        )),
    }
}

fn parse_geocode(address: &str, text: &str) -> Result<GeocodeResult, GeocodeError> {
    let body: GeocodeResponse = serde_json::from_str(text)
        .map_err(|_| GeocodeError::NotFound(address.to_string()))?;

    if let Some(error) = &body.error {
        tracing::debug!(address, error = %error, "geocode rejected");
    }

    let coordinate = match (body.longitude, body.latitude) {
        (Some(lon), Some(lat)) => Coordinate::new(lon, lat).ok(),
        _ => None,
    }
    .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

    Ok(GeocodeResult {
        coordinate,
        formatted_address: body.formatted_address.unwrap_or_else(|| address.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = BackendClient::new(BackendConfig {
            base_url: "http://example.test/".to_string(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(client.url("/api/geocode"), "http://example.test/api/geocode");
    }

    #[test]
    fn test_parse_submit_success() {
        let text = json!({"success": true, "task_id": "abc-123", "message": "queued"}).to_string();
        let task_id = parse_submit(StatusCode::OK, &text).unwrap();
        assert_eq!(task_id.as_str(), "abc-123");
    }

    #[test]
    fn test_parse_submit_rejected() {
        let text = json!({"success": false, "error": "submit failed: db down"}).to_string();
        match parse_submit(StatusCode::INTERNAL_SERVER_ERROR, &text) {
            Err(BackendError::Rejected(message)) => assert_eq!(message, "submit failed: db down"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_submit_not_json() {
        assert!(matches!(
            parse_submit(StatusCode::BAD_GATEWAY, "<html>"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_task_status_pending() {
        let text = json!({
            "success": true,
            "status": "pending",
            "created_at": "2024-05-01T10:00:00"
        })
        .to_string();
        let report = parse_task_status(&text).unwrap();
        assert_eq!(report, TaskStatusReport::status(TaskStatus::Pending));
    }

    #[test]
    fn test_parse_task_status_completed_with_plan() {
        let text = json!({
            "success": true,
            "status": "completed",
            "plan_id": 7,
            "plan": {"title": "Trip", "days": [{"day": 1, "items": []}]}
        })
        .to_string();
        let report = parse_task_status(&text).unwrap();
        assert_eq!(report.status, TaskStatus::Completed);
        let payload = report.payload.unwrap();
        assert_eq!(payload.plan_id, Some(7));
        assert_eq!(payload.plan.title, "Trip");
    }

    #[test]
    fn test_parse_task_status_failed() {
        let text = json!({"status": "failed", "error": "user not found"}).to_string();
        let report = parse_task_status(&text).unwrap();
        assert_eq!(report, TaskStatusReport::failed(Some("user not found".to_string())));
    }

    #[test]
    fn test_parse_task_status_unknown_state_is_error() {
        let text = json!({"status": "exploded"}).to_string();
        assert!(matches!(parse_task_status(&text), Err(BackendError::Decode(_))));
    }

    #[test]
    fn test_parse_route_success() {
        let text = json!({
            "success": true,
            "route": {
                "distance": 12.3,
                "duration": 25,
                "polyline": [[116.1, 39.1], [116.2, 39.2], ["bad"], [116.3, 39.3]],
                "waypoints_count": 3
            }
        })
        .to_string();
        let route = parse_route(&text).unwrap();
        assert_eq!(route.distance_km, 12.3);
        assert_eq!(route.duration_min, 25.0);
        assert_eq!(route.waypoint_count, 3);
        assert_eq!(route.polyline.len(), 3);
    }

    #[test]
    fn test_parse_route_error_body() {
        let text = json!({"error": "route planning failed: INVALID_PARAMS"}).to_string();
        assert_eq!(
            parse_route(&text),
            Err(RouteServiceError::Planning(
                "route planning failed: INVALID_PARAMS".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_geocode() {
        let text = json!({
            "latitude": 39.9042,
            "longitude": 116.4074,
            "formatted_address": "Beijing"
        })
        .to_string();
        let result = parse_geocode("beijing", &text).unwrap();
        assert_eq!(result.formatted_address, "Beijing");
        assert_eq!(result.coordinate.longitude(), 116.4074);
    }

    #[test]
    fn test_parse_geocode_not_found() {
        let text = json!({"error": "address lookup failed"}).to_string();
        assert_eq!(
            parse_geocode("nowhere", &text),
            Err(GeocodeError::NotFound("nowhere".to_string()))
        );
    }

    #[test]
    fn test_request_body_shape() {
        let waypoints = vec![Coordinate::new(1.0, 2.0).unwrap()];
        let body = serde_json::to_value(RoutePlanningRequest {
            waypoints: &waypoints,
        })
        .unwrap();
        assert_eq!(body, json!({"waypoints": [[1.0, 2.0]]}));
    }
}
