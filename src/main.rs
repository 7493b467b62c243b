//! Command-line client: generate a plan, geocode an address or route waypoints.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use std::io;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::runtime::Builder;

use travel_planner::backend::BackendClient;
use travel_planner::config::AppConfig;
use travel_planner::geo::Coordinate;
use travel_planner::itinerary::PlanRequest;
use travel_planner::map_view::ItineraryMap;
use travel_planner::poller::{CancelToken, PollOutcome, TaskPoller};
use travel_planner::route_cache::{RouteCache, RouteResult};
use travel_planner::route_planner::{RouteOptions, RoutePlannerClient};
use travel_planner::telemetry::init_tracing;
use travel_planner::traits::{Geocoder, RouteDisplay, RouteSource};

#[derive(Debug, Parser)]
#[command(
    name = "travel-planner",
    about = "Travel plan generation and route planning client",
    version
)]
struct CliArgs {
    /// Backend base URL. Overrides `TRAVEL_PLANNER_BASE_URL`.
    #[arg(long, global = true, value_name = "url")]
    base_url: Option<String>,
    /// Request timeout in seconds. Overrides `TRAVEL_PLANNER_TIMEOUT_SECS`.
    #[arg(long, global = true, value_name = "secs")]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a travel plan and route its itinerary.
    Plan {
        #[arg(long = "destination", required = true)]
        destinations: Vec<String>,
        #[arg(long, default_value_t = 3)]
        days: u32,
        #[arg(long, default_value_t = 0.0)]
        budget_min: f64,
        #[arg(long, default_value_t = 5000.0)]
        budget_max: f64,
        #[arg(long, default_value = "sightseeing")]
        theme: String,
        #[arg(long, default_value = "train")]
        transport: String,
        /// First day of the trip as `YYYY-MM-DD`.
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Maximum number of status polls.
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// Resolve an address to coordinates.
    Geocode { address: String },
    /// Plan a route through explicit `lon,lat` waypoints.
    Route {
        #[arg(value_name = "lon,lat", value_parser = parse_waypoint, required = true)]
        waypoints: Vec<(f64, f64)>,
    },
}

/// Logs drawn routes instead of rendering them.
#[derive(Debug, Default)]
struct TerminalDisplay {
    last: Option<(RouteResult, RouteSource)>,
}

impl RouteDisplay for TerminalDisplay {
    fn draw_route(&mut self, route: &RouteResult, source: RouteSource) {
        tracing::info!(
            source = ?source,
            distance_km = route.distance_km,
            duration_min = route.duration_min,
            points = route.polyline.len(),
            "route drawn"
        );
        self.last = Some((route.clone(), source));
    }

    fn clear_route(&mut self) {
        self.last = None;
    }

    fn show_route_error(&mut self, message: &str) {
        tracing::error!(error = %message, "route unavailable");
    }
}

fn main() -> io::Result<()> {
    init_tracing();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::parse();

    let mut config = AppConfig::from_env().map_err(io::Error::other)?;
    if let Some(base_url) = args.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.backend.timeout_secs = timeout_secs;
    }

    let client = BackendClient::new(config.backend.clone())
        .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?;

    match args.command {
        Command::Plan {
            destinations,
            days,
            budget_min,
            budget_max,
            theme,
            transport,
            start_date,
            max_attempts,
        } => {
            if let Some(max_attempts) = max_attempts {
                config.poller.max_attempts = max_attempts;
            }
            let request = PlanRequest {
                destinations,
                days,
                budget_min,
                budget_max,
                theme,
                transport,
                start_date,
            };
            run_plan(client, config, request).await
        }
        Command::Geocode { address } => {
            let result = client
                .geocode(&address)
                .await
                .map_err(|error| io::Error::other(error.to_string()))?;
            print_json(&json!({
                "address": result.formatted_address,
                "longitude": result.coordinate.longitude(),
                "latitude": result.coordinate.latitude(),
            }))
        }
        Command::Route { waypoints } => {
            let planner = RoutePlannerClient::with_config(client, config.planner);
            let mut cache = RouteCache::new();
            let planned = planner
                .plan_raw_route(&mut cache, &waypoints, RouteOptions::default())
                .await
                .map_err(|error| io::Error::other(error.to_string()))?;
            let route = planned.entry.result.clone();
            print_json(&json!({
                "route": route,
                "cache": cache.status(),
            }))
        }
    }
}

async fn run_plan(
    client: BackendClient,
    config: AppConfig,
    request: PlanRequest,
) -> io::Result<()> {
    let poller = TaskPoller::new(client.clone(), config.poller);
    let outcome = poller
        .submit_and_poll(&request, &CancelToken::new(), |percent| {
            tracing::info!(percent, "plan generation progress");
        })
        .await
        .map_err(|error| io::Error::other(error.to_string()))?;

    let payload = match outcome {
        PollOutcome::Completed(payload) => payload,
        other => {
            return Err(io::Error::other(other.user_message()));
        }
    };

    let planner = RoutePlannerClient::with_config(client, config.planner);
    let mut map = ItineraryMap::new(planner, TerminalDisplay::default());
    map.show_itinerary(&payload.plan);

    let route = if map.waypoints().len() >= 2 {
        match map.draw_route(RouteOptions::default()).await {
            Ok(_) => map.display().last.as_ref().map(|(route, _)| route.clone()),
            Err(error) => {
                tracing::warn!(error = %error, "itinerary route unavailable");
                None
            }
        }
    } else {
        tracing::info!("itinerary has fewer than two located items, skipping route");
        None
    };

    print_json(&json!({
        "plan_id": payload.plan_id,
        "title": payload.plan.title,
        "days": payload.plan.days.len(),
        "waypoints": map.waypoints(),
        "route": route,
        "cache": map.cache_status(),
    }))
}

fn print_json(value: &serde_json::Value) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{text}");
    Ok(())
}

fn parse_waypoint(raw: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected lon,lat but got {raw:?}"))?;
    let lon = lon
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid longitude {lon:?}: {error}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid latitude {lat:?}: {error}"))?;
    Coordinate::new(lon, lat).map_err(|error| error.to_string())?;
    Ok((lon, lat))
}
