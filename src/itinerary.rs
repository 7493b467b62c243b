//! Plan request and generated plan payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::Coordinate;
use crate::haversine::{
    DEDUPE_PRECISION, DEFAULT_MERGE_THRESHOLD_KM, dedupe_by_precision, merge_nearby,
};

/// Form fields submitted to start plan generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub destinations: Vec<String>,
    pub days: u32,
    pub budget_min: f64,
    pub budget_max: f64,
    pub theme: String,
    pub transport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for PlanRequest {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            days: 3,
            budget_min: 0.0,
            budget_max: 5000.0,
            theme: "sightseeing".to_string(),
            transport: "train".to_string(),
            start_date: None,
        }
    }
}

/// Result carried by a completed generation job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPayload {
    #[serde(default)]
    pub plan_id: Option<i64>,
    #[serde(default)]
    pub plan: TravelPlan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelPlan {
    pub title: String,
    pub summary: String,
    pub days: Vec<DayPlan>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayPlan {
    pub day: u32,
    pub date: Option<String>,
    pub theme: String,
    pub items: Vec<PlanItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanItem {
    pub time: Option<String>,
    #[serde(alias = "title")]
    pub activity: String,
    pub description: String,
    pub location: String,
    #[serde(deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub cost: Option<f64>,
}

impl PlanItem {
    /// The item's position, when both coordinates are present and valid.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Coordinate::new(lon, lat).ok(),
            _ => None,
        }
    }
}

impl TravelPlan {
    /// Every located item in visiting order.
    pub fn positions(&self) -> Vec<Coordinate> {
        self.days
            .iter()
            .flat_map(|day| day.items.iter())
            .filter_map(PlanItem::coordinate)
            .collect()
    }

    /// Distinct located items in visiting order. Repeats at 4 decimals are
    /// dropped, then stops within 100 m of the previous kept stop are merged.
    pub fn waypoints(&self) -> Vec<Coordinate> {
        let distinct = dedupe_by_precision(&self.positions(), DEDUPE_PRECISION);
        merge_nearby(&distinct, DEFAULT_MERGE_THRESHOLD_KM)
    }
}

// Generated plans are not strict about number formatting.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
