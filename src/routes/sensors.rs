use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conditions::{average_conditions, round_half_away};
use crate::error::{AppError, AppResult};
use crate::models::{AverageConditions, SensorReading};
use crate::state::AppState;
use crate::store::MAX_READINGS;

// ---

const DEFAULT_LIMIT: usize = 100;

/// Readings considered by `/api/sensors/summary`.
const SUMMARY_WINDOW: usize = 50;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/sensors", get(list_readings))
        .route("/api/sensors/live", get(live_readings))
        .route("/api/sensors/summary", get(summary))
        .route("/api/sensors/{sensor_id}", get(sensor_history))
        .route("/api/conditions", get(conditions))
}

/// Query parameters for reading lists.
///
/// `limit` is kept as text so a non-numeric value is reported through
/// [`AppError`] like any other out-of-range limit.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<String>,
}

impl LimitQuery {
    /// Requested limit, defaulting to 100; must be within 1..=MAX_READINGS.
    fn limit(&self) -> AppResult<usize> {
        // ---
        let Some(raw) = self.limit.as_deref() else {
            return Ok(DEFAULT_LIMIT);
        };
        match raw.trim().parse::<usize>() {
            Ok(n) if (1..=MAX_READINGS).contains(&n) => Ok(n),
            _ => Err(AppError::BadRequest(format!(
                "limit must be an integer between 1 and {}, got '{}'",
                MAX_READINGS, raw
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SensorSummary {
    // ---
    total_readings: usize,
    unique_sensors: usize,
    averages: Option<AverageConditions>,
    total_rainfall: f64,
    last_reading: Option<DateTime<Utc>>,
}

/// `GET /api/sensors`
async fn list_readings(
    Query(params): Query<LimitQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SensorReading>>> {
    // ---
    let limit = params.limit()?;
    Ok(Json(state.store.recent(limit).await))
}

/// `GET /api/sensors/live`: the latest reading of each sensor.
async fn live_readings(State(state): State<AppState>) -> Json<Vec<SensorReading>> {
    // ---
    Json(state.store.live().await)
}

/// `GET /api/sensors/{sensor_id}`
async fn sensor_history(
    Path(sensor_id): Path<String>,
    Query(params): Query<LimitQuery>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SensorReading>>> {
    // ---
    let history = state.store.history(&sensor_id, params.limit()?).await;
    if history.is_empty() {
        return Err(AppError::NotFound(format!(
            "No data found for sensor {}",
            sensor_id
        )));
    }
    debug!("Returning {} readings for {}", history.len(), sensor_id);
    Ok(Json(history))
}

/// `GET /api/sensors/summary`
async fn summary(State(state): State<AppState>) -> Json<SensorSummary> {
    // ---
    let readings = state.store.recent(SUMMARY_WINDOW).await;
    Json(summarize(&readings))
}

/// `GET /api/conditions`: averaged live conditions, `null` when no data.
async fn conditions(State(state): State<AppState>) -> Json<Option<AverageConditions>> {
    // ---
    let live = state.store.live().await;
    Json(average_conditions(&live))
}

fn summarize(readings: &[SensorReading]) -> SensorSummary {
    // ---
    let unique: HashSet<&str> = readings.iter().map(|r| r.sensor_id.as_str()).collect();
    SensorSummary {
        total_readings: readings.len(),
        unique_sensors: unique.len(),
        averages: average_conditions(readings),
        total_rainfall: round_half_away(readings.iter().map(|r| r.rainfall).sum(), 1),
        last_reading: readings.last().map(|r| r.timestamp),
    }
}
