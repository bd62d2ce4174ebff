use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::chart::chart_series;
use crate::models::ChartPoint;
use crate::state::AppState;
use crate::store::MAX_READINGS;

// ---

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chart", get(handler))
}

/// Sensor filter chosen on the dashboard; all sensors when absent.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    sensor_id: Option<String>,
}

/// `GET /api/chart`
async fn handler(
    Query(params): Query<ChartQuery>,
    State(state): State<AppState>,
) -> Json<Vec<ChartPoint>> {
    // ---
    let history = match params.sensor_id.as_deref() {
        Some(id) => state.store.history(id, MAX_READINGS).await,
        None => state.store.recent(MAX_READINGS).await,
    };
    Json(chart_series(&history, &state.config.chart_offset))
}
