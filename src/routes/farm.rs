use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::farm::{EquipmentEntry, EquipmentStatus, Farm, FarmSummary, Plot, PlotStatus};
use crate::state::AppState;
use crate::ws::ServerMessage;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/farm", get(farm))
        .route("/api/farm/summary", get(summary))
        .route("/api/plots", get(plots))
        .route("/api/plots/{plot_id}", get(plot))
        .route("/api/plots/{plot_id}/status", put(update_status))
        .route("/api/plots/{plot_id}/irrigation", put(toggle_irrigation))
        .route("/api/equipment", get(equipment))
        .route("/api/equipment/status/{status}", get(equipment_by_status))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    status: Option<String>,
}

fn plot_not_found(plot_id: &str) -> AppError {
    AppError::NotFound(format!("Plot {} not found", plot_id))
}

/// `GET /api/farm`
async fn farm(State(state): State<AppState>) -> Json<Farm> {
    Json(state.farm.farm().await)
}

/// `GET /api/farm/summary`
async fn summary(State(state): State<AppState>) -> Json<FarmSummary> {
    Json(state.farm.summary(Utc::now()).await)
}

/// `GET /api/plots`
async fn plots(State(state): State<AppState>) -> Json<Vec<Plot>> {
    Json(state.farm.plots().await)
}

/// `GET /api/plots/{plot_id}`
async fn plot(
    Path(plot_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<Plot>> {
    // ---
    match state.farm.plot(&plot_id).await {
        Some(plot) => Ok(Json(plot)),
        None => Err(plot_not_found(&plot_id)),
    }
}

/// `PUT /api/plots/{plot_id}/status`: body `{"status": "idle"}`.
async fn update_status(
    Path(plot_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> AppResult<Json<Value>> {
    // ---
    let Json(update) = payload?;
    let Some(raw) = update.status else {
        return Err(AppError::BadRequest("status is required".to_string()));
    };
    let status: PlotStatus = raw.parse()?;

    let now = Utc::now();
    if state.farm.set_status(&plot_id, status, now).await.is_none() {
        return Err(plot_not_found(&plot_id));
    }
    state
        .ws
        .publish(&ServerMessage::PlotUpdate {
            plot_id: plot_id.clone(),
            status,
            timestamp: now,
        })
        .await;

    Ok(Json(json!({
        "message": format!("Plot {} status updated to {}", plot_id, status),
        "plot_id": plot_id,
        "new_status": status,
    })))
}

/// `PUT /api/plots/{plot_id}/irrigation`: switch irrigation on or off.
async fn toggle_irrigation(
    Path(plot_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<Value>> {
    // ---
    let now = Utc::now();
    let Some(irrigating) = state.farm.toggle_irrigation(&plot_id, now).await else {
        return Err(plot_not_found(&plot_id));
    };
    state
        .ws
        .publish(&ServerMessage::IrrigationUpdate {
            plot_id: plot_id.clone(),
            irrigation_status: irrigating,
            timestamp: now,
        })
        .await;

    let word = if irrigating { "activated" } else { "deactivated" };
    Ok(Json(json!({
        "message": format!("Irrigation {} for plot {}", word, plot_id),
        "plot_id": plot_id,
        "irrigation_status": irrigating,
    })))
}

/// `GET /api/equipment`: every machine with the plot it works on.
async fn equipment(State(state): State<AppState>) -> Json<Vec<EquipmentEntry>> {
    Json(state.farm.equipment(None).await)
}

/// `GET /api/equipment/status/{status}`
async fn equipment_by_status(
    Path(status): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EquipmentEntry>>> {
    // ---
    let status: EquipmentStatus = status.parse()?;
    Ok(Json(state.farm.equipment(Some(status)).await))
}
