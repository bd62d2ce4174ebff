use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::alerts::evaluate_alerts;
use crate::error::{AppError, AppResult};
use crate::models::{Alert, AlertRecord, ManualAlert};
use crate::state::AppState;
use crate::ws::ServerMessage;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/alerts", get(current_alerts).post(create_alert))
        .route("/api/alerts/history", get(alert_history))
        .route("/api/alerts/broadcast", post(broadcast_alert))
}

/// Body of `POST /api/alerts`. The server fills in a missing id or timestamp.
#[derive(Debug, Deserialize)]
pub struct NewAlert {
    // ---
    id: Option<Uuid>,
    timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    alert: ManualAlert,
}

/// `GET /api/alerts`: alerts raised by the latest reading of each sensor.
async fn current_alerts(State(state): State<AppState>) -> Json<Vec<Alert>> {
    // ---
    let live = state.store.live().await;
    Json(evaluate_alerts(&live))
}

/// `GET /api/alerts/history`: alerts logged by the feed and by operators,
/// oldest first.
async fn alert_history(State(state): State<AppState>) -> Json<Vec<AlertRecord>> {
    Json(state.store.alert_log().await)
}

/// `POST /api/alerts`: log an operator alert and push it as `new_alert`.
async fn create_alert(
    State(state): State<AppState>,
    payload: Result<Json<NewAlert>, JsonRejection>,
) -> AppResult<Json<Value>> {
    // ---
    let Json(new) = payload?;
    if new.alert.message.trim().is_empty() {
        return Err(AppError::BadRequest("alert message must not be empty".to_string()));
    }

    let now = Utc::now();
    let mut record = AlertRecord::new(new.alert, new.timestamp.unwrap_or(now));
    if let Some(id) = new.id {
        record.id = id;
    }
    let alert_id = record.id;

    state.store.record_alerts(vec![record.clone()]).await;
    state
        .ws
        .publish(&ServerMessage::NewAlert {
            alert: record,
            timestamp: now,
        })
        .await;
    tracing::info!(%alert_id, "Alert created");

    Ok(Json(json!({
        "message": "Alert created successfully",
        "alert_id": alert_id,
    })))
}

/// `POST /api/alerts/broadcast`: relay an arbitrary payload to every client.
async fn broadcast_alert(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Value>> {
    // ---
    let Json(data) = payload?;
    state
        .ws
        .publish(&ServerMessage::BroadcastAlert {
            data,
            timestamp: Utc::now(),
        })
        .await;

    Ok(Json(json!({ "message": "Alert broadcasted successfully" })))
}
