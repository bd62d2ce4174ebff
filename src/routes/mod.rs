use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;
use crate::ws::ws_handler;

mod alerts;
mod chart;
mod farm;
mod health;
mod sensors;
mod weather;

// ---

pub fn router(state: AppState) -> Router {
    // ---
    let cors = cors_layer(&state.config.dashboard_origin);

    Router::new()
        .merge(sensors::router())
        .merge(alerts::router())
        .merge(chart::router())
        .merge(farm::router())
        .merge(weather::router())
        .merge(health::router())
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Allow the dashboard's origin; an unparsable origin leaves CORS closed.
fn cors_layer(origin: &str) -> CorsLayer {
    // ---
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            tracing::warn!("Ignoring DASHBOARD_ORIGIN '{}': {}", origin, e);
            layer
        }
    }
}
