use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::conditions::{average_conditions, round_half_away};
use crate::error::{AppError, AppResult};
use crate::feed;
use crate::models::{ForecastDay, SensorReading};
use crate::state::AppState;

// ---

/// Readings that make up "current" weather.
const CURRENT_WINDOW: usize = 10;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route(
            "/api/weather/forecast",
            get(forecast).put(refresh_forecast),
        )
        .route("/api/weather/current", get(current))
}

/// Weather as measured by the farm's own sensors.
#[derive(Debug, Serialize)]
pub struct CurrentWeather {
    // ---
    temperature: f64,
    humidity: f64,
    /// Millimetres summed over the window.
    rainfall: f64,
    light_intensity: f64,
    last_updated: DateTime<Utc>,
    conditions: &'static str,
    data_points: usize,
}

/// `GET /api/weather/forecast`
async fn forecast(State(state): State<AppState>) -> Json<Vec<ForecastDay>> {
    Json(state.farm.forecast().await)
}

/// `PUT /api/weather/forecast`: regenerate now instead of waiting for the feed.
async fn refresh_forecast(State(state): State<AppState>) -> Json<Value> {
    // ---
    let forecast = feed::refresh_forecast(&state).await;
    Json(json!({
        "message": "Weather forecast updated",
        "forecast": forecast,
    }))
}

/// `GET /api/weather/current`: averages over the most recent readings.
async fn current(State(state): State<AppState>) -> AppResult<Json<CurrentWeather>> {
    // ---
    let readings = state.store.recent(CURRENT_WINDOW).await;
    current_weather(&readings)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No weather data available".to_string()))
}

fn current_weather(readings: &[SensorReading]) -> Option<CurrentWeather> {
    // ---
    let avg = average_conditions(readings)?;
    let last = readings.last()?;
    Some(CurrentWeather {
        temperature: avg.temperature,
        humidity: avg.humidity,
        rainfall: round_half_away(readings.iter().map(|r| r.rainfall).sum(), 1),
        light_intensity: avg.light_intensity,
        last_updated: last.timestamp,
        conditions: "Real-time sensor data",
        data_points: readings.len(),
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn reading(minute: u32, temperature: f64, rainfall: f64) -> SensorReading {
        // ---
        SensorReading {
            sensor_id: "plot-1-sensor-1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, minute, 0).unwrap(),
            temperature,
            humidity: 70.0,
            soil_moisture: 80.0,
            ph_level: 6.5,
            light_intensity: 40000.0,
            rainfall,
        }
    }

    #[test]
    fn test_no_readings_no_weather() {
        assert!(current_weather(&[]).is_none());
    }

    #[test]
    fn test_rainfall_is_summed_not_averaged() {
        // ---
        let readings = [reading(0, 30.0, 1.25), reading(5, 31.0, 2.0)];

        let weather = current_weather(&readings).unwrap();

        assert_eq!(weather.temperature, 30.5);
        assert_eq!(weather.rainfall, 3.3);
        assert_eq!(weather.data_points, 2);
        assert_eq!(weather.last_updated, readings[1].timestamp);
    }
}
