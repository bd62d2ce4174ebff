//! WebSocket push channel for dashboard clients.
//!
//! The server pushes a `live_update` after every feed tick, announces plot,
//! weather and alert changes as they happen, and answers a few client
//! requests. Every frame is a JSON object tagged by `type`.

use axum::extract::ws::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::farm::PlotStatus;
use crate::models::{AlertRecord, ForecastDay, SensorReading};

mod handler;
mod manager;

pub use handler::ws_handler;
pub use manager::WsManager;

// ---

/// Frames sent to clients.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // ---
    LiveUpdate {
        timestamp: DateTime<Utc>,
        sensor_data: Vec<SensorReading>,
        alerts: Vec<AlertRecord>,
        connection_count: usize,
    },
    NewAlert {
        alert: AlertRecord,
        timestamp: DateTime<Utc>,
    },
    /// Operator-supplied payload relayed as is.
    BroadcastAlert {
        data: Value,
        timestamp: DateTime<Utc>,
    },
    PlotUpdate {
        plot_id: String,
        status: PlotStatus,
        timestamp: DateTime<Utc>,
    },
    IrrigationUpdate {
        plot_id: String,
        irrigation_status: bool,
        timestamp: DateTime<Utc>,
    },
    WeatherUpdate {
        forecast: Vec<ForecastDay>,
        timestamp: DateTime<Utc>,
    },
    LiveDataResponse {
        data: Vec<SensorReading>,
        timestamp: DateTime<Utc>,
    },
    Pong {
        timestamp: DateTime<Utc>,
    },
    SubscriptionConfirmed {
        message: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

/// Frames accepted from clients. Unrecognized types are ignored.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
    RequestLiveData,
    Subscribe,
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    // ---
    pub fn encode(&self) -> serde_json::Result<Message> {
        Ok(Message::Text(serde_json::to_string(self)?.into()))
    }
}
