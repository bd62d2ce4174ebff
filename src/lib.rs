//! `farmwatch`: live farm sensor conditions, climate alerts and chart series.
//!
//! The core is three pure functions over a slice of [`SensorReading`]s:
//! - [`average_conditions`] – per-metric means, `None` for no data
//! - [`evaluate_alerts`] – fixed-threshold climate alerts, per reading
//! - [`chart_series`] – the last 24 readings projected for display
//!
//! Around it sits a replaceable service: the monitored [`farm`] and its
//! plots, an in-memory [`store`], a periodic [`feed`] (simulated or upstream
//! readings), a WebSocket push channel ([`ws`]) and the JSON API ([`routes`]).

pub mod alerts;
pub mod chart;
pub mod conditions;
pub mod config;
pub mod error;
pub mod farm;
pub mod feed;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod ws;

pub use alerts::evaluate_alerts;
pub use chart::chart_series;
pub use conditions::average_conditions;
pub use config::Config;
pub use farm::{Farm, FarmRegistry, Plot, PlotStatus};
pub use models::{
    Alert, AlertKind, AlertRecord, AverageConditions, ChartPoint, ForecastDay, LoggedAlert,
    SensorReading,
};
pub use state::AppState;
