//! Data models for farm sensor readings and the values derived from them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---

/// One timestamped multi-metric measurement from a field sensor.
///
/// Readings are immutable once produced; identity is `sensor_id` + `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    // ---
    pub sensor_id: String,
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Percent.
    pub soil_moisture: f64,
    pub ph_level: f64,
    /// Lux.
    pub light_intensity: f64,
    /// Millimeters.
    pub rainfall: f64,
}

/// Mean value per metric over a batch of readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageConditions {
    // ---
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub ph_level: f64,
    pub light_intensity: f64,
    pub rainfall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Danger,
}

/// A threshold breach raised by a single reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    // ---
    pub kind: AlertKind,
    pub sensor_id: String,
    pub message: String,
}

/// How urgently an equipment or operator alert needs attention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentAlertKind {
    Maintenance,
    Fuel,
    Efficiency,
}

/// A machine that needs attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentAlert {
    // ---
    pub kind: EquipmentAlertKind,
    pub severity: Severity,
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub message: String,
    pub action_required: String,
}

/// An alert raised by an operator through the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAlert {
    // ---
    #[serde(default)]
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_required: Option<String>,
}

/// Body of a logged alert, tagged by where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LoggedAlert {
    Climate(Alert),
    Equipment(EquipmentAlert),
    Manual(ManualAlert),
}

/// An alert as kept in the service's alert log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    // ---
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub alert: LoggedAlert,
}

/// One day of the farm's weather outlook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    // ---
    pub date: NaiveDate,
    pub day_name: String,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity: f64,
    /// Percent.
    pub rainfall_probability: u32,
    /// Millimeters.
    pub rainfall_amount: f64,
    /// km/h.
    pub wind_speed: f64,
    pub uv_index: u32,
    pub conditions: String,
}

/// One point of a display chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    // ---
    /// Local time of day, `HH:MM`.
    pub time: String,
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub ph_level: f64,
    pub rainfall: f64,
}

impl AlertRecord {
    // ---
    /// Stamp an alert with a fresh id.
    pub fn new(alert: impl Into<LoggedAlert>, timestamp: DateTime<Utc>) -> Self {
        // ---
        AlertRecord {
            id: Uuid::new_v4(),
            timestamp,
            alert: alert.into(),
        }
    }
}

impl From<Alert> for LoggedAlert {
    fn from(alert: Alert) -> Self {
        LoggedAlert::Climate(alert)
    }
}

impl From<EquipmentAlert> for LoggedAlert {
    fn from(alert: EquipmentAlert) -> Self {
        LoggedAlert::Equipment(alert)
    }
}

impl From<ManualAlert> for LoggedAlert {
    fn from(alert: ManualAlert) -> Self {
        LoggedAlert::Manual(alert)
    }
}
