//! Chart series preparation: the most recent readings, projected for display.

use chrono::FixedOffset;

use crate::models::{ChartPoint, SensorReading};

// ---

/// Maximum number of points in a chart series.
pub const CHART_WINDOW: usize = 24;

/// Keep the last [`CHART_WINDOW`] readings (oldest first) and project each
/// to a [`ChartPoint`] labelled with its time of day in `offset`.
///
/// The input is expected in chronological order and is not re-sorted or
/// filtered; callers pass either all history or one sensor's history.
pub fn chart_series(readings: &[SensorReading], offset: &FixedOffset) -> Vec<ChartPoint> {
    // ---
    let start = readings.len().saturating_sub(CHART_WINDOW);

    readings[start..]
        .iter()
        .map(|r| ChartPoint {
            time: r.timestamp.with_timezone(offset).format("%H:%M").to_string(),
            temperature: r.temperature,
            humidity: r.humidity,
            soil_moisture: r.soil_moisture,
            ph_level: r.ph_level,
            rainfall: r.rainfall,
        })
        .collect()
}
