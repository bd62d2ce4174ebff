//! In-memory reading and alert store shared by the feed, the HTTP routes and
//! the WebSocket broadcaster.
//!
//! Both logs are bounded: the oldest entries are dropped once the cap is
//! reached. Nothing survives a restart.

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;

use crate::models::{AlertRecord, SensorReading};

// ---

/// Readings retained across all sensors.
pub const MAX_READINGS: usize = 1000;

/// Alert records retained.
pub const MAX_ALERTS: usize = 100;

pub struct ReadingStore {
    readings: RwLock<VecDeque<SensorReading>>,
    alerts: RwLock<VecDeque<AlertRecord>>,
}

impl ReadingStore {
    // ---
    pub fn new() -> Self {
        ReadingStore {
            readings: RwLock::new(VecDeque::with_capacity(MAX_READINGS)),
            alerts: RwLock::new(VecDeque::with_capacity(MAX_ALERTS)),
        }
    }

    /// Append a batch in arrival order, trimming to [`MAX_READINGS`].
    pub async fn push_readings(&self, batch: Vec<SensorReading>) {
        // ---
        let mut readings = self.readings.write().await;
        readings.extend(batch);
        let excess = readings.len().saturating_sub(MAX_READINGS);
        readings.drain(..excess);
    }

    /// The last `limit` readings, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<SensorReading> {
        // ---
        let readings = self.readings.read().await;
        let skip = readings.len().saturating_sub(limit);
        readings.iter().skip(skip).cloned().collect()
    }

    /// The last `limit` readings of one sensor, oldest first.
    pub async fn history(&self, sensor_id: &str, limit: usize) -> Vec<SensorReading> {
        // ---
        let readings = self.readings.read().await;
        let mut matching: Vec<SensorReading> = readings
            .iter()
            .rev()
            .filter(|r| r.sensor_id == sensor_id)
            .take(limit)
            .cloned()
            .collect();
        matching.reverse();
        matching
    }

    /// Most recent reading of every sensor, in order of first appearance.
    pub async fn live(&self) -> Vec<SensorReading> {
        // ---
        let readings = self.readings.read().await;
        let mut latest: Vec<&SensorReading> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();

        for reading in readings.iter() {
            match slot.get(reading.sensor_id.as_str()) {
                Some(&i) => latest[i] = reading,
                None => {
                    slot.insert(reading.sensor_id.as_str(), latest.len());
                    latest.push(reading);
                }
            }
        }

        latest.into_iter().cloned().collect()
    }

    pub async fn reading_count(&self) -> usize {
        self.readings.read().await.len()
    }

    /// Log stamped alerts in order, trimming to [`MAX_ALERTS`].
    pub async fn record_alerts(&self, records: Vec<AlertRecord>) {
        // ---
        let mut log = self.alerts.write().await;
        log.extend(records);
        let excess = log.len().saturating_sub(MAX_ALERTS);
        log.drain(..excess);
    }

    /// Logged alerts, oldest first.
    pub async fn alert_log(&self) -> Vec<AlertRecord> {
        self.alerts.read().await.iter().cloned().collect()
    }

    /// The last `limit` logged alerts, oldest first.
    pub async fn recent_alerts(&self, limit: usize) -> Vec<AlertRecord> {
        // ---
        let log = self.alerts.read().await;
        let skip = log.len().saturating_sub(limit);
        log.iter().skip(skip).cloned().collect()
    }
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}
