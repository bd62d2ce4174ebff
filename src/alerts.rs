//! Climate threshold alerts.
//!
//! Every reading is checked on its own against four fixed rules, in this
//! order: high temperature, low humidity, low soil moisture, pH out of range.
//! Nothing is carried between readings, so repeated breaches from the same
//! sensor produce repeated alerts.

use crate::models::{Alert, AlertKind, SensorReading};

// ---

/// Temperature above this (°C) raises a warning.
pub const HIGH_TEMPERATURE_C: f64 = 38.0;

/// Humidity below this (%) raises a warning.
pub const LOW_HUMIDITY_PCT: f64 = 50.0;

/// Soil moisture below this (%) raises a danger alert.
pub const LOW_SOIL_MOISTURE_PCT: f64 = 40.0;

/// Acceptable pH band, bounds inclusive.
pub const PH_MIN: f64 = 5.0;
pub const PH_MAX: f64 = 8.0;

/// Evaluate all readings in input order and collect their alerts.
pub fn evaluate_alerts(readings: &[SensorReading]) -> Vec<Alert> {
    // ---
    readings.iter().flat_map(evaluate_reading).collect()
}

/// Alerts raised by a single reading, in rule order.
pub fn evaluate_reading(reading: &SensorReading) -> Vec<Alert> {
    // ---
    let mut alerts = Vec::new();
    let mut raise = |kind, message: String| {
        alerts.push(Alert {
            kind,
            sensor_id: reading.sensor_id.clone(),
            message,
        })
    };

    if reading.temperature > HIGH_TEMPERATURE_C {
        raise(
            AlertKind::Warning,
            format!("High temperature: {}°C", reading.temperature),
        );
    }

    if reading.humidity < LOW_HUMIDITY_PCT {
        raise(
            AlertKind::Warning,
            format!("Low humidity: {}%", reading.humidity),
        );
    }

    if reading.soil_moisture < LOW_SOIL_MOISTURE_PCT {
        raise(
            AlertKind::Danger,
            format!("Low soil moisture: {}%", reading.soil_moisture),
        );
    }

    if reading.ph_level < PH_MIN || reading.ph_level > PH_MAX {
        raise(
            AlertKind::Warning,
            format!("pH level out of range: {}", reading.ph_level),
        );
    }

    alerts
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(sensor_id: &str, temp: f64, humidity: f64, soil: f64, ph: f64) -> SensorReading {
        // ---
        SensorReading {
            sensor_id: sensor_id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap(),
            temperature: temp,
            humidity,
            soil_moisture: soil,
            ph_level: ph,
            light_intensity: 30000.0,
            rainfall: 0.0,
        }
    }

    fn healthy(temp: f64) -> SensorReading {
        // ---
        reading("sensor-1", temp, 75.0, 80.0, 6.5)
    }

    #[test]
    fn test_healthy_reading_raises_nothing() {
        // ---
        assert!(evaluate_reading(&healthy(29.0)).is_empty());
    }

    #[test]
    fn test_temperature_boundary() {
        // ---
        assert!(evaluate_reading(&healthy(38.0)).is_empty());

        let alerts = evaluate_reading(&healthy(38.01));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Warning);
        assert_eq!(alerts[0].message, "High temperature: 38.01°C");
    }

    #[test]
    fn test_humidity_and_soil_boundaries() {
        // ---
        assert!(evaluate_reading(&reading("s", 30.0, 50.0, 40.0, 6.5)).is_empty());

        let alerts = evaluate_reading(&reading("s", 30.0, 49.9, 39.9, 6.5));
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].message, "Low humidity: 49.9%");
        assert_eq!(alerts[1].kind, AlertKind::Danger);
        assert_eq!(alerts[1].message, "Low soil moisture: 39.9%");
    }

    #[test]
    fn test_ph_boundaries() {
        // ---
        assert!(evaluate_reading(&reading("s", 30.0, 75.0, 80.0, 5.0)).is_empty());
        assert!(evaluate_reading(&reading("s", 30.0, 75.0, 80.0, 8.0)).is_empty());

        let low = evaluate_reading(&reading("s", 30.0, 75.0, 80.0, 4.99));
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].message, "pH level out of range: 4.99");

        let high = evaluate_reading(&reading("s", 30.0, 75.0, 80.0, 8.01));
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].message, "pH level out of range: 8.01");
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        // ---
        let alerts = evaluate_reading(&reading("sensor-9", 40.0, 30.0, 20.0, 9.0));

        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::Warning,
                AlertKind::Warning,
                AlertKind::Danger,
                AlertKind::Warning
            ]
        );
        assert!(alerts[0].message.starts_with("High temperature"));
        assert!(alerts[1].message.starts_with("Low humidity"));
        assert!(alerts[2].message.starts_with("Low soil moisture"));
        assert!(alerts[3].message.starts_with("pH level out of range"));
        assert!(alerts.iter().all(|a| a.sensor_id == "sensor-9"));
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        // ---
        assert!(evaluate_alerts(&[]).is_empty());
    }

    #[test]
    fn test_repeated_breaches_are_not_deduplicated() {
        // ---
        let hot = healthy(41.0);
        let alerts = evaluate_alerts(&[hot.clone(), hot]);

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0], alerts[1]);
    }

    #[test]
    fn test_two_reading_batch() {
        // ---
        let readings = vec![
            reading("a", 39.0, 55.0, 60.0, 6.5),
            reading("b", 30.0, 45.0, 35.0, 9.2),
        ];

        let alerts = evaluate_alerts(&readings);

        let expected = vec![
            Alert {
                kind: AlertKind::Warning,
                sensor_id: "a".to_string(),
                message: "High temperature: 39°C".to_string(),
            },
            Alert {
                kind: AlertKind::Warning,
                sensor_id: "b".to_string(),
                message: "Low humidity: 45%".to_string(),
            },
            Alert {
                kind: AlertKind::Danger,
                sensor_id: "b".to_string(),
                message: "Low soil moisture: 35%".to_string(),
            },
            Alert {
                kind: AlertKind::Warning,
                sensor_id: "b".to_string(),
                message: "pH level out of range: 9.2".to_string(),
            },
        ];
        assert_eq!(alerts, expected);
    }
}
