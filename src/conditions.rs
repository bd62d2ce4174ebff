//! Averaged field conditions over a batch of sensor readings.
//!
//! Temperature, humidity, soil moisture, pH and rainfall means are reported
//! to one decimal place; light intensity to the nearest whole lux. Rounding
//! is half away from zero on the shortest decimal form of the mean, so a mean
//! of `7.85` reports as `7.9` even though its binary value sits just below.

use crate::models::{AverageConditions, SensorReading};

// ---

/// Compute per-metric means, or `None` when there are no readings.
pub fn average_conditions(readings: &[SensorReading]) -> Option<AverageConditions> {
    // ---
    if readings.is_empty() {
        return None;
    }

    Some(AverageConditions {
        temperature: round_half_away(mean(readings, |r| r.temperature), 1),
        humidity: round_half_away(mean(readings, |r| r.humidity), 1),
        soil_moisture: round_half_away(mean(readings, |r| r.soil_moisture), 1),
        ph_level: round_half_away(mean(readings, |r| r.ph_level), 1),
        light_intensity: round_half_away(mean(readings, |r| r.light_intensity), 0),
        rainfall: round_half_away(mean(readings, |r| r.rainfall), 1),
    })
}

fn mean(readings: &[SensorReading], metric: impl Fn(&SensorReading) -> f64) -> f64 {
    // ---
    let mut values: Vec<f64> = readings.iter().map(metric).collect();
    // Fixed summation order keeps the result independent of input order.
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round `value` to `decimals` places, ties away from zero.
///
/// Operates on the shortest round-trip decimal representation of `value`
/// rather than its exact binary expansion. Non-finite values pass through.
/// A result of zero is always `+0.0`, never `-0.0`.
pub fn round_half_away(value: f64, decimals: u32) -> f64 {
    // ---
    if !value.is_finite() {
        return value;
    }
    if value == 0.0 {
        return 0.0;
    }

    // f64 Display never uses exponent notation.
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let places = decimals as usize;

    if frac_part.len() <= places {
        return value;
    }

    let round_up = frac_part.as_bytes()[places] >= b'5';
    let digits = format!("{}{}", int_part, &frac_part[..places]);

    let Ok(mut scaled) = digits.parse::<u128>() else {
        return value;
    };
    if round_up {
        scaled += 1;
    }
    if scaled == 0 {
        return 0.0;
    }

    let magnitude = scaled as f64 / 10f64.powi(decimals as i32);
    if value.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(temp: f64, humidity: f64, soil: f64, ph: f64, light: f64, rain: f64) -> SensorReading {
        // ---
        SensorReading {
            sensor_id: "sensor-1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            temperature: temp,
            humidity,
            soil_moisture: soil,
            ph_level: ph,
            light_intensity: light,
            rainfall: rain,
        }
    }

    #[test]
    fn test_empty_input_has_no_conditions() {
        // ---
        assert_eq!(average_conditions(&[]), None);
    }

    #[test]
    fn test_two_reading_means() {
        // ---
        let readings = vec![
            reading(39.0, 55.0, 60.0, 6.5, 1000.0, 5.0),
            reading(30.0, 45.0, 35.0, 9.2, 2000.0, 10.0),
        ];

        let avg = average_conditions(&readings).unwrap();

        assert_eq!(
            avg,
            AverageConditions {
                temperature: 34.5,
                humidity: 50.0,
                soil_moisture: 47.5,
                ph_level: 7.9,
                light_intensity: 1500.0,
                rainfall: 7.5,
            }
        );
    }

    #[test]
    fn test_single_reading_is_its_own_mean() {
        // ---
        let avg = average_conditions(&[reading(28.3, 80.1, 75.0, 6.2, 43210.4, 0.0)]).unwrap();

        assert_eq!(avg.temperature, 28.3);
        assert_eq!(avg.humidity, 80.1);
        assert_eq!(avg.ph_level, 6.2);
        assert_eq!(avg.light_intensity, 43210.0);
        assert_eq!(avg.rainfall, 0.0);
    }

    #[test]
    fn test_light_rounds_to_whole_lux() {
        // ---
        let readings = vec![
            reading(25.0, 70.0, 70.0, 6.0, 100.0, 0.0),
            reading(25.0, 70.0, 70.0, 6.0, 101.0, 0.0),
        ];

        // 100.5 rounds away from zero
        assert_eq!(average_conditions(&readings).unwrap().light_intensity, 101.0);
    }

    #[test]
    fn test_order_does_not_change_result() {
        // ---
        let readings = vec![
            reading(0.1, 60.3, 41.7, 5.9, 12000.0, 0.2),
            reading(0.2, 71.9, 88.1, 6.7, 48000.0, 12.4),
            reading(0.3, 55.5, 63.3, 7.1, 0.0, 33.3),
            reading(33.7, 90.0, 20.0, 4.4, 51000.0, 0.0),
        ];
        let mut reversed = readings.clone();
        reversed.reverse();
        let mut rotated = readings.clone();
        rotated.rotate_left(2);

        let expected = average_conditions(&readings);
        assert_eq!(average_conditions(&reversed), expected);
        assert_eq!(average_conditions(&rotated), expected);
    }

    #[test]
    fn test_round_half_away_uses_decimal_form() {
        // ---
        assert_eq!(round_half_away(7.85, 1), 7.9);
        assert_eq!(round_half_away(1.005, 2), 1.01);
        assert_eq!(round_half_away(2.449, 1), 2.4);
        assert_eq!(round_half_away(2.45, 1), 2.5);
        assert_eq!(round_half_away(-2.25, 1), -2.3);
        assert_eq!(round_half_away(1499.5, 0), 1500.0);
        assert_eq!(round_half_away(12.0, 1), 12.0);
    }

    #[test]
    fn test_rounding_to_zero_is_positive_zero() {
        // ---
        for value in [-0.04, -0.0, -0.004] {
            let rounded = round_half_away(value, 1);
            assert_eq!(rounded, 0.0);
            assert!(rounded.is_sign_positive(), "{} rounded to -0.0", value);
        }
        assert_eq!(serde_json::to_string(&round_half_away(-0.04, 1)).unwrap(), "0.0");
        assert_eq!(round_half_away(-0.05, 1), -0.1);
    }

    #[test]
    fn test_small_negative_mean_serializes_as_zero() {
        // ---
        let readings = vec![
            reading(-0.1, 70.0, 70.0, 6.0, 0.0, 0.0),
            reading(0.02, 70.0, 70.0, 6.0, 0.0, 0.0),
        ];

        let avg = average_conditions(&readings).unwrap();

        assert_eq!(serde_json::to_value(&avg).unwrap()["temperature"].to_string(), "0.0");
    }

    #[test]
    fn test_round_half_away_passes_non_finite() {
        // ---
        assert!(round_half_away(f64::NAN, 1).is_nan());
        assert_eq!(round_half_away(f64::INFINITY, 1), f64::INFINITY);
    }
}
