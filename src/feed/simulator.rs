//! Synthetic field readings and weather outlook for a tropical farm.
//!
//! Values follow the season (by local month) and the time of day: a diurnal
//! temperature curve, humidity falling as temperature rises (held within
//! 50..=100), season-dependent rain, and light peaking at noon and dimmed by
//! heavy rain. Soil moisture and pH follow the crop grown on the sensor's plot.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike, Utc};
use rand::Rng;

use crate::conditions::round_half_away;
use crate::farm::{CropKind, Farm};
use crate::models::{ForecastDay, SensorReading};

// ---

const SKIES: [&str; 7] = [
    "Sunny",
    "Partly Cloudy",
    "Cloudy",
    "Light Rain",
    "Heavy Rain",
    "Thunderstorms",
    "Hazy",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Dry,
    Wet,
    Transition,
}

struct SeasonProfile {
    temperature: (f64, f64),
    humidity: (f64, f64),
    rainfall: (f64, f64),
    rain_chance: f64,
    soil_modifier: f64,
}

impl Season {
    // ---
    pub fn for_month(month: u32) -> Season {
        match month {
            6..=9 => Season::Dry,
            4 | 5 => Season::Transition,
            _ => Season::Wet,
        }
    }

    fn profile(self) -> SeasonProfile {
        match self {
            Season::Dry => SeasonProfile {
                temperature: (26.0, 35.0),
                humidity: (60.0, 80.0),
                rainfall: (0.0, 15.0),
                rain_chance: 0.3,
                soil_modifier: -10.0,
            },
            Season::Wet => SeasonProfile {
                temperature: (24.0, 32.0),
                humidity: (70.0, 95.0),
                rainfall: (10.0, 80.0),
                rain_chance: 0.7,
                soil_modifier: 15.0,
            },
            Season::Transition => SeasonProfile {
                temperature: (25.0, 33.0),
                humidity: (65.0, 85.0),
                rainfall: (5.0, 40.0),
                rain_chance: 0.7,
                soil_modifier: 0.0,
            },
        }
    }
}

/// A sensor and the crop on the plot it is installed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSite {
    pub sensor_id: String,
    pub crop: CropKind,
}

/// Generates one reading per sensor site on every call.
#[derive(Debug, Clone)]
pub struct Simulator {
    sites: Vec<SensorSite>,
    offset: FixedOffset,
}

struct Weather {
    temperature: f64,
    humidity: f64,
    rainfall: f64,
    light: f64,
    season: Season,
}

impl Simulator {
    // ---
    /// `offset` is the farm's local offset; it decides season and time of day.
    pub fn new(sites: Vec<SensorSite>, offset: FixedOffset) -> Self {
        Simulator { sites, offset }
    }

    /// One site for every sensor installed on the farm's plots.
    pub fn for_farm(farm: &Farm, offset: FixedOffset) -> Self {
        // ---
        let sites = farm
            .plots
            .iter()
            .flat_map(|plot| {
                plot.sensors.iter().map(move |id| SensorSite {
                    sensor_id: id.clone(),
                    crop: plot.crop.kind,
                })
            })
            .collect();
        Simulator::new(sites, offset)
    }

    /// One reading per site, all stamped `at`.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, at: DateTime<Utc>) -> Vec<SensorReading> {
        // ---
        self.sites
            .iter()
            .map(|site| self.reading(&mut *rng, site, at))
            .collect()
    }

    /// `points` ticks of history spaced `step` apart, ending at `end`, oldest first.
    pub fn backfill<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        end: DateTime<Utc>,
        points: u32,
        step: Duration,
    ) -> Vec<SensorReading> {
        // ---
        (0..points)
            .rev()
            .flat_map(|i| self.generate(&mut *rng, end - step * i as i32))
            .collect()
    }

    fn reading<R: Rng + ?Sized>(&self, rng: &mut R, site: &SensorSite, at: DateTime<Utc>) -> SensorReading {
        // ---
        let weather = weather(rng, &at.with_timezone(&self.offset));
        let crop = site.crop.profile();

        let soil_swing = if weather.rainfall > 20.0 {
            rng.gen_range(5.0..15.0)
        } else if weather.rainfall == 0.0 {
            rng.gen_range(-10.0..-5.0)
        } else {
            rng.gen_range(-2.0..5.0)
        };
        let soil_moisture = round_half_away(
            (uniform(rng, crop.optimal_moisture) + soil_swing + weather.season.profile().soil_modifier)
                .clamp(20.0, 100.0),
            1,
        );

        let (ph_low, ph_high) = crop.optimal_ph;
        let ph_level = round_half_away(rng.gen_range(ph_low - 0.5..=ph_high + 0.5), 1);

        SensorReading {
            sensor_id: site.sensor_id.clone(),
            timestamp: at,
            temperature: weather.temperature,
            humidity: weather.humidity,
            soil_moisture,
            ph_level,
            light_intensity: round_half_away(weather.light.max(0.0), 0),
            rainfall: weather.rainfall,
        }
    }
}

/// Daily outlook for the `days` days after `from`, dated in the farm's
/// local calendar.
pub fn weather_forecast<R: Rng + ?Sized>(
    rng: &mut R,
    offset: &FixedOffset,
    from: DateTime<Utc>,
    days: u32,
) -> Vec<ForecastDay> {
    // ---
    (1..=days)
        .map(|day| {
            let local = (from + Duration::days(i64::from(day))).with_timezone(offset);
            let w = weather(&mut *rng, &local);
            ForecastDay {
                date: local.date_naive(),
                day_name: local.format("%A").to_string(),
                temperature_min: round_half_away(w.temperature - rng.gen_range(3.0..=8.0), 1),
                temperature_max: round_half_away(w.temperature + rng.gen_range(2.0..=6.0), 1),
                humidity: w.humidity,
                rainfall_probability: rng.gen_range(20..=80),
                rainfall_amount: w.rainfall,
                wind_speed: round_half_away(rng.gen_range(5.0..=20.0), 1),
                uv_index: rng.gen_range(6..=12),
                conditions: SKIES[rng.gen_range(0..SKIES.len())].to_string(),
            }
        })
        .collect()
}

/// Air conditions at a local moment.
fn weather<R: Rng + ?Sized>(rng: &mut R, local: &DateTime<FixedOffset>) -> Weather {
    // ---
    let hour = local.hour() as f64;
    let daytime = (6.0..=18.0).contains(&hour);
    let season = Season::for_month(local.month());
    let profile = season.profile();

    let diurnal = if daytime {
        (PI * (hour - 6.0) / 12.0).sin() * 3.0
    } else {
        -rng.gen_range(2.0..5.0)
    };
    let temperature = round_half_away(uniform(rng, profile.temperature) + diurnal, 1);

    let humidity = round_half_away(
        (uniform(rng, profile.humidity) - (temperature - 27.0) * 2.0).clamp(50.0, 100.0),
        1,
    );

    let rainfall = if rng.gen_bool(profile.rain_chance) {
        round_half_away(uniform(rng, profile.rainfall), 1)
    } else {
        0.0
    };

    let light = if daytime {
        let noon_curve = 50000.0 - (hour - 12.0).powi(2) * 2000.0;
        if rainfall > 10.0 {
            noon_curve * 0.3
        } else {
            noon_curve
        }
    } else {
        rng.gen_range(0.0..100.0)
    };

    Weather {
        temperature,
        humidity,
        rainfall,
        light,
        season,
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    rng.gen_range(low..=high)
}
