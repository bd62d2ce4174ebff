//! Live data feed: where readings come from and what happens on each tick.
//!
//! Each tick pulls one batch, appends it to the store, evaluates alerts on
//! the batch, logs them, and pushes a `live_update` to connected dashboards.
//! Less often the feed also inspects the farm's equipment and refreshes the
//! weather forecast.

use std::time::{Duration as StdDuration, Instant};

use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use tokio::sync::watch;

use crate::alerts::evaluate_alerts;
use crate::config::Config;
use crate::farm::{equipment_alerts, Farm};
use crate::models::{AlertRecord, ForecastDay, SensorReading};
use crate::state::AppState;
use crate::ws::ServerMessage;

mod simulator;
mod upstream;

pub use simulator::{weather_forecast, Season, SensorSite, Simulator};
pub use upstream::fetch_readings;

// ---

/// Alerts included in each `live_update`.
const LIVE_UPDATE_ALERTS: usize = 5;

/// Hourly points of simulated history seeded at startup.
const SEED_HOURS: u32 = 24;

/// Days covered by the weather forecast.
pub const FORECAST_DAYS: u32 = 7;

const EQUIPMENT_CHECK_EVERY: StdDuration = StdDuration::from_secs(5 * 60);
const FORECAST_EVERY: StdDuration = StdDuration::from_secs(60 * 60);

pub enum ReadingSource {
    Simulator(Simulator),
    Upstream {
        client: reqwest::Client,
        url: String,
        max_pages: u32,
    },
}

impl ReadingSource {
    // ---
    /// Upstream when `SENSOR_API_URL` is configured, otherwise a simulator
    /// covering every sensor installed on `farm`.
    pub fn from_config(cfg: &Config, farm: &Farm) -> Self {
        // ---
        match &cfg.api_url {
            Some(url) => ReadingSource::Upstream {
                client: reqwest::Client::new(),
                url: url.clone(),
                max_pages: cfg.api_max_pages,
            },
            None => ReadingSource::Simulator(Simulator::for_farm(farm, cfg.chart_offset)),
        }
    }

    pub async fn next_batch(&self, now: DateTime<Utc>) -> Result<Vec<SensorReading>> {
        // ---
        match self {
            ReadingSource::Simulator(sim) => Ok(simulate(sim, now)),
            ReadingSource::Upstream {
                client,
                url,
                max_pages,
            } => fetch_readings(client, url, *max_pages).await,
        }
    }

    /// History to preload so charts have something to show on first load.
    /// Upstream sources bring their own history.
    pub fn seed_history(&self, now: DateTime<Utc>) -> Vec<SensorReading> {
        // ---
        match self {
            ReadingSource::Simulator(sim) => {
                sim.backfill(&mut rand::thread_rng(), now, SEED_HOURS, Duration::hours(1))
            }
            ReadingSource::Upstream { .. } => Vec::new(),
        }
    }
}

fn simulate(sim: &Simulator, now: DateTime<Utc>) -> Vec<SensorReading> {
    sim.generate(&mut rand::thread_rng(), now)
}

fn next_forecast(offset: &FixedOffset, now: DateTime<Utc>) -> Vec<ForecastDay> {
    weather_forecast(&mut rand::thread_rng(), offset, now, FORECAST_DAYS)
}

/// Run one feed cycle. Returns the number of readings ingested.
pub async fn tick(state: &AppState, source: &ReadingSource) -> Result<usize> {
    // ---
    let now = Utc::now();
    let batch = source.next_batch(now).await?;
    let count = batch.len();

    let alerts = evaluate_alerts(&batch);
    if !alerts.is_empty() {
        tracing::info!("Raised {} alerts from {} readings", alerts.len(), count);
        let records = alerts.into_iter().map(|a| AlertRecord::new(a, now)).collect();
        state.store.record_alerts(records).await;
    }
    state.store.push_readings(batch.clone()).await;

    let connection_count = state.ws.connection_count().await;
    if connection_count > 0 {
        let update = ServerMessage::LiveUpdate {
            timestamp: now,
            sensor_data: batch,
            alerts: state.store.recent_alerts(LIVE_UPDATE_ALERTS).await,
            connection_count,
        };
        state.ws.broadcast(update.encode()?).await;
        tracing::debug!("Broadcasted live data to {} clients", connection_count);
    }

    Ok(count)
}

/// Inspect every machine on the farm and log what needs attention.
/// Returns the number of alerts raised.
pub async fn check_equipment(state: &AppState) -> usize {
    // ---
    let now = Utc::now();
    let farm = state.farm.farm().await;
    let alerts = equipment_alerts(farm.equipment(), now);
    let count = alerts.len();

    if count > 0 {
        tracing::info!("Raised {} equipment alerts", count);
        let records = alerts.into_iter().map(|a| AlertRecord::new(a, now)).collect();
        state.store.record_alerts(records).await;
    }
    count
}

/// Regenerate the forecast, keep it, and push a `weather_update`.
pub async fn refresh_forecast(state: &AppState) -> Vec<ForecastDay> {
    // ---
    let now = Utc::now();
    let forecast = next_forecast(&state.config.chart_offset, now);
    state.farm.set_forecast(forecast.clone()).await;
    state
        .ws
        .publish(&ServerMessage::WeatherUpdate {
            forecast: forecast.clone(),
            timestamp: now,
        })
        .await;
    tracing::debug!("Updated {}-day weather forecast", forecast.len());
    forecast
}

/// A chore the feed loop runs at most once per `period`.
struct Chore {
    period: StdDuration,
    last: Option<Instant>,
}

impl Chore {
    // ---
    fn new(period: StdDuration) -> Self {
        Chore { period, last: None }
    }

    /// True on the first call and once `period` has passed since the last
    /// call that returned true.
    fn due(&mut self, now: Instant) -> bool {
        // ---
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Tick every `live_interval` until `shutdown` flips. A failed tick is
/// logged and the next one waits twice as long.
pub async fn run_feed(state: AppState, source: ReadingSource, mut shutdown: watch::Receiver<bool>) {
    // ---
    let interval = state.config.live_interval;
    tracing::info!("Starting live data feed, every {:?}", interval);

    let mut forecast = Chore::new(FORECAST_EVERY);
    let mut equipment = Chore::new(EQUIPMENT_CHECK_EVERY);

    loop {
        if forecast.due(Instant::now()) {
            refresh_forecast(&state).await;
        }
        if equipment.due(Instant::now()) {
            check_equipment(&state).await;
        }

        let delay = match tick(&state, &source).await {
            Ok(count) => {
                tracing::debug!("Ingested {} sensor readings", count);
                interval
            }
            Err(e) => {
                tracing::error!("Live data tick failed: {:#}", e);
                interval * 2
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    tracing::info!("Live data feed stopped");
}
