//! Configuration loader for the `farmwatch` backend service.
//!
//! Centralizes runtime configuration values and their defaults, loaded from
//! environment variables (with optional `.env` file support provided by the
//! caller), so no other module reads `env::var` directly.
//!
use std::{env, net::SocketAddr, time::Duration};

use anyhow::{anyhow, bail, Result};
use chrono::FixedOffset;

use crate::farm::FarmLayout;

/// Parse an optional unsigned integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional signed integer environment variable with a default value.
macro_rules! parse_env_i32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<i32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Upstream sensor API base URL. When unset, readings are simulated.
    pub api_url: Option<String>,

    /// Maximum number of upstream API pages to fetch per tick (safety limit).
    pub api_max_pages: u32,

    /// Interval between live data ticks.
    pub live_interval: Duration,

    /// Plots laid out on the simulated farm.
    pub farm_plots: u32,

    /// Sensors installed on each plot.
    pub sensors_per_plot: u32,

    /// Offset used to label chart points with a local time of day.
    pub chart_offset: FixedOffset,

    /// Origin allowed by CORS, i.e. where the dashboard is served from.
    pub dashboard_origin: String,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
/// - `SENSOR_API_URL` – upstream sensor data API; simulator when unset
/// - `API_MAX_PAGES` – max upstream pages per tick (default: 100)
/// - `LIVE_INTERVAL_SECS` – seconds between live ticks (default: 30)
/// - `FARM_PLOTS` – plots on the simulated farm (default: 4)
/// - `SENSORS_PER_PLOT` – sensors installed on each plot (default: 2)
/// - `CHART_UTC_OFFSET_HOURS` – chart time-of-day offset (default: 8)
/// - `DASHBOARD_ORIGIN` – CORS origin (default: `http://localhost:3000`)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let bind_addr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse::<SocketAddr>()
        .map_err(|e| anyhow!("Invalid BIND_ADDR: {}", e))?;
    let api_url = env::var("SENSOR_API_URL").ok().filter(|v| !v.is_empty());
    let api_max_pages = parse_env_u32!("API_MAX_PAGES", 100);
    let live_interval_secs = parse_env_u32!("LIVE_INTERVAL_SECS", 30);
    let farm_plots = parse_env_u32!("FARM_PLOTS", 4);
    let sensors_per_plot = parse_env_u32!("SENSORS_PER_PLOT", 2);
    let offset_hours = parse_env_i32!("CHART_UTC_OFFSET_HOURS", 8);
    let dashboard_origin =
        env::var("DASHBOARD_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    if live_interval_secs == 0 {
        bail!("LIVE_INTERVAL_SECS must be at least 1");
    }
    if farm_plots == 0 {
        bail!("FARM_PLOTS must be at least 1");
    }
    if sensors_per_plot == 0 {
        bail!("SENSORS_PER_PLOT must be at least 1");
    }

    Ok(Config {
        bind_addr,
        api_url,
        api_max_pages,
        live_interval: Duration::from_secs(u64::from(live_interval_secs)),
        farm_plots,
        sensors_per_plot,
        chart_offset: chart_offset(offset_hours)?,
        dashboard_origin,
    })
}

/// Build the chart offset from whole hours east of UTC.
pub fn chart_offset(hours: i32) -> Result<FixedOffset> {
    // ---
    if !(-23..=23).contains(&hours) {
        bail!("CHART_UTC_OFFSET_HOURS must be within -23..=23, got {}", hours);
    }
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| anyhow!("Invalid CHART_UTC_OFFSET_HOURS: {}", hours))
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_url: None,
            api_max_pages: 100,
            live_interval: Duration::from_secs(30),
            farm_plots: 4,
            sensors_per_plot: 2,
            chart_offset: FixedOffset::east_opt(8 * 3600).expect("UTC+8 is a valid offset"),
            dashboard_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    // ---
    pub fn farm_layout(&self) -> FarmLayout {
        FarmLayout {
            plots: self.farm_plots,
            sensors_per_plot: self.sensors_per_plot,
        }
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  BIND_ADDR              : {}", self.bind_addr);
        match &self.api_url {
            Some(url) => tracing::info!("  SENSOR_API_URL         : {}", url),
            None => tracing::info!("  SENSOR_API_URL         : <unset, simulating>"),
        }
        tracing::info!("  API_MAX_PAGES          : {}", self.api_max_pages);
        tracing::info!("  LIVE_INTERVAL_SECS     : {}", self.live_interval.as_secs());
        tracing::info!("  FARM_PLOTS             : {}", self.farm_plots);
        tracing::info!("  SENSORS_PER_PLOT       : {}", self.sensors_per_plot);
        tracing::info!("  CHART_UTC_OFFSET       : {}", self.chart_offset);
        tracing::info!("  DASHBOARD_ORIGIN       : {}", self.dashboard_origin);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_chart_offset_range() {
        // ---
        assert_eq!(chart_offset(8).unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(chart_offset(-5).unwrap().local_minus_utc(), -5 * 3600);
        assert!(chart_offset(24).is_err());
        assert!(chart_offset(-24).is_err());
    }

    #[test]
    fn test_default_matches_documented_defaults() {
        // ---
        let cfg = Config::default();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert!(cfg.api_url.is_none());
        assert_eq!(cfg.live_interval, Duration::from_secs(30));
        assert_eq!(cfg.chart_offset.local_minus_utc(), 8 * 3600);
        assert_eq!(
            cfg.farm_layout(),
            FarmLayout {
                plots: 4,
                sensors_per_plot: 2
            }
        );
    }
}
