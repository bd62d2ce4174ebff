//! Application entry point for the `farmwatch` backend service.
//!
//! Startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Laying out the farm, choosing the reading source (simulator, or upstream
//!   API when configured) and seeding simulated history
//! - Spawning the live data feed
//! - Binding the Axum HTTP server and serving until Ctrl-C
//!
//! # Environment Variables
//! - `BIND_ADDR`, `SENSOR_API_URL`, `API_MAX_PAGES`, `LIVE_INTERVAL_SECS`,
//!   `FARM_PLOTS`, `SENSORS_PER_PLOT`, `CHART_UTC_OFFSET_HOURS`,
//!   `DASHBOARD_ORIGIN` – see `config`
//! - `FARMWATCH_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `FARMWATCH_SPAN_EVENTS` (optional) – span event mode for tracing
use std::env;

use anyhow::{Context, Result};
use chrono::Utc;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tokio::sync::watch;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use farmwatch::feed::{self, ReadingSource};
use farmwatch::{config, routes, AppState};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let bind_addr = cfg.bind_addr;
    let state = AppState::new(cfg);

    let farm = state.farm.farm().await;
    tracing::info!(
        "Monitoring {} in {}: {} plots, {:.2} ha",
        farm.name,
        farm.location,
        farm.plots.len(),
        farm.total_area
    );
    let source = ReadingSource::from_config(&state.config, &farm);

    let history = source.seed_history(Utc::now());
    if !history.is_empty() {
        tracing::info!("Seeded {} simulated historical readings", history.len());
        state.store.push_readings(history).await;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let feed_task = tokio::spawn(feed::run_feed(state.clone(), source, shutdown_rx));

    let app = routes::router(state.clone());

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    shutdown_tx.send(true).ok();
    feed_task.await?;

    Ok(())
}

/// Resolve on Ctrl-C, closing dashboard sockets so the server can drain.
async fn shutdown_signal(state: AppState) {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
    state.ws.shutdown_all().await;
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by `FARMWATCH_SPAN_EVENTS`:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level from `RUST_LOG`, else `FARMWATCH_LOG_LEVEL`
///
/// Call once at startup, before any logging.
fn init_tracing() {
    // ---
    let span_events = match env::var("FARMWATCH_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("FARMWATCH_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},hyper=info,reqwest=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
