//! Hexreign scheduler host.
//!
//! Owns the world and drives it on a clock: resolves a tick every
//! `TICK_INTERVAL_SECS` and refills action points every
//! `AP_REFRESH_INTERVAL_SECS`, persisting to `SNAPSHOT_PATH` when set.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod scheduler;

use config::ServerConfig;
use scheduler::SchedulerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!("Starting Hexreign scheduler...");

    let game = scheduler::load_game(config.snapshot_path.as_deref(), config.game.clone()).await?;
    let state = Arc::new(SchedulerState::new(game, config.snapshot_path.clone()));

    scheduler::run(state, config.tick_interval, config.ap_refresh_interval).await
}
