//! Scheduled jobs.
//!
//! The tick job and the action-point refresh job run on independent tokio
//! intervals and share the game behind an async mutex, so a job never
//! observes the other half-way through. A failed tick leaves the game
//! untouched and is simply attempted again on the next interval. A failed
//! snapshot does not undo a job; the next successful write catches up.

use anyhow::Context;
use hexreign_core::{Game, GameConfig, Timestamp, TickOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// State shared by the scheduled jobs
pub struct SchedulerState {
    pub game: Mutex<Game>,
    /// Where the game is written after every job that changed it
    pub snapshot_path: Option<PathBuf>,
}

impl SchedulerState {
    pub fn new(game: Game, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            game: Mutex::new(game),
            snapshot_path,
        }
    }
}

/// Current wall-clock time in milliseconds
pub fn now_millis() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or_default()
}

/// Restore the game from `path` if a snapshot exists there, else start fresh
pub async fn load_game(path: Option<&Path>, config: GameConfig) -> anyhow::Result<Game> {
    let Some(path) = path else {
        return Ok(Game::new(config));
    };
    if !tokio::fs::try_exists(path).await? {
        info!("No snapshot at {}, starting a new world", path.display());
        return Ok(Game::new(config));
    }

    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let game = Game::from_json(&json).with_context(|| format!("parsing snapshot {}", path.display()))?;
    info!(
        "Restored world from {} at tick {}",
        path.display(),
        game.next_tick_number() - 1
    );
    Ok(game)
}

/// Write the game to the snapshot path, if one is configured
pub async fn save_snapshot(state: &SchedulerState) -> anyhow::Result<()> {
    let Some(path) = &state.snapshot_path else {
        return Ok(());
    };
    let json = state.game.lock().await.to_json()?;

    // Write then rename so a crash never leaves half a snapshot behind
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("writing snapshot {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing snapshot {}", path.display()))?;
    Ok(())
}

/// Resolve the next tick. Errors only when the tick itself failed.
pub async fn run_tick(state: &SchedulerState, now: Timestamp) -> anyhow::Result<TickOutcome> {
    let outcome = state.game.lock().await.resolve_tick(now)?;
    if let TickOutcome::Resolved(summary) = &outcome {
        info!(
            "Tick {} resolved: {} processed, {} skipped",
            summary.tick, summary.actions_processed, summary.actions_skipped
        );
        if let Err(e) = save_snapshot(state).await {
            error!("Tick {} resolved but the snapshot failed: {:#}", summary.tick, e);
        }
    }
    Ok(outcome)
}

/// Refill every active player's action points
pub async fn run_refresh(state: &SchedulerState, now: Timestamp) -> usize {
    let refreshed = state.game.lock().await.refresh_action_points(now);
    if let Err(e) = save_snapshot(state).await {
        error!("Action points refreshed but the snapshot failed: {:#}", e);
    }
    refreshed
}

fn new_interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Run both jobs until ctrl-c, then write a final snapshot
pub async fn run(state: Arc<SchedulerState>, tick_every: Duration, refresh_every: Duration) -> anyhow::Result<()> {
    let tick_state = Arc::clone(&state);
    let tick_job = tokio::spawn(async move {
        let mut interval = new_interval(tick_every);
        // The first tick fires immediately; skip it so a restart does not resolve early
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = run_tick(&tick_state, now_millis()).await {
                error!("Tick failed, will retry next interval: {:#}", e);
            }
        }
    });

    let refresh_state = Arc::clone(&state);
    let refresh_job = tokio::spawn(async move {
        let mut interval = new_interval(refresh_every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let count = run_refresh(&refresh_state, now_millis()).await;
            info!("Refreshed action points for {} players", count);
        }
    });

    info!(
        "Scheduler running: tick every {:?}, refresh every {:?}",
        tick_every, refresh_every
    );
    tokio::signal::ctrl_c().await?;
    warn!("Shutting down");

    tick_job.abort();
    refresh_job.abort();
    save_snapshot(&state).await
}
