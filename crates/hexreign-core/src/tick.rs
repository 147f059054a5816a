//! Tick resolution.
//!
//! A tick turns every queued action into world-state changes, in this order:
//! 1. take the next tick number (last recorded + 1)
//! 2. collect the queued actions
//! 3. order them by kind priority, keeping submission order on ties
//! 4. cancel actions whose unit or player can no longer act; run a handler
//!    for each of the rest and log exactly one event per handled action
//! 5. credit every owner with the yield of the tiles they hold
//! 6. recompute advisor moods
//! 7. append the tick record
//!
//! Yields and combat are deltas, so a tick must never be applied twice.
//! [`advance`] runs the whole pass on a staged copy of the store and commits
//! it only on success, and refuses tick numbers that are already recorded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::actions::{ActionKind, ActionStatus, EventKind, Outcome, PendingAction};
use crate::advisor::{derive_mood, Mood, MOOD_WINDOW};
use crate::combat;
use crate::hex::hexes_in_radius;
use crate::player::{PlayerId, ResourceDelta};
use crate::store::{StoreError, WorldStore};
use crate::tile::Improvement;
use crate::unit::{UnitId, UnitStatus};
use crate::Timestamp;

/// Tiles revealed around a unit after it moves
pub const MOVE_REVEAL_RADIUS: u32 = 1;
/// Tiles revealed around a scouting unit
pub const SCOUT_REVEAL_RADIUS: u32 = 2;
/// Logged subtype for a diplomacy action submitted without one
pub const DEFAULT_DIPLOMACY: &str = "proposal";

/// Persisted record of a resolved tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub resolved_at: Timestamp,
    /// Actions that were handled (cancelled ones are not counted)
    pub actions_processed: u32,
}

/// Everything one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: u64,
    pub actions_processed: u32,
    pub actions_skipped: u32,
    /// Resources credited per owner
    pub yields: BTreeMap<PlayerId, ResourceDelta>,
    /// Advisors whose mood changed, with the new mood
    pub mood_changes: Vec<(PlayerId, Mood)>,
}

/// Result of asking for a specific tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    Resolved(TickSummary),
    /// The tick was already recorded; nothing was changed
    AlreadyResolved { requested: u64, last: u64 },
}

/// Why a tick could not be resolved. The store is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TickError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("tick {requested} requested but the next tick is {expected}")]
    TickGap { expected: u64, requested: u64 },
}

/// Resolve tick `requested` if it is the next one in the sequence.
///
/// Older tick numbers are a no-op. The pass runs on a clone of the store
/// which replaces `store` only once every step has succeeded.
pub fn advance(store: &mut WorldStore, requested: u64, now: Timestamp) -> Result<TickOutcome, TickError> {
    let last = store.last_tick_number();
    if requested <= last {
        debug!(requested, last, "tick already resolved");
        return Ok(TickOutcome::AlreadyResolved { requested, last });
    }
    let expected = last + 1;
    if requested != expected {
        return Err(TickError::TickGap { expected, requested });
    }

    let mut staged = store.clone();
    let summary = resolve(&mut staged, requested, now)?;
    *store = staged;
    Ok(TickOutcome::Resolved(summary))
}

/// Run one full resolution pass for `tick` directly on `store`.
///
/// Callers that need all-or-nothing behavior go through [`advance`].
pub fn resolve(store: &mut WorldStore, tick: u64, now: Timestamp) -> Result<TickSummary, TickError> {
    let mut queued: Vec<PendingAction> = store.queued_actions().into_iter().cloned().collect();
    // Stable sort; queued_actions is already in submission order
    queued.sort_by_key(|a| a.kind.priority());

    info!(tick, queued = queued.len(), "resolving tick");

    let mut summary = TickSummary {
        tick,
        ..TickSummary::default()
    };

    for action in &queued {
        if let Some(reason) = skip_reason(store, action) {
            warn!(tick, action = %action.id, player = %action.player, reason, "skipping action");
            store.set_action_status(action.id, ActionStatus::Cancelled)?;
            summary.actions_skipped += 1;
            continue;
        }
        dispatch(store, action, tick, now)?;
        store.set_action_status(action.id, ActionStatus::Resolved)?;
        summary.actions_processed += 1;
    }

    summary.yields = apply_yields(store);
    summary.mood_changes = update_moods(store)?;

    store.append_tick(TickRecord {
        tick,
        resolved_at: now,
        actions_processed: summary.actions_processed,
    })?;

    info!(
        tick,
        processed = summary.actions_processed,
        skipped = summary.actions_skipped,
        paid = summary.yields.len(),
        "tick resolved"
    );
    Ok(summary)
}

/// Why a queued action can no longer be carried out, if it cannot
fn skip_reason(store: &WorldStore, action: &PendingAction) -> Option<&'static str> {
    match store.player(action.player) {
        None => return Some("player gone"),
        Some(player) if player.is_defeated() => return Some("player defeated"),
        Some(_) => {}
    }
    match action.unit {
        Some(id) => match store.unit(id) {
            None => Some("unit gone"),
            Some(unit) if !unit.is_alive() => Some("unit dead"),
            Some(_) => None,
        },
        None if action.kind.requires_unit() => Some("no unit"),
        None => None,
    }
}

/// Run the handler for one action and log its event
fn dispatch(store: &mut WorldStore, action: &PendingAction, tick: u64, now: Timestamp) -> Result<(), TickError> {
    let actor = action.player;
    let mut at = action.target;
    let mut target = None;

    let outcome = match action.kind {
        ActionKind::Defend => {
            let unit = store.unit_mut(unit_of(action)?)?;
            unit.status = UnitStatus::Fortified;
            let (id, position) = (unit.id, unit.position);
            at = position;

            let tile = store.tile_mut(position);
            tile.fortified_by = Some(id);
            if tile.owner.is_none() {
                tile.owner = Some(actor);
            }
            Outcome::Success
        }
        ActionKind::Found => {
            let tile = store.tile_mut(action.target);
            if tile.owner.is_some() {
                Outcome::TileAlreadyOwned
            } else {
                tile.owner = Some(actor);
                tile.improvement = Improvement::Settlement;
                tile.deposit_revealed = true;
                Outcome::Success
            }
        }
        ActionKind::Move => {
            let unit = store.unit_mut(unit_of(action)?)?;
            let (id, from) = (unit.id, unit.position);
            unit.position = action.target;
            unit.status = UnitStatus::Idle;

            // A unit that walks away no longer anchors its old tile
            if store.tile(from).is_some_and(|t| t.fortified_by == Some(id)) {
                store.tile_mut(from).fortified_by = None;
            }
            for hex in hexes_in_radius(action.target, MOVE_REVEAL_RADIUS) {
                store.tile_mut(hex).discover(actor);
            }
            Outcome::Success
        }
        ActionKind::Scout => {
            let id = unit_of(action)?;
            let position = store.unit(id).ok_or(StoreError::UnitNotFound(id))?.position;
            at = position;
            for hex in hexes_in_radius(position, SCOUT_REVEAL_RADIUS) {
                let tile = store.tile_mut(hex);
                tile.discover(actor);
                if tile.is_owned_by(actor) && tile.survey(actor) {
                    tile.deposit_revealed = true;
                }
            }
            Outcome::Success
        }
        ActionKind::Invest => {
            let tile = store.tile_mut(action.target);
            if !tile.is_owned_by(actor) {
                Outcome::TileNotOwned
            } else {
                match tile.investable_improvement() {
                    Some(improvement) if improvement != tile.improvement => {
                        tile.improvement = improvement;
                        Outcome::Success
                    }
                    _ => Outcome::NoChange,
                }
            }
        }
        ActionKind::Attack => match combat::resolve_attack(store, unit_of(action)?, action.target)? {
            Some(report) => {
                target = Some(report.defender_owner);
                report.outcome()
            }
            None => Outcome::NoTarget,
        },
        ActionKind::Diplomacy => {
            target = action.target_player;
            let subtype = action.diplomacy.as_deref().unwrap_or(DEFAULT_DIPLOMACY);
            Outcome::Diplomacy(subtype.to_string())
        }
        ActionKind::Unknown => Outcome::Unsupported,
    };

    debug!(tick, action = %action.id, kind = ?action.kind, ?outcome, "action resolved");
    store.append_event(tick, EventKind::from(action.kind), actor, target, at, outcome, now);
    Ok(())
}

fn unit_of(action: &PendingAction) -> Result<UnitId, TickError> {
    // skip_reason has already ruled out unit-less unit actions
    action
        .unit
        .ok_or(TickError::Store(StoreError::ActionNotFound(action.id)))
}

/// Credit every non-defeated owner with the yield of their tiles
fn apply_yields(store: &mut WorldStore) -> BTreeMap<PlayerId, ResourceDelta> {
    let mut totals: BTreeMap<PlayerId, ResourceDelta> = BTreeMap::new();
    for tile in store.owned_tiles() {
        if let Some(owner) = tile.owner {
            totals.entry(owner).or_default().merge(&tile.yield_per_tick());
        }
    }

    let mut paid = BTreeMap::new();
    for (owner, delta) in totals {
        let Ok(player) = store.player_mut(owner) else {
            // Tiles of a player removed without release
            warn!(player = %owner, "yield for unknown owner dropped");
            continue;
        };
        if player.is_defeated() || delta.is_zero() {
            continue;
        }
        player.resources.apply(&delta);
        paid.insert(owner, delta);
    }
    paid
}

/// Recompute the mood of every active player's advisor
fn update_moods(store: &mut WorldStore) -> Result<Vec<(PlayerId, Mood)>, TickError> {
    let candidates: Vec<(PlayerId, u32)> = store
        .players()
        .into_iter()
        .filter(|p| !p.is_defeated() && store.advisor(p.id).is_some())
        .map(|p| (p.id, p.action_points))
        .collect();

    let mut changes = Vec::new();
    for (player, action_points) in candidates {
        let mood = derive_mood(player, store.recent_events(player, MOOD_WINDOW), action_points);
        if store.advisor_mut(player)?.set_mood(mood) {
            debug!(player = %player, ?mood, "advisor mood changed");
            changes.push((player, mood));
        }
    }
    Ok(changes)
}
