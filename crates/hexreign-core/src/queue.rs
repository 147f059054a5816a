//! Action queue: admission control, queuing and cancellation.
//!
//! Submitting validates the request, then deducts its cost and records it as
//! queued in one step on the store. Cancelling a still-queued action refunds
//! its cost, capped at the player's ceiling. Nothing is mutated when a call
//! returns an error.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::actions::{ActionId, ActionKind, ActionRequest, ActionStatus};
use crate::hex::{self, HexCoord};
use crate::player::PlayerId;
use crate::store::WorldStore;
use crate::unit::{Unit, UnitId};
use crate::Timestamp;

/// Why a submission or cancellation was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueError {
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} has been defeated")]
    PlayerDefeated(PlayerId),

    #[error("Not enough action points: need {needed}, have {available}")]
    InsufficientBudget { needed: u32, available: u32 },

    #[error("This action needs a unit")]
    UnitRequired,

    #[error("Unit {0} not found")]
    UnitNotFound(UnitId),

    #[error("Unit {0} belongs to someone else")]
    UnitNotOwned(UnitId),

    #[error("Unit {0} is dead")]
    UnitDead(UnitId),

    #[error("{unit} cannot reach {target}")]
    TargetUnreachable { unit: UnitId, target: HexCoord },

    #[error("No enemy for {unit} to attack at {target}")]
    NoAttackTarget { unit: UnitId, target: HexCoord },

    #[error("Action {0} not found")]
    ActionNotFound(ActionId),

    #[error("Action {0} belongs to someone else")]
    NotActionOwner(ActionId),

    #[error("Action {0} is no longer queued")]
    NotCancellable(ActionId),
}

/// Hexes `unit` could move to: discovered by its owner, passable, and within
/// its movement range.
pub fn move_targets(store: &WorldStore, unit: &Unit) -> HashSet<HexCoord> {
    hex::reachable(unit.position, unit.mov, |hex| {
        store
            .tile(hex)
            .is_some_and(|t| t.is_discovered_by(unit.owner) && t.terrain.is_passable())
    })
}

/// Adjacent hexes `unit` could attack
pub fn attack_targets(store: &WorldStore, unit: &Unit) -> Vec<HexCoord> {
    hex::attackable(
        unit.position,
        |hex| store.is_discovered(hex, unit.owner),
        |hex| !store.enemy_units_at(hex, unit.owner).is_empty(),
    )
}

fn validate_unit(store: &WorldStore, request: &ActionRequest) -> Result<(), QueueError> {
    let Some(unit_id) = request.unit else {
        return if request.kind.requires_unit() {
            Err(QueueError::UnitRequired)
        } else {
            Ok(())
        };
    };

    let unit = store.unit(unit_id).ok_or(QueueError::UnitNotFound(unit_id))?;
    if unit.owner != request.player {
        return Err(QueueError::UnitNotOwned(unit_id));
    }
    if !unit.is_alive() {
        return Err(QueueError::UnitDead(unit_id));
    }

    match request.kind {
        ActionKind::Move if !move_targets(store, unit).contains(&request.target) => {
            Err(QueueError::TargetUnreachable {
                unit: unit_id,
                target: request.target,
            })
        }
        ActionKind::Attack if !attack_targets(store, unit).contains(&request.target) => {
            Err(QueueError::NoAttackTarget {
                unit: unit_id,
                target: request.target,
            })
        }
        _ => Ok(()),
    }
}

/// Queue an action, deducting its cost from the player's budget
pub fn submit(store: &mut WorldStore, request: ActionRequest, now: Timestamp) -> Result<ActionId, QueueError> {
    let player = store
        .player(request.player)
        .ok_or(QueueError::UnknownPlayer(request.player))?;
    if player.is_defeated() {
        return Err(QueueError::PlayerDefeated(request.player));
    }
    validate_unit(store, &request)?;

    let player = store
        .player_mut(request.player)
        .map_err(|_| QueueError::UnknownPlayer(request.player))?;
    let available = player.action_points;
    if !player.try_spend(request.cost) {
        return Err(QueueError::InsufficientBudget {
            needed: request.cost,
            available,
        });
    }

    let (player_id, kind, cost) = (request.player, request.kind, request.cost);
    let id = store.insert_action(request, now);
    debug!(player = %player_id, action = %id, ?kind, cost, "action queued");
    Ok(id)
}

/// Cancel a queued action and refund its cost
pub fn cancel(store: &mut WorldStore, action: ActionId, player: PlayerId) -> Result<(), QueueError> {
    let pending = store.action(action).ok_or(QueueError::ActionNotFound(action))?;
    if pending.player != player {
        return Err(QueueError::NotActionOwner(action));
    }
    if !pending.is_queued() {
        return Err(QueueError::NotCancellable(action));
    }
    let cost = pending.cost;

    store
        .player_mut(player)
        .map_err(|_| QueueError::UnknownPlayer(player))?
        .refund(cost);
    store
        .set_action_status(action, ActionStatus::Cancelled)
        .map_err(|_| QueueError::ActionNotFound(action))?;

    debug!(player = %player, action = %action, refund = cost, "action cancelled");
    Ok(())
}
