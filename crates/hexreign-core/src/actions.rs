//! Queued player actions and the events they produce.
//!
//! Players queue `PendingAction`s between ticks. The tick resolver turns each
//! one into world-state changes plus exactly one structured `Event`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hex::HexCoord;
use crate::player::PlayerId;
use crate::unit::UnitId;
use crate::Timestamp;

/// Store-assigned action identifier. Ids increase in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// The kinds of action a player can queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Defend,
    Found,
    Move,
    Scout,
    Invest,
    Attack,
    Diplomacy,
    /// A kind this build does not understand (e.g. from a newer client)
    #[serde(other)]
    Unknown,
}

impl ActionKind {
    /// Resolution order within a tick, lowest first. Unknown kinds go last.
    pub const fn priority(&self) -> u8 {
        match self {
            ActionKind::Defend => 0,
            ActionKind::Found => 1,
            ActionKind::Move => 2,
            ActionKind::Scout => 3,
            ActionKind::Invest => 4,
            ActionKind::Attack => 5,
            ActionKind::Diplomacy => 6,
            ActionKind::Unknown => u8::MAX,
        }
    }

    /// Usual action-point price of this kind
    pub const fn default_cost(&self) -> u32 {
        match self {
            ActionKind::Found => 3,
            ActionKind::Attack | ActionKind::Invest => 2,
            ActionKind::Defend
            | ActionKind::Move
            | ActionKind::Scout
            | ActionKind::Diplomacy
            | ActionKind::Unknown => 1,
        }
    }

    /// Whether the action must be carried out by one of the player's units
    pub const fn requires_unit(&self) -> bool {
        !matches!(self, ActionKind::Diplomacy | ActionKind::Unknown)
    }
}

/// Lifecycle of a queued action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Queued,
    Resolved,
    Cancelled,
}

/// What a player asks for when queuing an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub player: PlayerId,
    pub unit: Option<UnitId>,
    pub kind: ActionKind,
    pub target: HexCoord,
    pub cost: u32,
    pub target_player: Option<PlayerId>,
    /// Free-form diplomacy subtype ("alliance", "tribute", ...)
    pub diplomacy: Option<String>,
}

impl ActionRequest {
    /// A unit action at its usual cost
    pub fn unit_action(player: PlayerId, unit: UnitId, kind: ActionKind, target: HexCoord) -> Self {
        Self {
            player,
            unit: Some(unit),
            kind,
            target,
            cost: kind.default_cost(),
            target_player: None,
            diplomacy: None,
        }
    }

    /// A diplomatic gesture toward another player
    pub fn diplomacy(player: PlayerId, target_player: PlayerId, subtype: impl Into<String>) -> Self {
        Self {
            player,
            unit: None,
            kind: ActionKind::Diplomacy,
            target: HexCoord::ORIGIN,
            cost: ActionKind::Diplomacy.default_cost(),
            target_player: Some(target_player),
            diplomacy: Some(subtype.into()),
        }
    }
}

/// An action waiting in (or retired from) the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: ActionId,
    pub player: PlayerId,
    pub unit: Option<UnitId>,
    pub kind: ActionKind,
    pub target: HexCoord,
    pub cost: u32,
    pub status: ActionStatus,
    pub target_player: Option<PlayerId>,
    pub diplomacy: Option<String>,
    pub submitted_at: Timestamp,
}

impl PendingAction {
    pub fn is_queued(&self) -> bool {
        self.status == ActionStatus::Queued
    }
}

/// Store-assigned event identifier. Ids increase in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Fortify,
    Found,
    Move,
    Scout,
    Invest,
    Attack,
    Diplomacy,
    Unknown,
}

impl From<ActionKind> for EventKind {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Defend => EventKind::Fortify,
            ActionKind::Found => EventKind::Found,
            ActionKind::Move => EventKind::Move,
            ActionKind::Scout => EventKind::Scout,
            ActionKind::Invest => EventKind::Invest,
            ActionKind::Attack => EventKind::Attack,
            ActionKind::Diplomacy => EventKind::Diplomacy,
            ActionKind::Unknown => EventKind::Unknown,
        }
    }
}

/// How it turned out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    /// Attack found no enemy on the target hex
    NoTarget,
    /// Found targeted a hex someone already holds
    TileAlreadyOwned,
    /// Invest targeted a hex the actor does not own
    TileNotOwned,
    /// Invest would not change the improvement
    NoChange,
    DamageDealt,
    DefenderKilled,
    AttackerKilled,
    BothKilled,
    /// Diplomatic gesture with its subtype
    Diplomacy(String),
    /// Action kind the resolver has no handler for
    Unsupported,
}

impl Outcome {
    /// Did the attacker destroy the defending unit?
    pub fn defender_died(&self) -> bool {
        matches!(self, Outcome::DefenderKilled | Outcome::BothKilled)
    }

    /// Did the attacking unit fall to the counter-attack?
    pub fn attacker_died(&self) -> bool {
        matches!(self, Outcome::AttackerKilled | Outcome::BothKilled)
    }
}

/// Immutable log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub tick: u64,
    pub kind: EventKind,
    pub actor: PlayerId,
    pub target: Option<PlayerId>,
    pub at: HexCoord,
    pub outcome: Outcome,
    pub timestamp: Timestamp,
}

impl Event {
    /// Whether `player` appears in this event as actor or target
    pub fn involves(&self, player: PlayerId) -> bool {
        self.actor == player || self.target == Some(player)
    }

    /// Did `player` kill an enemy unit in this event?
    pub fn is_victory_for(&self, player: PlayerId) -> bool {
        if self.kind != EventKind::Attack {
            return false;
        }
        (self.actor == player && self.outcome.defender_died())
            || (self.target == Some(player) && self.outcome.attacker_died())
    }

    /// Did `player` lose a unit in this event?
    pub fn is_loss_for(&self, player: PlayerId) -> bool {
        if self.kind != EventKind::Attack {
            return false;
        }
        (self.target == Some(player) && self.outcome.defender_died())
            || (self.actor == player && self.outcome.attacker_died())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {}] {:?} by {} at {}", self.tick, self.kind, self.actor, self.at)?;
        if let Some(target) = self.target {
            write!(f, " against {}", target)?;
        }
        write!(f, ": {:?}", self.outcome)
    }
}
