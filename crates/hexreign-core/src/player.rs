//! Player state and resource management.
//!
//! This module contains:
//! - `PlayerId`, the stable identity of a player
//! - `Resources`, the four-counter balance every player holds
//! - `ResourceDelta`, a signed change applied with a floor at zero
//! - `Player`, including the action-point budget

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::hex::HexCoord;
use crate::Timestamp;

/// Player identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generate a fresh random identifier
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Deterministic identifier, handy for fixtures and replays
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The four resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Grain,
    Stone,
    Gold,
    Knowledge,
}

/// A balance of resources. Counters can never go negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub grain: u32,
    pub stone: u32,
    pub gold: u32,
    pub knowledge: u32,
}

impl Resources {
    /// Create an empty balance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a balance with specific amounts
    pub const fn with_amounts(grain: u32, stone: u32, gold: u32, knowledge: u32) -> Self {
        Self {
            grain,
            stone,
            gold,
            knowledge,
        }
    }

    /// Get count of a specific resource
    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Grain => self.grain,
            ResourceKind::Stone => self.stone,
            ResourceKind::Gold => self.gold,
            ResourceKind::Knowledge => self.knowledge,
        }
    }

    /// Apply a signed delta, flooring every counter at zero
    pub fn apply(&mut self, delta: &ResourceDelta) {
        self.grain = floor_add(self.grain, delta.grain);
        self.stone = floor_add(self.stone, delta.stone);
        self.gold = floor_add(self.gold, delta.gold);
        self.knowledge = floor_add(self.knowledge, delta.knowledge);
    }
}

fn floor_add(balance: u32, delta: i64) -> u32 {
    (i64::from(balance) + delta).clamp(0, i64::from(u32::MAX)) as u32
}

/// A signed change to a resource balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub grain: i64,
    pub stone: i64,
    pub gold: i64,
    pub knowledge: i64,
}

impl ResourceDelta {
    /// Create a zero delta
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to a single counter
    pub fn add(&mut self, kind: ResourceKind, amount: i64) {
        match kind {
            ResourceKind::Grain => self.grain += amount,
            ResourceKind::Stone => self.stone += amount,
            ResourceKind::Gold => self.gold += amount,
            ResourceKind::Knowledge => self.knowledge += amount,
        }
    }

    /// Add an unsigned balance (e.g. a tile's base yield) to this delta
    pub fn add_resources(&mut self, resources: &Resources) {
        self.grain += i64::from(resources.grain);
        self.stone += i64::from(resources.stone);
        self.gold += i64::from(resources.gold);
        self.knowledge += i64::from(resources.knowledge);
    }

    /// Combine two deltas
    pub fn merge(&mut self, other: &ResourceDelta) {
        self.grain += other.grain;
        self.stone += other.stone;
        self.gold += other.gold;
        self.knowledge += other.knowledge;
    }

    /// Whether every counter is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl From<Resources> for ResourceDelta {
    fn from(resources: Resources) -> Self {
        let mut delta = ResourceDelta::new();
        delta.add_resources(&resources);
        delta
    }
}

/// Lifecycle status of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Idle,
    Defeated,
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Name of the leader
    pub leader_name: String,
    /// Name of the civilization
    pub civ_name: String,
    /// Where the player started
    pub start: HexCoord,
    /// Current resources
    pub resources: Resources,
    /// Action points available for queuing actions
    pub action_points: u32,
    /// Action points are refreshed up to this ceiling
    pub max_action_points: u32,
    /// When the next scheduled refresh is expected
    pub ap_resets_at: Timestamp,
    pub status: PlayerStatus,
}

impl Player {
    /// Whether this player can still act
    pub fn is_defeated(&self) -> bool {
        self.status == PlayerStatus::Defeated
    }

    /// Can the player cover `cost` action points?
    pub fn can_afford(&self, cost: u32) -> bool {
        self.action_points >= cost
    }

    /// Deduct action points, returning false (and changing nothing) if short
    pub fn try_spend(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.action_points -= cost;
        true
    }

    /// Give action points back, never exceeding the ceiling
    pub fn refund(&mut self, amount: u32) {
        self.action_points = self
            .action_points
            .saturating_add(amount)
            .min(self.max_action_points);
    }

    /// Refill action points to the ceiling and schedule the next refresh
    pub fn refresh(&mut self, next_reset: Timestamp) {
        self.action_points = self.max_action_points;
        self.ap_resets_at = next_reset;
    }
}
