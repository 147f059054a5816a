//! Military and civilian units.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hex::HexCoord;
use crate::player::PlayerId;

/// Store-assigned unit identifier. Lower ids were created earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// The six unit kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Spearman,
    Archer,
    Cavalry,
    Siege,
    Builder,
    Scout,
}

/// Fixed combat and movement numbers of a unit kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub hp: i32,
    pub atk: i32,
    pub def: i32,
    pub mov: u32,
}

impl UnitKind {
    /// All unit kinds
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Spearman,
        UnitKind::Archer,
        UnitKind::Cavalry,
        UnitKind::Siege,
        UnitKind::Builder,
        UnitKind::Scout,
    ];

    /// Base stats for a freshly spawned unit of this kind
    pub const fn base_stats(&self) -> UnitStats {
        match self {
            UnitKind::Spearman => UnitStats { hp: 20, atk: 3, def: 3, mov: 2 },
            UnitKind::Archer => UnitStats { hp: 15, atk: 5, def: 1, mov: 2 },
            UnitKind::Cavalry => UnitStats { hp: 20, atk: 4, def: 2, mov: 4 },
            UnitKind::Siege => UnitStats { hp: 25, atk: 7, def: 1, mov: 1 },
            UnitKind::Builder => UnitStats { hp: 10, atk: 1, def: 1, mov: 2 },
            UnitKind::Scout => UnitStats { hp: 12, atk: 2, def: 1, mov: 4 },
        }
    }

    fn name_pool(&self) -> &'static [&'static str] {
        match self {
            UnitKind::Spearman => &["Gilgamesh's Guard", "Warrior of Ur", "Spear of Ashur"],
            UnitKind::Archer => &["Eye of Ishtar", "Arrow of Nippur", "Hunter of Nineveh"],
            UnitKind::Cavalry => &["Rider of Akkad", "Horseman of Babylon", "Swift Lance"],
            UnitKind::Siege => &["Ram of the Gates", "Siege Engine", "Tower of Destruction"],
            UnitKind::Builder => &["Builder of Ur", "Mason of Nippur", "Craftsman"],
            UnitKind::Scout => &["Scout of the Wasteland", "Eyes of the King", "Desert Wanderer"],
        }
    }

    /// Pick a display name for a new unit
    pub fn random_name<R: Rng>(&self, rng: &mut R) -> String {
        self.name_pool()
            .choose(rng)
            .copied()
            .unwrap_or("Unnamed")
            .to_string()
    }
}

/// What a unit is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Idle,
    Fortified,
    Besieging,
    /// Soft-deleted; kept for history but gone from the map
    Dead,
}

/// A unit on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub kind: UnitKind,
    pub name: String,
    pub position: HexCoord,
    pub hp: i32,
    pub max_hp: i32,
    pub atk: i32,
    pub def: i32,
    pub mov: u32,
    pub status: UnitStatus,
}

impl Unit {
    /// Create a unit with its kind's base stats
    pub fn new(id: UnitId, owner: PlayerId, kind: UnitKind, name: String, position: HexCoord) -> Self {
        let stats = kind.base_stats();
        Self {
            id,
            owner,
            kind,
            name,
            position,
            hp: stats.hp,
            max_hp: stats.hp,
            atk: stats.atk,
            def: stats.def,
            mov: stats.mov,
            status: UnitStatus::Idle,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status != UnitStatus::Dead
    }

    pub fn is_fortified(&self) -> bool {
        self.status == UnitStatus::Fortified
    }

    /// Subtract hit points; a unit at or below zero dies.
    ///
    /// Returns true if this damage killed the unit.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if amount <= 0 || !self.is_alive() {
            return false;
        }
        let remaining = self.hp - amount;
        self.hp = remaining.max(0);
        if remaining <= 0 {
            self.status = UnitStatus::Dead;
            return true;
        }
        false
    }
}
