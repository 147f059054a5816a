//! Materialized map tiles.
//!
//! A `Tile` combines the fixed, generated properties of a hex with the
//! mutable state gameplay attaches to it: ownership, improvements, fog of
//! war and fortification.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::hex::HexCoord;
use crate::player::{PlayerId, ResourceDelta, ResourceKind, Resources};
use crate::unit::UnitId;
use crate::world::{self, Deposit, Terrain};

/// Extra grain from a farm on any non-mountain hex
pub const FARM_BONUS: i64 = 2;
/// Extra stone from a mine on mountain or desert
pub const MINE_BONUS: i64 = 2;

/// Improvement built on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Improvement {
    #[default]
    None,
    Farm,
    Mine,
    Settlement,
    Fortress,
}

/// A tile of the world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub base_yield: Resources,
    pub deposit: Option<Deposit>,
    /// Whether the deposit counts toward the owner's yield
    pub deposit_revealed: bool,
    pub owner: Option<PlayerId>,
    pub improvement: Improvement,
    /// Players that have seen this tile. Only ever grows.
    pub discovered_by: HashSet<PlayerId>,
    /// Players that have surveyed this tile. Only ever grows.
    pub surveyed_by: HashSet<PlayerId>,
    /// Unit anchoring the tile's defense
    pub fortified_by: Option<UnitId>,
}

impl Tile {
    /// Materialize the tile at `coord` from the world generator
    pub fn generate(coord: HexCoord) -> Self {
        let seed = world::generate(coord.q, coord.r);
        Self {
            coord,
            terrain: seed.terrain,
            base_yield: seed.base_yield,
            deposit: seed.deposit,
            deposit_revealed: false,
            owner: None,
            improvement: Improvement::None,
            discovered_by: HashSet::new(),
            surveyed_by: HashSet::new(),
            fortified_by: None,
        }
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    pub fn is_discovered_by(&self, player: PlayerId) -> bool {
        self.discovered_by.contains(&player)
    }

    pub fn is_surveyed_by(&self, player: PlayerId) -> bool {
        self.surveyed_by.contains(&player)
    }

    /// Add a player to the discovered set. Returns true if newly added.
    pub fn discover(&mut self, player: PlayerId) -> bool {
        self.discovered_by.insert(player)
    }

    /// Add a player to the surveyed set. Returns true if newly added.
    pub fn survey(&mut self, player: PlayerId) -> bool {
        self.surveyed_by.insert(player)
    }

    /// The improvement an `invest` action builds here, if any
    pub fn investable_improvement(&self) -> Option<Improvement> {
        match self.terrain {
            Terrain::Plains | Terrain::River | Terrain::Forest => Some(Improvement::Farm),
            Terrain::Mountain | Terrain::Desert => Some(Improvement::Mine),
            Terrain::Sea => None,
        }
    }

    /// Resources this tile produces for its owner each tick
    pub fn yield_per_tick(&self) -> ResourceDelta {
        let mut delta = ResourceDelta::from(self.base_yield);

        if self.improvement == Improvement::Farm && self.terrain != Terrain::Mountain {
            delta.add(ResourceKind::Grain, FARM_BONUS);
        }
        if self.improvement == Improvement::Mine
            && matches!(self.terrain, Terrain::Mountain | Terrain::Desert)
        {
            delta.add(ResourceKind::Stone, MINE_BONUS);
        }
        if self.deposit_revealed {
            if let Some(deposit) = self.deposit {
                delta.add(deposit.kind, i64::from(deposit.amount));
            }
        }

        delta
    }
}
