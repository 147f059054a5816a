//! In-memory entity store.
//!
//! Holds every record the simulation touches: players, advisors, units,
//! tiles, queued actions, the event log and the tick log. Lookups are by key
//! or by simple filters; every mutation goes through `&mut self`, which makes
//! each read-modify-write atomic for whoever holds the store.
//!
//! The store is `Clone` so the tick resolver can stage a whole tick on a copy
//! and swap it in only when the tick completes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

use crate::actions::{ActionId, ActionRequest, ActionStatus, Event, EventId, EventKind, Outcome, PendingAction};
use crate::advisor::Advisor;
use crate::hex::HexCoord;
use crate::player::{Player, PlayerId};
use crate::tick::TickRecord;
use crate::tile::Tile;
use crate::unit::{Unit, UnitId, UnitKind};
use crate::Timestamp;

/// A record the caller expected is missing, or a log append is out of order
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("{0} not found")]
    UnitNotFound(UnitId),

    #[error("{0} not found")]
    ActionNotFound(ActionId),

    #[error("no advisor for player {0}")]
    AdvisorNotFound(PlayerId),

    #[error("tick {tick} cannot follow tick {last}")]
    DuplicateTick { tick: u64, last: u64 },
}

/// Filter for unit queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitFilter {
    pub owner: Option<PlayerId>,
    pub at: Option<HexCoord>,
    pub include_dead: bool,
}

impl UnitFilter {
    /// Live units of one player
    pub fn owned_by(owner: PlayerId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    /// Live units standing on one hex
    pub fn at(hex: HexCoord) -> Self {
        Self {
            at: Some(hex),
            ..Self::default()
        }
    }

    /// Also return dead units (history queries)
    pub fn including_dead(mut self) -> Self {
        self.include_dead = true;
        self
    }

    fn matches(&self, unit: &Unit) -> bool {
        (self.include_dead || unit.is_alive())
            && self.owner.map_or(true, |owner| unit.owner == owner)
            && self.at.map_or(true, |hex| unit.position == hex)
    }
}

/// All persistent game records
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldStore {
    players: HashMap<PlayerId, Player>,
    advisors: HashMap<PlayerId, Advisor>,
    units: BTreeMap<UnitId, Unit>,
    #[serde(with = "tile_table")]
    tiles: HashMap<HexCoord, Tile>,
    actions: BTreeMap<ActionId, PendingAction>,
    events: Vec<Event>,
    ticks: Vec<TickRecord>,
    next_unit_id: u64,
    next_action_id: u64,
    next_event_id: u64,
}

impl WorldStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Players ====================

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, StoreError> {
        self.players.get_mut(&id).ok_or(StoreError::PlayerNotFound(id))
    }

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Every player, in id order
    pub fn players(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.id);
        players
    }

    // ==================== Advisors ====================

    pub fn advisor(&self, player: PlayerId) -> Option<&Advisor> {
        self.advisors.get(&player)
    }

    pub fn advisor_mut(&mut self, player: PlayerId) -> Result<&mut Advisor, StoreError> {
        self.advisors
            .get_mut(&player)
            .ok_or(StoreError::AdvisorNotFound(player))
    }

    pub fn insert_advisor(&mut self, advisor: Advisor) {
        self.advisors.insert(advisor.player, advisor);
    }

    pub fn remove_advisor(&mut self, player: PlayerId) -> Option<Advisor> {
        self.advisors.remove(&player)
    }

    // ==================== Units ====================

    /// Create a live unit with its kind's base stats
    pub fn spawn_unit(&mut self, owner: PlayerId, kind: UnitKind, name: String, at: HexCoord) -> UnitId {
        self.next_unit_id += 1;
        let id = UnitId(self.next_unit_id);
        self.units.insert(id, Unit::new(id, owner, kind, name, at));
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit, StoreError> {
        self.units.get_mut(&id).ok_or(StoreError::UnitNotFound(id))
    }

    /// Units matching `filter`, in id order
    pub fn units(&self, filter: UnitFilter) -> Vec<&Unit> {
        self.units.values().filter(|u| filter.matches(u)).collect()
    }

    /// Live units on `hex` not owned by `player`, in id order
    pub fn enemy_units_at(&self, hex: HexCoord, player: PlayerId) -> Vec<&Unit> {
        self.units
            .values()
            .filter(|u| u.is_alive() && u.position == hex && u.owner != player)
            .collect()
    }

    /// Hard-delete every unit of a player and drop any fortification they
    /// anchored, whoever owns the tile. Returns how many were removed.
    pub fn remove_units_of(&mut self, owner: PlayerId) -> usize {
        let removed: BTreeSet<UnitId> = self
            .units
            .values()
            .filter(|u| u.owner == owner)
            .map(|u| u.id)
            .collect();
        self.units.retain(|id, _| !removed.contains(id));

        for tile in self.tiles.values_mut() {
            if tile.fortified_by.is_some_and(|anchor| removed.contains(&anchor)) {
                tile.fortified_by = None;
            }
        }
        removed.len()
    }

    // ==================== Tiles ====================

    /// The tile at `hex`, if it has been materialized
    pub fn tile(&self, hex: HexCoord) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    /// The tile at `hex`, materializing it from the generator on first access
    pub fn tile_mut(&mut self, hex: HexCoord) -> &mut Tile {
        self.tiles.entry(hex).or_insert_with(|| Tile::generate(hex))
    }

    /// Number of tiles materialized so far
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Has `player` discovered `hex`? Unmaterialized hexes are undiscovered.
    pub fn is_discovered(&self, hex: HexCoord, player: PlayerId) -> bool {
        self.tile(hex).is_some_and(|t| t.is_discovered_by(player))
    }

    /// Every tile with an owner, in coordinate order
    pub fn owned_tiles(&self) -> Vec<&Tile> {
        let mut tiles: Vec<&Tile> = self.tiles.values().filter(|t| t.owner.is_some()).collect();
        tiles.sort_by_key(|t| t.coord);
        tiles
    }

    /// Coordinates of every tile owned by `owner`
    pub fn tiles_owned_by(&self, owner: PlayerId) -> Vec<HexCoord> {
        self.owned_tiles()
            .into_iter()
            .filter(|t| t.is_owned_by(owner))
            .map(|t| t.coord)
            .collect()
    }

    // ==================== Actions ====================

    /// Record a new queued action
    pub fn insert_action(&mut self, request: ActionRequest, now: Timestamp) -> ActionId {
        self.next_action_id += 1;
        let id = ActionId(self.next_action_id);
        self.actions.insert(
            id,
            PendingAction {
                id,
                player: request.player,
                unit: request.unit,
                kind: request.kind,
                target: request.target,
                cost: request.cost,
                status: ActionStatus::Queued,
                target_player: request.target_player,
                diplomacy: request.diplomacy,
                submitted_at: now,
            },
        );
        id
    }

    pub fn action(&self, id: ActionId) -> Option<&PendingAction> {
        self.actions.get(&id)
    }

    pub fn set_action_status(&mut self, id: ActionId, status: ActionStatus) -> Result<(), StoreError> {
        let action = self.actions.get_mut(&id).ok_or(StoreError::ActionNotFound(id))?;
        action.status = status;
        Ok(())
    }

    /// Every queued action, in submission order
    pub fn queued_actions(&self) -> Vec<&PendingAction> {
        self.actions.values().filter(|a| a.is_queued()).collect()
    }

    /// Queued actions of one player, in submission order
    pub fn queued_actions_of(&self, player: PlayerId) -> Vec<&PendingAction> {
        self.actions
            .values()
            .filter(|a| a.is_queued() && a.player == player)
            .collect()
    }

    // ==================== Events ====================

    /// Append an event to the log
    #[allow(clippy::too_many_arguments)]
    pub fn append_event(
        &mut self,
        tick: u64,
        kind: EventKind,
        actor: PlayerId,
        target: Option<PlayerId>,
        at: HexCoord,
        outcome: Outcome,
        now: Timestamp,
    ) -> EventId {
        self.next_event_id += 1;
        let id = EventId(self.next_event_id);
        self.events.push(Event {
            id,
            tick,
            kind,
            actor,
            target,
            at,
            outcome,
            timestamp: now,
        });
        id
    }

    /// Newest events where `player` is actor or target, newest first
    pub fn recent_events(&self, player: PlayerId, limit: usize) -> Vec<&Event> {
        self.events
            .iter()
            .rev()
            .filter(|e| e.involves(player))
            .take(limit)
            .collect()
    }

    /// Newest events world-wide, newest first
    pub fn recent_world_events(&self, limit: usize) -> Vec<&Event> {
        self.events.iter().rev().take(limit).collect()
    }

    /// Events recorded during one tick, in append order
    pub fn events_in_tick(&self, tick: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }

    // ==================== Ticks ====================

    pub fn last_tick(&self) -> Option<&TickRecord> {
        self.ticks.last()
    }

    /// Number of the last resolved tick, 0 before the first
    pub fn last_tick_number(&self) -> u64 {
        self.last_tick().map_or(0, |t| t.tick)
    }

    pub fn ticks(&self) -> &[TickRecord] {
        &self.ticks
    }

    /// Append a tick record. The sequence must continue without gaps.
    pub fn append_tick(&mut self, record: TickRecord) -> Result<(), StoreError> {
        let last = self.last_tick_number();
        if record.tick != last + 1 {
            return Err(StoreError::DuplicateTick {
                tick: record.tick,
                last,
            });
        }
        self.ticks.push(record);
        Ok(())
    }
}

/// Tiles are keyed by coordinate in memory but serialized as a plain list,
/// since JSON object keys must be strings.
mod tile_table {
    use super::{HashMap, HexCoord, Tile};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tiles: &HashMap<HexCoord, Tile>, serializer: S) -> Result<S::Ok, S::Error> {
        let mut sorted: Vec<&Tile> = tiles.values().collect();
        sorted.sort_by_key(|t| t.coord);
        serializer.collect_seq(sorted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HashMap<HexCoord, Tile>, D::Error> {
        let tiles = Vec::<Tile>::deserialize(deserializer)?;
        Ok(tiles.into_iter().map(|t| (t.coord, t)).collect())
    }
}
