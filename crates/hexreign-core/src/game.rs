//! Game facade.
//!
//! `Game` owns the world store and the tunable settings, and exposes the
//! operations the outside world drives the simulation with:
//! - the submission layer: onboarding, submitting and cancelling actions,
//!   map/unit/event queries
//! - the scheduler: tick resolution and action-point refresh
//!
//! Each `&mut self` method is one atomic step for whoever holds the game.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::actions::{ActionId, ActionRequest, ActionStatus, Event, PendingAction};
use crate::advisor::{Advisor, AdvisorProfile};
use crate::config::GameConfig;
use crate::hex::{hexes_in_radius, HexCoord};
use crate::player::{Player, PlayerId, PlayerStatus};
use crate::queue::{self, QueueError};
use crate::store::{StoreError, UnitFilter, WorldStore};
use crate::tick::{self, TickError, TickOutcome};
use crate::tile::{Improvement, Tile};
use crate::unit::{Unit, UnitId, UnitKind};
use crate::Timestamp;

/// Units every new player starts with
pub const STARTING_UNITS: [UnitKind; 3] = [UnitKind::Spearman, UnitKind::Scout, UnitKind::Builder];

/// Random draws for a passable start before settling for any hex
const START_ATTEMPTS: usize = 32;

/// Who is joining and how they want to be addressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub id: PlayerId,
    pub leader_name: String,
    pub civ_name: String,
    pub advisor: AdvisorProfile,
}

/// The simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    store: WorldStore,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            store: WorldStore::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read access to every record
    pub fn store(&self) -> &WorldStore {
        &self.store
    }

    /// Direct write access, for tooling and fixtures
    pub fn store_mut(&mut self) -> &mut WorldStore {
        &mut self.store
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.store.player(id)
    }

    pub fn advisor(&self, player: PlayerId) -> Option<&Advisor> {
        self.store.advisor(player)
    }

    // ==================== Onboarding ====================

    /// Add a player to the world.
    ///
    /// Picks a start hex, reveals the area around it, places the starting
    /// units and creates the advisor. Onboarding an existing player changes
    /// nothing and returns false.
    pub fn onboard_player<R: Rng>(&mut self, new: NewPlayer, now: Timestamp, rng: &mut R) -> bool {
        if self.store.player(new.id).is_some() {
            debug!(player = %new.id, "player already onboarded");
            return false;
        }

        let start = self.pick_start(rng);
        self.store.insert_player(Player {
            id: new.id,
            leader_name: new.leader_name,
            civ_name: new.civ_name,
            start,
            resources: self.config.starting_resources,
            action_points: self.config.starting_action_points.min(self.config.max_action_points),
            max_action_points: self.config.max_action_points,
            ap_resets_at: now + self.config.ap_refresh_period_ms,
            status: PlayerStatus::Active,
        });

        for hex in hexes_in_radius(start, self.config.reveal_radius) {
            self.store.tile_mut(hex).discover(new.id);
        }
        for kind in STARTING_UNITS {
            self.store.spawn_unit(new.id, kind, kind.random_name(rng), start);
        }
        self.store.insert_advisor(Advisor::new(new.id, new.advisor));

        info!(player = %new.id, %start, "player onboarded");
        true
    }

    fn pick_start<R: Rng>(&mut self, rng: &mut R) -> HexCoord {
        let range = self.config.spawn_range.saturating_abs();
        let mut candidate = HexCoord::ORIGIN;
        for _ in 0..START_ATTEMPTS {
            candidate = HexCoord::new(rng.gen_range(-range..=range), rng.gen_range(-range..=range));
            if self.store.tile_mut(candidate).terrain.is_passable() {
                break;
            }
        }
        candidate
    }

    /// Place a new unit of `kind` for `owner` at `at`
    pub fn spawn_unit<R: Rng>(
        &mut self,
        owner: PlayerId,
        kind: UnitKind,
        at: HexCoord,
        rng: &mut R,
    ) -> Result<UnitId, StoreError> {
        if self.store.player(owner).is_none() {
            return Err(StoreError::PlayerNotFound(owner));
        }
        Ok(self.store.spawn_unit(owner, kind, kind.random_name(rng), at))
    }

    /// Remove a player so they can start over.
    ///
    /// Their tiles are released (owner, improvement and fortification
    /// cleared), queued actions cancelled without refund, and units, advisor
    /// and player record deleted.
    pub fn restart_player(&mut self, player: PlayerId) -> Result<(), StoreError> {
        if self.store.player(player).is_none() {
            return Err(StoreError::PlayerNotFound(player));
        }

        let tiles = self.store.tiles_owned_by(player);
        for hex in &tiles {
            let tile = self.store.tile_mut(*hex);
            tile.owner = None;
            tile.improvement = Improvement::None;
            tile.fortified_by = None;
        }

        let queued: Vec<ActionId> = self.store.queued_actions_of(player).iter().map(|a| a.id).collect();
        for id in &queued {
            self.store.set_action_status(*id, ActionStatus::Cancelled)?;
        }

        let units = self.store.remove_units_of(player);
        self.store.remove_advisor(player);
        self.store.remove_player(player);

        info!(
            player = %player,
            tiles = tiles.len(),
            actions = queued.len(),
            units,
            "player restarted"
        );
        Ok(())
    }

    // ==================== Action queue ====================

    pub fn submit_action(&mut self, request: ActionRequest, now: Timestamp) -> Result<ActionId, QueueError> {
        queue::submit(&mut self.store, request, now)
    }

    pub fn cancel_action(&mut self, action: ActionId, player: PlayerId) -> Result<(), QueueError> {
        queue::cancel(&mut self.store, action, player)
    }

    /// A player's queued actions, in submission order
    pub fn queued_actions(&self, player: PlayerId) -> Vec<&PendingAction> {
        self.store.queued_actions_of(player)
    }

    /// Hexes a unit may currently be ordered to move to
    pub fn move_targets(&self, unit: UnitId) -> Result<HashSet<HexCoord>, StoreError> {
        let unit = self.store.unit(unit).ok_or(StoreError::UnitNotFound(unit))?;
        Ok(queue::move_targets(&self.store, unit))
    }

    /// Hexes a unit may currently be ordered to attack
    pub fn attack_targets(&self, unit: UnitId) -> Result<Vec<HexCoord>, StoreError> {
        let unit = self.store.unit(unit).ok_or(StoreError::UnitNotFound(unit))?;
        Ok(queue::attack_targets(&self.store, unit))
    }

    // ==================== Queries ====================

    /// The tile at `hex`, materialized if this is its first access
    pub fn tile(&mut self, hex: HexCoord) -> &Tile {
        self.store.tile_mut(hex)
    }

    /// Every tile within `radius` of `center`, materializing as needed
    pub fn tiles_in_radius(&mut self, center: HexCoord, radius: u32) -> Vec<&Tile> {
        let hexes = hexes_in_radius(center, radius);
        for hex in &hexes {
            self.store.tile_mut(*hex);
        }
        hexes.iter().filter_map(|hex| self.store.tile(*hex)).collect()
    }

    /// Number of tiles `player` owns
    pub fn territory_count(&self, player: PlayerId) -> usize {
        self.store.tiles_owned_by(player).len()
    }

    pub fn units(&self, filter: UnitFilter) -> Vec<&Unit> {
        self.store.units(filter)
    }

    /// Newest events involving `player`, newest first
    pub fn recent_events(&self, player: PlayerId, limit: usize) -> Vec<&Event> {
        self.store.recent_events(player, limit)
    }

    /// Newest events anywhere, newest first
    pub fn recent_world_events(&self, limit: usize) -> Vec<&Event> {
        self.store.recent_world_events(limit)
    }

    // ==================== Scheduled jobs ====================

    /// Number the next tick will get
    pub fn next_tick_number(&self) -> u64 {
        self.store.last_tick_number() + 1
    }

    /// Resolve the next tick
    pub fn resolve_tick(&mut self, now: Timestamp) -> Result<TickOutcome, TickError> {
        self.resolve_tick_number(self.next_tick_number(), now)
    }

    /// Resolve tick `tick` if it is the next one; already-resolved numbers are
    /// a no-op. Either the whole tick lands or nothing does.
    pub fn resolve_tick_number(&mut self, tick: u64, now: Timestamp) -> Result<TickOutcome, TickError> {
        tick::advance(&mut self.store, tick, now)
    }

    /// Refill every active player's action points and schedule the next
    /// refresh. Returns how many players were refreshed.
    pub fn refresh_action_points(&mut self, now: Timestamp) -> usize {
        let next_reset = now + self.config.ap_refresh_period_ms;
        let ids: Vec<PlayerId> = self
            .store
            .players()
            .into_iter()
            .filter(|p| !p.is_defeated())
            .map(|p| p.id)
            .collect();

        for id in &ids {
            if let Ok(player) = self.store.player_mut(*id) {
                player.refresh(next_reset);
            }
        }
        info!(players = ids.len(), next_reset, "action points refreshed");
        ids.len()
    }

    // ==================== Advisor ====================

    /// Raise the advisor's loyalty by one step. Returns the new value.
    pub fn increment_loyalty(&mut self, player: PlayerId) -> Result<u8, StoreError> {
        let advisor = self.store.advisor_mut(player)?;
        advisor.increment_loyalty();
        Ok(advisor.loyalty)
    }

    /// Lower the advisor's loyalty by one step. Returns the new value.
    pub fn decrement_loyalty(&mut self, player: PlayerId) -> Result<u8, StoreError> {
        let advisor = self.store.advisor_mut(player)?;
        advisor.decrement_loyalty();
        Ok(advisor.loyalty)
    }

    // ==================== Persistence ====================

    /// Serialize the whole game to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a game from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
