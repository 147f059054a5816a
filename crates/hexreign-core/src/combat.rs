//! Combat resolution.
//!
//! An attack engages exactly one defender: the live unit on the target hex,
//! not owned by the attacker, with the lowest id. Damage and counter-damage
//! are computed from the same pre-combat numbers and applied together.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::Outcome;
use crate::hex::HexCoord;
use crate::player::PlayerId;
use crate::store::{StoreError, WorldStore};
use crate::tile::Improvement;
use crate::unit::UnitId;

/// Defense bonus for a fortified defender
pub const FORTIFY_BONUS: i32 = 2;
/// Defense bonus for a defender standing on a fortress
pub const FORTRESS_BONUS: i32 = 2;
/// An attack always deals at least this much
pub const MIN_DAMAGE: i32 = 1;

/// Numbers of a single exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    pub effective_defense: i32,
    /// Damage to the defender
    pub damage: i32,
    /// Damage to the attacker
    pub counter_damage: i32,
}

/// Defender's defense after fortification and fortress bonuses
pub fn effective_defense(def: i32, fortified: bool, on_fortress: bool) -> i32 {
    let mut total = def;
    if fortified {
        total += FORTIFY_BONUS;
    }
    if on_fortress {
        total += FORTRESS_BONUS;
    }
    total
}

/// Compute one exchange between an attacker and a defender
pub fn strike(atk: i32, def: i32, fortified: bool, on_fortress: bool) -> Strike {
    let effective_defense = effective_defense(def, fortified, on_fortress);
    Strike {
        effective_defense,
        damage: (atk - effective_defense).max(MIN_DAMAGE),
        counter_damage: (effective_defense - atk).max(0),
    }
}

/// What an attack did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub defender_owner: PlayerId,
    pub at: HexCoord,
    pub strike: Strike,
    pub attacker_killed: bool,
    pub defender_killed: bool,
    /// The tile lost its fortification and owner
    pub tile_released: bool,
}

impl CombatReport {
    pub fn outcome(&self) -> Outcome {
        match (self.attacker_killed, self.defender_killed) {
            (true, true) => Outcome::BothKilled,
            (false, true) => Outcome::DefenderKilled,
            (true, false) => Outcome::AttackerKilled,
            (false, false) => Outcome::DamageDealt,
        }
    }
}

/// The unit that defends `hex` against `attacker_owner`, if any
pub fn select_defender(store: &WorldStore, attacker_owner: PlayerId, hex: HexCoord) -> Option<UnitId> {
    // Units come back in id order
    store.enemy_units_at(hex, attacker_owner).first().map(|u| u.id)
}

/// Resolve an attack by `attacker` on the hex `target`.
///
/// Returns `Ok(None)` when no enemy stands on the hex.
pub fn resolve_attack(
    store: &mut WorldStore,
    attacker: UnitId,
    target: HexCoord,
) -> Result<Option<CombatReport>, StoreError> {
    let (attacker_owner, atk) = {
        let unit = store.unit(attacker).ok_or(StoreError::UnitNotFound(attacker))?;
        (unit.owner, unit.atk)
    };

    let Some(defender) = select_defender(store, attacker_owner, target) else {
        return Ok(None);
    };

    let on_fortress = store.tile_mut(target).improvement == Improvement::Fortress;
    let (defender_owner, def, fortified) = {
        let unit = store.unit(defender).ok_or(StoreError::UnitNotFound(defender))?;
        (unit.owner, unit.def, unit.is_fortified())
    };

    let strike = strike(atk, def, fortified, on_fortress);
    let defender_killed = store.unit_mut(defender)?.take_damage(strike.damage);
    let attacker_killed = store.unit_mut(attacker)?.take_damage(strike.counter_damage);

    let mut tile_released = false;
    if defender_killed {
        let was_anchor = store.tile(target).is_some_and(|t| t.fortified_by == Some(defender));
        if was_anchor && store.enemy_units_at(target, attacker_owner).is_empty() {
            let tile = store.tile_mut(target);
            tile.fortified_by = None;
            tile.owner = None;
            tile_released = true;
        }
    }

    let report = CombatReport {
        attacker,
        defender,
        defender_owner,
        at: target,
        strike,
        attacker_killed,
        defender_killed,
        tile_released,
    };
    debug!(
        %attacker, %defender, at = %target,
        damage = strike.damage, counter = strike.counter_damage,
        outcome = ?report.outcome(),
        "combat resolved"
    );
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{UnitKind, UnitStatus};

    const ATTACKER: PlayerId = PlayerId::from_u128(1);
    const DEFENDER: PlayerId = PlayerId::from_u128(2);

    fn target() -> HexCoord {
        HexCoord::new(1, 0)
    }

    #[test]
    fn test_plain_strike() {
        let s = strike(3, 1, false, false);
        assert_eq!(s.effective_defense, 1);
        assert_eq!(s.damage, 2);
        assert_eq!(s.counter_damage, 0);
    }

    #[test]
    fn test_fortified_fortress_strike() {
        let s = strike(3, 3, true, true);
        assert_eq!(s.effective_defense, 7);
        assert_eq!(s.damage, 1);
        assert_eq!(s.counter_damage, 4);
    }

    #[test]
    fn test_fortified_defender_on_fortress() {
        let mut store = WorldStore::new();
        let attacker = store.spawn_unit(ATTACKER, UnitKind::Spearman, "a".into(), HexCoord::ORIGIN);
        let defender = store.spawn_unit(DEFENDER, UnitKind::Spearman, "d".into(), target());
        store.unit_mut(defender).unwrap().status = UnitStatus::Fortified;
        store.tile_mut(target()).improvement = Improvement::Fortress;

        let report = resolve_attack(&mut store, attacker, target()).unwrap().unwrap();
        assert_eq!(report.strike.effective_defense, 7);
        assert_eq!(report.strike.damage, 1);
        assert_eq!(report.strike.counter_damage, 4);
        assert_eq!(store.unit(defender).unwrap().hp, 19);
        assert_eq!(store.unit(attacker).unwrap().hp, 16);
        assert_eq!(report.outcome(), Outcome::DamageDealt);
    }

    #[test]
    fn test_minimum_damage() {
        assert_eq!(strike(1, 10, false, false).damage, MIN_DAMAGE);
    }

    #[test]
    fn test_no_defender() {
        let mut store = WorldStore::new();
        let attacker = store.spawn_unit(ATTACKER, UnitKind::Archer, "a".into(), HexCoord::ORIGIN);
        store.spawn_unit(ATTACKER, UnitKind::Spearman, "own".into(), target());

        assert_eq!(resolve_attack(&mut store, attacker, target()).unwrap(), None);
    }

    #[test]
    fn test_lowest_id_defends() {
        let mut store = WorldStore::new();
        let attacker = store.spawn_unit(ATTACKER, UnitKind::Archer, "a".into(), HexCoord::ORIGIN);
        let first = store.spawn_unit(DEFENDER, UnitKind::Builder, "b1".into(), target());
        let second = store.spawn_unit(DEFENDER, UnitKind::Builder, "b2".into(), target());

        assert_eq!(select_defender(&store, ATTACKER, target()), Some(first));
        store.unit_mut(first).unwrap().take_damage(100);
        assert_eq!(select_defender(&store, ATTACKER, target()), Some(second));

        let report = resolve_attack(&mut store, attacker, target()).unwrap().unwrap();
        assert_eq!(report.defender, second);
        // Archer atk 5 vs builder def 1
        assert_eq!(report.strike.damage, 4);
        assert_eq!(store.unit(second).unwrap().hp, 6);
        assert_eq!(report.outcome(), Outcome::DamageDealt);
    }

    #[test]
    fn test_counter_damage_applies_simultaneously() {
        let mut store = WorldStore::new();
        let attacker = store.spawn_unit(ATTACKER, UnitKind::Builder, "b".into(), HexCoord::ORIGIN);
        let defender = store.spawn_unit(DEFENDER, UnitKind::Spearman, "s".into(), target());
        store.unit_mut(attacker).unwrap().hp = 1;
        store.unit_mut(defender).unwrap().hp = 1;

        let report = resolve_attack(&mut store, attacker, target()).unwrap().unwrap();
        assert_eq!(report.outcome(), Outcome::BothKilled);
        assert!(!store.unit(attacker).unwrap().is_alive());
        assert!(!store.unit(defender).unwrap().is_alive());
    }

    #[test]
    fn test_killing_anchor_releases_tile() {
        let mut store = WorldStore::new();
        let attacker = store.spawn_unit(ATTACKER, UnitKind::Siege, "s".into(), HexCoord::ORIGIN);
        let defender = store.spawn_unit(DEFENDER, UnitKind::Scout, "d".into(), target());
        store.unit_mut(defender).unwrap().hp = 1;
        {
            let tile = store.tile_mut(target());
            tile.owner = Some(DEFENDER);
            tile.fortified_by = Some(defender);
        }

        let report = resolve_attack(&mut store, attacker, target()).unwrap().unwrap();
        assert!(report.tile_released);
        let tile = store.tile(target()).unwrap();
        assert_eq!(tile.owner, None);
        assert_eq!(tile.fortified_by, None);
    }

    #[test]
    fn test_tile_held_while_defenders_remain() {
        let mut store = WorldStore::new();
        let attacker = store.spawn_unit(ATTACKER, UnitKind::Siege, "s".into(), HexCoord::ORIGIN);
        let anchor = store.spawn_unit(DEFENDER, UnitKind::Scout, "d".into(), target());
        store.spawn_unit(DEFENDER, UnitKind::Spearman, "reserve".into(), target());
        store.unit_mut(anchor).unwrap().hp = 1;
        {
            let tile = store.tile_mut(target());
            tile.owner = Some(DEFENDER);
            tile.fortified_by = Some(anchor);
        }

        let report = resolve_attack(&mut store, attacker, target()).unwrap().unwrap();
        assert!(report.defender_killed);
        assert!(!report.tile_released);
        assert_eq!(store.tile(target()).unwrap().owner, Some(DEFENDER));
    }
}
