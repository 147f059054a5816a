//! Integration tests for the Hexreign simulation core.
//!
//! These tests drive whole ticks through the public `Game` API: players are
//! onboarded, orders are submitted through the queue, and the scheduler
//! entry points resolve them.

use hexreign_core::hex::hexes_in_radius;
use hexreign_core::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

const ALICE: PlayerId = PlayerId::from_u128(0xA11CE);
const BOB: PlayerId = PlayerId::from_u128(0xB0B);

/// A patch of open plains far from every start position
const FIELD: HexCoord = HexCoord::new(500, 500);
const EAST: HexCoord = HexCoord::new(501, 500);
const WEST: HexCoord = HexCoord::new(499, 500);

fn newcomer(id: PlayerId, leader: &str) -> NewPlayer {
    NewPlayer {
        id,
        leader_name: leader.to_string(),
        civ_name: format!("House of {}", leader),
        advisor: AdvisorProfile {
            name: "Ninsun".to_string(),
            title: "Vizier".to_string(),
            archetype: Archetype::Strategist,
            aggression: 5,
            caution: 5,
            mysticism: 3,
            verbosity: 4,
            bluntness: 6,
            speech_style: "dry".to_string(),
            catchphrase: "Every river finds the sea.".to_string(),
            favored_strategy: "hold the fords".to_string(),
            backstory: "Served three kings.".to_string(),
        },
    }
}

/// Two onboarded players, plus a revealed plains field both can see
fn setup() -> (Game, StdRng) {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut game = Game::default();
    assert!(game.onboard_player(newcomer(ALICE, "Ur-Nammu"), 0, &mut rng));
    assert!(game.onboard_player(newcomer(BOB, "Lugal"), 0, &mut rng));

    for hex in hexes_in_radius(FIELD, 4) {
        let tile = game.store_mut().tile_mut(hex);
        tile.terrain = Terrain::Plains;
        tile.base_yield = Terrain::Plains.base_yield();
        tile.deposit = None;
        tile.discover(ALICE);
        tile.discover(BOB);
    }
    (game, rng)
}

fn order(player: PlayerId, unit: UnitId, kind: ActionKind, target: HexCoord) -> ActionRequest {
    ActionRequest::unit_action(player, unit, kind, target)
}

fn tick_kinds(game: &Game, tick: u64) -> Vec<EventKind> {
    game.store().events_in_tick(tick).iter().map(|e| e.kind).collect()
}

fn resolved(outcome: TickOutcome) -> TickSummary {
    match outcome {
        TickOutcome::Resolved(summary) => summary,
        other => panic!("expected a resolved tick, got {:?}", other),
    }
}

#[test]
fn test_priority_overrides_submission_order() {
    let (mut game, mut rng) = setup();
    let spear = game.spawn_unit(ALICE, UnitKind::Spearman, FIELD, &mut rng).unwrap();
    game.spawn_unit(BOB, UnitKind::Scout, EAST, &mut rng).unwrap();

    game.submit_action(order(ALICE, spear, ActionKind::Attack, EAST), 10).unwrap();
    game.submit_action(order(ALICE, spear, ActionKind::Move, WEST), 11).unwrap();
    game.submit_action(order(ALICE, spear, ActionKind::Defend, FIELD), 12).unwrap();
    assert_eq!(game.player(ALICE).unwrap().action_points, 6);

    let summary = resolved(game.resolve_tick(100).unwrap());
    assert_eq!(summary.actions_processed, 3);
    assert_eq!(
        tick_kinds(&game, 1),
        vec![EventKind::Fortify, EventKind::Move, EventKind::Attack]
    );
}

#[test]
fn test_equal_priority_keeps_submission_order() {
    let (mut game, mut rng) = setup();
    let a = game.spawn_unit(ALICE, UnitKind::Spearman, FIELD, &mut rng).unwrap();
    let b = game.spawn_unit(ALICE, UnitKind::Archer, FIELD, &mut rng).unwrap();

    game.submit_action(order(ALICE, b, ActionKind::Move, EAST), 10).unwrap();
    game.submit_action(order(ALICE, a, ActionKind::Move, WEST), 11).unwrap();
    game.resolve_tick(100).unwrap();

    let destinations: Vec<HexCoord> = game.store().events_in_tick(1).iter().map(|e| e.at).collect();
    assert_eq!(destinations, vec![EAST, WEST]);
    assert_eq!(game.store().unit(a).unwrap().position, WEST);
    assert_eq!(game.store().unit(b).unwrap().position, EAST);
}

#[test]
fn test_submit_then_cancel_restores_budget() {
    let (mut game, mut rng) = setup();
    let builder = game.spawn_unit(ALICE, UnitKind::Builder, FIELD, &mut rng).unwrap();
    game.store_mut().player_mut(ALICE).unwrap().action_points = 6;

    let id = game
        .submit_action(order(ALICE, builder, ActionKind::Found, FIELD), 10)
        .unwrap();
    assert_eq!(game.player(ALICE).unwrap().action_points, 3);
    assert_eq!(game.queued_actions(ALICE).len(), 1);

    game.cancel_action(id, ALICE).unwrap();
    assert_eq!(game.player(ALICE).unwrap().action_points, 6);
    assert!(game.queued_actions(ALICE).is_empty());

    // Cancelled actions never resolve
    let summary = resolved(game.resolve_tick(100).unwrap());
    assert_eq!(summary.actions_processed, 0);
    assert_eq!(game.tile(FIELD).owner, None);
}

#[test]
fn test_budget_is_enforced() {
    let (mut game, mut rng) = setup();
    let builder = game.spawn_unit(ALICE, UnitKind::Builder, FIELD, &mut rng).unwrap();

    for _ in 0..3 {
        game.submit_action(order(ALICE, builder, ActionKind::Found, FIELD), 10)
            .unwrap();
    }
    assert_eq!(
        game.submit_action(order(ALICE, builder, ActionKind::Found, FIELD), 10),
        Err(QueueError::InsufficientBudget { needed: 3, available: 1 })
    );

    game.refresh_action_points(20);
    assert_eq!(game.player(ALICE).unwrap().action_points, 10);
}

#[test]
fn test_duplicate_trigger_applies_nothing() {
    let (mut game, mut rng) = setup();
    let spear = game.spawn_unit(ALICE, UnitKind::Spearman, FIELD, &mut rng).unwrap();
    let scout = game.spawn_unit(BOB, UnitKind::Scout, EAST, &mut rng).unwrap();
    game.store_mut().tile_mut(FIELD).owner = Some(ALICE);

    game.submit_action(order(ALICE, spear, ActionKind::Attack, EAST), 10).unwrap();

    let first = game.resolve_tick_number(1, 100).unwrap();
    assert!(matches!(first, TickOutcome::Resolved(_)));
    let grain = game.player(ALICE).unwrap().resources.grain;
    let hp = game.store().unit(scout).unwrap().hp;
    assert_eq!(grain, 12);
    // Spearman atk 3 vs scout def 1
    assert_eq!(hp, 10);

    assert_eq!(
        game.resolve_tick_number(1, 101),
        Ok(TickOutcome::AlreadyResolved { requested: 1, last: 1 })
    );
    assert_eq!(game.player(ALICE).unwrap().resources.grain, grain);
    assert_eq!(game.store().unit(scout).unwrap().hp, hp);
    assert_eq!(game.store().ticks().len(), 1);
    assert_eq!(game.store().recent_world_events(10).len(), 1);
}

#[test]
fn test_tick_gap_is_rejected() {
    let (mut game, _) = setup();
    assert_eq!(
        game.resolve_tick_number(2, 100),
        Err(TickError::TickGap { expected: 1, requested: 2 })
    );
    assert_eq!(game.next_tick_number(), 1);
}

#[test]
fn test_kill_makes_advisors_react() {
    let (mut game, mut rng) = setup();
    let siege = game.spawn_unit(ALICE, UnitKind::Siege, FIELD, &mut rng).unwrap();
    let victim = game.spawn_unit(BOB, UnitKind::Builder, EAST, &mut rng).unwrap();
    // Siege deals 6 to a builder
    game.store_mut().unit_mut(victim).unwrap().hp = 5;

    game.submit_action(order(ALICE, siege, ActionKind::Attack, EAST), 10).unwrap();
    let summary = resolved(game.resolve_tick(100).unwrap());

    assert!(!game.store().unit(victim).unwrap().is_alive());
    assert_eq!(game.recent_events(ALICE, 1)[0].outcome, Outcome::DefenderKilled);
    assert_eq!(game.advisor(ALICE).unwrap().mood, Mood::Triumphant);
    assert_eq!(game.advisor(BOB).unwrap().mood, Mood::Mourning);
    assert_eq!(summary.mood_changes.len(), 2);

    // Dead units drop out of live queries but stay in history
    assert!(game.units(UnitFilter::at(EAST)).is_empty());
    assert_eq!(game.units(UnitFilter::at(EAST).including_dead()).len(), 1);
}

#[test]
fn test_unit_killed_earlier_in_tick_is_skipped() {
    let (mut game, mut rng) = setup();
    let siege = game.spawn_unit(ALICE, UnitKind::Siege, FIELD, &mut rng).unwrap();
    let victim = game.spawn_unit(BOB, UnitKind::Builder, EAST, &mut rng).unwrap();
    // Siege deals 6 to a builder
    game.store_mut().unit_mut(victim).unwrap().hp = 5;

    // Resolves after attacks
    let late = ActionRequest {
        kind: ActionKind::Unknown,
        ..order(BOB, victim, ActionKind::Scout, EAST)
    };
    let late = game.submit_action(late, 10).unwrap();
    game.submit_action(order(ALICE, siege, ActionKind::Attack, EAST), 11).unwrap();

    let summary = resolved(game.resolve_tick(100).unwrap());
    assert_eq!(summary.actions_processed, 1);
    assert_eq!(summary.actions_skipped, 1);
    assert_eq!(game.store().action(late).unwrap().status, ActionStatus::Cancelled);
    assert_eq!(tick_kinds(&game, 1), vec![EventKind::Attack]);
}

#[test]
fn test_found_then_invest_grows_yield() {
    let (mut game, mut rng) = setup();
    let builder = game.spawn_unit(ALICE, UnitKind::Builder, FIELD, &mut rng).unwrap();
    game.store_mut().tile_mut(FIELD).deposit = Some(Deposit {
        kind: ResourceKind::Gold,
        amount: 3,
    });

    game.submit_action(order(ALICE, builder, ActionKind::Found, FIELD), 10).unwrap();
    let summary = resolved(game.resolve_tick(100).unwrap());

    // Plains grain plus the revealed gold deposit
    let paid = summary.yields[&ALICE];
    assert_eq!((paid.grain, paid.gold), (2, 3));
    let resources = game.player(ALICE).unwrap().resources;
    assert_eq!((resources.grain, resources.gold), (12, 8));
    assert_eq!(game.territory_count(ALICE), 1);

    // Investing replaces the settlement with a farm
    game.submit_action(order(ALICE, builder, ActionKind::Invest, FIELD), 200).unwrap();
    game.resolve_tick(300).unwrap();
    assert_eq!(game.tile(FIELD).improvement, Improvement::Farm);
    assert_eq!(game.player(ALICE).unwrap().resources.grain, 12 + 4);
}

#[test]
fn test_scout_reveals_and_surveys() {
    let (mut game, mut rng) = setup();
    let scout = game.spawn_unit(ALICE, UnitKind::Scout, FIELD, &mut rng).unwrap();
    game.store_mut().tile_mut(FIELD).owner = Some(ALICE);
    game.submit_action(order(ALICE, scout, ActionKind::Scout, FIELD), 10).unwrap();
    game.resolve_tick(100).unwrap();

    let tiles = game.tiles_in_radius(FIELD, 2);
    assert_eq!(tiles.len(), 19);
    assert!(tiles.iter().all(|t| t.is_discovered_by(ALICE)));
    let home = game.tile(FIELD);
    assert!(home.is_surveyed_by(ALICE));
    assert!(home.deposit_revealed);
}

#[test]
fn test_snapshot_keeps_tick_sequence() {
    let (mut game, mut rng) = setup();
    let spear = game.spawn_unit(ALICE, UnitKind::Spearman, FIELD, &mut rng).unwrap();
    game.submit_action(order(ALICE, spear, ActionKind::Defend, FIELD), 10).unwrap();
    game.resolve_tick(100).unwrap();

    let mut restored = Game::from_json(&game.to_json().unwrap()).unwrap();
    assert_eq!(restored.next_tick_number(), 2);
    assert!(matches!(
        restored.resolve_tick_number(1, 200),
        Ok(TickOutcome::AlreadyResolved { .. })
    ));

    let summary = resolved(restored.resolve_tick(300).unwrap());
    assert_eq!(summary.tick, 2);
    assert_eq!(restored.store().unit(spear).unwrap().status, UnitStatus::Fortified);
    assert_eq!(restored.tile(FIELD).fortified_by, Some(spear));
}

#[test]
fn test_defend_lands_before_attack_in_same_tick() {
    let (mut game, mut rng) = setup();
    let raider = game.spawn_unit(ALICE, UnitKind::Spearman, FIELD, &mut rng).unwrap();
    let guard = game.spawn_unit(BOB, UnitKind::Spearman, EAST, &mut rng).unwrap();
    game.store_mut().tile_mut(EAST).improvement = Improvement::Fortress;

    // The attack is queued first but defending outranks it
    game.submit_action(order(ALICE, raider, ActionKind::Attack, EAST), 10).unwrap();
    game.submit_action(order(BOB, guard, ActionKind::Defend, EAST), 20).unwrap();
    resolved(game.resolve_tick(1_000).unwrap());

    assert_eq!(tick_kinds(&game, 1), vec![EventKind::Fortify, EventKind::Attack]);
    // 3 attack against 3 defense, fortified and on a fortress
    assert_eq!(game.store().unit(guard).unwrap().hp, 19);
    assert_eq!(game.store().unit(raider).unwrap().hp, 16);
    assert_eq!(game.store().unit(guard).unwrap().status, UnitStatus::Fortified);
    assert_eq!(game.store().events_in_tick(1)[1].outcome, Outcome::DamageDealt);
}
