//! End-to-end match scenarios: arena events flowing through the
//! orchestrator into effects, pickups, encounters, and match outcomes.

use tokio::sync::mpsc;

use blastbound_bomber::config::MatchConfig;
use blastbound_bomber::director::DifficultyTier;
use blastbound_bomber::effects::EffectCategory;
use blastbound_bomber::{MatchOutcome, MatchPhase, SessionOrchestrator};
use blastbound_core::events::ArenaEvent;
use blastbound_core::grid::GridPos;
use blastbound_core::level::LevelSpec;
use blastbound_core::test_helpers::{
    make_boost, make_drop, make_encounter, make_session, open_level,
};

fn arena_match(
    levels: Vec<LevelSpec>,
) -> (SessionOrchestrator, mpsc::UnboundedSender<ArenaEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let config = MatchConfig {
        rng_seed: Some(7),
        ..MatchConfig::default()
    };
    let m = SessionOrchestrator::new(levels, config)
        .unwrap()
        .with_arena(make_session(), rx);
    (m, tx)
}

fn walk(m: &mut SessionOrchestrator, steps: &[(i32, i32)], start_ms: u64) -> u64 {
    let mut now = start_ms;
    for &(dx, dy) in steps {
        now += 300;
        assert!(m.move_player(dx, dy, now), "blocked step ({dx},{dy}) at {now}");
    }
    now
}

#[test]
fn boost_applies_then_expires_exactly_once() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::Boost(make_boost(600))).unwrap();
    m.tick(100);

    let effects = m.active_effects(100);
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].category, EffectCategory::Area);

    m.tick(15_050);
    assert_eq!(m.active_effects(15_050).len(), 1, "14.95s in, still live");

    m.tick(15_100);
    assert!(m.active_effects(15_100).is_empty(), "15s duration elapsed");
    let notes = m.drain_notifications();
    assert!(
        notes.iter().any(|n| n.text.contains("BIGGER BLASTS expired")),
        "expiry is announced once"
    );

    m.tick(15_200);
    assert!(
        !m.drain_notifications()
            .iter()
            .any(|n| n.text.contains("expired")),
        "no second revert"
    );
}

#[test]
fn repeat_boost_replaces_same_category() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::Boost(make_boost(10))).unwrap();
    m.tick(0);
    tx.send(ArenaEvent::Boost(make_boost(30))).unwrap();
    m.tick(5_000);

    let effects = m.active_effects(5_000);
    assert_eq!(effects.len(), 1, "same category replaces, never stacks");
    assert_eq!(
        effects[0].remaining_ms, 10_000,
        "replacement restarts its full duration"
    );
}

#[test]
fn invulnerability_shrugs_off_a_blast_and_reverts() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::Boost(make_boost(5_000))).unwrap();
    m.tick(100);
    assert_eq!(m.player_visual().tint, Some(0xFFFF00));
    assert!(m.player_visual().pulsing);

    // stand on the bomb and let it go off
    assert!(m.place_bomb(200));
    m.tick(3_300);
    assert!(m.player().alive, "blast ignored while invulnerable");
    assert_eq!(m.phase(), MatchPhase::Running);

    m.tick(10_100);
    assert_eq!(m.player_visual().tint, None, "tint cleared on expiry");
    assert!(!m.player_visual().pulsing);
}

#[test]
fn first_unprotected_hit_downs_the_player() {
    let (mut m, _tx) = arena_match(vec![open_level()]);
    m.start(0);
    // stand on the bomb with no protection active
    assert!(m.place_bomb(200));
    m.tick(3_300);
    assert_eq!(m.phase(), MatchPhase::PlayerDown, "one hit is terminal");
    assert!(!m.player().alive);
    m.tick(4_900);
    assert_eq!(m.phase(), MatchPhase::Ended);
    assert!(matches!(m.outcome(), Some(MatchOutcome::Defeat { .. })));
}

#[test]
fn dropped_item_spawns_on_the_spiral_and_collects_on_contact() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::ItemDrop(make_drop("Gold Coin", 100, Some(40))))
        .unwrap();
    m.tick(100);

    let pickups = m.active_pickups();
    assert_eq!(pickups.len(), 1);
    // from (1,1) the first spiral offsets land on the border; (2,0) is
    // the first open slot
    assert_eq!(pickups[0].pos, GridPos::new(3, 1));

    walk(&mut m, &[(1, 0), (1, 0)], 200);
    assert!(m.active_pickups().is_empty(), "collected on arrival");
    assert_eq!(m.player().score, 40, "coin value credited");
    assert!(
        m.drain_notifications()
            .iter()
            .any(|n| n.text.contains("Gold Coin")),
        "collection is announced"
    );
}

#[test]
fn speed_pickup_feeds_the_effect_ledger() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::ItemDrop(make_drop("Speed Boots", 50, None)))
        .unwrap();
    m.tick(100);
    walk(&mut m, &[(1, 0), (1, 0)], 200);

    let effects = m.active_effects(1_000);
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].category, EffectCategory::Velocity);
}

#[test]
fn uncollected_pickup_expires_silently() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::ItemDrop(make_drop("Gold Coin", 100, Some(40))))
        .unwrap();
    m.tick(100);
    assert_eq!(m.active_pickups().len(), 1);

    m.tick(30_200);
    assert!(m.active_pickups().is_empty(), "30s TTL elapsed");
    assert_eq!(m.player().score, 0, "expiry grants nothing");
}

#[test]
fn encounter_keywords_retune_the_roster() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    assert_eq!(m.difficulty(), DifficultyTier::Normal);

    tx.send(ArenaEvent::Encounter(make_encounter("Hard Mode", false)))
        .unwrap();
    m.tick(100);
    assert_eq!(m.difficulty(), DifficultyTier::Hard);

    tx.send(ArenaEvent::Encounter(make_encounter("Spawn Wave", false)))
        .unwrap();
    m.tick(200);
    assert_eq!(m.enemy_count(), 3, "wave adds two enemies");
}

#[test]
fn final_event_ends_the_match_in_victory() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::Encounter(make_encounter("Final Showdown", true)))
        .unwrap();
    m.tick(100);
    assert_eq!(m.phase(), MatchPhase::FinalEvent);

    m.tick(3_050);
    assert_eq!(m.phase(), MatchPhase::FinalEvent, "dramatic pause holds");
    m.tick(3_100);
    assert_eq!(m.phase(), MatchPhase::Ended);
    assert!(matches!(m.outcome(), Some(MatchOutcome::Victory { .. })));
}

#[test]
fn arena_side_termination_aborts_the_match() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::MatchEnds).unwrap();
    m.tick(100);
    assert_eq!(m.phase(), MatchPhase::Ended);
    assert!(matches!(m.outcome(), Some(MatchOutcome::Aborted { .. })));
}

#[test]
fn match_clock_carries_across_level_transitions() {
    let (mut m, _tx) = arena_match(vec![open_level(), open_level()]);
    m.start(0);

    // clear the single crate at (5,5): bomb from (5,4), then retreat
    let now = walk(
        &mut m,
        &[(1, 0), (1, 0), (1, 0), (1, 0), (0, 1), (0, 1), (0, 1)],
        0,
    );
    assert_eq!(m.player().pos, GridPos::new(5, 4));
    assert!(m.place_bomb(now));
    let now = walk(&mut m, &[(0, -1), (-1, 0), (-1, 0)], now);

    m.tick(now + 3_000);
    assert!(m.crates().is_empty());
    assert_eq!(m.phase(), MatchPhase::LevelComplete);

    m.tick(now + 5_100);
    assert_eq!(m.phase(), MatchPhase::Running, "advanced to level two");
    assert_eq!(m.player().pos, GridPos::new(1, 1), "scene state reset");
    assert_eq!(m.crates().len(), 1);
    assert_eq!(
        m.remaining_ms(now + 5_100),
        120_000 - (now + 5_100),
        "one clock spans the whole match"
    );
}

#[test]
fn connection_transitions_surface_as_notifications() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.start(0);
    tx.send(ArenaEvent::ConnectionChanged { connected: true })
        .unwrap();
    m.tick(100);
    assert!(m.is_connected());

    tx.send(ArenaEvent::ConnectionChanged { connected: false })
        .unwrap();
    m.tick(200);
    assert!(!m.is_connected());
    assert_eq!(m.phase(), MatchPhase::Running, "disconnect is not fatal");
    let notes = m.drain_notifications();
    assert!(notes.iter().any(|n| n.text == "ARENA CONNECTED"));
    assert!(notes.iter().any(|n| n.text == "ARENA CONNECTION LOST"));
}

#[test]
fn arena_failure_falls_back_to_standalone() {
    let (mut m, tx) = arena_match(vec![open_level()]);
    m.fall_back_to_standalone("init failed");
    m.start(0);
    assert!(!m.arena_mode());

    // late events go nowhere; the match itself keeps running
    let _ = tx.send(ArenaEvent::Boost(make_boost(600)));
    m.tick(100);
    assert!(m.active_effects(100).is_empty());
    assert_eq!(m.phase(), MatchPhase::Running);
    assert!(
        m.drain_notifications()
            .iter()
            .any(|n| n.text == "STANDALONE MODE")
    );
}
