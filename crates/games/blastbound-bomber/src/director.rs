//! Arena-triggered encounter handling: difficulty tiers and roster edits.
//!
//! Event names are free text authored on the arena side; they bind to
//! gameplay by keyword. An unmatched name still produces a notification
//! so viewers see their trigger acknowledged.

use rand::Rng;
use rand::rngs::StdRng;

use blastbound_core::events::EncounterEvent;
use blastbound_core::grid::{GridOccupancyQuery, GridPos, TileMap};

use crate::enemy::Enemy;
use crate::notify::{Notification, NotificationKind};

/// Difficulty tier for the live enemy roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyTier {
    Easy,
    #[default]
    Normal,
    Hard,
    Extreme,
}

impl DifficultyTier {
    pub fn speed_multiplier(self) -> f64 {
        match self {
            Self::Easy => 0.7,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
            Self::Extreme => 2.0,
        }
    }

    pub fn count_multiplier(self) -> f64 {
        match self {
            Self::Easy => 0.5,
            Self::Normal => 1.0,
            Self::Hard => 1.5,
            Self::Extreme => 2.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "EASY MODE",
            Self::Normal => "NORMAL MODE",
            Self::Hard => "HARD MODE",
            Self::Extreme => "EXTREME MODE",
        }
    }
}

const SPAWN_BATCH: usize = 2;
const REMOVE_BATCH: usize = 2;
const SPAWN_ATTEMPTS: u32 = 100;

/// Result of applying one encounter event.
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterOutcome {
    pub notification: Notification,
    /// Set when the event was flagged terminal; the orchestrator
    /// schedules the match end.
    pub final_event: bool,
}

/// Keyword-driven difficulty and roster controller.
#[derive(Debug, Default)]
pub struct EncounterDirector {
    tier: DifficultyTier,
}

impl EncounterDirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    /// Apply one arena event to the roster. Keyword ladder over the
    /// lowercased name, first match wins; no match changes nothing but
    /// still notifies.
    pub fn apply_event(
        &mut self,
        event: &EncounterEvent,
        roster: &mut Vec<Enemy>,
        map: &TileMap,
        occupancy: &dyn GridOccupancyQuery,
        rng: &mut StdRng,
        now_ms: u64,
    ) -> EncounterOutcome {
        let name = event.event_name.to_lowercase();
        tracing::info!(event = %event.event_name, is_final = event.is_final, "Encounter triggered");

        let text = if name.contains("easy") || name.contains("slow") {
            self.set_tier(DifficultyTier::Easy, roster, map, occupancy, rng, now_ms);
            DifficultyTier::Easy.label().to_string()
        } else if name.contains("hard") || name.contains("fast") {
            self.set_tier(DifficultyTier::Hard, roster, map, occupancy, rng, now_ms);
            DifficultyTier::Hard.label().to_string()
        } else if name.contains("extreme") || name.contains("chaos") {
            self.set_tier(DifficultyTier::Extreme, roster, map, occupancy, rng, now_ms);
            DifficultyTier::Extreme.label().to_string()
        } else if name.contains("spawn") || name.contains("add") {
            let added = self.spawn_enemies(SPAWN_BATCH, roster, map, occupancy, rng, now_ms);
            format!("{added} ENEMIES JOIN THE FIGHT")
        } else if name.contains("remove") || name.contains("clear") {
            let removed = remove_random_enemies(roster, REMOVE_BATCH, rng);
            format!("{removed} ENEMIES RETREAT")
        } else if name.contains("reset") {
            self.set_tier(DifficultyTier::Normal, roster, map, occupancy, rng, now_ms);
            DifficultyTier::Normal.label().to_string()
        } else {
            event.event_name.to_uppercase()
        };

        EncounterOutcome {
            notification: Notification::new(NotificationKind::Encounter, 0xFF4444, text),
            final_event: event.is_final,
        }
    }

    /// Move to `tier`: rescale every live enemy's patrol interval and
    /// reconcile the roster toward the tier's count factor. Repeated
    /// tier swings drift the roster size; that is accepted behavior.
    pub fn set_tier(
        &mut self,
        tier: DifficultyTier,
        roster: &mut Vec<Enemy>,
        map: &TileMap,
        occupancy: &dyn GridOccupancyQuery,
        rng: &mut StdRng,
        now_ms: u64,
    ) {
        self.tier = tier;
        for enemy in roster.iter_mut() {
            enemy.set_speed_multiplier(tier.speed_multiplier());
        }
        let target = (roster.len() as f64 * tier.count_multiplier()) as usize;
        if target > roster.len() {
            let added = self.spawn_enemies(
                target - roster.len(),
                roster,
                map,
                occupancy,
                rng,
                now_ms,
            );
            tracing::debug!(tier = tier.label(), added, "Roster grown for tier");
        } else if target < roster.len() {
            remove_random_enemies(roster, roster.len() - target, rng);
        }
    }

    fn spawn_enemies(
        &self,
        count: usize,
        roster: &mut Vec<Enemy>,
        map: &TileMap,
        occupancy: &dyn GridOccupancyQuery,
        rng: &mut StdRng,
        now_ms: u64,
    ) -> usize {
        for _ in 0..count {
            let pos = find_spawn_cell(map, occupancy, roster, rng);
            let mut enemy = Enemy::at(pos, rng, now_ms);
            enemy.set_speed_multiplier(self.tier.speed_multiplier());
            roster.push(enemy);
        }
        count
    }

    /// Drop back to Normal pacing on teardown. Only speeds are reset;
    /// director-spawned enemies stay with the level state.
    pub fn destroy(&mut self, roster: &mut [Enemy]) {
        self.tier = DifficultyTier::Normal;
        for enemy in roster.iter_mut() {
            enemy.set_speed_multiplier(1.0);
        }
    }
}

/// Despawn `count` enemies chosen uniformly from the roster.
fn remove_random_enemies(roster: &mut Vec<Enemy>, count: usize, rng: &mut StdRng) -> usize {
    let count = count.min(roster.len());
    for _ in 0..count {
        let idx = rng.random_range(0..roster.len());
        roster.swap_remove(idx);
    }
    count
}

fn find_spawn_cell(
    map: &TileMap,
    occupancy: &dyn GridOccupancyQuery,
    roster: &[Enemy],
    rng: &mut StdRng,
) -> GridPos {
    for _ in 0..SPAWN_ATTEMPTS {
        let pos = GridPos::new(
            rng.random_range(1..map.width().max(2) - 1),
            rng.random_range(1..map.height().max(2) - 1),
        );
        if map.get(pos).is_walkable()
            && occupancy.is_open(pos)
            && !roster.iter().any(|e| e.pos == pos)
        {
            return pos;
        }
    }
    map.center()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blastbound_core::test_helpers::{make_encounter, open_level};
    use rand::SeedableRng;

    struct AllOpen;
    impl GridOccupancyQuery for AllOpen {
        fn is_open(&self, _pos: GridPos) -> bool {
            true
        }
    }

    fn roster_of(n: usize) -> Vec<Enemy> {
        let mut rng = StdRng::seed_from_u64(9);
        (0..n)
            .map(|i| Enemy::at(GridPos::new(1 + i as i32, 1), &mut rng, 0))
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn hard_keyword_raises_tier_and_speeds() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(2);
        let outcome = director.apply_event(
            &make_encounter("Hard Mode Activated", false),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert_eq!(director.tier(), DifficultyTier::Hard);
        assert_eq!(outcome.notification.text, "HARD MODE");
        assert!(roster.iter().all(|e| e.move_interval_ms == 666));
        assert_eq!(roster.len(), 3, "2 × 1.5 floors to 3");
    }

    #[test]
    fn chaos_keyword_maxes_the_tier() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(2);
        director.apply_event(
            &make_encounter("Total Chaos", false),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert_eq!(director.tier(), DifficultyTier::Extreme);
        assert_eq!(roster.len(), 5, "2 × 2.5 = 5");
    }

    #[test]
    fn hard_outranks_chaos_when_a_name_carries_both() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(2);
        director.apply_event(
            &make_encounter("Hard Chaos", false),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert_eq!(director.tier(), DifficultyTier::Hard, "hard rung sits before extreme");
    }

    #[test]
    fn removal_picks_random_enemies_not_the_tail() {
        let level = open_level();
        let mut survivor_sets = std::collections::HashSet::new();
        for seed in 0..20 {
            let mut director = EncounterDirector::new();
            let mut roster = roster_of(4);
            let mut r = StdRng::seed_from_u64(seed);
            director.apply_event(
                &make_encounter("Clear two", false),
                &mut roster,
                &level.tiles,
                &AllOpen,
                &mut r,
                0,
            );
            assert_eq!(roster.len(), 2);
            let mut survivors: Vec<i32> = roster.iter().map(|e| e.pos.x).collect();
            survivors.sort_unstable();
            survivor_sets.insert(survivors);
        }
        assert!(
            survivor_sets.len() > 1,
            "which enemies retreat must vary with the rng"
        );
    }

    #[test]
    fn easy_keyword_shrinks_roster() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(4);
        director.apply_event(
            &make_encounter("Take it slow", false),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert_eq!(director.tier(), DifficultyTier::Easy);
        assert_eq!(roster.len(), 2, "4 × 0.5 = 2");
        assert!(roster.iter().all(|e| e.move_interval_ms == 1_428));
    }

    #[test]
    fn spawn_and_remove_keywords_edit_roster() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(3);
        director.apply_event(
            &make_encounter("Spawn Wave", false),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert_eq!(roster.len(), 5);
        director.apply_event(
            &make_encounter("Clear the field", false),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn unmatched_name_notifies_without_changes() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(2);
        let outcome = director.apply_event(
            &make_encounter("Lights Out", false),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert_eq!(director.tier(), DifficultyTier::Normal);
        assert_eq!(roster.len(), 2);
        assert_eq!(outcome.notification.text, "LIGHTS OUT");
        assert!(!outcome.final_event);
    }

    #[test]
    fn final_flag_signals_terminal() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(1);
        let outcome = director.apply_event(
            &make_encounter("Final Showdown", true),
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        assert!(outcome.final_event);
    }

    #[test]
    fn tier_oscillation_drifts_roster_size() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(5);
        let mut r = rng();
        director.set_tier(DifficultyTier::Easy, &mut roster, &level.tiles, &AllOpen, &mut r, 0);
        assert_eq!(roster.len(), 2);
        director.set_tier(DifficultyTier::Normal, &mut roster, &level.tiles, &AllOpen, &mut r, 0);
        assert_eq!(roster.len(), 2, "the round down does not round back up");
    }

    #[test]
    fn destroy_resets_speeds_but_keeps_roster() {
        let level = open_level();
        let mut director = EncounterDirector::new();
        let mut roster = roster_of(2);
        director.set_tier(
            DifficultyTier::Extreme,
            &mut roster,
            &level.tiles,
            &AllOpen,
            &mut rng(),
            0,
        );
        let grown = roster.len();
        director.destroy(&mut roster);
        assert_eq!(director.tier(), DifficultyTier::Normal);
        assert_eq!(roster.len(), grown);
        assert!(roster.iter().all(|e| e.move_interval_ms == 1_000));
    }
}
