//! Blastbound match orchestration.
//!
//! [`SessionOrchestrator`] owns one match end to end: the level
//! simulation (player, enemies, bombs, crates), the three arena-driven
//! managers (effects, pickups, encounters), the match-wide clock, and
//! the phase machine that decides how the match ends. Everything is
//! tick-driven off a caller-supplied timestamp; nothing here reads the
//! wall clock or renders.

pub mod bombs;
pub mod clock;
pub mod config;
pub mod director;
pub mod effects;
pub mod enemy;
pub mod notify;
pub mod pickups;
pub mod player;

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedReceiver;

use blastbound_core::events::ArenaEvent;
use blastbound_core::grid::{GridOccupancyQuery, GridPos, TileMap};
use blastbound_core::level::{LevelSpec, WinCondition};
use blastbound_core::session::Session;

use crate::bombs::BombStore;
use crate::clock::MatchClock;
use crate::config::MatchConfig;
use crate::director::{DifficultyTier, EncounterDirector};
use crate::effects::{EffectLedger, EffectStatus, VisualState};
use crate::enemy::Enemy;
use crate::notify::{Notification, NotificationFeed, NotificationKind};
use crate::pickups::{Pickup, PickupEffect, PickupField};
use crate::player::PlayerState;

const CRATE_SCORE: u32 = 10;
const ENEMY_SCORE: u32 = 100;

const COLOR_BOOST: u32 = 0x00FF00;
const COLOR_PICKUP: u32 = 0xFFFFFF;
const COLOR_CONNECTION: u32 = 0x00BFFF;
const COLOR_PHASE: u32 = 0xFFD700;

/// Errors raised while assembling a match.
#[derive(Debug)]
pub enum MatchError {
    NoLevels,
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoLevels => write!(f, "a match needs at least one level"),
        }
    }
}

impl std::error::Error for MatchError {}

/// Where the match currently is. Transitional phases hold until their
/// configured dwell elapses, then resolve on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Loading,
    Running,
    LevelComplete,
    PlayerDown,
    TimeExpired,
    FinalEvent,
    Ended,
}

/// How the match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Victory { reason: String },
    Defeat { reason: String },
    /// The arena closed the session from its side.
    Aborted { reason: String },
}

/// Running totals surfaced to the results screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchMetrics {
    pub enemies_defeated: u32,
    pub crates_destroyed: u32,
    pub survival_ms: u64,
}

/// Occupancy view over a prebuilt blocked-cell set.
struct BlockedCells<'a>(&'a HashSet<GridPos>);

impl GridOccupancyQuery for BlockedCells<'_> {
    fn is_open(&self, pos: GridPos) -> bool {
        !self.0.contains(&pos)
    }
}

/// One match, from level load to the results screen.
///
/// Arena mode wires in the session plus the event receiver and builds
/// the three managers; standalone mode runs the same simulation with
/// every arena surface absent.
pub struct SessionOrchestrator {
    config: MatchConfig,
    levels: Vec<LevelSpec>,
    level_index: usize,
    phase: MatchPhase,
    phase_deadline_ms: Option<u64>,
    outcome: Option<MatchOutcome>,
    clock: Option<MatchClock>,
    rng: StdRng,

    map: TileMap,
    crates: Vec<GridPos>,
    player: PlayerState,
    enemies: Vec<Enemy>,
    bombs: BombStore,

    session: Option<Session>,
    events: Option<UnboundedReceiver<ArenaEvent>>,
    ledger: Option<EffectLedger>,
    pickups: Option<PickupField>,
    director: Option<EncounterDirector>,

    feed: NotificationFeed,
    metrics: MatchMetrics,
    last_win_poll_ms: u64,
    connected: bool,
    destroyed: bool,
}

impl SessionOrchestrator {
    /// Standalone match over the given levels.
    pub fn new(levels: Vec<LevelSpec>, config: MatchConfig) -> Result<Self, MatchError> {
        let first = levels.first().ok_or(MatchError::NoLevels)?.clone();
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            levels,
            level_index: 0,
            phase: MatchPhase::Loading,
            phase_deadline_ms: None,
            outcome: None,
            clock: None,
            rng,
            map: first.tiles.clone(),
            crates: first.crates.clone(),
            player: PlayerState::new(first.player_start),
            enemies: Vec::new(),
            bombs: BombStore::new(),
            session: None,
            events: None,
            ledger: None,
            pickups: None,
            director: None,
            feed: NotificationFeed::default(),
            metrics: MatchMetrics::default(),
            last_win_poll_ms: 0,
            connected: false,
            destroyed: false,
        })
    }

    /// Attach an arena session and its event stream, enabling the
    /// effect ledger, pickup field, and encounter director.
    pub fn with_arena(mut self, session: Session, events: UnboundedReceiver<ArenaEvent>) -> Self {
        self.session = Some(session);
        self.events = Some(events);
        self.ledger = Some(EffectLedger::new());
        self.pickups = Some(PickupField::new(self.config.pickup_ttl_ms));
        self.director = Some(EncounterDirector::new());
        self
    }

    /// Drop back to standalone after an arena failure. The match keeps
    /// going; only the arena surfaces disappear.
    pub fn fall_back_to_standalone(&mut self, reason: &str) {
        tracing::warn!(reason, "Arena unavailable, continuing standalone");
        self.session = None;
        self.events = None;
        self.ledger = None;
        self.pickups = None;
        self.director = None;
        self.connected = false;
        self.feed.push(Notification::new(
            NotificationKind::Connection,
            COLOR_CONNECTION,
            "STANDALONE MODE",
        ));
    }

    pub fn arena_mode(&self) -> bool {
        self.session.is_some()
    }

    /// Begin the match: start the clock and load the first level.
    pub fn start(&mut self, now_ms: u64) {
        if self.phase != MatchPhase::Loading {
            return;
        }
        self.clock = Some(MatchClock::new(now_ms, self.config.time_limit_ms));
        self.load_level(self.level_index, now_ms);
        self.phase = MatchPhase::Running;
        tracing::info!(levels = self.levels.len(), arena = self.arena_mode(), "Match started");
    }

    fn load_level(&mut self, index: usize, now_ms: u64) {
        let level = self.levels[index].clone();
        self.level_index = index;
        self.map = level.tiles;
        self.crates = level.crates;
        let score = self.player.score;
        self.player = PlayerState::new(level.player_start);
        self.player.score = score;
        self.enemies = level
            .enemies
            .iter()
            .map(|s| Enemy::from_spawn(s, now_ms))
            .collect();
        self.bombs.clear();
        if self.arena_mode() {
            self.ledger = Some(EffectLedger::new());
            self.pickups = Some(PickupField::new(self.config.pickup_ttl_ms));
            self.director = Some(EncounterDirector::new());
        }
        self.last_win_poll_ms = now_ms;
        self.feed.push(Notification::new(
            NotificationKind::Phase,
            COLOR_PHASE,
            format!("{} — {}", level.name, level.win_condition.description()),
        ));
    }

    /// Advance the whole match by one tick.
    pub fn tick(&mut self, now_ms: u64) {
        if self.destroyed || matches!(self.phase, MatchPhase::Loading | MatchPhase::Ended) {
            return;
        }
        self.drain_events(now_ms);
        if self.phase == MatchPhase::Running {
            self.update_bombs(now_ms);
            self.update_enemies(now_ms);
            self.update_effects(now_ms);
            self.update_pickups(now_ms);
            self.check_clock(now_ms);
            self.poll_win_condition(now_ms);
        }
        if let Some(deadline) = self.phase_deadline_ms
            && now_ms >= deadline
        {
            self.resolve_phase(now_ms);
        }
    }

    // --- input -----------------------------------------------------------

    /// Try to step the player one cell. Returns whether it moved.
    pub fn move_player(&mut self, dx: i32, dy: i32, now_ms: u64) -> bool {
        if self.phase != MatchPhase::Running {
            return false;
        }
        let target = self.player.pos.offset(dx, dy);
        if !self.map.get(target).is_walkable()
            || self.crates.contains(&target)
            || self.bombs.occupies(target)
        {
            return false;
        }
        let speed = self
            .ledger
            .as_ref()
            .map_or(1.0, EffectLedger::speed_multiplier);
        let moved = self.player.try_step(target, now_ms, speed);
        if moved {
            self.collect_pickups(now_ms);
        }
        moved
    }

    /// Plant a bomb on the player's cell if capacity and cooldown allow.
    pub fn place_bomb(&mut self, now_ms: u64) -> bool {
        if self.phase != MatchPhase::Running {
            return false;
        }
        let (max_bombs, cooldown, radius) = match self.ledger.as_ref() {
            Some(ledger) => (
                ledger.max_bombs(self.player.base_max_bombs),
                ledger.bomb_cooldown(self.player.base_bomb_cooldown_ms),
                ledger.blast_radius(self.player.base_blast_radius),
            ),
            None => (
                self.player.base_max_bombs,
                self.player.base_bomb_cooldown_ms,
                self.player.base_blast_radius,
            ),
        };
        if !self
            .player
            .can_place_bomb(self.bombs.count(), max_bombs, cooldown, now_ms)
            || self.bombs.occupies(self.player.pos)
        {
            return false;
        }
        self.bombs.plant(self.player.pos, radius, now_ms);
        self.player.note_bomb_placed(now_ms);
        true
    }

    // --- tick stages -----------------------------------------------------

    fn drain_events(&mut self, now_ms: u64) {
        let mut pending = Vec::new();
        if let Some(rx) = self.events.as_mut() {
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
        }
        for event in pending {
            self.handle_event(event, now_ms);
        }
    }

    fn handle_event(&mut self, event: ArenaEvent, now_ms: u64) {
        if self.phase == MatchPhase::Ended {
            return;
        }
        match event {
            ArenaEvent::CountdownStarted => {
                self.notify_phase("ARENA COUNTDOWN STARTED");
            },
            ArenaEvent::CountdownUpdate { seconds_remaining } => {
                self.notify_phase(format!("Starting in {seconds_remaining}..."));
            },
            ArenaEvent::MatchBegins => {
                self.notify_phase("ARENA LIVE");
            },
            ArenaEvent::MatchEnds | ArenaEvent::MatchCompleted => {
                self.end_match(
                    MatchOutcome::Aborted {
                        reason: "Arena session ended".to_string(),
                    },
                    now_ms,
                );
            },
            ArenaEvent::Boost(boost) => {
                if let Some(ledger) = self.ledger.as_mut() {
                    let activation =
                        ledger.apply_boost(&boost.booster_username, boost.boost_amount, now_ms);
                    tracing::info!(
                        booster = %boost.booster_username,
                        amount = boost.boost_amount,
                        effect = activation.category.label(),
                        "Boost applied"
                    );
                    self.feed.push(Notification::new(
                        NotificationKind::Boost,
                        COLOR_BOOST,
                        format!(
                            "{}: {}!",
                            boost.booster_username,
                            activation.category.label()
                        ),
                    ));
                }
            },
            ArenaEvent::ItemDrop(drop) => {
                let blocked = self.blocked_cells(true);
                if let Some(pickups) = self.pickups.as_mut() {
                    let pickup = pickups.spawn(
                        &drop,
                        self.player.pos,
                        &self.map,
                        &BlockedCells(&blocked),
                        &mut self.rng,
                        now_ms,
                    );
                    self.feed.push(Notification::new(
                        NotificationKind::Pickup,
                        COLOR_PICKUP,
                        format!("{} dropped {}", drop.purchaser_username, pickup.item_name),
                    ));
                }
            },
            ArenaEvent::Encounter(encounter) => {
                let blocked = self.blocked_cells(true);
                if let Some(director) = self.director.as_mut() {
                    let outcome = director.apply_event(
                        &encounter,
                        &mut self.enemies,
                        &self.map,
                        &BlockedCells(&blocked),
                        &mut self.rng,
                        now_ms,
                    );
                    self.feed.push(outcome.notification);
                    if outcome.final_event {
                        self.enter_phase(
                            MatchPhase::FinalEvent,
                            now_ms + self.config.final_event_delay_ms,
                        );
                        self.notify_phase("FINAL EVENT!");
                    }
                }
            },
            ArenaEvent::ConnectionChanged { connected } => {
                self.connected = connected;
                let text = if connected {
                    "ARENA CONNECTED"
                } else {
                    "ARENA CONNECTION LOST"
                };
                self.feed.push(Notification::new(
                    NotificationKind::Connection,
                    COLOR_CONNECTION,
                    text,
                ));
            },
        }
    }

    fn update_bombs(&mut self, now_ms: u64) {
        let explosions = self.bombs.update(now_ms, &self.map, &self.crates);
        for explosion in explosions {
            for destroyed in &explosion.destroyed_crates {
                self.crates.retain(|c| c != destroyed);
                self.metrics.crates_destroyed += 1;
                self.player.add_score(CRATE_SCORE);
            }
            let before = self.enemies.len();
            self.enemies.retain(|e| !explosion.cells.contains(&e.pos));
            let defeated = (before - self.enemies.len()) as u32;
            self.metrics.enemies_defeated += defeated;
            self.player.add_score(ENEMY_SCORE * defeated);
            if explosion.cells.contains(&self.player.pos) {
                self.hit_player(now_ms);
            }
        }
    }

    fn update_enemies(&mut self, now_ms: u64) {
        let mut blocked = self.blocked_cells(false);
        for enemy in &self.enemies {
            blocked.insert(enemy.pos);
        }
        for i in 0..self.enemies.len() {
            let own = self.enemies[i].pos;
            blocked.remove(&own);
            self.enemies[i].step(now_ms, &self.map, &BlockedCells(&blocked));
            blocked.insert(self.enemies[i].pos);
            if self.enemies[i].pos == self.player.pos {
                self.hit_player(now_ms);
            }
        }
    }

    fn update_effects(&mut self, now_ms: u64) {
        if let Some(ledger) = self.ledger.as_mut() {
            for ended in ledger.update(now_ms) {
                self.feed.push(Notification::new(
                    NotificationKind::Boost,
                    COLOR_BOOST,
                    format!("{} expired", ended.category.label()),
                ));
            }
        }
    }

    fn update_pickups(&mut self, now_ms: u64) {
        if let Some(pickups) = self.pickups.as_mut() {
            pickups.update(now_ms);
        }
        self.collect_pickups(now_ms);
    }

    fn collect_pickups(&mut self, now_ms: u64) {
        let collections = match self.pickups.as_mut() {
            Some(pickups) => pickups.check_pickups(self.player.pos, &mut self.rng),
            None => return,
        };
        for collection in collections {
            match collection.effect {
                // heal is announcement-only; the collection note below
                // is its whole payoff
                PickupEffect::Heal(_) => {},
                PickupEffect::Boost(amount) => {
                    if let Some(ledger) = self.ledger.as_mut() {
                        ledger.apply_boost(&collection.purchaser, amount, now_ms);
                    }
                },
                PickupEffect::Score(points) => self.player.add_score(points),
            }
            self.feed.push(Notification::new(
                NotificationKind::Pickup,
                COLOR_PICKUP,
                format!(
                    "{} from {}!",
                    collection.item_name, collection.purchaser
                ),
            ));
        }
    }

    fn check_clock(&mut self, now_ms: u64) {
        if let Some(clock) = self.clock
            && clock.expired(now_ms)
            && self.phase == MatchPhase::Running
        {
            self.enter_phase(
                MatchPhase::TimeExpired,
                now_ms + self.config.time_expired_delay_ms,
            );
            self.notify_phase("TIME'S UP!");
        }
    }

    fn poll_win_condition(&mut self, now_ms: u64) {
        if self.phase != MatchPhase::Running
            || now_ms.saturating_sub(self.last_win_poll_ms) < self.config.win_poll_interval_ms
        {
            return;
        }
        self.last_win_poll_ms = now_ms;
        let met = match self.levels[self.level_index].win_condition {
            WinCondition::ClearAllCrates => self.crates.is_empty(),
            WinCondition::DefeatAllEnemies => self.enemies.is_empty(),
        };
        if met {
            self.enter_phase(
                MatchPhase::LevelComplete,
                now_ms + self.config.level_complete_delay_ms,
            );
            self.notify_phase("LEVEL COMPLETE!");
        }
    }

    /// An unprotected hit is terminal: the first blast or enemy contact
    /// while not invulnerable downs the player outright.
    fn hit_player(&mut self, now_ms: u64) {
        if self
            .ledger
            .as_ref()
            .is_some_and(EffectLedger::is_invulnerable)
        {
            return;
        }
        if self.player.down() && self.phase == MatchPhase::Running {
            self.enter_phase(
                MatchPhase::PlayerDown,
                now_ms + self.config.player_down_delay_ms,
            );
            self.notify_phase("PLAYER DOWN");
        }
    }

    fn enter_phase(&mut self, phase: MatchPhase, deadline_ms: u64) {
        self.phase = phase;
        self.phase_deadline_ms = Some(deadline_ms);
    }

    fn resolve_phase(&mut self, now_ms: u64) {
        self.phase_deadline_ms = None;
        match self.phase {
            MatchPhase::LevelComplete => {
                let next = self.level_index + 1;
                if next < self.levels.len() {
                    // same clock keeps running across the transition
                    self.load_level(next, now_ms);
                    self.phase = MatchPhase::Running;
                } else {
                    self.end_match(
                        MatchOutcome::Victory {
                            reason: "All levels cleared".to_string(),
                        },
                        now_ms,
                    );
                }
            },
            MatchPhase::PlayerDown => self.end_match(
                MatchOutcome::Defeat {
                    reason: "Player down".to_string(),
                },
                now_ms,
            ),
            MatchPhase::TimeExpired => self.end_match(
                MatchOutcome::Defeat {
                    reason: "Time expired".to_string(),
                },
                now_ms,
            ),
            MatchPhase::FinalEvent => self.end_match(
                MatchOutcome::Victory {
                    reason: "Survived the final event".to_string(),
                },
                now_ms,
            ),
            _ => {},
        }
    }

    fn end_match(&mut self, outcome: MatchOutcome, now_ms: u64) {
        if self.phase == MatchPhase::Ended {
            return;
        }
        tracing::info!(outcome = ?outcome, "Match ended");
        if let Some(clock) = self.clock {
            self.metrics.survival_ms = clock.elapsed_ms(now_ms);
        }
        self.outcome = Some(outcome);
        self.phase = MatchPhase::Ended;
        self.phase_deadline_ms = None;
        self.teardown();
        self.feed.push(Notification::new(
            NotificationKind::Phase,
            COLOR_PHASE,
            "MATCH ENDED",
        ));
    }

    /// Force-teardown, for embeddings that cancel a match externally.
    pub fn destroy(&mut self) {
        self.teardown();
        self.phase = MatchPhase::Ended;
    }

    fn teardown(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(ledger) = self.ledger.as_mut() {
            ledger.destroy();
        }
        if let Some(pickups) = self.pickups.as_mut() {
            pickups.destroy();
        }
        if let Some(director) = self.director.as_mut() {
            director.destroy(&mut self.enemies);
        }
        self.events = None;
    }

    /// Cells blocked for spawning or walking: crates, bombs, and
    /// optionally the player's own cell.
    fn blocked_cells(&self, include_player: bool) -> HashSet<GridPos> {
        let mut blocked: HashSet<GridPos> = self.crates.iter().copied().collect();
        blocked.extend(self.bombs.positions());
        if include_player {
            blocked.insert(self.player.pos);
        }
        blocked
    }

    fn notify_phase(&mut self, text: impl Into<String>) {
        self.feed
            .push(Notification::new(NotificationKind::Phase, COLOR_PHASE, text));
    }

    // --- queries ---------------------------------------------------------

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn metrics(&self) -> &MatchMetrics {
        &self.metrics
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn crates(&self) -> &[GridPos] {
        &self.crates
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn difficulty(&self) -> DifficultyTier {
        self.director
            .as_ref()
            .map_or(DifficultyTier::Normal, EncounterDirector::tier)
    }

    pub fn active_effects(&self, now_ms: u64) -> Vec<EffectStatus> {
        self.ledger
            .as_ref()
            .map_or_else(Vec::new, |l| l.active_effects(now_ms))
    }

    pub fn active_pickups(&self) -> &[Pickup] {
        self.pickups
            .as_ref()
            .map_or(&[], PickupField::active_pickups)
    }

    pub fn player_visual(&self) -> VisualState {
        self.ledger
            .as_ref()
            .map_or_else(VisualState::default, |l| l.visual().clone())
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.clock.map_or(0, |c| c.elapsed_ms(now_ms))
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.clock
            .map_or(self.config.time_limit_ms, |c| c.remaining_ms(now_ms))
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Take everything pending on the notification feed.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.feed.drain()
    }
}
