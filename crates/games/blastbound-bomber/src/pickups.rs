//! Viewer-purchased item drops on the grid.
//!
//! Items classify by name keywords at spawn time; a Mystery pickup only
//! commits to a concrete effect at the moment it is collected.

use rand::Rng;
use rand::rngs::StdRng;
use uuid::Uuid;

use blastbound_core::events::ItemDropEvent;
use blastbound_core::grid::{GridOccupancyQuery, GridPos, TileMap};

/// What a dropped item does when walked over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Health,
    BombPower,
    Speed,
    Shield,
    Score,
    Mystery,
}

impl PickupKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::BombPower => "Bomb Power",
            Self::Speed => "Speed",
            Self::Shield => "Shield",
            Self::Score => "Score",
            Self::Mystery => "Mystery",
        }
    }
}

/// Keyword ladder over the lowercased item name. First match wins;
/// anything unrecognized is a Mystery.
pub fn classify_item(name: &str) -> PickupKind {
    let name = name.to_lowercase();
    if name.contains("health") || name.contains("heal") {
        PickupKind::Health
    } else if name.contains("bomb") || name.contains("power") {
        PickupKind::BombPower
    } else if name.contains("speed") || name.contains("fast") {
        PickupKind::Speed
    } else if name.contains("shield") || name.contains("protect") {
        PickupKind::Shield
    } else if name.contains("coin") || name.contains("score") {
        PickupKind::Score
    } else {
        PickupKind::Mystery
    }
}

/// Magnitude of a pickup: the item's first stat value, or a floor-1
/// fraction of its cost when no stats came over the wire.
pub fn item_value(drop: &ItemDropEvent) -> u32 {
    drop.effects
        .stats
        .first()
        .map(|s| s.current_value)
        .unwrap_or_else(|| (drop.cost / 10).max(1))
}

/// One live pickup on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub id: Uuid,
    pub kind: PickupKind,
    pub pos: GridPos,
    pub item_name: String,
    pub purchaser: String,
    pub value: u32,
    pub spawned_ms: u64,
}

/// Gameplay instruction produced by collecting a pickup, applied by the
/// orchestrator. Boost amounts ride the same ladder viewer boosts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupEffect {
    /// Announced with its value; no simulation effect.
    Heal(u32),
    Boost(u32),
    Score(u32),
}

/// A collection event. `kind` is the kind as spawned; a Mystery stays
/// labeled Mystery even after its effect resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub pickup_id: Uuid,
    pub kind: PickupKind,
    pub item_name: String,
    pub value: u32,
    pub purchaser: String,
    pub effect: PickupEffect,
}

const SPIRAL_OFFSETS: [(i32, i32); 8] = [
    (0, -2),
    (2, 0),
    (0, 2),
    (-2, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

const RANDOM_PLACEMENT_ATTEMPTS: u32 = 100;

// Boost amounts that land each pickup on its intended effect tier.
const SPEED_BOOST_AMOUNT: u32 = 25;
const POWER_BOOST_AMOUNT: u32 = 500;
const SHIELD_BOOST_AMOUNT: u32 = 5_000;

/// All live pickups for the current level.
#[derive(Debug)]
pub struct PickupField {
    ttl_ms: u64,
    live: Vec<Pickup>,
}

impl PickupField {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            live: Vec::new(),
        }
    }

    fn occupied(&self, pos: GridPos) -> bool {
        self.live.iter().any(|p| p.pos == pos)
    }

    fn cell_valid(&self, pos: GridPos, map: &TileMap, occupancy: &dyn GridOccupancyQuery) -> bool {
        map.get(pos).is_walkable() && occupancy.is_open(pos) && !self.occupied(pos)
    }

    /// Place a dropped item near the player: spiral ring first, then
    /// bounded random probing, then the map center no matter what.
    pub fn spawn(
        &mut self,
        drop: &ItemDropEvent,
        player_pos: GridPos,
        map: &TileMap,
        occupancy: &dyn GridOccupancyQuery,
        rng: &mut StdRng,
        now_ms: u64,
    ) -> Pickup {
        let pos = self.find_cell(player_pos, map, occupancy, rng);
        let pickup = Pickup {
            id: Uuid::new_v4(),
            kind: classify_item(&drop.item_name),
            pos,
            item_name: drop.item_name.clone(),
            purchaser: drop.purchaser_username.clone(),
            value: item_value(drop),
            spawned_ms: now_ms,
        };
        tracing::debug!(
            kind = pickup.kind.label(),
            x = pos.x,
            y = pos.y,
            "Pickup spawned"
        );
        self.live.push(pickup.clone());
        pickup
    }

    fn find_cell(
        &self,
        player_pos: GridPos,
        map: &TileMap,
        occupancy: &dyn GridOccupancyQuery,
        rng: &mut StdRng,
    ) -> GridPos {
        for (dx, dy) in SPIRAL_OFFSETS {
            let pos = player_pos.offset(dx, dy);
            if self.cell_valid(pos, map, occupancy) {
                return pos;
            }
        }
        for _ in 0..RANDOM_PLACEMENT_ATTEMPTS {
            let pos = GridPos::new(
                rng.random_range(1..map.width().max(2) - 1),
                rng.random_range(1..map.height().max(2) - 1),
            );
            if self.cell_valid(pos, map, occupancy) {
                return pos;
            }
        }
        map.center()
    }

    /// Drop expired pickups. Expiry has no gameplay effect.
    pub fn update(&mut self, now_ms: u64) {
        let ttl = self.ttl_ms;
        self.live
            .retain(|p| now_ms.saturating_sub(p.spawned_ms) < ttl);
    }

    /// Collect every pickup sharing the player's cell. A Mystery rolls
    /// its concrete effect here, uniformly over the four boost kinds.
    pub fn check_pickups(
        &mut self,
        player_pos: GridPos,
        rng: &mut StdRng,
    ) -> Vec<Collection> {
        let mut collected = Vec::new();
        let mut i = 0;
        while i < self.live.len() {
            if self.live[i].pos == player_pos {
                let pickup = self.live.remove(i);
                let effect = resolve_effect(pickup.kind, pickup.value, rng);
                collected.push(Collection {
                    pickup_id: pickup.id,
                    kind: pickup.kind,
                    item_name: pickup.item_name,
                    value: pickup.value,
                    purchaser: pickup.purchaser,
                    effect,
                });
            } else {
                i += 1;
            }
        }
        collected
    }

    pub fn active_pickups(&self) -> &[Pickup] {
        &self.live
    }

    /// Remove everything with no effects.
    pub fn destroy(&mut self) {
        self.live.clear();
    }
}

fn resolve_effect(kind: PickupKind, value: u32, rng: &mut StdRng) -> PickupEffect {
    match kind {
        PickupKind::Health => PickupEffect::Heal(value),
        PickupKind::BombPower => PickupEffect::Boost(POWER_BOOST_AMOUNT),
        PickupKind::Speed => PickupEffect::Boost(SPEED_BOOST_AMOUNT),
        PickupKind::Shield => PickupEffect::Boost(SHIELD_BOOST_AMOUNT),
        PickupKind::Score => PickupEffect::Score(value),
        PickupKind::Mystery => {
            let resolved = match rng.random_range(0..4) {
                0 => PickupKind::Health,
                1 => PickupKind::BombPower,
                2 => PickupKind::Speed,
                _ => PickupKind::Shield,
            };
            resolve_effect(resolved, value, rng)
        },
    }
}
