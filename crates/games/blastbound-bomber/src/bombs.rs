use uuid::Uuid;

use blastbound_core::grid::{GridPos, TileMap};

pub const FUSE_MS: u64 = 3_000;

/// A planted bomb waiting on its fuse.
#[derive(Debug, Clone)]
pub struct Bomb {
    pub id: Uuid,
    pub pos: GridPos,
    pub planted_ms: u64,
    pub radius: u32,
}

/// The cells one detonation touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explosion {
    pub origin: GridPos,
    pub cells: Vec<GridPos>,
    pub destroyed_crates: Vec<GridPos>,
}

/// Walk the four axes from `origin` up to `radius` cells. Walls and
/// borders stop a ray outright; the first crate hit is destroyed and
/// also stops the ray.
pub fn compute_blast(
    origin: GridPos,
    radius: u32,
    map: &TileMap,
    crates: &[GridPos],
) -> Explosion {
    let mut cells = vec![origin];
    let mut destroyed = Vec::new();
    for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
        for step in 1..=radius as i32 {
            let pos = origin.offset(dx * step, dy * step);
            if !map.get(pos).is_walkable() {
                break;
            }
            cells.push(pos);
            if crates.contains(&pos) {
                destroyed.push(pos);
                break;
            }
        }
    }
    Explosion {
        origin,
        cells,
        destroyed_crates: destroyed,
    }
}

/// Live bombs for the current level.
#[derive(Debug, Default)]
pub struct BombStore {
    live: Vec<Bomb>,
}

impl BombStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plant(&mut self, pos: GridPos, radius: u32, now_ms: u64) -> Uuid {
        let bomb = Bomb {
            id: Uuid::new_v4(),
            pos,
            planted_ms: now_ms,
            radius,
        };
        let id = bomb.id;
        self.live.push(bomb);
        id
    }

    pub fn count(&self) -> usize {
        self.live.len()
    }

    pub fn occupies(&self, pos: GridPos) -> bool {
        self.live.iter().any(|b| b.pos == pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.live.iter().map(|b| b.pos)
    }

    /// Detonate every bomb whose fuse ran out.
    pub fn update(&mut self, now_ms: u64, map: &TileMap, crates: &[GridPos]) -> Vec<Explosion> {
        let mut explosions = Vec::new();
        let mut i = 0;
        while i < self.live.len() {
            if now_ms.saturating_sub(self.live[i].planted_ms) >= FUSE_MS {
                let bomb = self.live.remove(i);
                explosions.push(compute_blast(bomb.pos, bomb.radius, map, crates));
            } else {
                i += 1;
            }
        }
        explosions
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}
