use rand::Rng;
use rand::rngs::StdRng;
use uuid::Uuid;

use blastbound_core::grid::{GridOccupancyQuery, GridPos, TileMap};
use blastbound_core::level::{EnemyAxis, EnemySpawn};

pub const BASE_MOVE_INTERVAL_MS: u64 = 1_000;
pub const MIN_MOVE_INTERVAL_MS: u64 = 200;

/// A patrolling enemy. Walks its axis one cell per interval, reversing
/// when the next cell is blocked.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: Uuid,
    pub pos: GridPos,
    pub axis: EnemyAxis,
    pub move_interval_ms: u64,
    dir: i32,
    last_move_ms: u64,
}

impl Enemy {
    pub fn from_spawn(spawn: &EnemySpawn, now_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            pos: spawn.pos,
            axis: spawn.axis,
            move_interval_ms: BASE_MOVE_INTERVAL_MS,
            dir: 1,
            last_move_ms: now_ms,
        }
    }

    /// Random placement used for director-spawned reinforcements.
    pub fn at(pos: GridPos, rng: &mut StdRng, now_ms: u64) -> Self {
        let axis = if rng.random_range(0..2) == 0 {
            EnemyAxis::Horizontal
        } else {
            EnemyAxis::Vertical
        };
        Self {
            id: Uuid::new_v4(),
            pos,
            axis,
            move_interval_ms: BASE_MOVE_INTERVAL_MS,
            dir: 1,
            last_move_ms: now_ms,
        }
    }

    /// Rescale the patrol interval for a difficulty speed factor,
    /// clamped so extreme tiers never go sub-200 ms.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        let scaled = (BASE_MOVE_INTERVAL_MS as f64 / multiplier) as u64;
        self.move_interval_ms = scaled.max(MIN_MOVE_INTERVAL_MS);
    }

    fn next_cell(&self) -> GridPos {
        match self.axis {
            EnemyAxis::Horizontal => self.pos.offset(self.dir, 0),
            EnemyAxis::Vertical => self.pos.offset(0, self.dir),
        }
    }

    /// Advance one patrol step if the interval elapsed. A blocked cell
    /// reverses direction and forfeits this step.
    pub fn step(
        &mut self,
        now_ms: u64,
        map: &TileMap,
        occupancy: &dyn GridOccupancyQuery,
    ) -> bool {
        if now_ms.saturating_sub(self.last_move_ms) < self.move_interval_ms {
            return false;
        }
        self.last_move_ms = now_ms;
        let next = self.next_cell();
        if map.get(next).is_walkable() && occupancy.is_open(next) {
            self.pos = next;
            true
        } else {
            self.dir = -self.dir;
            false
        }
    }
}
