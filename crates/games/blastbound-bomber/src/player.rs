use blastbound_core::grid::GridPos;

// One grid cell is 30 world units; base speed 150 units/s gives a
// 200 ms step cadence before boosts.
const CELL_UNITS: f64 = 30.0;

/// The player's mutable match state. Base stats are fixed; effective
/// stats come from the effect ledger at the call site.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub pos: GridPos,
    pub score: u32,
    pub alive: bool,
    pub base_speed: f64,
    pub base_max_bombs: u32,
    pub base_blast_radius: u32,
    pub base_bomb_cooldown_ms: u64,
    last_bomb_ms: Option<u64>,
    last_move_ms: u64,
}

impl PlayerState {
    pub fn new(start: GridPos) -> Self {
        Self {
            pos: start,
            score: 0,
            alive: true,
            base_speed: 150.0,
            base_max_bombs: 1,
            base_blast_radius: 2,
            base_bomb_cooldown_ms: 500,
            last_bomb_ms: None,
            last_move_ms: 0,
        }
    }

    /// Step cadence under the given speed factor.
    pub fn move_interval_ms(&self, speed_multiplier: f64) -> u64 {
        (CELL_UNITS / (self.base_speed * speed_multiplier) * 1000.0) as u64
    }

    /// Move onto `to` if the cadence allows it. Cell validity is the
    /// caller's job; this only owns the timing.
    pub fn try_step(&mut self, to: GridPos, now_ms: u64, speed_multiplier: f64) -> bool {
        if !self.alive {
            return false;
        }
        if now_ms.saturating_sub(self.last_move_ms) < self.move_interval_ms(speed_multiplier) {
            return false;
        }
        self.pos = to;
        self.last_move_ms = now_ms;
        true
    }

    pub fn can_place_bomb(
        &self,
        live_bombs: usize,
        max_bombs: u32,
        cooldown_ms: u64,
        now_ms: u64,
    ) -> bool {
        let cooled = self
            .last_bomb_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= cooldown_ms);
        self.alive && live_bombs < max_bombs as usize && cooled
    }

    pub fn note_bomb_placed(&mut self, now_ms: u64) {
        self.last_bomb_ms = Some(now_ms);
    }

    /// Mark the player down. Returns true on the live-to-down
    /// transition, false if the player was already down.
    pub fn down(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        was_alive
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_step_cadence_is_200ms() {
        let player = PlayerState::new(GridPos::new(1, 1));
        assert_eq!(player.move_interval_ms(1.0), 200);
        assert!(player.move_interval_ms(1.5) < 200);
    }

    #[test]
    fn movement_respects_cadence() {
        let mut player = PlayerState::new(GridPos::new(1, 1));
        assert!(player.try_step(GridPos::new(2, 1), 200, 1.0));
        assert!(!player.try_step(GridPos::new(3, 1), 300, 1.0), "too soon");
        assert!(player.try_step(GridPos::new(3, 1), 400, 1.0));
    }

    #[test]
    fn bomb_placement_gated_by_count_and_cooldown() {
        let mut player = PlayerState::new(GridPos::new(1, 1));
        assert!(player.can_place_bomb(0, 1, 500, 1_000));
        assert!(!player.can_place_bomb(1, 1, 500, 1_000), "at capacity");
        player.note_bomb_placed(1_000);
        assert!(!player.can_place_bomb(0, 1, 500, 1_200), "cooling down");
        assert!(player.can_place_bomb(0, 1, 500, 1_500));
    }

    #[test]
    fn down_transitions_exactly_once() {
        let mut player = PlayerState::new(GridPos::new(1, 1));
        assert!(player.down(), "first hit downs");
        assert!(!player.alive);
        assert!(!player.down(), "no double-down");
        assert!(!player.try_step(GridPos::new(2, 1), 10_000, 1.0));
    }
}
