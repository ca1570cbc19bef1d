use serde::Deserialize;

/// Match pacing and lifecycle tunables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Match-wide time limit; one clock spans every level.
    pub time_limit_ms: u64,
    /// Cadence of the win-condition poll.
    pub win_poll_interval_ms: u64,
    /// Dwell before a downed player ends the match.
    pub player_down_delay_ms: u64,
    /// Dwell on the level-complete banner before advancing.
    pub level_complete_delay_ms: u64,
    /// Dwell after time expiry before the match ends.
    pub time_expired_delay_ms: u64,
    /// Dramatic pause after a final encounter before victory.
    pub final_event_delay_ms: u64,
    /// Lifetime of an uncollected pickup.
    pub pickup_ttl_ms: u64,
    /// Fixed RNG seed; unset means seed from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 120_000,
            win_poll_interval_ms: 500,
            player_down_delay_ms: 1_500,
            level_complete_delay_ms: 2_000,
            time_expired_delay_ms: 2_000,
            final_event_delay_ms: 3_000,
            pickup_ttl_ms: 30_000,
            rng_seed: None,
        }
    }
}
