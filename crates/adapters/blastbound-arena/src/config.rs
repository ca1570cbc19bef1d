use serde::Deserialize;

/// Tunables for the realtime connection and reconnection policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaClientConfig {
    /// Reconnection attempts before the channel stays down for the match.
    pub max_reconnect_attempts: u32,
    /// Base backoff delay in milliseconds.
    pub reconnect_base_delay_ms: u64,
    /// Backoff delay cap in milliseconds.
    pub reconnect_max_delay_ms: u64,
    /// Randomization applied to each delay, as a fraction (0.5 = ±50%).
    pub jitter: f64,
    /// Timeout for a single WebSocket dial.
    pub connect_timeout_ms: u64,
}

impl Default for ArenaClientConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 10,
            reconnect_base_delay_ms: 1_000,
            reconnect_max_delay_ms: 5_000,
            jitter: 0.5,
            connect_timeout_ms: 30_000,
        }
    }
}

impl ArenaClientConfig {
    /// Backoff delay for the given attempt (0-based), before jitter.
    pub fn backoff_delay_ms(&self, attempt: u32) -> u64 {
        let exp = self
            .reconnect_base_delay_ms
            .saturating_mul(1u64 << attempt.min(16));
        exp.min(self.reconnect_max_delay_ms)
    }
}
