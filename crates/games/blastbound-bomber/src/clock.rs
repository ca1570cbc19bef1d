/// Match-wide countdown. One clock covers the whole match: level
/// transitions copy it forward instead of restarting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchClock {
    started_ms: u64,
    limit_ms: u64,
}

impl MatchClock {
    pub fn new(now_ms: u64, limit_ms: u64) -> Self {
        Self {
            started_ms: now_ms,
            limit_ms,
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.limit_ms.saturating_sub(self.elapsed_ms(now_ms))
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.limit_ms
    }
}
