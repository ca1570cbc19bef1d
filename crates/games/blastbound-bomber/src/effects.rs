//! Boost-driven temporary effects on the player.
//!
//! Every boost resolves to exactly one category by amount; categories
//! stack with each other, a repeat of the same category replaces the
//! running one. Stat reads are derived on demand so a revert can never
//! leave a stale cached value behind.

/// Effect families, ordered by the spend required to reach them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    Velocity,
    Rate,
    Capacity,
    Area,
    Invulnerability,
}

impl EffectCategory {
    /// Player-facing banner text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Velocity => "SPEED BOOST",
            Self::Rate => "RAPID FIRE",
            Self::Capacity => "EXTRA BOMBS",
            Self::Area => "BIGGER BLASTS",
            Self::Invulnerability => "INVULNERABLE",
        }
    }
}

/// Map a boost amount to its category. Total: every amount lands
/// somewhere, and bigger spends never map to a lesser tier.
pub fn classify(amount: u32) -> EffectCategory {
    if amount >= 5_000 {
        EffectCategory::Invulnerability
    } else if amount >= 500 {
        EffectCategory::Area
    } else if amount >= 100 {
        EffectCategory::Capacity
    } else if amount >= 50 {
        EffectCategory::Rate
    } else {
        EffectCategory::Velocity
    }
}

/// Duration granted by a boost, on the same amount ladder.
pub fn duration_for(amount: u32) -> u64 {
    match classify(amount) {
        EffectCategory::Invulnerability => 10_000,
        EffectCategory::Area => 15_000,
        EffectCategory::Capacity => 20_000,
        EffectCategory::Rate => 15_000,
        EffectCategory::Velocity => 10_000,
    }
}

/// One running effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectActivation {
    pub category: EffectCategory,
    pub amount: u32,
    pub duration_ms: u64,
    pub started_ms: u64,
    pub actor: String,
}

impl EffectActivation {
    fn expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) >= self.duration_ms
    }
}

/// Snapshot of an active effect for the presentation surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectStatus {
    pub category: EffectCategory,
    pub remaining_ms: u64,
    pub actor: String,
}

/// Render hints owned by the ledger instead of mutated onto a sprite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualState {
    pub tint: Option<u32>,
    pub pulsing: bool,
}

const INVULN_TINT: u32 = 0xFFFF00;

/// The set of effects currently acting on the player.
#[derive(Debug, Default)]
pub struct EffectLedger {
    active: Vec<EffectActivation>,
    visual: VisualState,
}

impl EffectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the effect a boost buys. A running effect of the same
    /// category is reverted first; other categories are untouched.
    pub fn apply_boost(&mut self, actor: &str, amount: u32, now_ms: u64) -> EffectActivation {
        let category = classify(amount);
        if let Some(existing) = self.active.iter().position(|e| e.category == category) {
            let old = self.active.swap_remove(existing);
            self.revert(&old);
            tracing::debug!(category = old.category.label(), "Replacing running effect");
        }
        let activation = EffectActivation {
            category,
            amount,
            duration_ms: duration_for(amount),
            started_ms: now_ms,
            actor: actor.to_string(),
        };
        if category == EffectCategory::Invulnerability {
            self.visual = VisualState {
                tint: Some(INVULN_TINT),
                pulsing: true,
            };
        }
        self.active.push(activation.clone());
        activation
    }

    /// Expiry sweep. Returns the effects that just ended, each reverted
    /// exactly once. Safe to call repeatedly with the same timestamp.
    pub fn update(&mut self, now_ms: u64) -> Vec<EffectActivation> {
        let mut ended = Vec::new();
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].expired(now_ms) {
                let effect = self.active.swap_remove(i);
                self.revert(&effect);
                ended.push(effect);
            } else {
                i += 1;
            }
        }
        ended
    }

    fn revert(&mut self, effect: &EffectActivation) {
        if effect.category == EffectCategory::Invulnerability {
            self.visual = VisualState::default();
        }
    }

    fn find(&self, category: EffectCategory) -> Option<&EffectActivation> {
        self.active.iter().find(|e| e.category == category)
    }

    /// Movement speed factor. Velocity boosts scale with the spend.
    pub fn speed_multiplier(&self) -> f64 {
        match self.find(EffectCategory::Velocity) {
            Some(e) => 1.0 + (f64::from(e.amount) / 25.0) * 0.5,
            None => 1.0,
        }
    }

    /// Concurrent bomb limit with any capacity boost applied.
    pub fn max_bombs(&self, base: u32) -> u32 {
        match self.find(EffectCategory::Capacity) {
            Some(e) => base + e.amount / 100,
            None => base,
        }
    }

    /// Blast radius with any area boost applied.
    pub fn blast_radius(&self, base: u32) -> u32 {
        match self.find(EffectCategory::Area) {
            Some(e) => base + e.amount / 500,
            None => base,
        }
    }

    /// Bomb placement cooldown, halved while rapid fire runs.
    pub fn bomb_cooldown(&self, base_ms: u64) -> u64 {
        if self.find(EffectCategory::Rate).is_some() {
            base_ms / 2
        } else {
            base_ms
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.find(EffectCategory::Invulnerability).is_some()
    }

    pub fn visual(&self) -> &VisualState {
        &self.visual
    }

    pub fn active_effects(&self, now_ms: u64) -> Vec<EffectStatus> {
        self.active
            .iter()
            .map(|e| EffectStatus {
                category: e.category,
                remaining_ms: e
                    .duration_ms
                    .saturating_sub(now_ms.saturating_sub(e.started_ms)),
                actor: e.actor.clone(),
            })
            .collect()
    }

    /// Force-revert everything, visual state included.
    pub fn destroy(&mut self) {
        self.active.clear();
        self.visual = VisualState::default();
    }
}
