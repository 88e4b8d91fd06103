//! Mana costs

use crate::stats::CombatStats;

/// Resource a skill consumes on a successful execution
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ManaCost {
    #[default]
    Free,
    Flat(f32),
    /// Percentage (0-100) of the caster's maximum mana
    PercentOfMax(f32),
}

impl ManaCost {
    pub fn amount(&self, stats: &CombatStats) -> f32 {
        match *self {
            Self::Free => 0.0,
            Self::Flat(amount) => amount.max(0.0),
            Self::PercentOfMax(percent) => (stats.max_mana * percent / 100.0).max(0.0),
        }
    }

    pub fn can_afford(&self, stats: &CombatStats) -> bool {
        stats.mana >= self.amount(stats)
    }

    /// Deduct the cost. Returns `false` without touching mana when unaffordable.
    pub fn pay(&self, stats: &mut CombatStats) -> bool {
        let amount = self.amount(stats);
        if stats.mana < amount {
            return false;
        }
        stats.mana -= amount;
        true
    }
}
