//! Damage calculation
//!
//! A [`DamageMethod`] holds the talent-derived modifiers of one skill and turns
//! attacker and defender stats into an [`AttackDamageResult`]. It keeps no
//! state between calls.

use rand::Rng;
use serde::Serialize;

use crate::stats::EffectiveStats;

/// How a hit landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReceiveType {
    Hit,
    Crit,
    Resisted,
    Missed,
}

/// Result of one damage roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackDamageResult {
    pub damage: i32,
    pub receive_type: ReceiveType,
}

impl AttackDamageResult {
    pub fn landed(&self) -> bool {
        matches!(self.receive_type, ReceiveType::Hit | ReceiveType::Crit)
    }
}

/// Attack multiplier bounds, always `min <= max`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRange {
    min: f32,
    max: f32,
}

impl DamageRange {
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Damage strategy of a skill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageMethod {
    range: DamageRange,
    crit_chance_increase: f32,
    /// Scales the attacker's own crit multiplier
    crit_multiplier: f32,
}

impl Default for DamageMethod {
    fn default() -> Self {
        Self::new(DamageRange::new(1.0, 1.0), 0.0)
    }
}

impl DamageMethod {
    pub fn new(range: DamageRange, crit_chance_increase: f32) -> Self {
        Self {
            range,
            crit_chance_increase,
            crit_multiplier: 1.0,
        }
    }

    pub fn with_crit_multiplier(mut self, crit_multiplier: f32) -> Self {
        self.crit_multiplier = crit_multiplier.max(1.0);
        self
    }

    /// Replace the talent-derived parameters
    pub fn set_values(&mut self, range: DamageRange, crit_chance_increase: f32) {
        self.range = range;
        self.crit_chance_increase = crit_chance_increase;
    }

    pub fn range(&self) -> DamageRange {
        self.range
    }

    pub fn crit_chance_increase(&self) -> f32 {
        self.crit_chance_increase
    }

    /// Pipeline: hit roll -> resist roll -> attack * modifier -> crit
    /// -> minus defense * 0.5 -> floor at 1 -> round
    pub fn get_damage_done(
        &self,
        attacker: &EffectiveStats,
        defender: &EffectiveStats,
        rng: &mut impl Rng,
    ) -> AttackDamageResult {
        if rng.gen::<f32>() >= attacker.hit_chance {
            return AttackDamageResult {
                damage: 0,
                receive_type: ReceiveType::Missed,
            };
        }
        if rng.gen::<f32>() < defender.resist_chance {
            return AttackDamageResult {
                damage: 0,
                receive_type: ReceiveType::Resisted,
            };
        }

        let mut damage = attacker.attack * self.range.sample(rng);

        let crit_chance = (attacker.crit_chance + self.crit_chance_increase).clamp(0.0, 1.0);
        let is_crit = rng.gen::<f32>() < crit_chance;
        if is_crit {
            damage *= attacker.crit_multiplier * self.crit_multiplier;
        }

        damage -= defender.defense * 0.5;
        damage = damage.max(1.0);

        AttackDamageResult {
            damage: damage.round() as i32,
            receive_type: if is_crit {
                ReceiveType::Crit
            } else {
                ReceiveType::Hit
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sure_hit(attack: f32) -> EffectiveStats {
        EffectiveStats {
            attack,
            hit_chance: 1.0,
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            ..EffectiveStats::default()
        }
    }

    fn target(defense: f32) -> EffectiveStats {
        EffectiveStats {
            defense,
            resist_chance: 0.0,
            ..EffectiveStats::default()
        }
    }

    #[test]
    fn test_range_is_normalized() {
        let range = DamageRange::new(2.0, 1.0);
        assert_eq!(range.min(), 1.0);
        assert_eq!(range.max(), 2.0);
    }

    #[test]
    fn test_basic_hit_subtracts_half_defense() {
        let mut rng = StdRng::seed_from_u64(1);
        let method = DamageMethod::new(DamageRange::new(1.0, 1.0), 0.0);
        let result = method.get_damage_done(&sure_hit(20.0), &target(10.0), &mut rng);
        assert_eq!(result.receive_type, ReceiveType::Hit);
        assert_eq!(result.damage, 15);
    }

    #[test]
    fn test_damage_floor_at_one() {
        let mut rng = StdRng::seed_from_u64(2);
        let method = DamageMethod::default();
        let result = method.get_damage_done(&sure_hit(1.0), &target(100.0), &mut rng);
        assert_eq!(result.damage, 1);
    }

    #[test]
    fn test_guaranteed_crit_from_increase() {
        let mut rng = StdRng::seed_from_u64(3);
        let method = DamageMethod::new(DamageRange::new(1.0, 1.0), 1.0);
        let result = method.get_damage_done(&sure_hit(10.0), &target(0.0), &mut rng);
        assert_eq!(result.receive_type, ReceiveType::Crit);
        assert_eq!(result.damage, 20);
    }

    #[test]
    fn test_zero_hit_chance_misses() {
        let mut rng = StdRng::seed_from_u64(4);
        let attacker = EffectiveStats {
            hit_chance: 0.0,
            ..sure_hit(50.0)
        };
        let result = DamageMethod::default().get_damage_done(&attacker, &target(0.0), &mut rng);
        assert_eq!(result.receive_type, ReceiveType::Missed);
        assert_eq!(result.damage, 0);
        assert!(!result.landed());
    }

    #[test]
    fn test_full_resist() {
        let mut rng = StdRng::seed_from_u64(5);
        let defender = EffectiveStats {
            resist_chance: 1.0,
            ..target(0.0)
        };
        let result = DamageMethod::default().get_damage_done(&sure_hit(50.0), &defender, &mut rng);
        assert_eq!(result.receive_type, ReceiveType::Resisted);
    }

    #[test]
    fn test_damage_within_range() {
        let mut rng = StdRng::seed_from_u64(6);
        let method = DamageMethod::new(DamageRange::new(0.5, 1.5), 0.0);
        for _ in 0..200 {
            let result = method.get_damage_done(&sure_hit(100.0), &target(0.0), &mut rng);
            assert!((50..=150).contains(&result.damage));
        }
    }

    #[test]
    fn test_set_values_replaces_parameters() {
        let mut method = DamageMethod::default();
        method.set_values(DamageRange::new(3.0, 2.0), 0.25);
        assert_eq!(method.range().min(), 2.0);
        assert_eq!(method.crit_chance_increase(), 0.25);
    }
}
