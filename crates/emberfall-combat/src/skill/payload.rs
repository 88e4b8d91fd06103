//! What a skill does once it is allowed to execute

use crate::aura::AuraSpec;
use crate::damage::DamageMethod;
use crate::talent::SplitTalent;

/// Instant damage to one target within reach
#[derive(Debug, Clone, PartialEq)]
pub struct MeleeStrike {
    pub method: DamageMethod,
    pub reach: f32,
}

/// A single travelling projectile
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSpell {
    pub method: DamageMethod,
    pub speed: f32,
    pub range: f32,
    pub radius: f32,
    /// Applied to every target the projectile hits
    pub burn: Option<AuraSpec>,
    /// Present once the split talent is learned
    pub split: Option<SplitTalent>,
}

/// A line of stationary flames across the aim direction
#[derive(Debug, Clone, PartialEq)]
pub struct FirewallSpell {
    pub method: DamageMethod,
    pub flame_count: u32,
    pub spacing: f32,
    /// Distance from the caster when aimed without a target
    pub distance: f32,
    pub lifetime: f32,
    pub radius: f32,
    pub burn: Option<AuraSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkillPayload {
    Melee(MeleeStrike),
    Projectile(ProjectileSpell),
    Firewall(FirewallSpell),
    /// Aura applied to the caster
    SelfBuff(AuraSpec),
}

impl SkillPayload {
    pub fn damage_method(&self) -> Option<&DamageMethod> {
        match self {
            Self::Melee(strike) => Some(&strike.method),
            Self::Projectile(spell) => Some(&spell.method),
            Self::Firewall(spell) => Some(&spell.method),
            Self::SelfBuff(_) => None,
        }
    }

    pub fn burn(&self) -> Option<&AuraSpec> {
        match self {
            Self::Projectile(spell) => spell.burn.as_ref(),
            Self::Firewall(spell) => spell.burn.as_ref(),
            Self::Melee(_) | Self::SelfBuff(_) => None,
        }
    }
}
