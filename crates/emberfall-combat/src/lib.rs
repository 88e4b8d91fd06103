//! Emberfall Combat - Skills, auras and projectile resolution
//!
//! Everything that happens between "a skill is cast" and "hit points go down":
//! - Cooldowns and attack limiters gating skill use
//! - Talent trees and the skill parameters derived from them
//! - Auras (buffs and damage over time) with pooled instances
//! - Damage rolls, projectiles and projectile splitting
//! - The combat world that runs a frame and emits events

pub mod aura;
pub mod cooldown;
pub mod damage;
pub mod events;
pub mod limiter;
pub mod projectile;
pub mod scene;
pub mod skill;
pub mod spellbook;
pub mod stats;
pub mod talent;
pub mod timers;
pub mod world;

pub use aura::{
    Aura, AuraApplication, AuraKind, AuraList, AuraPool, AuraPoolId, AuraPools, AuraSpec,
    AuraState, EffectId, EffectValues, ExhaustionPolicy, StatusEffect,
};
pub use cooldown::Cooldown;
pub use damage::{AttackDamageResult, DamageMethod, DamageRange, ReceiveType};
pub use events::{CombatEvent, EventBus};
pub use limiter::AttackLimiter;
pub use projectile::{
    DestroyCause, DestroyEffect, HitEffect, Projectile, ProjectileLaunch, ProjectileState,
    SplitEffect,
};
pub use scene::{OpenField, Scene, TileGrid};
pub use skill::{ManaCost, Skill, SkillBuildError, SkillKind, SkillPayload, SkillTarget};
pub use spellbook::SkillBook;
pub use stats::{CombatStats, EffectiveStats, Faction, Statable};
pub use talent::{TalentId, TalentTree};
pub use timers::{TimerError, TimerType, WorldTimer, WorldTimers};
pub use world::{CombatWorld, Combatant};
