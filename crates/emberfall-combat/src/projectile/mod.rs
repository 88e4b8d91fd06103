//! Projectiles - spell objects that travel, hit and get destroyed
//!
//! A projectile is `Flying` until it hits a hostile combatant (unless it
//! pierces), travels past its range, enters a blocked tile or outlives its
//! lifetime. On hit its [`HitEffect`]s run in order; on destruction its
//! [`DestroyEffect`]s run in order, which is where splitting happens.

pub mod split;

pub use split::SplitEffect;

use emberfall_core::{Entity, Floor, Transform2D, Vec2};

use crate::aura::{AuraPoolId, AuraSpec};
use crate::damage::DamageMethod;
use crate::scene::Scene;
use crate::skill::SkillKind;
use crate::stats::{EffectiveStats, Faction};

/// Why a projectile stopped existing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyCause {
    HitTarget(Entity),
    MaxRange,
    Blocked,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    Flying,
    Destroyed(DestroyCause),
}

/// Applied to each target a projectile hits, in order
#[derive(Debug, Clone, PartialEq)]
pub enum HitEffect {
    Damage {
        source: SkillKind,
        method: DamageMethod,
    },
    Burn {
        spec: AuraSpec,
        pool: Option<AuraPoolId>,
    },
}

/// Run when a projectile is destroyed, in order
#[derive(Debug, Clone, PartialEq)]
pub enum DestroyEffect {
    Split(SplitEffect),
}

/// Everything needed to put a projectile into the world
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileLaunch {
    pub owner: Entity,
    pub source: SkillKind,
    pub faction: Faction,
    pub transform: Transform2D,
    /// Units per second; zero for stationary projectiles
    pub speed: f32,
    pub max_range: Option<f32>,
    pub radius: f32,
    pub lifetime: Option<f32>,
    /// Keep flying after a hit; each target is still hit only once
    pub pierce: bool,
    pub hit_effects: Vec<HitEffect>,
    pub destroy_effects: Vec<DestroyEffect>,
    /// How many splits produced this projectile
    pub split_count: u32,
    /// Targets that count as hit from the start; split offspring inherit
    /// their parent's so they never strike the same target twice
    pub already_hit: Vec<Entity>,
    /// Owner stats captured at launch
    pub attacker_stats: EffectiveStats,
}

/// A live projectile
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    launch: ProjectileLaunch,
    origin: Vec2,
    age: f32,
    already_hit: Vec<Entity>,
    state: ProjectileState,
}

impl Projectile {
    pub fn new(launch: ProjectileLaunch) -> Self {
        Self {
            origin: launch.transform.position,
            already_hit: launch.already_hit.clone(),
            launch,
            age: 0.0,
            state: ProjectileState::Flying,
        }
    }

    /// Move along the facing direction and check range, lifetime and terrain.
    /// Returns the cause if the projectile got destroyed.
    pub fn advance(&mut self, delta: f32, scene: &dyn Scene) -> Option<DestroyCause> {
        if !self.is_flying() {
            return None;
        }
        let delta = delta.max(0.0);
        self.age += delta;
        let step = self.launch.transform.direction * self.launch.speed * delta;
        self.launch.transform.translate(step);

        let cause = if self
            .launch
            .lifetime
            .is_some_and(|lifetime| self.age >= lifetime)
        {
            Some(DestroyCause::Expired)
        } else if self
            .launch
            .max_range
            .is_some_and(|range| self.travelled_distance_sq() >= range * range)
        {
            Some(DestroyCause::MaxRange)
        } else if !scene.is_walkable(self.position(), self.floor()) {
            Some(DestroyCause::Blocked)
        } else {
            None
        };

        if let Some(cause) = cause {
            self.destroy(cause);
        }
        cause
    }

    /// Remember a hit. Returns `false` if this target was already hit.
    pub fn register_hit(&mut self, target: Entity) -> bool {
        if self.already_hit.contains(&target) {
            return false;
        }
        self.already_hit.push(target);
        true
    }

    pub fn has_hit(&self, target: Entity) -> bool {
        self.already_hit.contains(&target)
    }

    pub fn already_hit(&self) -> &[Entity] {
        &self.already_hit
    }

    pub fn destroy(&mut self, cause: DestroyCause) {
        if self.is_flying() {
            self.state = ProjectileState::Destroyed(cause);
        }
    }

    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    pub fn state(&self) -> ProjectileState {
        self.state
    }

    pub fn travelled_distance_sq(&self) -> f32 {
        self.origin.distance_squared(self.position())
    }

    pub fn position(&self) -> Vec2 {
        self.launch.transform.position
    }

    pub fn direction(&self) -> Vec2 {
        self.launch.transform.direction
    }

    pub fn floor(&self) -> Floor {
        self.launch.transform.floor
    }

    pub fn owner(&self) -> Entity {
        self.launch.owner
    }

    pub fn source(&self) -> SkillKind {
        self.launch.source
    }

    pub fn faction(&self) -> Faction {
        self.launch.faction
    }

    pub fn radius(&self) -> f32 {
        self.launch.radius
    }

    pub fn pierces(&self) -> bool {
        self.launch.pierce
    }

    pub fn split_count(&self) -> u32 {
        self.launch.split_count
    }

    pub fn attacker_stats(&self) -> &EffectiveStats {
        &self.launch.attacker_stats
    }

    pub fn hit_effects(&self) -> &[HitEffect] {
        &self.launch.hit_effects
    }

    pub fn destroy_effects(&self) -> &[DestroyEffect] {
        &self.launch.destroy_effects
    }

    pub fn launch(&self) -> &ProjectileLaunch {
        &self.launch
    }
}
