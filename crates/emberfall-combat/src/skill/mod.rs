//! Skills - talent-driven abilities gated by an attack limiter
//!
//! A [`Skill`] is rebuilt from plain talent parameters whenever talents
//! change ([`Skill::refresh_data_from_talents`]) and re-reads its cooldown
//! modifiers whenever the owner's auras change ([`Skill::refresh_cooldown`]).
//! Execution never errors: a skill that cannot run returns `false`.

pub mod cost;
pub mod payload;

pub use cost::ManaCost;
pub use payload::{FirewallSpell, MeleeStrike, ProjectileSpell, SkillPayload};

use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Entity, Transform2D, Vec2};
use tracing::debug;

use crate::aura::{AuraApplication, AuraList, AuraPoolId, AuraSpec, EffectId, StatusEffect};
use crate::damage::{DamageMethod, DamageRange};
use crate::limiter::AttackLimiter;
use crate::projectile::{DestroyEffect, HitEffect, ProjectileLaunch, SplitEffect};
use crate::talent::{
    FirewallTalent, FirewhirlTalent, HasteTalent, PyromaniaTalent, SplitTalent,
    SwordsmanshipTalent, TalentId, TalentTree,
};
use crate::world::CombatWorld;

/// Every skill in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum SkillKind {
    Swordstrike,
    Firewhirl,
    Firewall,
    Haste,
}

impl SkillKind {
    pub const ALL: [SkillKind; 4] = [
        SkillKind::Swordstrike,
        SkillKind::Firewhirl,
        SkillKind::Firewall,
        SkillKind::Haste,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Swordstrike => "Swordstrike",
            Self::Firewhirl => "Firewhirl",
            Self::Firewall => "Firewall",
            Self::Haste => "Haste",
        }
    }

    /// Talent that unlocks this skill
    pub fn talent(self) -> TalentId {
        match self {
            Self::Swordstrike => TalentId::Swordsmanship,
            Self::Firewhirl => TalentId::Firewhirl,
            Self::Firewall => TalentId::Firewall,
            Self::Haste => TalentId::Haste,
        }
    }

    /// Basic attacks are usable without spending talent points
    pub fn requires_talent(self) -> bool {
        self != Self::Swordstrike
    }

    pub fn is_fire(self) -> bool {
        matches!(self, Self::Firewhirl | Self::Firewall)
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(match self {
            Self::Swordstrike => 0,
            Self::Firewhirl => 1,
            Self::Firewall => 2,
            Self::Haste => 3,
        });
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0 => Ok(Self::Swordstrike),
            1 => Ok(Self::Firewhirl),
            2 => Ok(Self::Firewall),
            3 => Ok(Self::Haste),
            tag => Err(CodecError::InvalidTag {
                what: "SkillKind",
                tag: u32::from(tag),
            }),
        }
    }
}

impl std::fmt::Display for SkillKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SkillBuildError {
    #[error("{skill} requires the {} talent", .talent.name())]
    TalentNotLearned { skill: SkillKind, talent: TalentId },
    #[error("{0} applies burning but no aura pool was provided")]
    MissingAuraPool(SkillKind),
}

/// Where a skill is aimed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkillTarget {
    /// The caster itself, or along its facing for aimed skills
    Caster,
    Entity(Entity),
    Point(Vec2),
}

/// Values derived from talents, recomputed as a whole on every refresh
struct Derived {
    limiter: LimiterKind,
    cost: ManaCost,
    payload: SkillPayload,
    base_cooldown: f32,
    cast_time: f32,
}

#[derive(Clone, Copy)]
enum LimiterKind {
    Unlimited,
    Timed,
    FreeN(u32),
}

/// A learned ability
#[derive(Debug, Clone)]
pub struct Skill {
    kind: SkillKind,
    limiter: AttackLimiter,
    cost: ManaCost,
    payload: SkillPayload,
    base_cooldown: f32,
    cast_time: f32,
    aura_pool: Option<AuraPoolId>,
}

impl Skill {
    /// Build a skill from the current talents. Fire skills need the pool
    /// their burning auras are drawn from; buffs use it when given one.
    pub fn build(
        kind: SkillKind,
        talents: &TalentTree,
        auras: &AuraList,
        aura_pool: Option<AuraPoolId>,
    ) -> Result<Self, SkillBuildError> {
        let derived = derive(kind, talents, aura_pool)?;
        let limiter = match derived.limiter {
            LimiterKind::Unlimited => AttackLimiter::Unlimited,
            LimiterKind::Timed => AttackLimiter::timed(derived.base_cooldown),
            LimiterKind::FreeN(casts) => {
                AttackLimiter::free_n_then_cooldown(casts, derived.base_cooldown)
            }
        };
        let mut skill = Self {
            kind,
            limiter,
            cost: derived.cost,
            payload: derived.payload,
            base_cooldown: derived.base_cooldown,
            cast_time: derived.cast_time,
            aura_pool,
        };
        skill.refresh_cooldown(auras);
        Ok(skill)
    }

    /// Recompute every talent-derived value. Running it twice with the same
    /// inputs changes nothing; a running cooldown keeps its time left.
    pub fn refresh_data_from_talents(
        &mut self,
        talents: &TalentTree,
        auras: &AuraList,
    ) -> Result<(), SkillBuildError> {
        let derived = derive(self.kind, talents, self.aura_pool)?;
        if let LimiterKind::FreeN(casts) = derived.limiter {
            self.limiter.set_free_casts(casts);
        }
        self.cost = derived.cost;
        self.payload = derived.payload;
        self.base_cooldown = derived.base_cooldown;
        self.cast_time = derived.cast_time;
        self.refresh_cooldown(auras);
        Ok(())
    }

    /// Whether aura cooldown modifiers affect this skill
    pub fn is_cooldown_dependant(&self) -> bool {
        self.limiter.cooldown().is_some()
    }

    /// Apply `(base + fixed) * multiplier` from the owner's cooldown auras
    pub fn refresh_cooldown(&mut self, auras: &AuraList) {
        if !self.is_cooldown_dependant() {
            return;
        }
        let total = auras
            .get_effect_values(EffectId::Cooldown(self.kind))
            .apply(self.base_cooldown)
            .max(0.0);
        self.limiter.set_cooldown_total(total);
    }

    pub fn update(&mut self, delta: f32) {
        self.limiter.update(delta);
    }

    /// Try to run the skill. Checks the limiter, the caster, the mana cost
    /// and the target; only a successful execution pays and arms the limiter.
    pub fn execute(&mut self, caster: Entity, target: SkillTarget, world: &mut CombatWorld) -> bool {
        if !self.limiter.can_execute_now() {
            self.limiter.on_rejected();
            debug!("{} is not ready", self.kind);
            return false;
        }
        let Some(combatant) = world.combatant(caster) else {
            return false;
        };
        if !combatant.stats.is_alive() {
            return false;
        }
        if !self.cost.can_afford(&combatant.stats.stats) {
            debug!("{} cannot afford {}", caster, self.kind);
            return false;
        }

        let performed = match &self.payload {
            SkillPayload::Melee(strike) => perform_melee(self.kind, strike, caster, target, world),
            SkillPayload::Projectile(spell) => {
                perform_projectile(self.kind, spell, self.aura_pool, caster, target, world)
            }
            SkillPayload::Firewall(spell) => {
                perform_firewall(self.kind, spell, self.aura_pool, caster, target, world)
            }
            SkillPayload::SelfBuff(spec) => matches!(
                world.apply_aura(caster, spec, Some(caster), self.aura_pool),
                AuraApplication::Applied | AuraApplication::Refreshed
            ),
        };
        if !performed {
            debug!("{} had no valid target", self.kind);
            return false;
        }

        if let Some(combatant) = world.combatant_mut(caster) {
            self.cost.pay(&mut combatant.stats.stats);
        }
        self.limiter.on_executed();
        world.skill_executed(caster, self.kind);
        true
    }

    pub fn kind(&self) -> SkillKind {
        self.kind
    }

    pub fn limiter(&self) -> &AttackLimiter {
        &self.limiter
    }

    pub fn cost(&self) -> ManaCost {
        self.cost
    }

    pub fn payload(&self) -> &SkillPayload {
        &self.payload
    }

    pub fn base_cooldown(&self) -> f32 {
        self.base_cooldown
    }

    /// Cooldown after aura modifiers, zero for unlimited skills
    pub fn cooldown_total(&self) -> f32 {
        self.limiter.cooldown().map_or(0.0, |cd| cd.total_time())
    }

    pub fn cast_time(&self) -> f32 {
        self.cast_time
    }

    pub fn can_execute_now(&self) -> bool {
        self.limiter.can_execute_now()
    }
}

fn require<T>(
    kind: SkillKind,
    talents: &TalentTree,
    params: impl FnOnce(u8) -> Option<T>,
) -> Result<T, SkillBuildError> {
    let talent = kind.talent();
    params(talents.level(talent)).ok_or(SkillBuildError::TalentNotLearned { skill: kind, talent })
}

fn burn_spec(
    kind: SkillKind,
    pyromania: &PyromaniaTalent,
    damage: i32,
    duration: f32,
    tick: f32,
) -> AuraSpec {
    let boosted = (damage as f32 * (1.0 + pyromania.burn_damage_percent / 100.0)).round() as i32;
    AuraSpec::damage_over_time(kind, duration, tick, boosted.max(1))
}

fn derive(
    kind: SkillKind,
    talents: &TalentTree,
    aura_pool: Option<AuraPoolId>,
) -> Result<Derived, SkillBuildError> {
    let pyromania = PyromaniaTalent::at_level(talents.level(TalentId::Pyromania));
    match kind {
        SkillKind::Swordstrike => {
            let talent = SwordsmanshipTalent::at_level(talents.level(TalentId::Swordsmanship));
            Ok(Derived {
                limiter: LimiterKind::Unlimited,
                cost: ManaCost::Free,
                payload: SkillPayload::Melee(MeleeStrike {
                    method: DamageMethod::new(
                        DamageRange::new(talent.damage_min, talent.damage_max),
                        talent.crit_chance_increase,
                    ),
                    reach: talent.reach,
                }),
                base_cooldown: 0.0,
                cast_time: 0.0,
            })
        }
        SkillKind::Firewhirl => {
            let talent = require(kind, talents, FirewhirlTalent::at_level)?;
            if aura_pool.is_none() {
                return Err(SkillBuildError::MissingAuraPool(kind));
            }
            let split = SplitTalent::at_level(talents.level(TalentId::FirewhirlSplit));
            Ok(Derived {
                limiter: LimiterKind::Timed,
                cost: ManaCost::Flat(talent.mana_cost),
                payload: SkillPayload::Projectile(ProjectileSpell {
                    method: DamageMethod::new(
                        DamageRange::new(talent.damage_min, talent.damage_max),
                        pyromania.crit_chance_increase,
                    ),
                    speed: talent.speed,
                    range: talent.range,
                    radius: talent.radius,
                    burn: Some(burn_spec(
                        kind,
                        &pyromania,
                        talent.burn_damage,
                        talent.burn_duration,
                        talent.burn_tick,
                    )),
                    split,
                }),
                base_cooldown: talent.cooldown,
                cast_time: talent.cast_time,
            })
        }
        SkillKind::Firewall => {
            let talent = require(kind, talents, FirewallTalent::at_level)?;
            if aura_pool.is_none() {
                return Err(SkillBuildError::MissingAuraPool(kind));
            }
            Ok(Derived {
                limiter: LimiterKind::FreeN(talent.times_castable),
                cost: ManaCost::Flat(talent.mana_cost),
                payload: SkillPayload::Firewall(FirewallSpell {
                    method: DamageMethod::new(
                        DamageRange::new(talent.damage_min, talent.damage_max),
                        pyromania.crit_chance_increase,
                    ),
                    flame_count: talent.flame_count,
                    spacing: talent.spacing,
                    distance: talent.distance,
                    lifetime: talent.lifetime,
                    radius: talent.radius,
                    burn: Some(burn_spec(
                        kind,
                        &pyromania,
                        talent.burn_damage,
                        talent.burn_duration,
                        talent.burn_tick,
                    )),
                }),
                base_cooldown: talent.cooldown,
                cast_time: talent.cast_time,
            })
        }
        SkillKind::Haste => {
            let talent = require(kind, talents, HasteTalent::at_level)?;
            let effects = SkillKind::ALL
                .into_iter()
                .filter(|skill| skill.is_fire())
                .map(|skill| StatusEffect::percent(EffectId::Cooldown(skill), talent.cooldown_percent))
                .collect();
            Ok(Derived {
                limiter: LimiterKind::Timed,
                cost: ManaCost::PercentOfMax(talent.mana_cost_percent),
                payload: SkillPayload::SelfBuff(AuraSpec::buff(kind, talent.duration, effects)),
                base_cooldown: talent.cooldown,
                cast_time: 0.0,
            })
        }
    }
}

fn perform_melee(
    kind: SkillKind,
    strike: &MeleeStrike,
    caster: Entity,
    target: SkillTarget,
    world: &mut CombatWorld,
) -> bool {
    let SkillTarget::Entity(target) = target else {
        return false;
    };
    if target == caster || !world.is_hostile_and_alive(caster, target) {
        return false;
    }
    if !world.within_reach(caster, target, strike.reach) {
        return false;
    }
    world.strike(caster, target, kind, &strike.method).is_some()
}

/// Resolve the aim point and face it. `None` when the target is invalid.
fn aim(caster: Entity, target: SkillTarget, fallback_distance: f32, world: &mut CombatWorld) -> Option<Transform2D> {
    let caster_transform = world.combatant(caster)?.transform;
    let point = match target {
        SkillTarget::Caster => caster_transform.ahead(fallback_distance),
        SkillTarget::Point(point) => point,
        SkillTarget::Entity(entity) => {
            if entity == caster || !world.is_hostile_and_alive(caster, entity) {
                return None;
            }
            world.combatant(entity)?.transform.position
        }
    };
    let combatant = world.combatant_mut(caster)?;
    combatant.transform.look_at(point);
    let mut aimed = combatant.transform;
    aimed.position = point;
    Some(aimed)
}

fn perform_projectile(
    kind: SkillKind,
    spell: &ProjectileSpell,
    aura_pool: Option<AuraPoolId>,
    caster: Entity,
    target: SkillTarget,
    world: &mut CombatWorld,
) -> bool {
    if aim(caster, target, spell.range, world).is_none() {
        return false;
    }
    let Some(combatant) = world.combatant(caster) else {
        return false;
    };
    let facing = combatant.transform;
    let start = facing.ahead(combatant.radius);

    let mut hit_effects = vec![HitEffect::Damage {
        source: kind,
        method: spell.method,
    }];
    if let Some(burn) = &spell.burn {
        hit_effects.push(HitEffect::Burn {
            spec: burn.clone(),
            pool: aura_pool,
        });
    }
    let destroy_effects = spell
        .split
        .map(|talent| vec![DestroyEffect::Split(SplitEffect::new(talent))])
        .unwrap_or_default();

    let launch = ProjectileLaunch {
        owner: caster,
        source: kind,
        faction: combatant.stats.faction,
        transform: Transform2D::new(start, facing.direction, facing.floor),
        speed: spell.speed,
        max_range: Some(spell.range),
        radius: spell.radius,
        lifetime: None,
        pierce: false,
        hit_effects,
        destroy_effects,
        split_count: 0,
        already_hit: Vec::new(),
        attacker_stats: combatant.stats.effective(),
    };
    world.spawn_projectile(launch);
    true
}

fn perform_firewall(
    kind: SkillKind,
    spell: &FirewallSpell,
    aura_pool: Option<AuraPoolId>,
    caster: Entity,
    target: SkillTarget,
    world: &mut CombatWorld,
) -> bool {
    let Some(aimed) = aim(caster, target, spell.distance, world) else {
        return false;
    };
    let Some(combatant) = world.combatant(caster) else {
        return false;
    };
    let faction = combatant.stats.faction;
    let attacker_stats = combatant.stats.effective();

    let across = aimed.direction.perp();
    let half = (spell.flame_count.saturating_sub(1)) as f32 / 2.0;
    let positions: Vec<Vec2> = (0..spell.flame_count)
        .map(|i| aimed.position + across * (i as f32 - half) * spell.spacing)
        .filter(|position| world.scene().is_walkable(*position, aimed.floor))
        .collect();
    if positions.is_empty() {
        return false;
    }

    let mut hit_effects = vec![HitEffect::Damage {
        source: kind,
        method: spell.method,
    }];
    if let Some(burn) = &spell.burn {
        hit_effects.push(HitEffect::Burn {
            spec: burn.clone(),
            pool: aura_pool,
        });
    }
    for position in positions {
        world.spawn_projectile(ProjectileLaunch {
            owner: caster,
            source: kind,
            faction,
            transform: Transform2D::new(position, aimed.direction, aimed.floor),
            speed: 0.0,
            max_range: None,
            radius: spell.radius,
            lifetime: Some(spell.lifetime),
            pierce: true,
            hit_effects: hit_effects.clone(),
            destroy_effects: Vec::new(),
            split_count: 0,
            already_hit: Vec::new(),
            attacker_stats,
        });
    }
    true
}
