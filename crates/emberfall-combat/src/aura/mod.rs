//! Auras - timed buffs, debuffs and damage-over-time effects
//!
//! An aura moves through `Inactive` (sitting in a pool) → `Active` (attached
//! to an [`AuraList`]) → `Expiring` (duration ran out, about to be removed) and
//! then either back to `Inactive` in its pool or dropped when unpooled.

pub mod effect;
pub mod list;
pub mod pool;

pub use effect::{EffectId, EffectValues, StatusEffect};
pub use list::{AuraList, AuraUpdate, DotTick};
pub use pool::{AuraPool, AuraPoolId, AuraPools, ExhaustionPolicy};

use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Entity, Versioned};

use crate::skill::SkillKind;

/// Timer slack absorbing f32 drift from summing fixed steps
pub const TIME_EPSILON: f32 = 1e-4;

/// Shortest damage-over-time interval accepted
pub const MIN_TICK_INTERVAL: f32 = 0.01;

/// Lifecycle state of an aura
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuraState {
    Inactive,
    Active,
    Expiring,
}

/// Behavior beyond the stat effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuraKind {
    Buff,
    DamageOverTime { damage_each_tick: i32 },
}

/// Everything needed to (re)apply an aura
#[derive(Debug, Clone, PartialEq)]
pub struct AuraSpec {
    /// Skill the aura comes from; together with the attacker this identifies
    /// the aura for refresh purposes
    pub source: SkillKind,
    pub kind: AuraKind,
    pub duration: f32,
    pub tick_interval: f32,
    pub effects: Vec<StatusEffect>,
}

impl AuraSpec {
    pub fn buff(source: SkillKind, duration: f32, effects: Vec<StatusEffect>) -> Self {
        Self {
            source,
            kind: AuraKind::Buff,
            duration,
            tick_interval: duration.max(f32::EPSILON),
            effects,
        }
    }

    pub fn damage_over_time(
        source: SkillKind,
        duration: f32,
        tick_interval: f32,
        damage_each_tick: i32,
    ) -> Self {
        Self {
            source,
            kind: AuraKind::DamageOverTime { damage_each_tick },
            duration,
            tick_interval,
            effects: Vec::new(),
        }
    }
}

/// Outcome of applying an aura to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuraApplication {
    /// A new aura instance was attached
    Applied,
    /// An aura from the same source was re-armed in place
    Refreshed,
    /// The target is dead or gone
    TargetGone,
    /// The pool had no free instance
    PoolExhausted,
}

/// A timed status effect attached to a combatant
#[derive(Debug, Clone, PartialEq)]
pub struct Aura {
    source: SkillKind,
    kind: AuraKind,
    duration_total: f32,
    duration_left: f32,
    tick_interval: f32,
    tick_time_left: f32,
    effects: Vec<StatusEffect>,
    attacker: Option<Entity>,
    pool: Option<AuraPoolId>,
    state: AuraState,
}

impl Aura {
    pub(crate) fn blank(pool: Option<AuraPoolId>) -> Self {
        Self {
            source: SkillKind::Swordstrike,
            kind: AuraKind::Buff,
            duration_total: 0.0,
            duration_left: 0.0,
            tick_interval: 0.0,
            tick_time_left: 0.0,
            effects: Vec::new(),
            attacker: None,
            pool,
            state: AuraState::Inactive,
        }
    }

    /// Build a standalone (unpooled) aura already active
    pub fn from_spec(spec: &AuraSpec, attacker: Option<Entity>) -> Self {
        let mut aura = Self::blank(None);
        aura.activate(spec, attacker);
        aura
    }

    /// Arm an inactive aura from a spec
    pub(crate) fn activate(&mut self, spec: &AuraSpec, attacker: Option<Entity>) {
        self.source = spec.source;
        self.kind = spec.kind;
        self.duration_total = spec.duration.max(0.0);
        self.tick_interval = spec.tick_interval.max(MIN_TICK_INTERVAL);
        self.effects.clear();
        self.effects.extend_from_slice(&spec.effects);
        self.attacker = attacker;
        self.reset_duration();
        self.reset_tick();
        self.state = AuraState::Active;
    }

    /// Re-arm from a newer application of the same source
    pub(crate) fn refresh(&mut self, spec: &AuraSpec) {
        self.kind = spec.kind;
        self.duration_total = spec.duration.max(0.0);
        self.tick_interval = spec.tick_interval.max(MIN_TICK_INTERVAL);
        self.effects.clear();
        self.effects.extend_from_slice(&spec.effects);
        self.reset_duration();
        self.reset_tick();
        self.state = AuraState::Active;
    }

    /// Return to the pristine inactive state. Only the pool calls this.
    pub(crate) fn reinitialize(&mut self) {
        let pool = self.pool;
        let mut effects = std::mem::take(&mut self.effects);
        effects.clear();
        *self = Self::blank(pool);
        self.effects = effects;
    }

    pub fn reset_duration(&mut self) {
        self.duration_left = self.duration_total;
    }

    pub fn reset_tick(&mut self) {
        self.tick_time_left = self.tick_interval;
    }

    /// Advance timers. Returns the summed damage of every damage-over-time
    /// tick that fell due during this step.
    ///
    /// Overshoot carries into the next interval, so ticks stay on schedule
    /// at any step size. A tick due within [`TIME_EPSILON`] of expiry still
    /// lands on the step the aura runs out.
    pub fn advance(&mut self, delta: f32) -> Option<i32> {
        if self.state != AuraState::Active {
            return None;
        }
        // Time past expiry never counts toward ticks
        let step = delta.max(0.0).min(self.duration_left);
        self.duration_left -= step;

        let mut tick = None;
        if let AuraKind::DamageOverTime { damage_each_tick } = self.kind {
            self.tick_time_left -= step;
            let mut ticks = 0;
            while self.tick_time_left <= TIME_EPSILON {
                self.tick_time_left += self.tick_interval;
                ticks += 1;
            }
            if ticks > 0 {
                tick = Some(damage_each_tick.saturating_mul(ticks));
            }
        }
        if self.duration_left <= TIME_EPSILON {
            self.duration_left = 0.0;
            self.state = AuraState::Expiring;
        }
        tick
    }

    pub fn source(&self) -> SkillKind {
        self.source
    }

    pub fn kind(&self) -> AuraKind {
        self.kind
    }

    pub fn damage_each_tick(&self) -> Option<i32> {
        match self.kind {
            AuraKind::DamageOverTime { damage_each_tick } => Some(damage_each_tick),
            AuraKind::Buff => None,
        }
    }

    pub fn duration_total(&self) -> f32 {
        self.duration_total
    }

    pub fn duration_left(&self) -> f32 {
        self.duration_left
    }

    pub fn tick_interval(&self) -> f32 {
        self.tick_interval
    }

    pub fn tick_time_left(&self) -> f32 {
        self.tick_time_left
    }

    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    /// The entity that applied this aura, if any. May no longer be alive.
    pub fn attacker(&self) -> Option<Entity> {
        self.attacker
    }

    pub fn pool(&self) -> Option<AuraPoolId> {
        self.pool
    }

    pub fn state(&self) -> AuraState {
        self.state
    }

    pub fn is_expired(&self) -> bool {
        self.state == AuraState::Expiring
    }

    pub(crate) fn matches(&self, source: SkillKind, attacker: Option<Entity>) -> bool {
        self.source == source && self.attacker == attacker
    }
}

/// Layout: source, timers and effects first, then the kind tag with any
/// kind-specific fields (`damage_each_tick` for damage over time).
/// Attacker handles and pool membership are runtime-only and not written.
impl Versioned for Aura {
    const TYPE_NAME: &'static str = "Aura";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        self.source.write(writer);
        writer.write_f32(self.duration_total);
        writer.write_f32(self.duration_left);
        writer.write_f32(self.tick_interval);
        writer.write_f32(self.tick_time_left);
        writer.write_len(self.effects.len());
        for effect in &self.effects {
            effect.write(writer);
        }
        match self.kind {
            AuraKind::Buff => writer.write_u8(0),
            AuraKind::DamageOverTime { damage_each_tick } => {
                writer.write_u8(1);
                writer.write_i32(damage_each_tick);
            }
        }
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let source = SkillKind::read(reader)?;
        let duration_total = reader.read_f32()?.max(0.0);
        let duration_left = reader.read_f32()?.max(0.0);
        let tick_interval = reader.read_f32()?.max(MIN_TICK_INTERVAL);
        let tick_time_left = reader.read_f32()?;
        let count = reader.read_len()?;
        let mut effects = Vec::with_capacity(count);
        for _ in 0..count {
            effects.push(StatusEffect::read(reader)?);
        }
        let kind = match reader.read_u8()? {
            0 => AuraKind::Buff,
            1 => AuraKind::DamageOverTime {
                damage_each_tick: reader.read_i32()?,
            },
            tag => {
                return Err(CodecError::InvalidTag {
                    what: "AuraKind",
                    tag: u32::from(tag),
                })
            }
        };
        let state = if duration_left > 0.0 {
            AuraState::Active
        } else {
            AuraState::Expiring
        };
        Ok(Self {
            source,
            kind,
            duration_total,
            duration_left,
            tick_interval,
            tick_time_left,
            effects,
            attacker: None,
            pool: None,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn burn(damage: i32) -> AuraSpec {
        AuraSpec::damage_over_time(SkillKind::Firewhirl, 3.0, 1.0, damage)
    }

    #[test]
    fn test_dot_ticks_each_interval_including_last() {
        let mut aura = Aura::from_spec(&burn(4), None);
        let mut total = 0;
        for _ in 0..30 {
            if let Some(damage) = aura.advance(0.25) {
                total += damage;
            }
            if aura.is_expired() {
                break;
            }
        }
        assert!(aura.is_expired());
        assert_eq!(total, 12);
        assert_eq!(aura.duration_left(), 0.0);
    }

    fn count_ticks(spec: &AuraSpec, delta: f32) -> (i32, u32) {
        let mut aura = Aura::from_spec(spec, None);
        let mut total = 0;
        let mut steps = 0;
        while !aura.is_expired() && steps < 10_000 {
            total += aura.advance(delta).unwrap_or(0);
            steps += 1;
        }
        (total, steps)
    }

    #[test]
    fn test_dot_tick_count_at_fixed_step() {
        let firewhirl = AuraSpec::damage_over_time(SkillKind::Firewhirl, 3.0, 1.0, 1);
        assert_eq!(count_ticks(&firewhirl, 1.0 / 60.0).0, 3);
        assert_eq!(count_ticks(&firewhirl, 0.3).0, 3);
        assert_eq!(count_ticks(&firewhirl, 0.3).1, 10);

        let firewall = AuraSpec::damage_over_time(SkillKind::Firewall, 2.0, 0.5, 1);
        assert_eq!(count_ticks(&firewall, 1.0 / 60.0).0, 4);
        assert_eq!(count_ticks(&firewall, 0.3).0, 4);
    }

    #[test]
    fn test_large_step_sums_due_ticks_until_expiry() {
        let mut aura = Aura::from_spec(&burn(5), None);
        assert_eq!(aura.advance(2.5), Some(10));
        assert!((aura.tick_time_left() - 0.5).abs() < 1e-5);
        // Only the tick at 3.0 is due; the rest of the step is past expiry
        assert_eq!(aura.advance(10.0), Some(5));
        assert!(aura.is_expired());
    }

    #[test]
    fn test_buff_never_deals_damage() {
        let spec = AuraSpec::buff(
            SkillKind::Haste,
            2.0,
            vec![StatusEffect::percent(EffectId::MoveSpeed, 30.0)],
        );
        let mut aura = Aura::from_spec(&spec, None);
        assert_eq!(aura.advance(5.0), None);
        assert!(aura.is_expired());
    }

    #[test]
    fn test_reset_duration_and_tick() {
        let mut aura = Aura::from_spec(&burn(2), None);
        aura.advance(0.5);
        aura.reset_duration();
        aura.reset_tick();
        assert_eq!(aura.duration_left(), 3.0);
        assert_eq!(aura.tick_time_left(), 1.0);
    }

    #[test]
    fn test_reinitialize_clears_state() {
        let attacker = Entity::from_raw(4, 2);
        let mut aura = Aura::blank(Some(AuraPoolId::from_raw(1)));
        aura.activate(&burn(9), Some(attacker));
        aura.reinitialize();
        assert_eq!(aura.state(), AuraState::Inactive);
        assert_eq!(aura.attacker(), None);
        assert_eq!(aura.damage_each_tick(), None);
        assert_eq!(aura.pool(), Some(AuraPoolId::from_raw(1)));
        assert!(aura.effects().is_empty());
    }

    #[test]
    fn test_codec_round_trip_random_values() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let spec = AuraSpec {
                source: SkillKind::Firewall,
                kind: if rng.gen_bool(0.5) {
                    AuraKind::DamageOverTime {
                        damage_each_tick: rng.gen_range(1..500),
                    }
                } else {
                    AuraKind::Buff
                },
                duration: rng.gen_range(0.5..20.0),
                tick_interval: rng.gen_range(0.1..2.0),
                effects: vec![StatusEffect::new(
                    EffectId::Defense,
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-50.0..50.0),
                )],
            };
            let mut aura = Aura::from_spec(&spec, None);
            aura.advance(rng.gen_range(0.0..0.4));

            let loaded = Aura::from_bytes(&aura.to_bytes()).unwrap();
            assert_eq!(loaded, aura);
        }
    }

    #[test]
    fn test_attacker_not_persisted() {
        let aura = Aura::from_spec(&burn(3), Some(Entity::from_raw(1, 0)));
        let loaded = Aura::from_bytes(&aura.to_bytes()).unwrap();
        assert_eq!(loaded.attacker(), None);
        assert_eq!(loaded.damage_each_tick(), Some(3));
    }
}
