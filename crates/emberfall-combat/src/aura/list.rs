//! Per-combatant collection of active auras

use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Entity, Versioned};
use tracing::debug;

use super::{Aura, AuraApplication, AuraPool, AuraSpec, EffectId, EffectValues};
use crate::skill::SkillKind;

/// A damage-over-time tick produced during [`AuraList::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotTick {
    pub source: SkillKind,
    pub attacker: Option<Entity>,
    pub damage: i32,
}

/// What happened to an aura list during one update
#[derive(Debug, Default)]
pub struct AuraUpdate {
    /// DoT ticks in list order
    pub ticks: Vec<DotTick>,
    /// Auras that ran out and left the list; hand them to
    /// [`AuraPools::release`](super::AuraPools::release)
    pub expired: Vec<Box<Aura>>,
}

/// Ordered set of active auras. At most one aura exists per
/// `(source, attacker)` pair; re-applying refreshes it.
#[derive(Debug, Default)]
pub struct AuraList {
    auras: Vec<Box<Aura>>,
    revision: u64,
}

impl AuraList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an aura, refreshing an existing one from the same source and
    /// attacker. With a pool the new instance is taken from it, otherwise it
    /// is allocated.
    pub fn apply(
        &mut self,
        spec: &AuraSpec,
        attacker: Option<Entity>,
        pool: Option<&mut AuraPool>,
    ) -> AuraApplication {
        if let Some(existing) = self
            .auras
            .iter_mut()
            .find(|aura| aura.matches(spec.source, attacker))
        {
            existing.refresh(spec);
            debug!("Refreshed {} aura", spec.source.name());
            return AuraApplication::Refreshed;
        }

        let mut aura = match pool {
            Some(pool) => match pool.acquire() {
                Some(aura) => aura,
                None => return AuraApplication::PoolExhausted,
            },
            None => Box::new(Aura::blank(None)),
        };
        aura.activate(spec, attacker);
        self.insert(aura);
        AuraApplication::Applied
    }

    /// Attach an already active aura, e.g. one read from a save
    pub fn insert(&mut self, aura: Box<Aura>) {
        self.auras.push(aura);
        self.revision += 1;
    }

    /// Aggregate every active aura's contribution to `effect`
    pub fn get_effect_values(&self, effect: EffectId) -> EffectValues {
        EffectValues::aggregate(
            self.auras
                .iter()
                .flat_map(|aura| aura.effects())
                .filter(|e| e.id == effect),
        )
    }

    /// Advance every aura. DoT ticks fire before expired auras are removed.
    pub fn update(&mut self, delta: f32) -> AuraUpdate {
        let mut result = AuraUpdate::default();
        for aura in &mut self.auras {
            if let Some(damage) = aura.advance(delta) {
                result.ticks.push(DotTick {
                    source: aura.source(),
                    attacker: aura.attacker(),
                    damage,
                });
            }
        }

        if self.auras.iter().any(|aura| aura.is_expired()) {
            let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.auras)
                .into_iter()
                .partition(|aura| aura.is_expired());
            self.auras = active;
            self.revision += 1;
            result.expired = expired;
        }
        result
    }

    /// Remove every aura that came from `source`
    pub fn remove_source(&mut self, source: SkillKind) -> Vec<Box<Aura>> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.auras)
            .into_iter()
            .partition(|aura| aura.source() == source);
        self.auras = kept;
        if !removed.is_empty() {
            self.revision += 1;
        }
        removed
    }

    /// Detach every aura (owner died or is despawning)
    pub fn drain_all(&mut self) -> Vec<Box<Aura>> {
        if !self.auras.is_empty() {
            self.revision += 1;
        }
        std::mem::take(&mut self.auras)
    }

    pub fn find(&self, source: SkillKind, attacker: Option<Entity>) -> Option<&Aura> {
        self.auras
            .iter()
            .map(|aura| aura.as_ref())
            .find(|aura| aura.matches(source, attacker))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aura> {
        self.auras.iter().map(|aura| aura.as_ref())
    }

    pub fn len(&self) -> usize {
        self.auras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auras.is_empty()
    }

    /// Bumped on every insert and removal
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Versioned for AuraList {
    const TYPE_NAME: &'static str = "AuraList";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        writer.write_len(self.auras.len());
        for aura in &self.auras {
            aura.serialize(writer);
        }
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let count = reader.read_len()?;
        let mut list = AuraList::new();
        for _ in 0..count {
            let aura = Aura::deserialize(reader)?;
            if !aura.is_expired() {
                list.insert(Box::new(aura));
            }
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::{AuraPoolId, ExhaustionPolicy, StatusEffect};

    fn buff(source: SkillKind, fixed: f32, percent: f32) -> AuraSpec {
        AuraSpec::buff(
            source,
            10.0,
            vec![StatusEffect::new(EffectId::Attack, fixed, percent)],
        )
    }

    #[test]
    fn test_effect_values_commutative() {
        let a = buff(SkillKind::Haste, 5.0, 10.0);
        let b = buff(SkillKind::Firewall, 3.0, 20.0);

        let mut first = AuraList::new();
        first.apply(&a, None, None);
        first.apply(&b, None, None);

        let mut second = AuraList::new();
        second.apply(&b, None, None);
        second.apply(&a, None, None);

        let x = first.get_effect_values(EffectId::Attack);
        let y = second.get_effect_values(EffectId::Attack);
        assert_eq!(x.fixed, 8.0);
        assert!((x.multiplier - 1.32).abs() < 1e-6);
        assert_eq!(x, y);
    }

    #[test]
    fn test_unrelated_effect_is_neutral() {
        let mut list = AuraList::new();
        list.apply(&buff(SkillKind::Haste, 5.0, 10.0), None, None);
        assert!(list.get_effect_values(EffectId::Defense).is_neutral());
    }

    #[test]
    fn test_dot_refresh_does_not_stack() {
        let attacker = Some(Entity::from_raw(3, 0));
        let spec = AuraSpec::damage_over_time(SkillKind::Firewhirl, 4.0, 1.0, 5);
        let mut pool = AuraPool::new(AuraPoolId::from_raw(0), 4, ExhaustionPolicy::Reject);
        let mut list = AuraList::new();

        assert_eq!(
            list.apply(&spec, attacker, Some(&mut pool)),
            AuraApplication::Applied
        );
        list.update(2.5);
        assert_eq!(
            list.apply(&spec, attacker, Some(&mut pool)),
            AuraApplication::Refreshed
        );

        assert_eq!(list.len(), 1);
        assert_eq!(pool.in_use(), 1);
        let aura = list.find(SkillKind::Firewhirl, attacker).unwrap();
        assert_eq!(aura.duration_left(), 4.0);
        assert_eq!(aura.tick_time_left(), 1.0);
    }

    #[test]
    fn test_refresh_recomputes_tick_damage() {
        let mut list = AuraList::new();
        list.apply(
            &AuraSpec::damage_over_time(SkillKind::Firewall, 3.0, 1.0, 5),
            None,
            None,
        );
        list.apply(
            &AuraSpec::damage_over_time(SkillKind::Firewall, 3.0, 1.0, 8),
            None,
            None,
        );
        let aura = list.find(SkillKind::Firewall, None).unwrap();
        assert_eq!(aura.damage_each_tick(), Some(8));
    }

    #[test]
    fn test_different_attackers_stack() {
        let spec = AuraSpec::damage_over_time(SkillKind::Firewhirl, 4.0, 1.0, 5);
        let mut list = AuraList::new();
        list.apply(&spec, Some(Entity::from_raw(1, 0)), None);
        list.apply(&spec, Some(Entity::from_raw(2, 0)), None);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_expired_auras_leave_and_return_to_pool() {
        let spec = AuraSpec::damage_over_time(SkillKind::Firewhirl, 1.0, 0.5, 2);
        let mut pool = AuraPool::new(AuraPoolId::from_raw(0), 1, ExhaustionPolicy::Reject);
        let mut list = AuraList::new();
        list.apply(&spec, None, Some(&mut pool));
        let revision = list.revision();

        let first = list.update(0.5);
        assert_eq!(first.ticks.len(), 1);
        assert!(first.expired.is_empty());

        let second = list.update(0.5);
        assert_eq!(second.ticks.len(), 1);
        assert_eq!(second.ticks[0].damage, 2);
        assert_eq!(second.expired.len(), 1);
        assert!(list.is_empty());
        assert!(list.revision() > revision);

        for aura in second.expired {
            pool.release(aura);
        }
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_pool_exhaustion_reported() {
        let mut pool = AuraPool::new(AuraPoolId::from_raw(0), 0, ExhaustionPolicy::Reject);
        let mut list = AuraList::new();
        let spec = AuraSpec::damage_over_time(SkillKind::Firewhirl, 1.0, 0.5, 2);
        assert_eq!(
            list.apply(&spec, None, Some(&mut pool)),
            AuraApplication::PoolExhausted
        );
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_source() {
        let mut list = AuraList::new();
        list.apply(&buff(SkillKind::Haste, 1.0, 0.0), None, None);
        list.apply(&buff(SkillKind::Firewall, 1.0, 0.0), None, None);
        let removed = list.remove_source(SkillKind::Haste);
        assert_eq!(removed.len(), 1);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_list_codec_keeps_state() {
        let mut list = AuraList::new();
        list.apply(&buff(SkillKind::Haste, 2.0, 15.0), None, None);
        list.apply(
            &AuraSpec::damage_over_time(SkillKind::Firewhirl, 3.0, 1.0, 7),
            Some(Entity::from_raw(0, 0)),
            None,
        );
        list.update(0.5);

        let loaded = AuraList::from_bytes(&list.to_bytes()).unwrap();
        assert_eq!(loaded.len(), 2);
        let dot = loaded.find(SkillKind::Firewhirl, None).unwrap();
        assert_eq!(dot.damage_each_tick(), Some(7));
        assert_eq!(dot.duration_left(), 2.5);
        assert_eq!(
            loaded.get_effect_values(EffectId::Attack),
            list.get_effect_values(EffectId::Attack)
        );
    }
}
