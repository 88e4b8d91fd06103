//! Combat world - owner of every combatant, projectile and aura pool
//!
//! [`CombatWorld::update`] advances one frame in a fixed order:
//! auras and mana, projectiles and their hits, destroy effects, corpses,
//! world timers, then event dispatch.

use emberfall_core::{Entity, EntityAllocator, EntityMap, Transform2D};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::aura::{AuraApplication, AuraPoolId, AuraPools, AuraSpec, ExhaustionPolicy};
use crate::damage::{AttackDamageResult, DamageMethod, ReceiveType};
use crate::events::{CombatEvent, EventBus};
use crate::projectile::{
    DestroyCause, DestroyEffect, HitEffect, Projectile, ProjectileLaunch, ProjectileState,
};
use crate::scene::Scene;
use crate::skill::SkillKind;
use crate::stats::{EffectiveStats, Statable};
use crate::timers::WorldTimers;

/// Default collision radius of a combatant
pub const DEFAULT_COMBATANT_RADIUS: f32 = 0.4;

/// A fighter in the world
#[derive(Debug)]
pub struct Combatant {
    pub name: String,
    pub stats: Statable,
    pub transform: Transform2D,
    pub radius: f32,
}

impl Combatant {
    pub fn new(name: impl Into<String>, stats: Statable, transform: Transform2D) -> Self {
        Self {
            name: name.into(),
            stats,
            transform,
            radius: DEFAULT_COMBATANT_RADIUS,
        }
    }
}

/// A hit found while moving projectiles, resolved afterwards
struct PendingHit {
    projectile: Entity,
    target: Entity,
    owner: Entity,
    effects: Vec<HitEffect>,
    attacker_stats: EffectiveStats,
}

pub struct CombatWorld {
    entities: EntityAllocator,
    combatants: EntityMap<Combatant>,
    projectiles: EntityMap<Projectile>,
    pools: AuraPools,
    scene: Box<dyn Scene>,
    rng: StdRng,
    events: EventBus,
    timers: WorldTimers,
    elapsed: f64,
}

impl std::fmt::Debug for CombatWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatWorld")
            .field("combatants", &self.combatants.len())
            .field("projectiles", &self.projectiles.len())
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

impl CombatWorld {
    /// Create an empty world. The seed makes every roll reproducible.
    pub fn new(scene: Box<dyn Scene>, seed: u64) -> Self {
        Self {
            entities: EntityAllocator::new(),
            combatants: EntityMap::new(),
            projectiles: EntityMap::new(),
            pools: AuraPools::new(),
            scene,
            rng: StdRng::seed_from_u64(seed),
            events: EventBus::new(),
            timers: WorldTimers::new(),
            elapsed: 0.0,
        }
    }

    pub fn create_aura_pool(&mut self, capacity: usize, policy: ExhaustionPolicy) -> AuraPoolId {
        let id = self.pools.create(capacity, policy);
        info!("Created aura pool {:?} with {} instances ({:?})", id, capacity, policy);
        id
    }

    pub fn spawn_combatant(&mut self, combatant: Combatant) -> Entity {
        let entity = self.entities.allocate();
        debug!("Spawned {} as {}", combatant.name, entity);
        self.combatants.insert(entity, combatant);
        entity
    }

    /// Remove a combatant or projectile. Its auras go back to their pools.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if let Some(mut combatant) = self.combatants.remove(entity) {
            for aura in combatant.stats.auras_mut().drain_all() {
                self.pools.release(aura);
            }
        } else {
            self.projectiles.remove(entity);
        }
        self.entities.deallocate(entity)
    }

    pub fn spawn_projectile(&mut self, launch: ProjectileLaunch) -> Entity {
        let entity = self.entities.allocate();
        self.events.push(CombatEvent::ProjectileSpawned {
            projectile: entity,
            owner: launch.owner,
            generation: launch.split_count,
        });
        self.projectiles.insert(entity, Projectile::new(launch));
        entity
    }

    pub fn combatant(&self, entity: Entity) -> Option<&Combatant> {
        self.combatants.get(entity)
    }

    pub fn combatant_mut(&mut self, entity: Entity) -> Option<&mut Combatant> {
        self.combatants.get_mut(entity)
    }

    pub fn combatants(&self) -> impl Iterator<Item = (Entity, &Combatant)> {
        self.combatants.iter()
    }

    pub fn projectile(&self, entity: Entity) -> Option<&Projectile> {
        self.projectiles.get(entity)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = (Entity, &Projectile)> {
        self.projectiles.iter()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn pools(&self) -> &AuraPools {
        &self.pools
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    pub fn timers(&self) -> &WorldTimers {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut WorldTimers {
        &mut self.timers
    }

    /// Replace the timers, e.g. after loading a save
    pub fn set_timers(&mut self, timers: WorldTimers) {
        self.timers = timers;
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&CombatEvent) + 'static) {
        self.events.subscribe(callback);
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Both exist, `target` is alive and on the other side
    pub fn is_hostile_and_alive(&self, attacker: Entity, target: Entity) -> bool {
        match (self.combatants.get(attacker), self.combatants.get(target)) {
            (Some(a), Some(t)) => {
                t.stats.is_alive() && a.stats.faction.is_hostile_to(t.stats.faction)
            }
            _ => false,
        }
    }

    /// Edge-to-edge distance check on the same floor
    pub fn within_reach(&self, attacker: Entity, target: Entity, reach: f32) -> bool {
        match (self.combatants.get(attacker), self.combatants.get(target)) {
            (Some(a), Some(t)) => {
                let limit = reach + a.radius + t.radius;
                a.transform.floor == t.transform.floor
                    && a.transform.distance_squared(&t.transform) <= limit * limit
            }
            _ => false,
        }
    }

    /// Roll damage from a live attacker against a live target and apply it
    pub fn strike(
        &mut self,
        attacker: Entity,
        target: Entity,
        source: SkillKind,
        method: &DamageMethod,
    ) -> Option<AttackDamageResult> {
        let attacker_stats = self
            .combatants
            .get(attacker)
            .filter(|c| c.stats.is_alive())?
            .stats
            .effective();
        self.resolve_hit(Some(attacker), &attacker_stats, target, source, method)
    }

    fn resolve_hit(
        &mut self,
        attacker: Option<Entity>,
        attacker_stats: &EffectiveStats,
        target: Entity,
        source: SkillKind,
        method: &DamageMethod,
    ) -> Option<AttackDamageResult> {
        let defender = self.combatants.get(target).filter(|c| c.stats.is_alive())?;
        let result = method.get_damage_done(attacker_stats, &defender.stats.effective(), &mut self.rng);
        self.apply_damage(target, attacker, Some(source), result);
        Some(result)
    }

    /// Subtract hit points and report it. Emits `Died` on the killing blow.
    pub fn apply_damage(
        &mut self,
        target: Entity,
        attacker: Option<Entity>,
        source: Option<SkillKind>,
        result: AttackDamageResult,
    ) -> i32 {
        let Some(combatant) = self.combatants.get_mut(target) else {
            return 0;
        };
        if !combatant.stats.is_alive() {
            return 0;
        }
        let dealt = combatant.stats.take_damage(result.damage);
        let died = !combatant.stats.is_alive();
        self.events.push(CombatEvent::Damaged {
            target,
            attacker,
            source,
            amount: dealt,
            receive_type: result.receive_type,
        });
        if died {
            info!("{} was slain", combatant.name);
            self.events.push(CombatEvent::Died {
                entity: target,
                killer: attacker,
            });
        }
        dealt
    }

    /// Apply or refresh an aura on a live target
    pub fn apply_aura(
        &mut self,
        target: Entity,
        spec: &AuraSpec,
        attacker: Option<Entity>,
        pool: Option<AuraPoolId>,
    ) -> AuraApplication {
        let Some(combatant) = self.combatants.get_mut(target) else {
            return AuraApplication::TargetGone;
        };
        if !combatant.stats.is_alive() {
            return AuraApplication::TargetGone;
        }
        let pool = pool.and_then(|id| self.pools.get_mut(id));
        let outcome = combatant.stats.auras_mut().apply(spec, attacker, pool);
        match outcome {
            AuraApplication::Applied => self.events.push(CombatEvent::AuraApplied {
                target,
                source: spec.source,
            }),
            AuraApplication::Refreshed => self.events.push(CombatEvent::AuraRefreshed {
                target,
                source: spec.source,
            }),
            AuraApplication::PoolExhausted => {
                debug!("No free aura instance for {} on {}", spec.source, target)
            }
            AuraApplication::TargetGone => {}
        }
        outcome
    }

    pub(crate) fn skill_executed(&mut self, caster: Entity, skill: SkillKind) {
        self.events.push(CombatEvent::SkillExecuted { caster, skill });
    }

    /// Advance the simulation by `delta` seconds and return the events
    /// dispatched this frame
    pub fn update(&mut self, delta: f32) -> Vec<CombatEvent> {
        let delta = delta.max(0.0);
        self.elapsed += f64::from(delta);

        self.update_auras(delta);
        let destroyed = self.update_projectiles(delta);
        self.run_destroy_effects(destroyed);
        self.clear_corpses();

        for name in self.timers.update(delta) {
            debug!("World timer '{}' elapsed", name);
            self.events.push(CombatEvent::TimerElapsed { name });
        }
        self.events.dispatch()
    }

    fn update_auras(&mut self, delta: f32) {
        let entities = self.combatants.entities().to_vec();
        for entity in entities {
            let Some(combatant) = self.combatants.get_mut(entity) else {
                continue;
            };
            if !combatant.stats.is_alive() {
                continue;
            }
            combatant.stats.regen(delta);
            let update = combatant.stats.auras_mut().update(delta);

            for tick in update.ticks {
                self.apply_damage(
                    entity,
                    tick.attacker,
                    Some(tick.source),
                    AttackDamageResult {
                        damage: tick.damage,
                        receive_type: ReceiveType::Hit,
                    },
                );
            }
            for aura in update.expired {
                self.events.push(CombatEvent::AuraExpired {
                    target: entity,
                    source: aura.source(),
                });
                self.pools.release(aura);
            }
        }
    }

    /// Move every projectile, resolve hits, and remove the destroyed ones
    fn update_projectiles(&mut self, delta: f32) -> Vec<(Entity, Projectile)> {
        let mut pending = Vec::new();
        for (entity, projectile) in self.projectiles.iter_mut() {
            if projectile.advance(delta, self.scene.as_ref()).is_some() {
                continue;
            }

            let mut candidates: Vec<(f32, Entity)> = self
                .combatants
                .iter()
                .filter(|(target, c)| {
                    c.stats.is_alive()
                        && c.stats.faction.is_hostile_to(projectile.faction())
                        && c.transform.floor == projectile.floor()
                        && !projectile.has_hit(*target)
                })
                .filter_map(|(target, c)| {
                    let limit = c.radius + projectile.radius();
                    let distance_sq = c.transform.position.distance_squared(projectile.position());
                    (distance_sq <= limit * limit).then_some((distance_sq, target))
                })
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            for (_, target) in candidates {
                projectile.register_hit(target);
                pending.push(PendingHit {
                    projectile: entity,
                    target,
                    owner: projectile.owner(),
                    effects: projectile.hit_effects().to_vec(),
                    attacker_stats: *projectile.attacker_stats(),
                });
                if !projectile.pierces() {
                    projectile.destroy(DestroyCause::HitTarget(target));
                    break;
                }
            }
        }

        for hit in pending {
            self.events.push(CombatEvent::ProjectileHit {
                projectile: hit.projectile,
                target: hit.target,
            });
            for effect in &hit.effects {
                match effect {
                    HitEffect::Damage { source, method } => {
                        self.resolve_hit(
                            Some(hit.owner),
                            &hit.attacker_stats,
                            hit.target,
                            *source,
                            method,
                        );
                    }
                    HitEffect::Burn { spec, pool } => {
                        self.apply_aura(hit.target, spec, Some(hit.owner), *pool);
                    }
                }
            }
        }

        let finished: Vec<Entity> = self
            .projectiles
            .iter()
            .filter(|(_, p)| !p.is_flying())
            .map(|(entity, _)| entity)
            .collect();
        let mut destroyed = Vec::with_capacity(finished.len());
        for entity in finished {
            if let Some(projectile) = self.projectiles.remove(entity) {
                self.entities.deallocate(entity);
                destroyed.push((entity, projectile));
            }
        }
        destroyed
    }

    fn run_destroy_effects(&mut self, destroyed: Vec<(Entity, Projectile)>) {
        for (entity, projectile) in destroyed {
            let cause = match projectile.state() {
                ProjectileState::Destroyed(cause) => cause,
                ProjectileState::Flying => continue,
            };
            self.events.push(CombatEvent::ProjectileDestroyed {
                projectile: entity,
                position: projectile.position(),
                cause,
            });

            for effect in projectile.destroy_effects() {
                match effect {
                    DestroyEffect::Split(split) => {
                        if !split.should_split(&projectile, &mut self.rng) {
                            continue;
                        }
                        let offspring =
                            split.offspring(&projectile, self.scene.as_ref(), &mut self.rng);
                        self.events.push(CombatEvent::ProjectileSplit {
                            parent: entity,
                            offspring: offspring.len(),
                        });
                        for launch in offspring {
                            self.spawn_projectile(launch);
                        }
                    }
                }
            }
        }
    }

    /// Dead combatants keep their body but lose every aura
    fn clear_corpses(&mut self) {
        for (_, combatant) in self.combatants.iter_mut() {
            if combatant.stats.is_alive() || combatant.stats.auras().is_empty() {
                continue;
            }
            for aura in combatant.stats.auras_mut().drain_all() {
                self.pools.release(aura);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectile::SplitEffect;
    use crate::scene::{OpenField, TileGrid};
    use crate::stats::{CombatStats, Faction};
    use crate::talent::SplitTalent;
    use emberfall_core::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sure_hit_stats() -> CombatStats {
        CombatStats {
            hit_chance: 1.0,
            crit_chance: 0.0,
            ..CombatStats::default()
        }
    }

    fn spawn(world: &mut CombatWorld, faction: Faction, position: Vec2) -> Entity {
        world.spawn_combatant(Combatant::new(
            "dummy",
            Statable::new(sure_hit_stats(), faction),
            Transform2D::from_position(position),
        ))
    }

    fn bolt(owner: Entity, position: Vec2, direction: Vec2) -> ProjectileLaunch {
        ProjectileLaunch {
            owner,
            source: SkillKind::Firewhirl,
            faction: Faction::Player,
            transform: Transform2D::new(position, direction, 0),
            speed: 10.0,
            max_range: Some(20.0),
            radius: 0.3,
            lifetime: None,
            pierce: false,
            hit_effects: vec![HitEffect::Damage {
                source: SkillKind::Firewhirl,
                method: DamageMethod::default(),
            }],
            destroy_effects: Vec::new(),
            split_count: 0,
            already_hit: Vec::new(),
            attacker_stats: EffectiveStats {
                hit_chance: 1.0,
                crit_chance: 0.0,
                attack: 12.0,
                ..EffectiveStats::default()
            },
        }
    }

    #[test]
    fn test_dot_damages_and_returns_to_pool() {
        let mut world = CombatWorld::new(Box::new(OpenField), 1);
        let pool = world.create_aura_pool(2, ExhaustionPolicy::Reject);
        let player = spawn(&mut world, Faction::Player, Vec2::ZERO);
        let monster = spawn(&mut world, Faction::Monster, Vec2::new(5.0, 0.0));

        let burn = AuraSpec::damage_over_time(SkillKind::Firewall, 2.0, 0.5, 3);
        assert_eq!(
            world.apply_aura(monster, &burn, Some(player), Some(pool)),
            AuraApplication::Applied
        );
        assert_eq!(world.pools().get(pool).unwrap().available(), 1);

        for _ in 0..8 {
            world.update(0.25);
        }
        assert_eq!(world.combatant(monster).unwrap().stats.stats.hp, 88);
        assert!(world.combatant(monster).unwrap().stats.auras().is_empty());
        assert_eq!(world.pools().get(pool).unwrap().available(), 2);
    }

    #[test]
    fn test_aura_on_dead_target_is_noop() {
        let mut world = CombatWorld::new(Box::new(OpenField), 1);
        let monster = spawn(&mut world, Faction::Monster, Vec2::ZERO);
        world.combatant_mut(monster).unwrap().stats.take_damage(1000);
        let burn = AuraSpec::damage_over_time(SkillKind::Firewall, 2.0, 0.5, 3);
        assert_eq!(
            world.apply_aura(monster, &burn, None, None),
            AuraApplication::TargetGone
        );
        assert!(world.combatant(monster).unwrap().stats.auras().is_empty());
    }

    #[test]
    fn test_projectile_hits_first_hostile() {
        let mut world = CombatWorld::new(Box::new(OpenField), 2);
        let player = spawn(&mut world, Faction::Player, Vec2::ZERO);
        let monster = spawn(&mut world, Faction::Monster, Vec2::new(2.0, 0.0));
        world.spawn_projectile(bolt(player, Vec2::new(0.5, 0.0), Vec2::X));

        let mut events = Vec::new();
        for _ in 0..10 {
            events.extend(world.update(0.05));
        }
        assert_eq!(world.projectile_count(), 0);
        // 12 attack - 5 defense * 0.5
        assert_eq!(world.combatant(monster).unwrap().stats.stats.hp, 90);
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::ProjectileDestroyed {
                cause: DestroyCause::HitTarget(t),
                ..
            } if *t == monster
        )));
        // The caster's own faction is never hit
        assert_eq!(world.combatant(player).unwrap().stats.stats.hp, 100);
    }

    #[test]
    fn test_projectile_blocked_by_wall() {
        let mut grid = TileGrid::open(10, 10, 1.0, 1);
        grid.block_column(4, 0);
        let mut world = CombatWorld::new(Box::new(grid), 3);
        let player = spawn(&mut world, Faction::Player, Vec2::new(0.5, 0.5));
        let monster = spawn(&mut world, Faction::Monster, Vec2::new(8.5, 0.5));
        world.spawn_projectile(bolt(player, Vec2::new(1.0, 0.5), Vec2::X));

        let mut destroyed = None;
        for _ in 0..20 {
            for event in world.update(0.05) {
                if let CombatEvent::ProjectileDestroyed { cause, .. } = event {
                    destroyed = Some(cause);
                }
            }
        }
        assert_eq!(destroyed, Some(DestroyCause::Blocked));
        assert_eq!(world.combatant(monster).unwrap().stats.stats.hp, 100);
    }

    #[test]
    fn test_piercing_flame_hits_each_target_once() {
        let mut world = CombatWorld::new(Box::new(OpenField), 4);
        let player = spawn(&mut world, Faction::Player, Vec2::ZERO);
        let a = spawn(&mut world, Faction::Monster, Vec2::new(3.0, 0.0));
        let b = spawn(&mut world, Faction::Monster, Vec2::new(3.0, 0.5));
        let mut flame = bolt(player, Vec2::new(3.0, 0.25), Vec2::X);
        flame.speed = 0.0;
        flame.max_range = None;
        flame.lifetime = Some(1.0);
        flame.pierce = true;
        world.spawn_projectile(flame);

        for _ in 0..10 {
            world.update(0.05);
        }
        assert_eq!(world.combatant(a).unwrap().stats.stats.hp, 90);
        assert_eq!(world.combatant(b).unwrap().stats.stats.hp, 90);
        assert_eq!(world.projectile_count(), 1);
        world.update(0.6);
        assert_eq!(world.projectile_count(), 0);
    }

    #[test]
    fn test_split_through_world_update() {
        let mut world = CombatWorld::new(Box::new(OpenField), 6);
        let player = spawn(&mut world, Faction::Player, Vec2::ZERO);
        let monster = spawn(&mut world, Faction::Monster, Vec2::new(3.0, 0.0));

        let burn = AuraSpec::damage_over_time(SkillKind::Firewhirl, 3.0, 1.0, 2);
        let mut whirl = bolt(player, Vec2::new(0.5, 0.0), Vec2::X);
        whirl.hit_effects.push(HitEffect::Burn {
            spec: burn.clone(),
            pool: None,
        });
        whirl.destroy_effects = vec![DestroyEffect::Split(SplitEffect::new(SplitTalent {
            level: 1,
            proc_chance_percent: 100.0,
            split_min: 3,
            split_max: 3,
            max_continuous_splits: 1,
            required_distance_sq: 1.0,
            spawn_offset: 0.5,
        }))];
        let parent = world.spawn_projectile(whirl);

        // Fourth step reaches the monster 2.0 units out
        let mut events = Vec::new();
        for _ in 0..4 {
            events.extend(world.update(0.05));
        }
        assert!(events.contains(&CombatEvent::ProjectileSplit {
            parent,
            offspring: 3,
        }));
        assert_eq!(world.projectile_count(), 3);
        for (_, child) in world.projectiles() {
            assert_eq!(child.split_count(), 1);
            assert_eq!(child.already_hit(), &[monster]);
            assert!(child
                .hit_effects()
                .iter()
                .any(|effect| matches!(effect, HitEffect::Burn { spec, .. } if *spec == burn)));
        }

        // Offspring spawn inside the monster's reach but never strike it again
        for _ in 0..10 {
            events.extend(world.update(0.05));
        }
        assert_eq!(world.combatant(monster).unwrap().stats.stats.hp, 90);

        for _ in 0..60 {
            events.extend(world.update(0.05));
        }
        assert_eq!(world.projectile_count(), 0);
        let count = |pred: fn(&CombatEvent) -> bool| events.iter().filter(|e| pred(e)).count();
        assert_eq!(count(|e| matches!(e, CombatEvent::ProjectileHit { .. })), 1);
        assert_eq!(count(|e| matches!(e, CombatEvent::ProjectileSplit { .. })), 1);
        assert_eq!(
            count(|e| matches!(e, CombatEvent::ProjectileSpawned { generation: 1, .. })),
            3
        );
        assert_eq!(count(|e| matches!(e, CombatEvent::ProjectileDestroyed { .. })), 4);
    }

    #[test]
    fn test_kill_emits_died_and_clears_auras() {
        let mut world = CombatWorld::new(Box::new(OpenField), 5);
        let pool = world.create_aura_pool(1, ExhaustionPolicy::Reject);
        let player = spawn(&mut world, Faction::Player, Vec2::ZERO);
        let monster = spawn(&mut world, Faction::Monster, Vec2::new(1.0, 0.0));
        let burn = AuraSpec::damage_over_time(SkillKind::Firewhirl, 10.0, 1.0, 1);
        world.apply_aura(monster, &burn, Some(player), Some(pool));

        world.apply_damage(
            monster,
            Some(player),
            None,
            AttackDamageResult {
                damage: 500,
                receive_type: ReceiveType::Crit,
            },
        );
        let events = world.update(0.1);
        assert!(events.contains(&CombatEvent::Died {
            entity: monster,
            killer: Some(player),
        }));
        assert!(world.combatant(monster).unwrap().stats.auras().is_empty());
        assert_eq!(world.pools().get(pool).unwrap().available(), 1);
    }

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let mut world = CombatWorld::new(Box::new(OpenField), 6);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        world.subscribe(move |event| {
            if let CombatEvent::TimerElapsed { name } = event {
                log.borrow_mut().push(name.clone());
            }
        });
        world
            .timers_mut()
            .register(crate::timers::WorldTimer::new(
                "a",
                0.5,
                crate::timers::TimerType::Once,
            ))
            .unwrap();
        world
            .timers_mut()
            .register(crate::timers::WorldTimer::new(
                "b",
                0.5,
                crate::timers::TimerType::Once,
            ))
            .unwrap();
        world.update(0.5);
        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_despawn_releases_auras() {
        let mut world = CombatWorld::new(Box::new(OpenField), 7);
        let pool = world.create_aura_pool(1, ExhaustionPolicy::Reject);
        let monster = spawn(&mut world, Faction::Monster, Vec2::ZERO);
        let burn = AuraSpec::damage_over_time(SkillKind::Firewhirl, 10.0, 1.0, 1);
        world.apply_aura(monster, &burn, None, Some(pool));
        assert!(world.despawn(monster));
        assert!(world.combatant(monster).is_none());
        assert_eq!(world.pools().get(pool).unwrap().available(), 1);
    }
}
