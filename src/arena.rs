//! Headless arena: one caster against a ring of melee monsters
//!
//! Drives the combat world with a small scripted brain for each side and
//! tallies the events into an [`ArenaReport`].

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use emberfall_combat::{
    AuraList, CombatEvent, CombatStats, CombatWorld, Combatant, Cooldown, Faction, ReceiveType,
    SkillBook, SkillKind, SkillTarget, Statable, TalentTree, TileGrid, TimerType, WorldTimer,
    WorldTimers,
};
use emberfall_core::{Entity, Transform2D, Vec2, Versioned};
use serde::Serialize;
use tracing::{debug, info};

use crate::settings::Settings;

const ARENA_SIZE: u32 = 24;
const MONSTER_RING_RADIUS: f32 = 7.0;
const MONSTER_SPEED: f32 = 1.8;
/// Firewall is only worth casting on monsters closer than this
const FIREWALL_RANGE: f32 = 4.0;
const SWORD_RANGE: f32 = 1.5;
/// Shortest pause between two actions of the same actor
const ACTION_RECOVERY: f32 = 0.6;
pub const RESTOCK_TIMER: &str = "merchant_restock";

/// Summary of one arena run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArenaReport {
    pub seed: u64,
    pub simulated_seconds: f64,
    pub steps: u64,
    pub casts: BTreeMap<SkillKind, u32>,
    pub damage_dealt: i64,
    pub damage_taken: i64,
    pub hits: u32,
    pub crits: u32,
    pub resisted: u32,
    pub missed: u32,
    pub projectiles_spawned: u32,
    pub splits: u32,
    pub split_offspring: u32,
    pub auras_applied: u32,
    pub auras_refreshed: u32,
    pub auras_expired: u32,
    pub monsters_slain: u32,
    pub timers_elapsed: u32,
    pub player_alive: bool,
    pub player_hp: i32,
}

impl ArenaReport {
    fn record(&mut self, event: &CombatEvent, player: Entity) {
        match event {
            CombatEvent::Damaged {
                target,
                amount,
                receive_type,
                ..
            } => {
                if *target == player {
                    self.damage_taken += i64::from(*amount);
                } else {
                    self.damage_dealt += i64::from(*amount);
                }
                match receive_type {
                    ReceiveType::Hit => self.hits += 1,
                    ReceiveType::Crit => self.crits += 1,
                    ReceiveType::Resisted => self.resisted += 1,
                    ReceiveType::Missed => self.missed += 1,
                }
            }
            CombatEvent::SkillExecuted { caster, skill } if *caster == player => {
                *self.casts.entry(*skill).or_default() += 1;
            }
            CombatEvent::ProjectileSpawned { .. } => self.projectiles_spawned += 1,
            CombatEvent::ProjectileSplit { offspring, .. } => {
                self.splits += 1;
                self.split_offspring += *offspring as u32;
            }
            CombatEvent::AuraApplied { .. } => self.auras_applied += 1,
            CombatEvent::AuraRefreshed { .. } => self.auras_refreshed += 1,
            CombatEvent::AuraExpired { .. } => self.auras_expired += 1,
            CombatEvent::Died { entity, .. } if *entity != player => self.monsters_slain += 1,
            CombatEvent::TimerElapsed { .. } => self.timers_elapsed += 1,
            _ => {}
        }
    }
}

/// A combatant with its skills and the recovery after each action
struct Actor {
    entity: Entity,
    book: SkillBook,
    recovery: Cooldown,
}

impl Actor {
    fn new(entity: Entity, book: SkillBook) -> Self {
        Self {
            entity,
            book,
            recovery: Cooldown::new(ACTION_RECOVERY),
        }
    }

    fn update(&mut self, delta: f32, world: &CombatWorld) {
        self.recovery.tick(delta);
        if let Some(combatant) = world.combatant(self.entity) {
            self.book.update(delta, combatant.stats.auras());
        }
    }

    /// Try each planned cast in order until one succeeds
    fn act(&mut self, plan: &[(SkillKind, SkillTarget)], world: &mut CombatWorld) -> bool {
        if !self.recovery.is_ready() {
            return false;
        }
        for (kind, target) in plan {
            if !self.book.knows(*kind) || !self.book.cast(*kind, *target, world) {
                continue;
            }
            let cast_time = self.book.skill(*kind).map_or(0.0, |s| s.cast_time());
            self.recovery.set_total_time(cast_time.max(ACTION_RECOVERY));
            self.recovery.start();
            debug!("{} cast {} at {:?}", self.entity, kind, target);
            return true;
        }
        false
    }
}

pub struct Arena {
    world: CombatWorld,
    talents: TalentTree,
    player: Actor,
    monsters: Vec<Actor>,
    report: ArenaReport,
}

impl Arena {
    /// Build the arena. `player_stats` restores a saved player; otherwise a
    /// fresh one is created.
    pub fn new(
        settings: &Settings,
        talents: TalentTree,
        player_stats: Option<Statable>,
        timers: Option<WorldTimers>,
    ) -> Result<Self> {
        let mut grid = TileGrid::open(ARENA_SIZE, ARENA_SIZE, 1.0, 1);
        for edge in 0..ARENA_SIZE {
            grid.set_walkable(edge, 0, 0, false);
            grid.set_walkable(edge, ARENA_SIZE - 1, 0, false);
            grid.set_walkable(0, edge, 0, false);
            grid.set_walkable(ARENA_SIZE - 1, edge, 0, false);
        }
        // A pillar in each quadrant
        for (x, y) in [(7, 7), (16, 7), (7, 16), (16, 16)] {
            grid.set_walkable(x, y, 0, false);
        }

        let seed = settings.simulation.rng_seed;
        let mut world = CombatWorld::new(Box::new(grid), seed);
        let aura_pool = world.create_aura_pool(
            settings.combat.aura_pool_capacity,
            settings.combat.pool_exhaustion,
        );

        let center = Vec2::splat(ARENA_SIZE as f32 / 2.0);
        let player_stats = player_stats
            .unwrap_or_else(|| Statable::new(CombatStats::default(), Faction::Player));
        let player = world.spawn_combatant(Combatant::new(
            "hero",
            player_stats,
            Transform2D::from_position(center),
        ));

        let mut player_book = SkillBook::new(player, Some(aura_pool));
        let player_auras = world
            .combatant(player)
            .map(|c| c.stats.auras())
            .context("Player is missing from the world")?;
        player_book
            .sync_with_talents(&talents, player_auras)
            .context("Failed to build the player's skills")?;

        let count = settings.combat.monster_count;
        let mut monsters = Vec::with_capacity(count as usize);
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count.max(1) as f32;
            let position = center + Vec2::from_angle(angle) * MONSTER_RING_RADIUS;
            let stats = CombatStats {
                max_hp: 60,
                hp: 60,
                attack: 6.0,
                defense: 2.0,
                mana_regen: 0.0,
                ..CombatStats::default()
            };
            let entity = world.spawn_combatant(Combatant::new(
                format!("slime #{}", i + 1),
                Statable::new(stats, Faction::Monster),
                Transform2D::from_position(position),
            ));
            let mut book = SkillBook::new(entity, None);
            book.sync_with_talents(&TalentTree::new(), &AuraList::new())
                .context("Failed to build monster skills")?;
            monsters.push(Actor::new(entity, book));
        }

        match timers {
            Some(timers) => world.set_timers(timers),
            None => {
                world
                    .timers_mut()
                    .register(WorldTimer::new(RESTOCK_TIMER, 10.0, TimerType::Repeating))
                    .context("Failed to register the restock timer")?;
            }
        }

        info!(
            "Arena ready: {} monsters, {} player skills, seed {}",
            monsters.len(),
            player_book.len(),
            seed
        );

        Ok(Self {
            world,
            talents,
            player: Actor::new(player, player_book),
            monsters,
            report: ArenaReport {
                seed,
                ..ArenaReport::default()
            },
        })
    }

    /// Advance one fixed step
    pub fn step(&mut self, delta: f32) {
        self.player.update(delta, &self.world);
        for monster in &mut self.monsters {
            monster.update(delta, &self.world);
        }

        self.player_turn();
        self.monster_turn(delta);

        let player = self.player.entity;
        for event in self.world.update(delta) {
            self.report.record(&event, player);
        }
        self.report.steps += 1;
        self.report.simulated_seconds = self.world.elapsed();
    }

    /// Whether both sides still have someone standing
    pub fn is_running(&self) -> bool {
        self.is_alive(self.player.entity) && self.monsters.iter().any(|m| self.is_alive(m.entity))
    }

    fn is_alive(&self, entity: Entity) -> bool {
        self.world
            .combatant(entity)
            .is_some_and(|c| c.stats.is_alive())
    }

    /// Nearest living monster and its distance
    fn nearest_monster(&self) -> Option<(Entity, f32)> {
        let player = self.world.combatant(self.player.entity)?;
        self.monsters
            .iter()
            .filter_map(|actor| {
                let monster = self.world.combatant(actor.entity)?;
                monster.stats.is_alive().then(|| {
                    (
                        actor.entity,
                        monster.transform.distance_squared(&player.transform).sqrt(),
                    )
                })
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn player_turn(&mut self) {
        if !self.is_alive(self.player.entity) {
            return;
        }
        let Some((target, distance)) = self.nearest_monster() else {
            return;
        };

        let mut plan = vec![(SkillKind::Haste, SkillTarget::Caster)];
        if distance <= FIREWALL_RANGE {
            plan.push((SkillKind::Firewall, SkillTarget::Entity(target)));
        }
        plan.push((SkillKind::Firewhirl, SkillTarget::Entity(target)));
        if distance <= SWORD_RANGE + 1.0 {
            plan.push((SkillKind::Swordstrike, SkillTarget::Entity(target)));
        }

        self.player.act(&plan, &mut self.world);
    }

    fn monster_turn(&mut self, delta: f32) {
        let Some(player_position) = self
            .world
            .combatant(self.player.entity)
            .filter(|c| c.stats.is_alive())
            .map(|c| c.transform.position)
        else {
            return;
        };
        let plan = [(SkillKind::Swordstrike, SkillTarget::Entity(self.player.entity))];

        for actor in &mut self.monsters {
            let entity = actor.entity;
            if actor.act(&plan, &mut self.world) || !actor.recovery.is_ready() {
                continue;
            }

            let Some(monster) = self.world.combatant(entity) else {
                continue;
            };
            if !monster.stats.is_alive() {
                continue;
            }
            let speed = MONSTER_SPEED * monster.stats.effective().move_speed;
            let mut transform = monster.transform;
            transform.look_at(player_position);
            let next = transform.ahead(speed * delta);
            if self.world.scene().is_walkable(next, transform.floor) {
                transform.position = next;
            }
            if let Some(monster) = self.world.combatant_mut(entity) {
                monster.transform = transform;
            }
        }
    }

    /// Final report with the player's state filled in
    pub fn finish(mut self) -> ArenaReport {
        if let Some(player) = self.world.combatant(self.player.entity) {
            self.report.player_alive = player.stats.is_alive();
            self.report.player_hp = player.stats.stats.hp;
        }
        self.report
    }

    pub fn talents(&self) -> &TalentTree {
        &self.talents
    }

    pub fn timers(&self) -> &WorldTimers {
        self.world.timers()
    }

    pub fn elapsed(&self) -> f64 {
        self.world.elapsed()
    }

    /// Detached copy of the player's stats and auras, as a save stores them
    pub fn player_snapshot(&self) -> Result<Statable> {
        let player = self
            .world
            .combatant(self.player.entity)
            .context("Player is missing from the world")?;
        Statable::from_bytes(&player.stats.to_bytes()).context("Failed to snapshot player stats")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings(seed: u64) -> Settings {
        let mut settings = Settings::default();
        settings.simulation.rng_seed = seed;
        settings.combat.monster_count = 4;
        settings
    }

    fn run(settings: &Settings, seconds: f32) -> ArenaReport {
        let mut arena = Arena::new(settings, settings.talent_tree(), None, None).unwrap();
        let dt = settings.simulation.fixed_timestep;
        let steps = (seconds / dt) as u32;
        for _ in 0..steps {
            if !arena.is_running() {
                break;
            }
            arena.step(dt);
        }
        arena.finish()
    }

    #[test]
    fn test_arena_produces_combat() {
        let report = run(&quick_settings(3), 12.0);
        assert!(report.casts.get(&SkillKind::Firewhirl).copied().unwrap_or(0) > 0);
        assert!(report.projectiles_spawned > 0);
        assert!(report.damage_dealt > 0);
        assert_eq!(report.casts.get(&SkillKind::Haste), Some(&1));
    }

    #[test]
    fn test_same_seed_same_report() {
        let settings = quick_settings(99);
        assert_eq!(run(&settings, 5.0), run(&settings, 5.0));
    }

    #[test]
    fn test_snapshot_restores_player() {
        let settings = quick_settings(5);
        let mut arena = Arena::new(&settings, settings.talent_tree(), None, None).unwrap();
        for _ in 0..120 {
            arena.step(settings.simulation.fixed_timestep);
        }
        let snapshot = arena.player_snapshot().unwrap();
        let timers = arena.timers().clone();
        let restored =
            Arena::new(&settings, settings.talent_tree(), Some(snapshot), Some(timers)).unwrap();
        assert_eq!(
            restored.world.combatant(restored.player.entity).unwrap().stats.stats,
            arena.world.combatant(arena.player.entity).unwrap().stats.stats
        );
        assert_eq!(restored.timers(), arena.timers());
    }
}
