//! Projectile splitting - a destroyed projectile bursts into offspring
//!
//! Offspring inherit the parent's hit and destroy effects and carry
//! `split_count + 1`, so the chain stops at `max_continuous_splits`. They
//! also inherit the parent's hit list, so a target struck by the parent is
//! never struck again by its offspring.

use std::f32::consts::TAU;

use emberfall_core::{Transform2D, Vec2};
use rand::Rng;
use tracing::debug;

use super::{Projectile, ProjectileLaunch};
use crate::scene::Scene;
use crate::talent::SplitTalent;

/// Destroy effect granted by the split talent
#[derive(Debug, Clone, PartialEq)]
pub struct SplitEffect {
    pub talent: SplitTalent,
}

impl SplitEffect {
    pub fn new(talent: SplitTalent) -> Self {
        Self { talent }
    }

    /// Decide whether `parent` splits. The random roll comes last so the
    /// cheap checks never consume randomness.
    pub fn should_split(&self, parent: &Projectile, rng: &mut impl Rng) -> bool {
        let talent = &self.talent;
        if talent.level == 0 {
            return false;
        }
        if parent.travelled_distance_sq() < talent.required_distance_sq {
            return false;
        }
        if parent.split_count() >= talent.max_continuous_splits {
            return false;
        }
        let roll: f32 = rng.gen_range(1.0..=100.0);
        roll <= talent.proc_chance_percent
    }

    /// Build the offspring of `parent`: evenly spaced directions starting
    /// at a random angle, spawned `spawn_offset` away from the impact point.
    /// Destinations that are not walkable are skipped.
    pub fn offspring(
        &self,
        parent: &Projectile,
        scene: &dyn Scene,
        rng: &mut impl Rng,
    ) -> Vec<ProjectileLaunch> {
        let talent = &self.talent;
        let low = talent.split_min.min(talent.split_max);
        let high = talent.split_min.max(talent.split_max);
        let count = rng.gen_range(low..=high);
        if count == 0 {
            return Vec::new();
        }

        let start = rng.gen_range(0.0..TAU);
        let step = TAU / count as f32;
        let impact = parent.position();
        let floor = parent.floor();

        let mut launches = Vec::with_capacity(count as usize);
        for i in 0..count {
            let direction = Vec2::from_angle(start + step * i as f32);
            let position = impact + direction * talent.spawn_offset;
            if !scene.is_walkable(position, floor) {
                debug!("Split offspring at {:?} skipped, tile not walkable", position);
                continue;
            }
            let mut launch = parent.launch().clone();
            launch.transform = Transform2D::new(position, direction, floor);
            launch.split_count = parent.split_count() + 1;
            launch.already_hit = parent.already_hit().to_vec();
            launches.push(launch);
        }
        launches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projectile::tests::launch_at;
    use crate::projectile::{DestroyCause, DestroyEffect};
    use crate::scene::{OpenField, Scene, TileGrid};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn always_split(max_continuous_splits: u32, count: u32) -> SplitEffect {
        SplitEffect::new(SplitTalent {
            level: 1,
            proc_chance_percent: 100.0,
            split_min: count,
            split_max: count,
            max_continuous_splits,
            required_distance_sq: 1.0,
            spawn_offset: 0.5,
        })
    }

    fn flown(launch: ProjectileLaunch) -> Projectile {
        let mut projectile = Projectile::new(launch);
        projectile.advance(0.2, &OpenField);
        projectile
    }

    #[test]
    fn test_no_split_before_required_distance() {
        let effect = always_split(2, 3);
        let projectile = Projectile::new(launch_at(Vec2::new(50.0, 50.0), Vec2::X));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!effect.should_split(&projectile, &mut rng));
    }

    #[test]
    fn test_zero_chance_never_splits() {
        let mut effect = always_split(2, 3);
        effect.talent.proc_chance_percent = 0.0;
        let projectile = flown(launch_at(Vec2::new(50.0, 50.0), Vec2::X));
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert!(!effect.should_split(&projectile, &mut rng));
        }
    }

    #[test]
    fn test_offspring_evenly_spaced() {
        let effect = always_split(2, 4);
        let parent = flown(launch_at(Vec2::new(50.0, 50.0), Vec2::X));
        let mut rng = StdRng::seed_from_u64(3);
        let offspring = effect.offspring(&parent, &OpenField, &mut rng);
        assert_eq!(offspring.len(), 4);
        for pair in offspring.windows(2) {
            let dot = pair[0].transform.direction.dot(pair[1].transform.direction);
            assert!(dot.abs() < 1e-4);
        }
        for launch in &offspring {
            assert_eq!(launch.split_count, 1);
            let distance = launch.transform.position.distance(parent.position());
            assert!((distance - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_unwalkable_destinations_skipped() {
        let mut effect = always_split(2, 8);
        effect.talent.spawn_offset = 1.0;
        let mut grid = TileGrid::open(3, 3, 1.0, 1);
        grid.block_column(2, 0);
        let mut launch = launch_at(Vec2::new(1.5, 1.5), Vec2::X);
        launch.speed = 0.0;
        let parent = Projectile::new(launch);
        let mut rng = StdRng::seed_from_u64(4);

        // The blocked column covers a third of the circle around the impact
        let offspring = effect.offspring(&parent, &grid, &mut rng);
        assert!((5..=6).contains(&offspring.len()));
        for launch in &offspring {
            assert!(grid.is_walkable(launch.transform.position, 0));
        }
    }

    #[test]
    fn test_split_chain_capped() {
        let effect = always_split(2, 2);
        let mut launch = launch_at(Vec2::new(500.0, 500.0), Vec2::X);
        launch.max_range = None;
        launch.destroy_effects = vec![DestroyEffect::Split(effect.clone())];
        let mut rng = StdRng::seed_from_u64(5);

        let mut generation = vec![flown(launch)];
        let mut deepest = 0;
        for _ in 0..5 {
            let mut next = Vec::new();
            for mut parent in generation {
                parent.destroy(DestroyCause::MaxRange);
                for effect in parent.destroy_effects() {
                    let DestroyEffect::Split(split) = effect;
                    if split.should_split(&parent, &mut rng) {
                        for child in split.offspring(&parent, &OpenField, &mut rng) {
                            deepest = deepest.max(child.split_count);
                            next.push(flown(child));
                        }
                    }
                }
            }
            generation = next;
        }
        assert_eq!(deepest, 2);
        assert!(generation.is_empty());
    }
}
