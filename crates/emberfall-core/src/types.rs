//! Spatial types shared by combat and scene code

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Dungeon floor index. Entities only interact with others on the same floor.
pub type Floor = u8;

/// Position and facing of an entity on a 2D floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub position: Vec2,
    /// Unit facing direction
    pub direction: Vec2,
    pub floor: Floor,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            direction: Vec2::Y,
            floor: 0,
        }
    }
}

impl Transform2D {
    /// Create a transform at the given position, facing down the +Y axis
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position, facing and floor
    pub fn new(position: Vec2, direction: Vec2, floor: Floor) -> Self {
        Self {
            position,
            direction: direction.try_normalize().unwrap_or(Vec2::Y),
            floor,
        }
    }

    /// Turn to face a target point. Facing is unchanged if the target is on top of us.
    pub fn look_at(&mut self, target: Vec2) {
        if let Some(dir) = (target - self.position).try_normalize() {
            self.direction = dir;
        }
    }

    /// Translate by the given offset
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Point `distance` units ahead of the current facing
    pub fn ahead(&self, distance: f32) -> Vec2 {
        self.position + self.direction * distance
    }

    pub fn distance_squared(&self, other: &Transform2D) -> f32 {
        self.position.distance_squared(other.position)
    }
}
