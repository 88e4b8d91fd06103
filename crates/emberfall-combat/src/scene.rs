//! Spatial queries the combat code needs from the level

use emberfall_core::{Floor, Vec2};

/// Tile walkability lookup provided by the level
pub trait Scene {
    fn is_walkable(&self, position: Vec2, floor: Floor) -> bool;
}

/// An unbounded floor where every position is walkable
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl Scene for OpenField {
    fn is_walkable(&self, _position: Vec2, _floor: Floor) -> bool {
        true
    }
}

/// Rectangular grid of square tiles, one layer per floor.
/// Tile `(0, 0)` covers `[0, tile_size)` on both axes.
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    /// `floors[floor][y * width + x]`
    floors: Vec<Vec<bool>>,
}

impl TileGrid {
    /// A grid with every tile walkable
    pub fn open(width: u32, height: u32, tile_size: f32, floor_count: usize) -> Self {
        let tiles = (width as usize) * (height as usize);
        Self {
            width,
            height,
            tile_size: tile_size.max(f32::EPSILON),
            floors: vec![vec![true; tiles]; floor_count.max(1)],
        }
    }

    /// Mark a tile blocked or walkable. Out-of-range tiles are ignored.
    pub fn set_walkable(&mut self, x: u32, y: u32, floor: Floor, walkable: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y * self.width + x) as usize;
        if let Some(tile) = self
            .floors
            .get_mut(floor as usize)
            .and_then(|tiles| tiles.get_mut(index))
        {
            *tile = walkable;
        }
    }

    /// Block an entire column, e.g. a wall
    pub fn block_column(&mut self, x: u32, floor: Floor) {
        for y in 0..self.height {
            self.set_walkable(x, y, floor, false);
        }
    }

    pub fn tile_at(&self, position: Vec2) -> Option<(u32, u32)> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        let x = (position.x / self.tile_size) as u32;
        let y = (position.y / self.tile_size) as u32;
        (x < self.width && y < self.height).then_some((x, y))
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.tile_size
    }
}

impl Scene for TileGrid {
    fn is_walkable(&self, position: Vec2, floor: Floor) -> bool {
        let Some((x, y)) = self.tile_at(position) else {
            return false;
        };
        self.floors
            .get(floor as usize)
            .and_then(|tiles| tiles.get((y * self.width + x) as usize))
            .copied()
            .unwrap_or(false)
    }
}
