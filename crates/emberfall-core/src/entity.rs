//! Generational entity handles
//!
//! Handles double as weak references: once an entity is despawned its slot
//! generation advances, so stale handles held by auras or projectiles simply
//! stop resolving instead of aliasing whatever reuses the slot.

use std::fmt;

/// A generational entity handle (slot index + generation).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Create an entity from raw parts (mainly for testing).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity slots and recycles them with a bumped generation.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    len: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entity, preferring a previously freed slot.
    pub fn allocate(&mut self) -> Entity {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            return Entity {
                index,
                generation: self.generations[slot],
            };
        }
        let index = u32::try_from(self.generations.len()).unwrap_or(u32::MAX);
        self.generations.push(0);
        self.alive.push(true);
        Entity {
            index,
            generation: 0,
        }
    }

    /// Free an entity slot. Returns `false` for stale or unknown handles.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = entity.index as usize;
        self.alive[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free_list.push(entity.index);
        self.len -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        slot < self.alive.len() && self.alive[slot] && self.generations[slot] == entity.generation
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Sparse-set storage keyed by entity handle.
///
/// Lookups check the stored handle, so a stale handle never reaches the
/// value of a newer entity occupying the same slot. Iteration order is the
/// dense order, which is insertion order until something is removed.
#[derive(Debug, Clone)]
pub struct EntityMap<T> {
    sparse: Vec<Option<usize>>,
    dense: Vec<T>,
    owners: Vec<Entity>,
}

impl<T> Default for EntityMap<T> {
    fn default() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            owners: Vec::new(),
        }
    }
}

impl<T> EntityMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for an entity. Returns the replaced value.
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        let slot = entity.index as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, None);
        }
        if let Some(dense_idx) = self.sparse[slot] {
            self.owners[dense_idx] = entity;
            return Some(std::mem::replace(&mut self.dense[dense_idx], value));
        }
        self.sparse[slot] = Some(self.dense.len());
        self.dense.push(value);
        self.owners.push(entity);
        None
    }

    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let dense_idx = (*self.sparse.get(entity.index as usize)?)?;
        (self.owners[dense_idx] == entity).then_some(dense_idx)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_index(entity).map(|i| &self.dense[i])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_index(entity).map(|i| &mut self.dense[i])
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Remove an entity's value with a swap-remove.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let dense_idx = self.dense_index(entity)?;
        self.sparse[entity.index as usize] = None;
        let last = self.dense.len() - 1;
        if dense_idx != last {
            self.dense.swap(dense_idx, last);
            self.owners.swap(dense_idx, last);
            let moved = self.owners[dense_idx];
            self.sparse[moved.index as usize] = Some(dense_idx);
        }
        self.owners.pop();
        self.dense.pop()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    /// Entities with a stored value, in dense order.
    pub fn entities(&self) -> &[Entity] {
        &self.owners
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}
