//! Aura pools - pre-built aura instances recycled between casts
//!
//! Frequent procs (burning from every fire hit) would otherwise allocate an
//! aura per application. A pool hands out boxed auras from a free list; the
//! box travels into an [`AuraList`](super::AuraList) and comes back through
//! [`AuraPools::release`] when the aura expires or its owner dies. Release is
//! the only place an instance is re-initialized.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Aura;

/// Identifies a pool inside [`AuraPools`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuraPoolId(u32);

impl AuraPoolId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// What `acquire` does when every instance is handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhaustionPolicy {
    /// Refuse the application until an instance comes back
    #[default]
    Reject,
    /// Build another instance and raise the capacity
    Grow,
}

/// Fixed-capacity free list of aura instances
#[derive(Debug)]
pub struct AuraPool {
    id: AuraPoolId,
    free: Vec<Box<Aura>>,
    capacity: usize,
    policy: ExhaustionPolicy,
}

impl AuraPool {
    pub fn new(id: AuraPoolId, capacity: usize, policy: ExhaustionPolicy) -> Self {
        let free = (0..capacity)
            .map(|_| Box::new(Aura::blank(Some(id))))
            .collect();
        Self {
            id,
            free,
            capacity,
            policy,
        }
    }

    pub fn id(&self) -> AuraPoolId {
        self.id
    }

    /// Take an inactive instance out of the pool
    pub fn acquire(&mut self) -> Option<Box<Aura>> {
        if let Some(aura) = self.free.pop() {
            return Some(aura);
        }
        match self.policy {
            ExhaustionPolicy::Reject => {
                debug!("Aura pool {:?} exhausted ({} in use)", self.id, self.capacity);
                None
            }
            ExhaustionPolicy::Grow => {
                self.capacity += 1;
                debug!("Aura pool {:?} grown to {}", self.id, self.capacity);
                Some(Box::new(Aura::blank(Some(self.id))))
            }
        }
    }

    /// Give an instance back. Instances from another pool are refused and dropped.
    pub fn release(&mut self, mut aura: Box<Aura>) {
        if aura.pool() != Some(self.id) {
            warn!(
                "Aura from pool {:?} released into pool {:?}; dropping it",
                aura.pool(),
                self.id
            );
            return;
        }
        if self.free.len() >= self.capacity {
            warn!("Aura pool {:?} received more instances than it handed out", self.id);
            return;
        }
        aura.reinitialize();
        self.free.push(aura);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Instances ready to be handed out
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Instances currently attached somewhere
    pub fn in_use(&self) -> usize {
        self.capacity - self.free.len()
    }

    pub fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }
}

/// World-wide registry of aura pools
#[derive(Debug, Default)]
pub struct AuraPools {
    pools: Vec<AuraPool>,
}

impl AuraPools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new pool and return its id
    pub fn create(&mut self, capacity: usize, policy: ExhaustionPolicy) -> AuraPoolId {
        let id = AuraPoolId(u32::try_from(self.pools.len()).unwrap_or(u32::MAX));
        self.pools.push(AuraPool::new(id, capacity, policy));
        id
    }

    pub fn get(&self, id: AuraPoolId) -> Option<&AuraPool> {
        self.pools.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: AuraPoolId) -> Option<&mut AuraPool> {
        self.pools.get_mut(id.0 as usize)
    }

    /// Route an aura that left its list: pooled instances go home,
    /// unpooled ones are dropped.
    pub fn release(&mut self, aura: Box<Aura>) {
        match aura.pool().and_then(|id| self.pools.get_mut(id.0 as usize)) {
            Some(pool) => pool.release(aura),
            None => drop(aura),
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
