//! Combat events and the FIFO event bus
//!
//! Systems push events while a frame is simulated; [`EventBus::dispatch`]
//! delivers them afterwards in the order they were pushed. Subscribers see
//! every event in registration order.

use emberfall_core::{Entity, Vec2};

use crate::damage::ReceiveType;
use crate::projectile::DestroyCause;
use crate::skill::SkillKind;

/// Something observable that happened during combat
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    Damaged {
        target: Entity,
        attacker: Option<Entity>,
        source: Option<SkillKind>,
        amount: i32,
        receive_type: ReceiveType,
    },
    AuraApplied {
        target: Entity,
        source: SkillKind,
    },
    AuraRefreshed {
        target: Entity,
        source: SkillKind,
    },
    AuraExpired {
        target: Entity,
        source: SkillKind,
    },
    SkillExecuted {
        caster: Entity,
        skill: SkillKind,
    },
    ProjectileSpawned {
        projectile: Entity,
        owner: Entity,
        generation: u32,
    },
    ProjectileHit {
        projectile: Entity,
        target: Entity,
    },
    ProjectileDestroyed {
        projectile: Entity,
        position: Vec2,
        cause: DestroyCause,
    },
    ProjectileSplit {
        parent: Entity,
        offspring: usize,
    },
    Died {
        entity: Entity,
        killer: Option<Entity>,
    },
    TimerElapsed {
        name: String,
    },
}

type Subscriber = Box<dyn FnMut(&CombatEvent)>;

/// Queue of pending events plus the callbacks that observe them
#[derive(Default)]
pub struct EventBus {
    queue: Vec<CombatEvent>,
    subscribers: Vec<Subscriber>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &self.queue.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.queue.push(event);
    }

    /// Register a callback. Callbacks run in registration order.
    pub fn subscribe(&mut self, callback: impl FnMut(&CombatEvent) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Deliver every queued event to every subscriber and return them
    pub fn dispatch(&mut self) -> Vec<CombatEvent> {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            for subscriber in &mut self.subscribers {
                subscriber(event);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn died(index: u32) -> CombatEvent {
        CombatEvent::Died {
            entity: Entity::from_raw(index, 0),
            killer: None,
        }
    }

    #[test]
    fn test_dispatch_is_fifo() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        bus.subscribe(move |event| log.borrow_mut().push(event.clone()));

        bus.push(died(1));
        bus.push(died(2));
        bus.push(died(3));
        let dispatched = bus.dispatch();

        assert_eq!(dispatched, vec![died(1), died(2), died(3)]);
        assert_eq!(*seen.borrow(), dispatched);
        assert!(bus.dispatch().is_empty());
    }

    #[test]
    fn test_subscribers_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe(move |_| order.borrow_mut().push(id));
        }
        bus.push(died(0));
        bus.dispatch();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_dispatch_without_subscribers_drains() {
        let mut bus = EventBus::new();
        bus.push(died(7));
        assert_eq!(bus.dispatch().len(), 1);
        assert!(bus.dispatch().is_empty());
    }
}
