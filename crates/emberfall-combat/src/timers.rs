//! World timers - named countdowns owned by the world (merchant restock,
//! shrine respawn) that survive saving and loading

use std::collections::BTreeMap;

use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Versioned};
use tracing::{debug, warn};

use crate::cooldown::Cooldown;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("World timer '{0}' is already registered")]
    Duplicate(String),
    #[error("World timer '{0}' not found")]
    NotFound(String),
}

/// What a timer does once it elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerType {
    /// Stays elapsed until restarted
    #[default]
    Once,
    /// Restarts immediately
    Repeating,
}

impl TimerType {
    fn tag(self) -> u8 {
        match self {
            Self::Once => 0,
            Self::Repeating => 1,
        }
    }
}

/// A named world countdown
#[derive(Debug, Clone, PartialEq)]
pub struct WorldTimer {
    pub name: String,
    pub cooldown: Cooldown,
    pub timer_type: TimerType,
}

impl WorldTimer {
    /// A running timer
    pub fn new(name: impl Into<String>, duration: f32, timer_type: TimerType) -> Self {
        let mut cooldown = Cooldown::new(duration);
        cooldown.start();
        Self {
            name: name.into(),
            cooldown,
            timer_type,
        }
    }

    /// Advance. Returns `true` when the timer elapsed during this step.
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.cooldown.tick(delta) {
            return false;
        }
        if self.timer_type == TimerType::Repeating {
            self.cooldown.start();
        }
        true
    }

    pub fn is_elapsed(&self) -> bool {
        self.cooldown.is_ready()
    }
}

/// Layout v1: name, total, left. v2 appends the timer type; v1 timers load
/// as one-shot.
impl Versioned for WorldTimer {
    const TYPE_NAME: &'static str = "WorldTimer";
    const VERSION: u32 = 2;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        writer.write_str(&self.name);
        writer.write_f32(self.cooldown.total_time());
        writer.write_f32(self.cooldown.time_left());
        writer.write_u8(self.timer_type.tag());
    }

    fn read_fields(reader: &mut BinaryReader<'_>, version: u32) -> Result<Self, CodecError> {
        let name = reader.read_string()?;
        let total = reader.read_f32()?;
        let left = reader.read_f32()?;
        let timer_type = if version >= 2 {
            match reader.read_u8()? {
                0 => TimerType::Once,
                1 => TimerType::Repeating,
                tag => {
                    return Err(CodecError::InvalidTag {
                        what: "TimerType",
                        tag: u32::from(tag),
                    })
                }
            }
        } else {
            TimerType::Once
        };

        Ok(Self {
            name,
            cooldown: Cooldown::from_parts(total, left),
            timer_type,
        })
    }
}

/// Registry of world timers keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldTimers {
    timers: BTreeMap<String, WorldTimer>,
}

impl WorldTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a timer. A name can only be registered once.
    pub fn register(&mut self, timer: WorldTimer) -> Result<(), TimerError> {
        if self.timers.contains_key(&timer.name) {
            warn!("Rejected duplicate world timer '{}'", timer.name);
            return Err(TimerError::Duplicate(timer.name));
        }
        debug!(
            "Registered world timer '{}' ({:.1}s)",
            timer.name,
            timer.cooldown.total_time()
        );
        self.timers.insert(timer.name.clone(), timer);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<WorldTimer> {
        self.timers.remove(name)
    }

    /// Start an elapsed timer again from its full duration
    pub fn restart(&mut self, name: &str) -> Result<(), TimerError> {
        let timer = self
            .timers
            .get_mut(name)
            .ok_or_else(|| TimerError::NotFound(name.to_string()))?;
        timer.cooldown.start();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&WorldTimer> {
        self.timers.get(name)
    }

    /// Advance every timer. Returns the names of timers that elapsed, sorted.
    pub fn update(&mut self, delta: f32) -> Vec<String> {
        self.timers
            .values_mut()
            .filter_map(|timer| timer.tick(delta).then(|| timer.name.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldTimer> {
        self.timers.values()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Versioned for WorldTimers {
    const TYPE_NAME: &'static str = "WorldTimers";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        writer.write_len(self.timers.len());
        for timer in self.timers.values() {
            timer.serialize(writer);
        }
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let count = reader.read_len()?;
        let mut timers = WorldTimers::new();
        for _ in 0..count {
            let timer = WorldTimer::deserialize(reader)?;
            if timers.register(timer).is_err() {
                warn!("Save contained a duplicate world timer; keeping the first");
            }
        }
        Ok(timers)
    }
}
