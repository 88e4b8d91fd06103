//! Emberfall Core - Shared foundations for the Emberfall combat simulation
//!
//! This crate provides the types every other crate builds on:
//! - Math primitives (re-exported from glam)
//! - Generational entity handles and entity-keyed storage
//! - 2D transforms with floor tracking
//! - Fixed-step simulation clock
//! - The versioned little-endian binary codec used by save games

pub mod codec;
pub mod entity;
pub mod time;
pub mod types;

pub use codec::{BinaryReader, BinaryWriter, CodecError, Versioned};
pub use entity::{Entity, EntityAllocator, EntityMap};
pub use glam::Vec2;
pub use time::{SimClock, TimeConfig};
pub use types::{Floor, Transform2D};
