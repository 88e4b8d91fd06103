//! Talent tree - learned talent levels and the skill parameters they grant
//!
//! Every talent exposes a plain parameter struct computed from its level.
//! Skills read those structs when they are built or refreshed; nothing here
//! holds a reference to a skill.

use std::collections::BTreeMap;

use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Versioned};
use serde::{Deserialize, Serialize};

/// Nodes of the talent tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalentId {
    Swordsmanship,
    Firewhirl,
    FirewhirlSplit,
    Firewall,
    Pyromania,
    Haste,
}

impl TalentId {
    pub const ALL: [TalentId; 6] = [
        TalentId::Swordsmanship,
        TalentId::Firewhirl,
        TalentId::FirewhirlSplit,
        TalentId::Firewall,
        TalentId::Pyromania,
        TalentId::Haste,
    ];

    pub fn max_level(self) -> u8 {
        match self {
            Self::Swordsmanship => 5,
            Self::Firewhirl => 5,
            Self::FirewhirlSplit => 3,
            Self::Firewall => 3,
            Self::Pyromania => 5,
            Self::Haste => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Swordsmanship => "swordsmanship",
            Self::Firewhirl => "firewhirl",
            Self::FirewhirlSplit => "firewhirl_split",
            Self::Firewall => "firewall",
            Self::Pyromania => "pyromania",
            Self::Haste => "haste",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    fn tag(self) -> u8 {
        match self {
            Self::Swordsmanship => 0,
            Self::Firewhirl => 1,
            Self::FirewhirlSplit => 2,
            Self::Firewall => 3,
            Self::Pyromania => 4,
            Self::Haste => 5,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|id| id.tag() == tag)
            .ok_or(CodecError::InvalidTag {
                what: "TalentId",
                tag: u32::from(tag),
            })
    }
}

/// Learned talent levels. Unlisted talents are at level 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalentTree {
    levels: BTreeMap<TalentId, u8>,
}

impl TalentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, id: TalentId) -> u8 {
        self.levels.get(&id).copied().unwrap_or(0)
    }

    pub fn is_learned(&self, id: TalentId) -> bool {
        self.level(id) > 0
    }

    /// Set a level, clamped to the talent's maximum. Returns the stored level.
    pub fn set_level(&mut self, id: TalentId, level: u8) -> u8 {
        let level = level.min(id.max_level());
        if level == 0 {
            self.levels.remove(&id);
        } else {
            self.levels.insert(id, level);
        }
        level
    }

    /// Spend one point. Returns `false` when the talent is already maxed.
    pub fn learn(&mut self, id: TalentId) -> bool {
        let current = self.level(id);
        if current >= id.max_level() {
            return false;
        }
        self.set_level(id, current + 1);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (TalentId, u8)> + '_ {
        self.levels.iter().map(|(id, level)| (*id, *level))
    }

    pub fn points_spent(&self) -> u32 {
        self.levels.values().map(|l| u32::from(*l)).sum()
    }
}

impl Versioned for TalentTree {
    const TYPE_NAME: &'static str = "TalentTree";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        writer.write_len(self.levels.len());
        for (id, level) in &self.levels {
            writer.write_u8(id.tag());
            writer.write_u8(*level);
        }
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let count = reader.read_len()?;
        let mut tree = TalentTree::new();
        for _ in 0..count {
            let id = TalentId::from_tag(reader.read_u8()?)?;
            let level = reader.read_u8()?;
            tree.set_level(id, level);
        }
        Ok(tree)
    }
}

fn per_level(level: u8) -> f32 {
    f32::from(level.saturating_sub(1))
}

/// Basic melee attack. Available from level 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwordsmanshipTalent {
    pub damage_min: f32,
    pub damage_max: f32,
    pub reach: f32,
    pub crit_chance_increase: f32,
}

impl SwordsmanshipTalent {
    pub fn at_level(level: u8) -> Self {
        let l = f32::from(level);
        Self {
            damage_min: 0.9 + 0.05 * l,
            damage_max: 1.1 + 0.1 * l,
            reach: 1.5,
            crit_chance_increase: 0.02 * l,
        }
    }
}

/// Whirling fireball projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirewhirlTalent {
    pub cooldown: f32,
    pub cast_time: f32,
    pub mana_cost: f32,
    pub damage_min: f32,
    pub damage_max: f32,
    pub speed: f32,
    pub range: f32,
    pub radius: f32,
    pub burn_damage: i32,
    pub burn_duration: f32,
    pub burn_tick: f32,
}

impl FirewhirlTalent {
    pub fn at_level(level: u8) -> Option<Self> {
        if level == 0 {
            return None;
        }
        let l = per_level(level);
        Some(Self {
            cooldown: (3.0 - 0.25 * l).max(1.0),
            cast_time: 0.3,
            mana_cost: 12.0 + 2.0 * l,
            damage_min: 1.2 + 0.1 * l,
            damage_max: 1.6 + 0.15 * l,
            speed: 9.0,
            range: 10.0 + l,
            radius: 0.4,
            burn_damage: 2 + i32::from(level),
            burn_duration: 3.0,
            burn_tick: 1.0,
        })
    }
}

/// Firewhirl projectiles may burst into smaller ones when destroyed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitTalent {
    pub level: u8,
    /// 0-100
    pub proc_chance_percent: f32,
    pub split_min: u32,
    pub split_max: u32,
    pub max_continuous_splits: u32,
    /// Squared distance a projectile has to travel before it may split
    pub required_distance_sq: f32,
    /// How far from the impact point offspring appear
    pub spawn_offset: f32,
}

impl SplitTalent {
    pub fn at_level(level: u8) -> Option<Self> {
        if level == 0 {
            return None;
        }
        let l = per_level(level);
        Some(Self {
            level,
            proc_chance_percent: 30.0 + 20.0 * l,
            split_min: 2,
            split_max: 2 + u32::from(level),
            max_continuous_splits: 1 + u32::from(level) / 2,
            required_distance_sq: 4.0,
            spawn_offset: 0.6,
        })
    }
}

/// Line of stationary flames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirewallTalent {
    pub times_castable: u32,
    pub cooldown: f32,
    pub cast_time: f32,
    pub mana_cost: f32,
    pub damage_min: f32,
    pub damage_max: f32,
    pub flame_count: u32,
    pub spacing: f32,
    pub distance: f32,
    pub lifetime: f32,
    pub radius: f32,
    pub burn_damage: i32,
    pub burn_duration: f32,
    pub burn_tick: f32,
}

impl FirewallTalent {
    pub fn at_level(level: u8) -> Option<Self> {
        if level == 0 {
            return None;
        }
        let l = per_level(level);
        Some(Self {
            times_castable: 2,
            cooldown: 5.0,
            cast_time: 0.5,
            mana_cost: 18.0,
            damage_min: 0.5 + 0.1 * l,
            damage_max: 0.8 + 0.1 * l,
            flame_count: 1 + 2 * u32::from(level),
            spacing: 0.8,
            distance: 2.0,
            lifetime: 4.0,
            radius: 0.5,
            burn_damage: 3 + i32::from(level),
            burn_duration: 2.0,
            burn_tick: 0.5,
        })
    }
}

/// Passive bonus to every fire skill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyromaniaTalent {
    pub crit_chance_increase: f32,
    /// Percentage added to burn damage
    pub burn_damage_percent: f32,
}

impl PyromaniaTalent {
    pub fn at_level(level: u8) -> Self {
        let l = f32::from(level);
        Self {
            crit_chance_increase: 0.03 * l,
            burn_damage_percent: 10.0 * l,
        }
    }
}

/// Self buff that shortens fire skill cooldowns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HasteTalent {
    pub cooldown: f32,
    pub mana_cost_percent: f32,
    /// Negative values shorten cooldowns
    pub cooldown_percent: f32,
    pub duration: f32,
}

impl HasteTalent {
    pub fn at_level(level: u8) -> Option<Self> {
        if level == 0 {
            return None;
        }
        let l = per_level(level);
        Some(Self {
            cooldown: 20.0,
            mana_cost_percent: 10.0,
            cooldown_percent: -(20.0 + 10.0 * l),
            duration: 8.0 + 2.0 * l,
        })
    }
}
