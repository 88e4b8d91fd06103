//! Combat stats and the stat container every combatant carries
//!
//! [`Statable`] pairs the base [`CombatStats`] with the combatant's
//! [`AuraList`]; [`Statable::effective`] folds the aura modifiers in.

use emberfall_core::{BinaryReader, BinaryWriter, CodecError, Versioned};

use crate::aura::{AuraList, EffectId};

/// Base combat stats for players and monsters
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub max_hp: i32,
    pub hp: i32,
    pub max_mana: f32,
    pub mana: f32,
    /// Mana regenerated per second
    pub mana_regen: f32,
    pub attack: f32,
    /// Damage reduction, half of it is subtracted from every hit
    pub defense: f32,
    /// Chance to land a hit (0.0 - 1.0)
    pub hit_chance: f32,
    /// Chance to shrug off a landed hit (0.0 - 1.0)
    pub resist_chance: f32,
    /// Critical hit chance (0.0 - 1.0)
    pub crit_chance: f32,
    /// Critical hit damage multiplier (usually 1.5 - 2.0)
    pub crit_multiplier: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            max_hp: 100,
            hp: 100,
            max_mana: 100.0,
            mana: 100.0,
            mana_regen: 2.0,
            attack: 10.0,
            defense: 5.0,
            hit_chance: 0.95,
            resist_chance: 0.0,
            crit_chance: 0.05,
            crit_multiplier: 1.5,
        }
    }
}

impl Versioned for CombatStats {
    const TYPE_NAME: &'static str = "CombatStats";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        writer.write_i32(self.max_hp);
        writer.write_i32(self.hp);
        writer.write_f32(self.max_mana);
        writer.write_f32(self.mana);
        writer.write_f32(self.mana_regen);
        writer.write_f32(self.attack);
        writer.write_f32(self.defense);
        writer.write_f32(self.hit_chance);
        writer.write_f32(self.resist_chance);
        writer.write_f32(self.crit_chance);
        writer.write_f32(self.crit_multiplier);
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let max_hp = reader.read_i32()?;
        let hp = reader.read_i32()?.min(max_hp);
        let max_mana = reader.read_f32()?;
        let mana = reader.read_f32()?.min(max_mana);
        Ok(Self {
            max_hp,
            hp,
            max_mana,
            mana,
            mana_regen: reader.read_f32()?,
            attack: reader.read_f32()?,
            defense: reader.read_f32()?,
            hit_chance: reader.read_f32()?,
            resist_chance: reader.read_f32()?,
            crit_chance: reader.read_f32()?,
            crit_multiplier: reader.read_f32()?,
        })
    }
}

/// Which side a combatant fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Faction {
    Player,
    Monster,
}

impl Faction {
    pub fn is_hostile_to(self, other: Faction) -> bool {
        self != other
    }

    fn tag(self) -> u8 {
        match self {
            Self::Player => 0,
            Self::Monster => 1,
        }
    }
}

/// Stats after aura modifiers, the values damage is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStats {
    pub attack: f32,
    pub defense: f32,
    pub hit_chance: f32,
    pub resist_chance: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub move_speed: f32,
}

impl Default for EffectiveStats {
    fn default() -> Self {
        let base = CombatStats::default();
        Self {
            attack: base.attack,
            defense: base.defense,
            hit_chance: base.hit_chance,
            resist_chance: base.resist_chance,
            crit_chance: base.crit_chance,
            crit_multiplier: base.crit_multiplier,
            move_speed: 1.0,
        }
    }
}

/// Hit point, mana and combat stat container with its auras
#[derive(Debug)]
pub struct Statable {
    pub stats: CombatStats,
    pub faction: Faction,
    auras: AuraList,
}

impl Statable {
    pub fn new(stats: CombatStats, faction: Faction) -> Self {
        Self {
            stats,
            faction,
            auras: AuraList::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    /// Subtract hit points. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        if !self.is_alive() || amount <= 0 {
            return 0;
        }
        let dealt = amount.min(self.stats.hp);
        self.stats.hp -= dealt;
        dealt
    }

    /// Restore hit points, capped at max. Dead combatants stay dead.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() || amount <= 0 {
            return 0;
        }
        let before = self.stats.hp;
        self.stats.hp = (self.stats.hp.saturating_add(amount)).min(self.stats.max_hp);
        self.stats.hp - before
    }

    /// Regenerate mana over `delta` seconds
    pub fn regen(&mut self, delta: f32) {
        if !self.is_alive() {
            return;
        }
        let rate = self
            .auras
            .get_effect_values(EffectId::ManaRegen)
            .apply(self.stats.mana_regen)
            .max(0.0);
        self.stats.mana = (self.stats.mana + rate * delta.max(0.0)).min(self.stats.max_mana);
    }

    /// Stats with every active aura modifier applied
    pub fn effective(&self) -> EffectiveStats {
        let auras = &self.auras;
        EffectiveStats {
            attack: auras
                .get_effect_values(EffectId::Attack)
                .apply(self.stats.attack)
                .max(0.0),
            defense: auras
                .get_effect_values(EffectId::Defense)
                .apply(self.stats.defense)
                .max(0.0),
            hit_chance: self.stats.hit_chance.clamp(0.0, 1.0),
            resist_chance: self.stats.resist_chance.clamp(0.0, 1.0),
            crit_chance: auras
                .get_effect_values(EffectId::CritChance)
                .apply(self.stats.crit_chance)
                .clamp(0.0, 1.0),
            crit_multiplier: self.stats.crit_multiplier.max(1.0),
            move_speed: auras
                .get_effect_values(EffectId::MoveSpeed)
                .apply(1.0)
                .max(0.0),
        }
    }

    pub fn auras(&self) -> &AuraList {
        &self.auras
    }

    pub fn auras_mut(&mut self) -> &mut AuraList {
        &mut self.auras
    }
}

/// Layout: stats, faction tag, aura list
impl Versioned for Statable {
    const TYPE_NAME: &'static str = "Statable";
    const VERSION: u32 = 1;
    const MIN_VERSION: u32 = 1;

    fn write_fields(&self, writer: &mut BinaryWriter) {
        self.stats.serialize(writer);
        writer.write_u8(self.faction.tag());
        self.auras.serialize(writer);
    }

    fn read_fields(reader: &mut BinaryReader<'_>, _version: u32) -> Result<Self, CodecError> {
        let stats = CombatStats::deserialize(reader)?;
        let faction = match reader.read_u8()? {
            0 => Faction::Player,
            1 => Faction::Monster,
            tag => {
                return Err(CodecError::InvalidTag {
                    what: "Faction",
                    tag: u32::from(tag),
                })
            }
        };
        let auras = AuraList::deserialize(reader)?;
        Ok(Self {
            stats,
            faction,
            auras,
        })
    }
}
