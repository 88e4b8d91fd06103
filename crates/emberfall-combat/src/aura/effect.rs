//! Status effects carried by auras and their aggregation

use emberfall_core::{BinaryReader, BinaryWriter, CodecError};

use crate::skill::SkillKind;

/// What a status effect modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectId {
    Attack,
    Defense,
    CritChance,
    MoveSpeed,
    ManaRegen,
    /// Cooldown duration of one skill
    Cooldown(SkillKind),
}

impl EffectId {
    pub fn write(&self, writer: &mut BinaryWriter) {
        match self {
            Self::Attack => writer.write_u8(0),
            Self::Defense => writer.write_u8(1),
            Self::CritChance => writer.write_u8(2),
            Self::MoveSpeed => writer.write_u8(3),
            Self::ManaRegen => writer.write_u8(4),
            Self::Cooldown(kind) => {
                writer.write_u8(5);
                kind.write(writer);
            }
        }
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        match reader.read_u8()? {
            0 => Ok(Self::Attack),
            1 => Ok(Self::Defense),
            2 => Ok(Self::CritChance),
            3 => Ok(Self::MoveSpeed),
            4 => Ok(Self::ManaRegen),
            5 => Ok(Self::Cooldown(SkillKind::read(reader)?)),
            tag => Err(CodecError::InvalidTag {
                what: "EffectId",
                tag: u32::from(tag),
            }),
        }
    }
}

/// A single stat modification: a flat delta and a percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEffect {
    pub id: EffectId,
    pub fixed: f32,
    /// Percentage change, e.g. `-20.0` shortens a cooldown to 80%
    pub percent: f32,
}

impl StatusEffect {
    pub fn new(id: EffectId, fixed: f32, percent: f32) -> Self {
        Self { id, fixed, percent }
    }

    pub fn flat(id: EffectId, fixed: f32) -> Self {
        Self::new(id, fixed, 0.0)
    }

    pub fn percent(id: EffectId, percent: f32) -> Self {
        Self::new(id, 0.0, percent)
    }

    /// The multiplicative factor this effect contributes
    pub fn multiplier(&self) -> f32 {
        1.0 + self.percent / 100.0
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        self.id.write(writer);
        writer.write_f32(self.fixed);
        writer.write_f32(self.percent);
    }

    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let id = EffectId::read(reader)?;
        let fixed = reader.read_f32()?;
        let percent = reader.read_f32()?;
        Ok(Self { id, fixed, percent })
    }
}

/// Aggregated modification for one effect id: `(base + fixed) * multiplier`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectValues {
    pub fixed: f32,
    pub multiplier: f32,
}

impl Default for EffectValues {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl EffectValues {
    pub const NEUTRAL: EffectValues = EffectValues {
        fixed: 0.0,
        multiplier: 1.0,
    };

    /// Fold a set of effects: fixed values are summed, multipliers multiplied.
    ///
    /// Contributions are sorted before folding so the floating-point result
    /// does not depend on the order the effects were collected in.
    pub fn aggregate<'a>(effects: impl IntoIterator<Item = &'a StatusEffect>) -> Self {
        let mut fixed: Vec<f32> = Vec::new();
        let mut multipliers: Vec<f32> = Vec::new();
        for effect in effects {
            fixed.push(effect.fixed);
            multipliers.push(effect.multiplier());
        }
        fixed.sort_by(f32::total_cmp);
        multipliers.sort_by(f32::total_cmp);
        Self {
            fixed: fixed.into_iter().sum(),
            multiplier: multipliers.into_iter().product(),
        }
    }

    pub fn apply(&self, base: f32) -> f32 {
        (base + self.fixed) * self.multiplier
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_empty_is_neutral() {
        let values = EffectValues::aggregate(std::iter::empty());
        assert!(values.is_neutral());
        assert_eq!(values.apply(7.0), 7.0);
    }

    #[test]
    fn test_aggregate_sum_and_product() {
        let a = StatusEffect::new(EffectId::Attack, 5.0, 10.0);
        let b = StatusEffect::new(EffectId::Attack, 3.0, 20.0);
        let values = EffectValues::aggregate([&a, &b]);
        assert_eq!(values.fixed, 8.0);
        assert!((values.multiplier - 1.32).abs() < 1e-6);
    }

    #[test]
    fn test_aggregate_order_independent() {
        let effects = [
            StatusEffect::new(EffectId::Defense, 0.1, 3.3),
            StatusEffect::new(EffectId::Defense, 0.7, -12.5),
            StatusEffect::new(EffectId::Defense, 1.3, 41.0),
            StatusEffect::new(EffectId::Defense, -0.2, 7.7),
        ];
        let forward = EffectValues::aggregate(effects.iter());
        let backward = EffectValues::aggregate(effects.iter().rev());
        assert_eq!(forward.fixed.to_bits(), backward.fixed.to_bits());
        assert_eq!(forward.multiplier.to_bits(), backward.multiplier.to_bits());
    }

    #[test]
    fn test_effect_codec() {
        let effect = StatusEffect::percent(EffectId::Cooldown(SkillKind::Firewall), -25.0);
        let mut writer = BinaryWriter::new();
        effect.write(&mut writer);
        let mut reader = BinaryReader::new(writer.as_bytes());
        assert_eq!(StatusEffect::read(&mut reader).unwrap(), effect);
    }

    #[test]
    fn test_unknown_effect_tag() {
        let mut reader = BinaryReader::new(&[42]);
        assert!(matches!(
            EffectId::read(&mut reader),
            Err(CodecError::InvalidTag { tag: 42, .. })
        ));
    }
}
