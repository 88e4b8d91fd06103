//! Spellbook - the skills one combatant has learned
//!
//! Keeps the skill set in sync with a [`TalentTree`] and re-reads cooldown
//! modifiers whenever the owner's aura list changes.

use std::collections::BTreeMap;

use emberfall_core::Entity;
use tracing::{debug, warn};

use crate::aura::{AuraList, AuraPoolId};
use crate::skill::{Skill, SkillBuildError, SkillKind, SkillTarget};
use crate::talent::TalentTree;
use crate::world::CombatWorld;

#[derive(Debug, Clone)]
pub struct SkillBook {
    owner: Entity,
    skills: BTreeMap<SkillKind, Skill>,
    aura_pool: Option<AuraPoolId>,
    seen_revision: Option<u64>,
}

impl SkillBook {
    pub fn new(owner: Entity, aura_pool: Option<AuraPoolId>) -> Self {
        Self {
            owner,
            skills: BTreeMap::new(),
            aura_pool,
            seen_revision: None,
        }
    }

    /// Learn newly unlocked skills, refresh known ones and forget the ones
    /// whose talent was unlearned. Returns the first build error; the
    /// remaining skills are still synced.
    pub fn sync_with_talents(
        &mut self,
        talents: &TalentTree,
        auras: &AuraList,
    ) -> Result<(), SkillBuildError> {
        let mut first_error = None;
        for kind in SkillKind::ALL {
            let unlocked = !kind.requires_talent() || talents.is_learned(kind.talent());
            if !unlocked {
                if self.skills.remove(&kind).is_some() {
                    debug!("{} forgot {}", self.owner, kind);
                }
                continue;
            }

            let result = if let Some(skill) = self.skills.get_mut(&kind) {
                skill.refresh_data_from_talents(talents, auras)
            } else {
                Skill::build(kind, talents, auras, self.aura_pool).map(|skill| {
                    debug!("{} learned {}", self.owner, kind);
                    self.skills.insert(kind, skill);
                })
            };
            if let Err(err) = result {
                warn!("Could not sync {}: {}", kind, err);
                first_error.get_or_insert(err);
            }
        }
        self.seen_revision = Some(auras.revision());
        first_error.map_or(Ok(()), Err)
    }

    /// Cast a learned skill. Unknown skills fail like any other refusal.
    pub fn cast(&mut self, kind: SkillKind, target: SkillTarget, world: &mut CombatWorld) -> bool {
        match self.skills.get_mut(&kind) {
            Some(skill) => skill.execute(self.owner, target, world),
            None => false,
        }
    }

    /// Tick every limiter. Cooldown-dependant skills re-read their modifiers
    /// when the aura list changed since the last call.
    pub fn update(&mut self, delta: f32, auras: &AuraList) {
        if self.seen_revision != Some(auras.revision()) {
            for skill in self.skills.values_mut() {
                if skill.is_cooldown_dependant() {
                    skill.refresh_cooldown(auras);
                }
            }
            self.seen_revision = Some(auras.revision());
        }
        for skill in self.skills.values_mut() {
            skill.update(delta);
        }
    }

    pub fn skill(&self, kind: SkillKind) -> Option<&Skill> {
        self.skills.get(&kind)
    }

    pub fn knows(&self, kind: SkillKind) -> bool {
        self.skills.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
