//! Static combat content: skills, keywords, passives and named sets.
//!
//! Units reference content by id. The [`Catalog`] resolves those references
//! when a roster is built, recovering locally from bad references instead of
//! failing the encounter:
//! - an unknown or empty skill source falls back to the default skill set
//! - an unknown passive set yields an empty passive list
//! - unknown ids inside an explicit list are skipped
//!
//! # Example
//!
//! ```
//! use skirmish_core::catalog::{Catalog, SkillSource};
//!
//! let catalog = Catalog::standard();
//! let skills = catalog.resolve_skills(&SkillSource::Set("no_such_set".into()));
//! assert!(!skills.is_empty());
//! ```

pub mod passive;
pub mod skill;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

pub use passive::{Passive, PassiveEffect, PassiveOutcome, Trigger};
pub use skill::{Keyword, KeywordProfile, Skill, SkillKind, WAIT_SKILL_ID};

/// Name of the skill set used when a unit's own skill source is unusable.
pub const DEFAULT_SKILL_SET: &str = "default";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from a string.
            #[must_use]
            pub fn new(id: &str) -> Self {
                Self(id.to_string())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Catalog id of a [`Skill`].
    SkillId
);
string_id!(
    /// Catalog id of a [`Keyword`].
    KeywordId
);
string_id!(
    /// Catalog id of a [`Passive`].
    PassiveId
);

/// Where a unit's skills come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillSource {
    /// A named skill set in the catalog.
    Set(String),
    /// Explicit catalog ids.
    Ids(Vec<SkillId>),
    /// Skills defined inline, bypassing the catalog.
    Inline(Vec<Skill>),
}

impl Default for SkillSource {
    fn default() -> Self {
        Self::Set(DEFAULT_SKILL_SET.to_string())
    }
}

/// Where a unit's passives come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PassiveSource {
    /// A named passive set in the catalog.
    Set(String),
    /// Explicit catalog ids.
    Ids(Vec<PassiveId>),
    /// Passives defined inline, bypassing the catalog.
    Inline(Vec<Passive>),
}

impl Default for PassiveSource {
    fn default() -> Self {
        Self::Ids(Vec::new())
    }
}

/// Lookup tables for all combat content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    skills: BTreeMap<SkillId, Skill>,
    #[serde(default)]
    keywords: BTreeMap<KeywordId, Keyword>,
    #[serde(default)]
    passives: BTreeMap<PassiveId, Passive>,
    #[serde(default)]
    skill_sets: BTreeMap<String, Vec<SkillId>>,
    #[serde(default)]
    passive_sets: BTreeMap<String, Vec<PassiveId>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in content set.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        catalog.insert_keyword(Keyword::new("double").with_hits(2));
        catalog.insert_keyword(Keyword::new("triple").with_hits(3));
        catalog.insert_keyword(Keyword::new("pierce").ignoring_defense());
        catalog.insert_keyword(Keyword {
            lifesteal: Some(0.3),
            ..Keyword::new("drain")
        });
        catalog.insert_keyword(Keyword {
            splash: true,
            ..Keyword::new("sweep")
        });

        catalog.insert_skill(
            Skill::attack("heavy_blow", "Heavy Blow", 4, 22)
                .with_description("A slow, crushing swing."),
        );
        catalog.insert_skill(
            Skill::attack("twin_strike", "Twin Strike", 3, 16)
                .with_keyword("double")
                .with_priority(1)
                .with_description("Two quick cuts."),
        );
        catalog.insert_skill(
            Skill::attack("flurry", "Flurry", 5, 24)
                .with_keyword("triple")
                .with_description("Three blows in a blur."),
        );
        catalog.insert_skill(
            Skill::attack("lance", "Lance", 3, 14)
                .with_keyword("pierce")
                .with_priority(1)
                .with_description("A thrust aimed at the gaps in armor."),
        );
        catalog.insert_skill(Skill::attack("slash", "Slash", 2, 10).with_priority(2));
        catalog.insert_skill(Skill::heal("mend", "Mend", 3, 20));
        catalog.insert_skill(Skill::defend("guard", "Guard", 1).with_priority(3));
        catalog.insert_skill(Skill::wait());

        catalog.define_skill_set(DEFAULT_SKILL_SET, &["heavy_blow", "twin_strike", "slash"]);
        catalog.define_skill_set("warrior", &["heavy_blow", "slash", "guard"]);
        catalog.define_skill_set("rogue", &["flurry", "twin_strike", "slash"]);
        catalog.define_skill_set("lancer", &["lance", "slash", "guard"]);
        catalog.define_skill_set("cleric", &["mend", "slash", "guard"]);

        catalog.insert_passive(Passive::new(
            "evasion",
            "Evasion",
            Trigger::OnBeingHit,
            1,
            0.25,
            PassiveEffect::Dodge,
        ));
        catalog.insert_passive(Passive::new(
            "iron_skin",
            "Iron Skin",
            Trigger::OnBeingHit,
            1,
            0.5,
            PassiveEffect::DamageMultiplier { factor: 0.5 },
        ));
        catalog.insert_passive(Passive::new(
            "riposte",
            "Riposte",
            Trigger::OnAfterHit,
            2,
            0.35,
            PassiveEffect::CounterAttack { damage: 8 },
        ));
        catalog.insert_passive(Passive::new(
            "fury",
            "Fury",
            Trigger::OnAttack,
            1,
            0.2,
            PassiveEffect::DamageMultiplier { factor: 1.5 },
        ));
        catalog.insert_passive(Passive::new(
            "focus",
            "Focus",
            Trigger::OnTurnStart,
            1,
            0.3,
            PassiveEffect::ApRecover { amount: 2 },
        ));
        catalog.insert_passive(Passive::new(
            "second_wind",
            "Second Wind",
            Trigger::OnLowHp,
            2,
            1.0,
            PassiveEffect::Heal { amount: 20 },
        ));

        catalog.define_passive_set("duelist", &["evasion", "riposte"]);
        catalog.define_passive_set("tank", &["iron_skin", "riposte", "second_wind"]);
        catalog.define_passive_set("berserker", &["fury", "second_wind"]);
        catalog.define_passive_set("caster", &["focus"]);

        catalog
    }

    /// Adds or replaces a skill.
    pub fn insert_skill(&mut self, skill: Skill) {
        self.skills.insert(skill.id.clone(), skill);
    }

    /// Adds or replaces a keyword.
    pub fn insert_keyword(&mut self, keyword: Keyword) {
        self.keywords.insert(keyword.id.clone(), keyword);
    }

    /// Adds or replaces a passive.
    pub fn insert_passive(&mut self, passive: Passive) {
        self.passives.insert(passive.id.clone(), passive);
    }

    /// Defines a named skill set.
    pub fn define_skill_set(&mut self, name: &str, ids: &[&str]) {
        self.skill_sets
            .insert(name.to_string(), ids.iter().map(|id| SkillId::new(id)).collect());
    }

    /// Defines a named passive set.
    pub fn define_passive_set(&mut self, name: &str, ids: &[&str]) {
        self.passive_sets.insert(
            name.to_string(),
            ids.iter().map(|id| PassiveId::new(id)).collect(),
        );
    }

    /// Looks up a skill.
    #[must_use]
    pub fn skill(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.get(id)
    }

    /// Looks up a keyword.
    #[must_use]
    pub fn keyword(&self, id: &KeywordId) -> Option<&Keyword> {
        self.keywords.get(id)
    }

    /// Looks up a passive.
    #[must_use]
    pub fn passive(&self, id: &PassiveId) -> Option<&Passive> {
        self.passives.get(id)
    }

    /// Looks up a named skill set.
    #[must_use]
    pub fn skill_set(&self, name: &str) -> Option<&[SkillId]> {
        self.skill_sets.get(name).map(Vec::as_slice)
    }

    /// Looks up a named passive set.
    #[must_use]
    pub fn passive_set(&self, name: &str) -> Option<&[PassiveId]> {
        self.passive_sets.get(name).map(Vec::as_slice)
    }

    /// Folds a skill's keywords into the values the resolver reads.
    #[must_use]
    pub fn keyword_profile(&self, skill: &Skill) -> KeywordProfile {
        KeywordProfile::fold(&skill.keywords, |id| self.keyword(id))
    }

    /// Resolves a skill source into concrete skills.
    ///
    /// Never returns an empty list: unusable sources fall back to the default
    /// set, and a catalog without a usable default set yields only the wait
    /// skill.
    #[must_use]
    pub fn resolve_skills(&self, source: &SkillSource) -> Vec<Skill> {
        let skills = match source {
            SkillSource::Set(name) => match self.skill_set(name) {
                Some(ids) => self.lookup_skills(ids),
                None => {
                    warn!(set = %name, "unknown skill set, using default set");
                    Vec::new()
                }
            },
            SkillSource::Ids(ids) => self.lookup_skills(ids),
            SkillSource::Inline(skills) => skills.clone(),
        };

        if !skills.is_empty() {
            return skills;
        }

        let fallback = self
            .skill_set(DEFAULT_SKILL_SET)
            .map(|ids| self.lookup_skills(ids))
            .unwrap_or_default();
        if fallback.is_empty() {
            warn!("default skill set unavailable, unit can only wait");
            vec![Skill::wait()]
        } else {
            fallback
        }
    }

    /// Resolves a passive source into concrete passives.
    ///
    /// Unknown sets and ids degrade to an empty (but valid) list.
    #[must_use]
    pub fn resolve_passives(&self, source: &PassiveSource) -> Vec<Passive> {
        match source {
            PassiveSource::Set(name) => match self.passive_set(name) {
                Some(ids) => self.lookup_passives(ids),
                None => {
                    warn!(set = %name, "unknown passive set, unit has no passives");
                    Vec::new()
                }
            },
            PassiveSource::Ids(ids) => self.lookup_passives(ids),
            PassiveSource::Inline(passives) => passives.clone(),
        }
    }

    fn lookup_skills(&self, ids: &[SkillId]) -> Vec<Skill> {
        ids.iter()
            .filter_map(|id| {
                let skill = self.skill(id).cloned();
                if skill.is_none() {
                    warn!(skill = %id, "unknown skill id, skipping");
                }
                skill
            })
            .collect()
    }

    fn lookup_passives(&self, ids: &[PassiveId]) -> Vec<Passive> {
        ids.iter()
            .filter_map(|id| {
                let passive = self.passive(id).cloned();
                if passive.is_none() {
                    warn!(passive = %id, "unknown passive id, skipping");
                }
                passive
            })
            .collect()
    }
}
