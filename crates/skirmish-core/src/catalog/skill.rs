//! Skill and keyword definitions.
//!
//! Skills are immutable data referenced by id from units. A skill's resolved
//! effect is modulated by the keywords it carries; see [`KeywordProfile`] for
//! how a keyword list collapses into the values the resolver reads.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{KeywordId, SkillId};

/// Id of the reserved rest skill.
pub const WAIT_SKILL_ID: &str = "wait";

/// What a skill does when resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Damage an opponent.
    Attack,
    /// Restore HP to the most wounded ally.
    Heal,
    /// Raise a single-use guard on the user.
    Defend,
    /// Rest and recover AP.
    Wait,
}

/// Immutable skill data.
///
/// # Example
///
/// ```
/// use skirmish_core::catalog::{Skill, SkillKind};
///
/// let slash = Skill::attack("slash", "Slash", 2, 10);
/// assert_eq!(slash.kind, SkillKind::Attack);
/// assert!(slash.can_use(2));
/// assert!(!slash.can_use(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Catalog id.
    pub id: SkillId,
    /// Display name.
    pub name: String,
    /// Keyword ids, in the order they are scanned.
    #[serde(default)]
    pub keywords: Vec<KeywordId>,
    /// Selection priority; lower is tried first.
    #[serde(default)]
    pub priority: u32,
    /// Resolution kind.
    pub kind: SkillKind,
    /// AP consumed on use.
    #[serde(default)]
    pub ap_cost: u32,
    /// Base damage. Heal skills store their magnitude as a negative value.
    #[serde(default)]
    pub power: i32,
    /// Flavor text.
    #[serde(default)]
    pub description: String,
}

impl Skill {
    /// Creates an attack skill with no keywords and priority 0.
    #[must_use]
    pub fn attack(id: &str, name: &str, ap_cost: u32, power: i32) -> Self {
        Self {
            id: SkillId::new(id),
            name: name.to_string(),
            keywords: Vec::new(),
            priority: 0,
            kind: SkillKind::Attack,
            ap_cost,
            power,
            description: String::new(),
        }
    }

    /// Creates a heal skill. `amount` is stored with the negative convention.
    #[must_use]
    pub fn heal(id: &str, name: &str, ap_cost: u32, amount: u32) -> Self {
        Self {
            kind: SkillKind::Heal,
            power: -i32::try_from(amount).unwrap_or(i32::MAX),
            ..Self::attack(id, name, ap_cost, 0)
        }
    }

    /// Creates a defend skill.
    #[must_use]
    pub fn defend(id: &str, name: &str, ap_cost: u32) -> Self {
        Self {
            kind: SkillKind::Defend,
            ..Self::attack(id, name, ap_cost, 0)
        }
    }

    /// The reserved rest skill used when nothing else is affordable.
    #[must_use]
    pub fn wait() -> Self {
        Self {
            kind: SkillKind::Wait,
            priority: u32::MAX,
            description: "Catch your breath and recover AP.".to_string(),
            ..Self::attack(WAIT_SKILL_ID, "Wait", 0, 0)
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Appends a keyword id.
    #[must_use]
    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keywords.push(KeywordId::new(keyword));
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Whether the skill is affordable with `current_ap`.
    #[must_use]
    pub const fn can_use(&self, current_ap: u32) -> bool {
        self.ap_cost <= current_ap
    }

    /// Heal magnitude, independent of the sign convention.
    #[must_use]
    pub const fn heal_amount(&self) -> u32 {
        self.power.unsigned_abs()
    }
}

/// Immutable keyword data.
///
/// Only `hits` and `ignore_defense` are read by the resolver. The remaining
/// fields are catalog data carried for presentation and future rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Catalog id.
    pub id: KeywordId,
    /// Extra AP cost.
    #[serde(default)]
    pub ap_cost: u32,
    /// Extra power.
    #[serde(default)]
    pub power: i32,
    /// Defense modifier.
    #[serde(default)]
    pub defense: Option<i32>,
    /// Overrides the hit count of the skill.
    #[serde(default)]
    pub hits: Option<u32>,
    /// Marks the skill as defense-ignoring.
    #[serde(default)]
    pub ignore_defense: bool,
    /// Armor penetration.
    #[serde(default)]
    pub penetration: Option<u32>,
    /// Fraction of damage returned as healing.
    #[serde(default)]
    pub lifesteal: Option<f64>,
    /// Whether the effect spreads to adjacent targets.
    #[serde(default)]
    pub splash: bool,
}

impl Keyword {
    /// Creates a keyword with every modifier unset.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: KeywordId::new(id),
            ap_cost: 0,
            power: 0,
            defense: None,
            hits: None,
            ignore_defense: false,
            penetration: None,
            lifesteal: None,
            splash: false,
        }
    }

    /// Sets the hit-count override.
    #[must_use]
    pub fn with_hits(mut self, hits: u32) -> Self {
        self.hits = Some(hits);
        self
    }

    /// Marks the keyword as defense-ignoring.
    #[must_use]
    pub fn ignoring_defense(mut self) -> Self {
        self.ignore_defense = true;
        self
    }
}

/// The values a keyword list contributes to one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordProfile {
    /// Number of hits the damage is split across. Never zero.
    pub hits: u32,
    /// Recorded but not applied during defense mitigation.
    pub ignore_defense: bool,
}

impl Default for KeywordProfile {
    fn default() -> Self {
        Self {
            hits: 1,
            ignore_defense: false,
        }
    }
}

impl KeywordProfile {
    /// Folds a skill's keyword ids into a profile.
    ///
    /// Keywords are scanned in order and the last one carrying `hits` wins;
    /// hit counts are not summed or maximized. Unknown ids are skipped.
    pub fn fold<'a>(
        ids: &[KeywordId],
        lookup: impl Fn(&KeywordId) -> Option<&'a Keyword>,
    ) -> Self {
        let mut profile = Self::default();
        for id in ids {
            let Some(keyword) = lookup(id) else {
                warn!(keyword = %id, "unknown keyword id, skipping");
                continue;
            };
            if let Some(hits) = keyword.hits {
                profile.hits = hits.max(1);
            }
            if keyword.ignore_defense {
                profile.ignore_defense = true;
            }
        }
        profile
    }
}
