use std::sync::Arc;

use strum::Display;

use super::RelicEffect;
use super::registry::EffectSpec;

/// How a relic reacts when the player already holds one from the same family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingRule {
    /// A second copy is rejected.
    #[default]
    Unique,
    /// Stack count increases up to `max_stacks`.
    Stackable,
    /// Replaces the held relic when the held tier is lower.
    ReplaceLower,
    /// Replaces the held relic when the held tier is higher.
    ReplaceHigher,
}

/// Data form of a relic, as loaded from content files.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelicSpec {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub family: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_max_stacks"))]
    pub max_stacks: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: StackingRule,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectSpec>,
}

#[cfg(feature = "serde")]
fn default_max_stacks() -> u32 {
    1
}

/// A relic with its effects constructed.
#[derive(Clone, Debug)]
pub struct RelicDefinition {
    pub id: String,
    pub name: String,
    pub family: String,
    pub tier: u32,
    pub max_stacks: u32,
    pub stacking: StackingRule,
    pub effects: Vec<Arc<dyn RelicEffect>>,
}

impl RelicDefinition {
    /// A unique, single-stack relic whose family is its id.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            family: id.clone(),
            id,
            name: name.into(),
            tier: 0,
            max_stacks: 1,
            stacking: StackingRule::Unique,
            effects: Vec::new(),
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    pub fn with_tier(mut self, tier: u32) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_stacking(mut self, stacking: StackingRule, max_stacks: u32) -> Self {
        self.stacking = stacking;
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_effect(mut self, effect: Arc<dyn RelicEffect>) -> Self {
        self.effects.push(effect);
        self
    }
}

/// A held relic: definition plus mutable run state.
#[derive(Clone, Debug)]
pub struct RelicRuntime {
    pub definition: Arc<RelicDefinition>,
    pub stacks: u32,
    pub enabled: bool,
}

impl RelicRuntime {
    pub fn new(definition: Arc<RelicDefinition>) -> Self {
        Self {
            definition,
            stacks: 1,
            enabled: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn family(&self) -> &str {
        &self.definition.family
    }
}
