use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::card::Rank;
use crate::state::{Actor, PhaseKind};

use super::effects::{
    HealOnCardPlayed, HealOnJoker, HealOnShuffle, HealOnTurnStart, MaxHpBonus, NamedStat,
    StatBonus, ThresholdBonus,
};
use super::{Bonus, RelicDefinition, RelicEffect, RelicError, RelicSpec, StatTarget};

/// Data description of one relic effect.
///
/// Built-in variants map one-to-one onto the effects in this module; `Custom`
/// carries numeric parameters for factories registered at runtime.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSpec {
    StatBonus {
        target: StatTarget,
        bonus: Bonus,
    },
    ThresholdBonus {
        actor: Actor,
        #[cfg_attr(feature = "serde", serde(default))]
        phase: Option<PhaseKind>,
        amount: i64,
    },
    NamedStat {
        stat: String,
        amount: f64,
    },
    HealOnTurnStart {
        amount: u32,
    },
    HealOnShuffle {
        amount: u32,
    },
    HealOnJoker {
        amount: u32,
    },
    HealOnCardPlayed {
        #[cfg_attr(feature = "serde", serde(default))]
        rank: Option<Rank>,
        amount: u32,
    },
    MaxHpBonus {
        amount: u32,
    },
    Custom {
        kind: String,
        #[cfg_attr(feature = "serde", serde(default))]
        params: BTreeMap<String, f64>,
    },
}

impl EffectSpec {
    /// Registry key for this spec.
    pub fn kind(&self) -> &str {
        match self {
            Self::StatBonus { .. } => StatBonus::KIND,
            Self::ThresholdBonus { .. } => ThresholdBonus::KIND,
            Self::NamedStat { .. } => NamedStat::KIND,
            Self::HealOnTurnStart { .. } => HealOnTurnStart::KIND,
            Self::HealOnShuffle { .. } => HealOnShuffle::KIND,
            Self::HealOnJoker { .. } => HealOnJoker::KIND,
            Self::HealOnCardPlayed { .. } => HealOnCardPlayed::KIND,
            Self::MaxHpBonus { .. } => MaxHpBonus::KIND,
            Self::Custom { kind, .. } => kind,
        }
    }
}

/// Constructs an effect from its spec.
pub type EffectFactory =
    Arc<dyn Fn(&EffectSpec) -> Result<Arc<dyn RelicEffect>, RelicError> + Send + Sync>;

/// Effect factories keyed by type id.
///
/// [`EffectRegistry::default`] knows every built-in effect. Additional kinds
/// are added with [`EffectRegistry::register`] and described in content files
/// through [`EffectSpec::Custom`].
#[derive(Clone)]
pub struct EffectRegistry {
    factories: HashMap<String, EffectFactory>,
}

impl EffectRegistry {
    /// A registry with no factories, not even the built-ins.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers `factory` under `kind`, returning the one it replaced.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        factory: EffectFactory,
    ) -> Option<EffectFactory> {
        self.factories.insert(kind.into(), factory)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, spec: &EffectSpec) -> Result<Arc<dyn RelicEffect>, RelicError> {
        let factory = self
            .factories
            .get(spec.kind())
            .ok_or_else(|| RelicError::UnknownEffect {
                kind: spec.kind().to_owned(),
            })?;
        factory(spec)
    }

    /// Validates `spec` and builds every effect it lists.
    pub fn build_relic(&self, spec: &RelicSpec) -> Result<RelicDefinition, RelicError> {
        let invalid = |reason: &str| RelicError::InvalidDefinition {
            relic: spec.id.clone(),
            reason: reason.to_owned(),
        };
        if spec.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if spec.max_stacks == 0 {
            return Err(invalid("max_stacks must be at least 1"));
        }

        let effects = spec
            .effects
            .iter()
            .map(|effect| self.build(effect))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RelicDefinition {
            id: spec.id.clone(),
            name: spec.name.clone(),
            family: spec.family.clone().unwrap_or_else(|| spec.id.clone()),
            tier: spec.tier,
            max_stacks: spec.max_stacks,
            stacking: spec.stacking,
            effects,
        })
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for kind in [
            StatBonus::KIND,
            ThresholdBonus::KIND,
            NamedStat::KIND,
            HealOnTurnStart::KIND,
            HealOnShuffle::KIND,
            HealOnJoker::KIND,
            HealOnCardPlayed::KIND,
            MaxHpBonus::KIND,
        ] {
            registry.register(kind, Arc::new(build_builtin));
        }
        registry
    }
}

impl core::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("EffectRegistry").field("kinds", &kinds).finish()
    }
}

fn build_builtin(spec: &EffectSpec) -> Result<Arc<dyn RelicEffect>, RelicError> {
    let effect: Arc<dyn RelicEffect> = match spec {
        EffectSpec::StatBonus { target, bonus } => Arc::new(StatBonus {
            target: *target,
            bonus: bonus.clone(),
        }),
        EffectSpec::ThresholdBonus {
            actor,
            phase,
            amount,
        } => Arc::new(ThresholdBonus {
            actor: *actor,
            phase: *phase,
            amount: *amount,
        }),
        EffectSpec::NamedStat { stat, amount } => Arc::new(NamedStat {
            stat: stat.clone(),
            amount: *amount,
        }),
        EffectSpec::HealOnTurnStart { amount } => Arc::new(HealOnTurnStart { amount: *amount }),
        EffectSpec::HealOnShuffle { amount } => Arc::new(HealOnShuffle { amount: *amount }),
        EffectSpec::HealOnJoker { amount } => Arc::new(HealOnJoker { amount: *amount }),
        EffectSpec::HealOnCardPlayed { rank, amount } => Arc::new(HealOnCardPlayed {
            rank: *rank,
            amount: *amount,
        }),
        EffectSpec::MaxHpBonus { amount } => Arc::new(MaxHpBonus { amount: *amount }),
        EffectSpec::Custom { kind, .. } => {
            return Err(RelicError::UnknownEffect { kind: kind.clone() });
        }
    };
    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relic::{Modification, StackingRule};

    #[derive(Debug)]
    struct Doubler;

    impl RelicEffect for Doubler {
        fn kind(&self) -> &'static str {
            "doubler"
        }

        fn modify_attack(&self, value: i64, _stacks: u32) -> Modification<i64> {
            Modification::applied(value * 2)
        }
    }

    fn spec(effects: Vec<EffectSpec>) -> RelicSpec {
        RelicSpec {
            id: "whetstone".into(),
            name: "Whetstone".into(),
            family: None,
            tier: 1,
            max_stacks: 3,
            stacking: StackingRule::Stackable,
            effects,
        }
    }

    #[test]
    fn builds_builtin_effects() {
        let registry = EffectRegistry::default();
        let relic = registry
            .build_relic(&spec(vec![EffectSpec::StatBonus {
                target: StatTarget::Attack,
                bonus: Bonus::flat(1),
            }]))
            .unwrap();
        assert_eq!(relic.family, "whetstone");
        assert_eq!(relic.effects[0].kind(), "stat_bonus");
    }

    #[test]
    fn unknown_custom_kind_is_rejected() {
        let registry = EffectRegistry::default();
        let err = registry
            .build(&EffectSpec::Custom {
                kind: "doubler".into(),
                params: BTreeMap::new(),
            })
            .unwrap_err();
        assert_eq!(err, RelicError::UnknownEffect { kind: "doubler".into() });
    }

    #[test]
    fn custom_factories_can_be_registered() {
        let mut registry = EffectRegistry::default();
        registry.register(
            "doubler",
            Arc::new(|_: &EffectSpec| Ok::<_, RelicError>(Arc::new(Doubler) as Arc<dyn RelicEffect>)),
        );
        let effect = registry
            .build(&EffectSpec::Custom {
                kind: "doubler".into(),
                params: BTreeMap::new(),
            })
            .unwrap();
        assert_eq!(effect.modify_attack(4, 1).value, 8);
    }

    #[test]
    fn zero_max_stacks_is_invalid() {
        let mut relic = spec(Vec::new());
        relic.max_stacks = 0;
        assert!(matches!(
            EffectRegistry::default().build_relic(&relic),
            Err(RelicError::InvalidDefinition { .. })
        ));
    }
}
