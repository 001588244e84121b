//! Relic catalog loader.
//!
//! Relics are stored as [`RelicSpec`] data and built into definitions through
//! an [`EffectRegistry`], so custom effect kinds registered by the caller are
//! available to content files.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use combat_core::{EffectRegistry, RelicDefinition, RelicSpec};

use crate::loaders::{LoadResult, read_file};

/// Loader for the relic catalog from RON files.
pub struct RelicLoader;

impl RelicLoader {
    /// Load relic definitions from a RON file.
    ///
    /// RON format: `Vec<RelicSpec>`
    pub fn load(path: &Path, registry: &EffectRegistry) -> LoadResult<Vec<Arc<RelicDefinition>>> {
        let content = read_file(path)?;
        Self::parse(&content, registry)
    }

    pub fn parse(content: &str, registry: &EffectRegistry) -> LoadResult<Vec<Arc<RelicDefinition>>> {
        let specs: Vec<RelicSpec> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse relic catalog RON: {}", e))?;

        let mut seen = HashSet::new();
        let mut relics = Vec::with_capacity(specs.len());
        for spec in &specs {
            if !seen.insert(spec.id.as_str()) {
                anyhow::bail!("Duplicate relic id '{}' in catalog", spec.id);
            }
            let relic = registry
                .build_relic(spec)
                .map_err(|e| anyhow::anyhow!("Failed to build relic '{}': {}", spec.id, e))?;
            relics.push(Arc::new(relic));
        }

        Ok(relics)
    }
}

#[cfg(test)]
mod tests {
    use combat_core::{Actor, PhaseKind, RelicManager, StackingRule, Threshold};

    use super::*;

    const CATALOG: &str = r#"[
        (
            id: "whetstone",
            name: "Whetstone",
            max_stacks: 3,
            stacking: Stackable,
            effects: [StatBonus(target: Attack, bonus: Flat(2))],
        ),
        (
            id: "lucky-coin",
            name: "Lucky Coin",
            family: Some("coin"),
            tier: 2,
            stacking: ReplaceLower,
            effects: [
                ThresholdBonus(actor: Player, phase: Some(Defense), amount: 2),
                HealOnJoker(amount: 3),
            ],
        ),
    ]"#;

    #[test]
    fn parses_and_builds_effects() {
        let relics = RelicLoader::parse(CATALOG, &EffectRegistry::default()).unwrap();
        assert_eq!(relics.len(), 2);
        assert_eq!(relics[0].stacking, StackingRule::Stackable);
        assert_eq!(relics[1].family, "coin");
        assert_eq!(relics[1].effects.len(), 2);

        let mut manager = RelicManager::new();
        for relic in &relics {
            manager.acquire(relic.clone(), None).unwrap();
        }
        assert_eq!(manager.attack_value(10), 12);
        assert_eq!(
            manager
                .threshold(Actor::Player, PhaseKind::Defense, Threshold::DEFAULT)
                .get(),
            23
        );
    }

    #[test]
    fn unknown_custom_effect_fails_loading() {
        let err = RelicLoader::parse(
            r#"[(id: "odd", name: "Odd", effects: [Custom(kind: "mystery")])]"#,
            &EffectRegistry::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn rejects_zero_max_stacks() {
        assert!(
            RelicLoader::parse(
                r#"[(id: "void", name: "Void", max_stacks: 0)]"#,
                &EffectRegistry::default()
            )
            .is_err()
        );
    }
}
