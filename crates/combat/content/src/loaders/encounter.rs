//! Encounter loader.
//!
//! An encounter file references enemy and relic catalog ids. Loading resolves
//! those references against already-loaded catalogs and produces an
//! [`EncounterSetup`].

use std::path::Path;
use std::sync::Arc;

use combat_core::{CombatConfig, RelicDefinition};

use crate::loaders::{LoadResult, read_file};
use crate::templates::{DeckSpec, EncounterSetup, EncounterSpec, EnemyTemplate};

/// Loader for encounters from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    /// Load an encounter from a RON file.
    ///
    /// RON format: `EncounterSpec`
    pub fn load(
        path: &Path,
        config: &CombatConfig,
        enemies: &[EnemyTemplate],
        relics: &[Arc<RelicDefinition>],
    ) -> LoadResult<EncounterSetup> {
        let content = read_file(path)?;
        let spec: EncounterSpec = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))?;
        Self::resolve(&spec, config, enemies, relics)
    }

    /// Resolves catalog references in `spec`.
    pub fn resolve(
        spec: &EncounterSpec,
        config: &CombatConfig,
        enemies: &[EnemyTemplate],
        relics: &[Arc<RelicDefinition>],
    ) -> LoadResult<EncounterSetup> {
        if spec.enemies.is_empty() {
            anyhow::bail!("Encounter must contain at least one enemy");
        }
        if spec.enemies.len() > CombatConfig::MAX_ENEMIES {
            anyhow::bail!(
                "Encounter has {} enemies, at most {} are allowed",
                spec.enemies.len(),
                CombatConfig::MAX_ENEMIES
            );
        }

        let mut config = config.clone();
        if let Some(threshold) = spec.global_threshold {
            config.global_threshold = threshold.get();
        }
        if let Some(max_hp) = spec.player.max_hp {
            config.player_max_hp = max_hp;
        }

        let enemies = spec
            .enemies
            .iter()
            .map(|id| {
                enemies
                    .iter()
                    .find(|enemy| &enemy.id == id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Unknown enemy '{}' in encounter", id))
            })
            .collect::<LoadResult<Vec<_>>>()?;

        let relics = spec
            .relics
            .iter()
            .map(|id| {
                relics
                    .iter()
                    .find(|relic| &relic.id == id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Unknown relic '{}' in encounter", id))
            })
            .collect::<LoadResult<Vec<_>>>()?;

        let player_deck = spec
            .player
            .deck
            .clone()
            .unwrap_or_else(|| DeckSpec::standard_with_jokers(config.player_jokers))
            .cards();

        Ok(EncounterSetup {
            player_name: spec
                .player
                .name
                .clone()
                .unwrap_or_else(|| "Player".to_owned()),
            player_deck,
            player_thresholds: spec.player.thresholds,
            enemies,
            relics,
            config,
        })
    }
}
