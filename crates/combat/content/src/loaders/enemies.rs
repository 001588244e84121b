//! Enemy catalog loader.
//!
//! Loads enemy templates (HP, draw tuning, threshold overrides, deck) from RON.

use std::collections::HashSet;
use std::path::Path;

use combat_core::PhaseKind;

use crate::loaders::{LoadResult, read_file};
use crate::templates::EnemyTemplate;

/// Loader for the enemy catalog from RON files.
pub struct EnemyLoader;

impl EnemyLoader {
    /// Load the enemy catalog from a RON file.
    ///
    /// RON format: `Vec<EnemyTemplate>`
    pub fn load(path: &Path) -> LoadResult<Vec<EnemyTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<EnemyTemplate>> {
        let enemies: Vec<EnemyTemplate> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse enemy catalog RON: {}", e))?;

        let mut seen = HashSet::new();
        for enemy in &enemies {
            if !seen.insert(enemy.id.as_str()) {
                anyhow::bail!("Duplicate enemy id '{}' in catalog", enemy.id);
            }
            if enemy.max_hp == 0 {
                anyhow::bail!("Enemy '{}' must have positive max_hp", enemy.id);
            }
            for phase in [PhaseKind::Defense, PhaseKind::Attack] {
                if let Some(band) = enemy.tuning.band(phase)
                    && !band.is_valid()
                {
                    anyhow::bail!(
                        "Enemy '{}' has an empty {} band [{}, {}]",
                        enemy.id,
                        phase,
                        band.min,
                        band.max
                    );
                }
            }
        }

        Ok(enemies)
    }
}
