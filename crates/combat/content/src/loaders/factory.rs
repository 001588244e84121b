//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use combat_core::{CombatConfig, EffectRegistry, RelicDefinition};

use crate::loaders::{ConfigLoader, EncounterLoader, EnemyLoader, LoadResult, RelicLoader};
use crate::templates::{EncounterSetup, EnemyTemplate};

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── combat.toml
/// ├── enemies.ron
/// ├── relics.ron
/// └── encounters/
///     ├── tutorial.ron
///     └── ambush.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat configuration from `combat.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join("combat.toml"))
    }

    /// Load the enemy catalog from `enemies.ron`.
    pub fn load_enemies(&self) -> LoadResult<Vec<EnemyTemplate>> {
        EnemyLoader::load(&self.data_dir.join("enemies.ron"))
    }

    /// Load the relic catalog from `relics.ron`.
    pub fn load_relics(&self, registry: &EffectRegistry) -> LoadResult<Vec<Arc<RelicDefinition>>> {
        RelicLoader::load(&self.data_dir.join("relics.ron"), registry)
    }

    /// Load `encounters/{name}.ron` together with every catalog it needs.
    pub fn load_encounter(&self, name: &str, registry: &EffectRegistry) -> LoadResult<EncounterSetup> {
        let config = self.load_config()?;
        let enemies = self.load_enemies()?;
        let relics = self.load_relics(registry)?;
        let path = self.data_dir.join("encounters").join(format!("{}.ron", name));
        EncounterLoader::load(&path, &config, &enemies, &relics)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
