//! Combat configuration loader.

use std::path::Path;

use combat_core::{CombatConfig, Threshold};

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys keep their defaults. A global threshold below the engine
    /// minimum is rejected here rather than silently replaced later.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse combat config TOML: {}", e))?;

        Threshold::new(config.global_threshold)
            .map_err(|e| anyhow::anyhow!("Invalid global_threshold in combat config: {}", e))?;

        Ok(config)
    }
}
