//! Content loaders for reading encounter data from files.
//!
//! Loaders convert RON/TOML files into combat-core types and the templates
//! in [`crate::templates`].

pub mod config;
pub mod encounter;
pub mod enemies;
pub mod factory;
pub mod relics;

pub use config::ConfigLoader;
pub use encounter::EncounterLoader;
pub use enemies::EnemyLoader;
pub use factory::ContentFactory;
pub use relics::RelicLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
