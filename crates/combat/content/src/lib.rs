//! Data-driven encounter content and loaders.
//!
//! This crate houses the opaque configuration the combat engine consumes and
//! provides loaders for RON/TOML data files:
//! - Combat configuration (TOML)
//! - Enemy catalog with draw tuning, threshold overrides and decks (RON)
//! - Relic catalog with effect specs (RON)
//! - Encounters tying a player, enemies and starting relics together (RON)
//!
//! Content is consumed by the runtime's oracles and session builder and never
//! appears in combat state directly.

pub mod templates;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use templates::{
    DeckSpec, EncounterSetup, EncounterSpec, EnemyTemplate, PlayerSpec, ThresholdOverrides,
};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, EncounterLoader, EnemyLoader, LoadResult, RelicLoader,
};
