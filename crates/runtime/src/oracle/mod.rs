//! Runtime wrappers around static encounter content.
//!
//! These implementations expose the `combat-core` oracle traits and bundle
//! them into an [`OracleManager`] the session consults when binding decks and
//! building enemy policies. The data is immutable once the encounter starts.
mod deck;
mod tuning;

use std::sync::Arc;

use combat_core::{DeckOracle, EnemyTuningOracle};

pub use deck::StaticDeckOracle;
pub use tuning::StaticTuningOracle;

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) tuning: Arc<dyn EnemyTuningOracle>,
    pub(crate) decks: Arc<dyn DeckOracle>,
}

impl OracleManager {
    pub fn new(tuning: Arc<dyn EnemyTuningOracle>, decks: Arc<dyn DeckOracle>) -> Self {
        Self { tuning, decks }
    }

    pub fn tuning(&self) -> &dyn EnemyTuningOracle {
        self.tuning.as_ref()
    }

    pub fn decks(&self) -> &dyn DeckOracle {
        self.decks.as_ref()
    }
}

impl std::fmt::Debug for OracleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleManager").finish_non_exhaustive()
    }
}
