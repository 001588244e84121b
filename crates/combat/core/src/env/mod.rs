//! Traits describing read-only encounter data.
//!
//! Oracles expose enemy tuning and deck compositions. The engine treats both
//! as opaque configuration: it reads tuning once per enemy per phase and only
//! ever shuffles, draws and rebuilds the decks it is given.
mod deck;
mod tuning;

pub use deck::DeckOracle;
pub use tuning::{Band, EnemyTuning, EnemyTuningOracle};
