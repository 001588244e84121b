//! Deck content oracle.

use crate::card::Card;
use crate::state::UnitId;

/// Provides the initial card composition of each unit.
pub trait DeckOracle: Send + Sync {
    /// Cards in `unit`'s starting deck, or `None` when the unit has no deck.
    ///
    /// Order is irrelevant; the engine shuffles before the first draw.
    fn composition(&self, unit: UnitId) -> Option<Vec<Card>>;
}
