use strum::{Display, EnumIter};

use crate::card::Card;
use crate::deck::Deck;

use super::Threshold;

/// Which side an accumulator belongs to.
///
/// There is a single `Enemy` slot; the context rebinds it to each enemy in turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Actor {
    Player,
    Enemy,
}

/// The two phases each actor accumulates independently every turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseKind {
    Defense,
    Attack,
}

/// Result of a single [`PhaseAccumulator::hit`].
///
/// Callers re-read `total`, `is_standing` and `is_busted` afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// The accumulator was already terminal; nothing was drawn.
    Ignored,
    /// The deck had no card to give.
    DeckEmpty,
    /// A card was drawn and appended.
    Drew(Card),
}

/// Running card total and bust/stand state for one (actor, phase) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseAccumulator {
    actor: Actor,
    phase: PhaseKind,
    cards: Vec<Card>,
    total: u32,
    standing: bool,
    busted: bool,
}

impl PhaseAccumulator {
    pub fn new(actor: Actor, phase: PhaseKind) -> Self {
        Self {
            actor,
            phase,
            cards: Vec::new(),
            total: 0,
            standing: false,
            busted: false,
        }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }

    pub fn phase(&self) -> PhaseKind {
        self.phase
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn is_standing(&self) -> bool {
        self.standing
    }

    pub fn is_busted(&self) -> bool {
        self.busted
    }

    /// Standing or busted: further draws and stands are no-ops.
    pub fn is_terminal(&self) -> bool {
        self.standing || self.busted
    }

    /// Draws one card from `deck` and applies the bust rule.
    pub fn hit(&mut self, deck: &mut Deck, threshold: Threshold) -> HitOutcome {
        if self.is_terminal() {
            return HitOutcome::Ignored;
        }
        let Some(card) = deck.draw() else {
            return HitOutcome::DeckEmpty;
        };
        self.accept(card, threshold);
        HitOutcome::Drew(card)
    }

    /// Locks the current total, re-checking the bust rule on the way.
    ///
    /// Returns `false` when the accumulator was already terminal.
    pub fn stand(&mut self, threshold: Threshold) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.total = self.raw_sum();
        self.standing = true;
        if self.total > threshold.get() {
            self.bust();
        }
        true
    }

    /// Clears the accumulator for a new turn and hands back the held cards.
    pub fn reset(&mut self) -> Vec<Card> {
        self.total = 0;
        self.standing = false;
        self.busted = false;
        core::mem::take(&mut self.cards)
    }

    fn accept(&mut self, card: Card, threshold: Threshold) {
        self.cards.push(card);

        if card.is_joker() && self.actor == Actor::Player {
            self.total = threshold.get();
            self.standing = true;
            return;
        }

        self.total = self.raw_sum();
        if self.total > threshold.get() {
            self.bust();
        }
    }

    fn bust(&mut self) {
        self.busted = true;
        self.standing = false;
        self.total = 0;
    }

    fn raw_sum(&self) -> u32 {
        self.cards.iter().map(|card| card.value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn card(value: u32) -> Card {
        Card::with_value(Rank::Ten, Suit::Hearts, value)
    }

    /// Deck that yields `values` in the given order.
    fn deck_of(values: &[u32]) -> Deck {
        Deck::new(values.iter().rev().map(|&v| card(v)).collect())
    }

    fn threshold(value: u32) -> Threshold {
        Threshold::new(value).unwrap()
    }

    #[test]
    fn accumulates_and_busts_to_zero() {
        let mut deck = deck_of(&[10, 9, 5]);
        let mut acc = PhaseAccumulator::new(Actor::Player, PhaseKind::Defense);

        acc.hit(&mut deck, threshold(21));
        acc.hit(&mut deck, threshold(21));
        assert_eq!(acc.total(), 19);
        assert!(!acc.is_busted());

        acc.hit(&mut deck, threshold(21));
        assert!(acc.is_busted());
        assert_eq!(acc.total(), 0);
        assert_eq!(acc.cards().len(), 3);
    }

    #[test]
    fn landing_exactly_on_threshold_is_not_a_bust() {
        let mut deck = deck_of(&[10, 11]);
        let mut acc = PhaseAccumulator::new(Actor::Enemy, PhaseKind::Attack);
        acc.hit(&mut deck, threshold(21));
        acc.hit(&mut deck, threshold(21));
        assert_eq!(acc.total(), 21);
        assert!(!acc.is_terminal());
    }

    #[test]
    fn player_joker_maxes_and_locks() {
        let mut deck = Deck::new(vec![Card::joker(), card(4)]);
        let mut acc = PhaseAccumulator::new(Actor::Player, PhaseKind::Attack);

        acc.hit(&mut deck, threshold(17));
        assert_eq!(acc.total(), 4);

        acc.hit(&mut deck, threshold(17));
        assert_eq!(acc.total(), 17);
        assert!(acc.is_standing());
        assert!(!acc.is_busted());
    }

    #[test]
    fn enemy_joker_counts_as_plain_card() {
        let mut deck = Deck::new(vec![Card::joker(), card(6)]);
        let mut acc = PhaseAccumulator::new(Actor::Enemy, PhaseKind::Attack);

        acc.hit(&mut deck, threshold(21));
        acc.hit(&mut deck, threshold(21));
        assert_eq!(acc.total(), 6);
        assert!(!acc.is_terminal());
    }

    #[test]
    fn terminal_accumulator_ignores_hits_and_stands() {
        let mut deck = deck_of(&[20, 5, 3, 2]);
        let mut acc = PhaseAccumulator::new(Actor::Player, PhaseKind::Defense);
        acc.hit(&mut deck, threshold(21));
        acc.hit(&mut deck, threshold(21));
        assert!(acc.is_busted());

        assert_eq!(acc.hit(&mut deck, threshold(21)), HitOutcome::Ignored);
        assert!(!acc.stand(threshold(21)));
        assert_eq!(acc.total(), 0);
        assert!(acc.is_busted());
        assert!(!acc.is_standing());
        assert_eq!(deck.count(), 2);
    }

    #[test]
    fn joker_total_survives_repeated_stand() {
        let mut deck = Deck::new(vec![Card::joker(), card(3)]);
        let mut acc = PhaseAccumulator::new(Actor::Player, PhaseKind::Defense);
        acc.hit(&mut deck, threshold(21));
        acc.hit(&mut deck, threshold(21));

        assert!(!acc.stand(threshold(21)));
        assert_eq!(acc.total(), 21);
        assert!(acc.is_standing());
    }

    #[test]
    fn stand_rechecks_bust_against_current_threshold() {
        let mut deck = deck_of(&[10, 8]);
        let mut acc = PhaseAccumulator::new(Actor::Player, PhaseKind::Attack);
        acc.hit(&mut deck, threshold(21));
        acc.hit(&mut deck, threshold(21));

        // Threshold lowered between the draws and the stand.
        assert!(acc.stand(threshold(15)));
        assert!(acc.is_busted());
        assert_eq!(acc.total(), 0);
    }

    #[test]
    fn empty_deck_reports_without_mutation() {
        let mut deck = Deck::default();
        let mut acc = PhaseAccumulator::new(Actor::Player, PhaseKind::Attack);
        assert_eq!(acc.hit(&mut deck, threshold(21)), HitOutcome::DeckEmpty);
        assert!(acc.cards().is_empty());
    }

    #[test]
    fn reset_returns_cards_and_clears_flags() {
        let mut deck = deck_of(&[9, 9, 9]);
        let mut acc = PhaseAccumulator::new(Actor::Enemy, PhaseKind::Defense);
        for _ in 0..3 {
            acc.hit(&mut deck, threshold(21));
        }
        assert!(acc.is_busted());

        let released = acc.reset();
        assert_eq!(released.len(), 3);
        assert_eq!(acc.total(), 0);
        assert!(!acc.is_terminal());
    }
}
