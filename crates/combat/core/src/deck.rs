//! Draw pile with discard and rebuild semantics.
//!
//! A deck never rebuilds on its own: [`Deck::draw`] on an empty pile returns
//! `None` and the caller decides when to call [`Deck::rebuild_and_shuffle`].

use rand::RngCore;
use rand::seq::SliceRandom;

use crate::card::Card;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deck {
    /// Draw pile; the top card is the last element.
    draw_pile: Vec<Card>,
    discard: Vec<Card>,
    /// Original composition, restored when both piles are empty.
    snapshot: Option<Vec<Card>>,
}

impl Deck {
    /// Creates a deck whose draw pile is `cards` in the given order (last = top).
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            draw_pile: cards,
            discard: Vec::new(),
            snapshot: None,
        }
    }

    /// Creates a deck and remembers its composition for later rebuilds.
    pub fn with_snapshot(cards: Vec<Card>) -> Self {
        Self {
            snapshot: Some(cards.clone()),
            draw_pile: cards,
            discard: Vec::new(),
        }
    }

    /// Standard pack plus `jokers` Jokers, snapshotted and shuffled.
    pub fn standard(jokers: u8, rng: &mut dyn RngCore) -> Self {
        let mut cards = Card::standard_pack();
        cards.extend((0..jokers).map(|_| Card::joker()));
        let mut deck = Self::with_snapshot(cards);
        deck.shuffle(rng);
        deck
    }

    /// Number of cards left in the draw pile.
    pub fn count(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_pile.is_empty()
    }

    pub fn discard_count(&self) -> usize {
        self.discard.len()
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.draw_pile.pop()
    }

    /// Peeks at the top card without drawing it.
    pub fn peek(&self) -> Option<&Card> {
        self.draw_pile.last()
    }

    pub fn discard(&mut self, card: Card) {
        self.discard.push(card);
    }

    pub fn discard_all(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.discard.extend(cards);
    }

    pub fn shuffle(&mut self, rng: &mut dyn RngCore) {
        self.draw_pile.shuffle(rng);
    }

    /// Moves the discard pile back into the draw pile and reshuffles.
    ///
    /// When the discard pile is empty too, the snapshot (if any) is restored.
    /// Returns the new draw pile size; `0` means the deck could not be rebuilt.
    pub fn rebuild_and_shuffle(&mut self, rng: &mut dyn RngCore) -> usize {
        self.draw_pile.append(&mut self.discard);
        if self.draw_pile.is_empty()
            && let Some(snapshot) = &self.snapshot
        {
            self.draw_pile = snapshot.clone();
        }
        self.shuffle(rng);
        self.draw_pile.len()
    }
}
