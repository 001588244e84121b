//! Immutable card values.

use strum::{Display, EnumIter, IntoEnumIterator};

/// Card rank. [`Rank::Joker`] is a distinct rank with its own primary value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Joker,
}

impl Rank {
    /// Primary value the rank carries when no custom value is supplied.
    ///
    /// Aces count 1, pips their face value, court cards 10 and Jokers 0.
    pub const fn default_value(self) -> u32 {
        match self {
            Rank::Ace => 1,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Joker => 0,
        }
    }

    /// Iterates the thirteen ranks of a standard pack (no Joker).
    pub fn standard() -> impl Iterator<Item = Rank> {
        Rank::iter().filter(|rank| *rank != Rank::Joker)
    }
}

/// Card suit. Jokers carry [`Suit::None`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    None,
}

impl Suit {
    /// Iterates the four suits of a standard pack.
    pub fn standard() -> impl Iterator<Item = Suit> {
        Suit::iter().filter(|suit| *suit != Suit::None)
    }
}

/// A single card: rank, suit and the primary numeric value used for totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
    pub value: u32,
}

impl Card {
    /// Creates a card with the rank's default value.
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self {
            rank,
            suit,
            value: rank.default_value(),
        }
    }

    /// Creates a card with a custom primary value (used for "extra" cards).
    pub const fn with_value(rank: Rank, suit: Suit, value: u32) -> Self {
        Self { rank, suit, value }
    }

    pub const fn joker() -> Self {
        Self::new(Rank::Joker, Suit::None)
    }

    pub const fn is_joker(&self) -> bool {
        matches!(self.rank, Rank::Joker)
    }

    /// The 52 cards of a standard pack, ordered by suit then rank.
    pub fn standard_pack() -> Vec<Card> {
        Suit::standard()
            .flat_map(|suit| Rank::standard().map(move |rank| Card::new(rank, suit)))
            .collect()
    }
}

impl core::fmt::Display for Card {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_joker() {
            write!(f, "Joker")
        } else {
            write!(f, "{} of {} ({})", self.rank, self.suit, self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pack_has_52_cards_without_jokers() {
        let pack = Card::standard_pack();
        assert_eq!(pack.len(), 52);
        assert!(pack.iter().all(|card| !card.is_joker()));
        assert_eq!(pack.iter().map(|c| c.value).sum::<u32>(), 4 * (1 + 2 + 3 + 4 + 5 + 6 + 7 + 8 + 9 + 40));
    }

    #[test]
    fn joker_has_zero_value() {
        let joker = Card::joker();
        assert!(joker.is_joker());
        assert_eq!(joker.value, 0);
        assert_eq!(joker.suit, Suit::None);
    }
}
