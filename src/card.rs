//! Mapping between marker ids and playing-card identities.
//!
//! Ids `0..=51` are the regular deck laid out suit by suit (13 ranks each),
//! `52` and `53` are the black and red jokers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DECK_SIZE: i32 = 54;
const RANKS_PER_SUIT: i32 = 13;
const BLACK_JOKER_ID: i32 = 52;
const RED_JOKER_ID: i32 = 53;

pub const JOKER: &str = "joker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
        }
    }

    pub fn from_name(name: &str) -> Option<Suit> {
        Suit::ALL.into_iter().find(|suit| suit.name() == name)
    }

    /// Position in the canonical deck order.
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    pub fn from_token(token: &str) -> Option<Rank> {
        Rank::ALL.into_iter().find(|rank| rank.token() == token)
    }

    /// Sort value, A=1 through K=13.
    pub fn value(self) -> u32 {
        self as u32 + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JokerColor {
    Black,
    Red,
}

impl JokerColor {
    pub fn token(self) -> &'static str {
        match self {
            JokerColor::Black => "B",
            JokerColor::Red => "R",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Card {
    Regular(Suit, Rank),
    Joker(JokerColor),
}

impl Card {
    pub fn from_id(id: i32) -> Result<Card> {
        match id {
            BLACK_JOKER_ID => Ok(Card::Joker(JokerColor::Black)),
            RED_JOKER_ID => Ok(Card::Joker(JokerColor::Red)),
            id if (0..BLACK_JOKER_ID).contains(&id) => {
                let suit = Suit::ALL[(id / RANKS_PER_SUIT) as usize];
                let rank = Rank::ALL[(id % RANKS_PER_SUIT) as usize];
                Ok(Card::Regular(suit, rank))
            }
            _ => Err(Error::InvalidMarkerId(id)),
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Card::Regular(suit, rank) => suit.index() as i32 * RANKS_PER_SUIT + rank as i32,
            Card::Joker(JokerColor::Black) => BLACK_JOKER_ID,
            Card::Joker(JokerColor::Red) => RED_JOKER_ID,
        }
    }

    /// Suit name, or `"joker"`.
    pub fn suit_token(self) -> &'static str {
        match self {
            Card::Regular(suit, _) => suit.name(),
            Card::Joker(_) => JOKER,
        }
    }

    /// Rank token, or the joker colour tag.
    pub fn rank_token(self) -> &'static str {
        match self {
            Card::Regular(_, rank) => rank.token(),
            Card::Joker(color) => color.token(),
        }
    }

    /// `NN_suit_rank`, without extension.
    pub fn stem(self) -> String {
        format!("{:02}_{}_{}", self.id(), self.suit_token(), self.rank_token())
    }

    pub fn file_name(self) -> String {
        format!("{}.png", self.stem())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.suit_token(), self.rank_token())
    }
}

/// `(suit, rank)` tokens for a marker id.
pub fn card_name(id: i32) -> Result<(&'static str, &'static str)> {
    let card = Card::from_id(id)?;
    Ok((card.suit_token(), card.rank_token()))
}

pub fn all_cards() -> impl Iterator<Item = Card> {
    (0..DECK_SIZE).filter_map(|id| Card::from_id(id).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SUITS: [&str; 4] = ["spades", "hearts", "diamonds", "clubs"];
    const RANKS: [&str; 13] = [
        "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
    ];

    #[test]
    fn regular_ids_follow_suit_major_order() {
        for id in 0..52 {
            let (suit, rank) = card_name(id).unwrap();
            assert_eq!(suit, SUITS[(id / 13) as usize]);
            assert_eq!(rank, RANKS[(id % 13) as usize]);
        }
    }

    #[test]
    fn jokers() {
        assert_eq!(card_name(52).unwrap(), ("joker", "B"));
        assert_eq!(card_name(53).unwrap(), ("joker", "R"));
    }

    #[test]
    fn mapping_is_injective() {
        let names: HashSet<_> = (0..DECK_SIZE).map(|id| card_name(id).unwrap()).collect();
        assert_eq!(names.len(), DECK_SIZE as usize);
    }

    #[test]
    fn id_roundtrips_through_card() {
        for card in all_cards() {
            assert_eq!(Card::from_id(card.id()).unwrap(), card);
        }
        assert_eq!(all_cards().count(), 54);
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        assert!(matches!(Card::from_id(54), Err(Error::InvalidMarkerId(54))));
        assert!(matches!(Card::from_id(-1), Err(Error::InvalidMarkerId(-1))));
    }

    #[test]
    fn file_names() {
        assert_eq!(Card::from_id(2).unwrap().file_name(), "02_spades_3.png");
        assert_eq!(Card::from_id(22).unwrap().file_name(), "22_hearts_10.png");
        assert_eq!(Card::from_id(53).unwrap().file_name(), "53_joker_R.png");
    }

    #[test]
    fn rank_values_are_one_based() {
        assert_eq!(Rank::Ace.value(), 1);
        assert_eq!(Rank::from_token("10").unwrap().value(), 10);
        assert_eq!(Rank::King.value(), 13);
        assert_eq!(Rank::from_token("B"), None);
    }
}
