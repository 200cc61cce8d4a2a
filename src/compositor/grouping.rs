//! Recovers card semantics from marker filenames and orders them for print.

use std::cmp::Ordering;

use crate::card::{Rank, Suit, JOKER};

/// Sort key for rank tokens that are not part of the deck.
pub const UNKNOWN_RANK_ORDER: u32 = 999;

const JOKER_PREFIXES: [&str; 2] = ["52_", "53_"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFile {
    pub file_name: String,
    pub suit: String,
    pub rank: String,
}

impl MarkerFile {
    /// Joker ids, or anything whose suit token is `joker`.
    pub fn is_joker(&self) -> bool {
        self.suit == JOKER
            || JOKER_PREFIXES
                .iter()
                .any(|prefix| self.file_name.starts_with(prefix))
    }

    pub fn rank_order(&self) -> u32 {
        Rank::from_token(&self.rank).map_or(UNKNOWN_RANK_ORDER, Rank::value)
    }

    /// File name without the `.png` extension.
    pub fn stem(&self) -> &str {
        self.file_name
            .strip_suffix(".png")
            .unwrap_or(&self.file_name)
    }
}

/// Parses `NN_suit_rank.png`. Anything else yields `None`.
pub fn parse_marker_file(file_name: &str) -> Option<MarkerFile> {
    let stem = file_name.strip_suffix(".png")?;
    let mut parts = stem.split('_');
    let (_id, suit, rank) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || suit.is_empty() || rank.is_empty() {
        return None;
    }
    Some(MarkerFile {
        file_name: file_name.to_string(),
        suit: suit.to_string(),
        rank: rank.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuitGroup {
    pub suit: String,
    pub cards: Vec<MarkerFile>,
}

impl SuitGroup {
    pub fn file_names(&self) -> Vec<&str> {
        self.cards.iter().map(|card| card.file_name.as_str()).collect()
    }
}

fn suit_order(a: &str, b: &str) -> Ordering {
    match (Suit::from_name(a), Suit::from_name(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn by_rank(a: &MarkerFile, b: &MarkerFile) -> Ordering {
    a.rank_order()
        .cmp(&b.rank_order())
        .then_with(|| a.file_name.cmp(&b.file_name))
}

/// Groups marker files by suit, each group sorted A..K.
///
/// Known suits come first in deck order, unknown suit tokens follow
/// alphabetically and the jokers close the list. Unparseable names are
/// skipped.
pub fn group_cards_by_suit<S: AsRef<str>>(file_names: &[S]) -> Vec<SuitGroup> {
    let mut groups: Vec<SuitGroup> = Vec::new();
    let mut jokers = Vec::new();

    for name in file_names {
        let Some(card) = parse_marker_file(name.as_ref()) else {
            log::warn!("Skipping marker file with unexpected name: {}", name.as_ref());
            continue;
        };
        if card.is_joker() {
            jokers.push(card);
            continue;
        }
        match groups.iter_mut().find(|group| group.suit == card.suit) {
            Some(group) => group.cards.push(card),
            None => groups.push(SuitGroup {
                suit: card.suit.clone(),
                cards: vec![card],
            }),
        }
    }

    groups.sort_by(|a, b| suit_order(&a.suit, &b.suit));
    for group in &mut groups {
        group.cards.sort_by(by_rank);
    }

    if !jokers.is_empty() {
        jokers.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        groups.push(SuitGroup {
            suit: JOKER.to_string(),
            cards: jokers,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_regular_cards_and_jokers() {
        let names = ["52_joker_B.png", "01_spades_2.png", "00_spades_A.png"];
        let groups = group_cards_by_suit(&names);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].suit, "spades");
        assert_eq!(groups[0].file_names(), ["00_spades_A.png", "01_spades_2.png"]);
        assert_eq!(groups[1].suit, "joker");
        assert_eq!(groups[1].file_names(), ["52_joker_B.png"]);
    }

    #[test]
    fn ranks_sort_numerically_then_faces() {
        let names = [
            "12_spades_K.png",
            "09_spades_10.png",
            "10_spades_J.png",
            "01_spades_2.png",
            "11_spades_Q.png",
            "00_spades_A.png",
        ];
        let groups = group_cards_by_suit(&names);
        assert_eq!(
            groups[0].file_names(),
            [
                "00_spades_A.png",
                "01_spades_2.png",
                "09_spades_10.png",
                "10_spades_J.png",
                "11_spades_Q.png",
                "12_spades_K.png",
            ]
        );
    }

    #[test]
    fn unknown_ranks_sort_last() {
        let names = ["99_hearts_X.png", "25_hearts_K.png", "13_hearts_A.png"];
        let groups = group_cards_by_suit(&names);
        assert_eq!(
            groups[0].file_names(),
            ["13_hearts_A.png", "25_hearts_K.png", "99_hearts_X.png"]
        );
    }

    #[test]
    fn suits_follow_deck_order() {
        let groups = group_cards_by_suit(&[
            "39_clubs_A.png",
            "53_joker_R.png",
            "13_hearts_A.png",
            "00_spades_A.png",
            "26_diamonds_A.png",
        ]);
        let suits: Vec<_> = groups.iter().map(|g| g.suit.as_str()).collect();
        assert_eq!(suits, ["spades", "hearts", "diamonds", "clubs", "joker"]);
    }

    #[test]
    fn malformed_names_are_dropped() {
        let names = ["readme.png", "00_spades.png", "00_spades_A.jpg", "a_b_c_d.png"];
        let groups = group_cards_by_suit(&names);
        assert!(groups.is_empty());
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let names: [&str; 0] = [];
        assert!(group_cards_by_suit(&names).is_empty());
    }

    #[test]
    fn parse_extracts_tokens() {
        let card = parse_marker_file("22_hearts_10.png").unwrap();
        assert_eq!(card.suit, "hearts");
        assert_eq!(card.rank, "10");
        assert_eq!(card.rank_order(), 10);
        assert_eq!(card.stem(), "22_hearts_10");
        assert!(!card.is_joker());
        assert!(parse_marker_file("53_joker_R.png").unwrap().is_joker());
    }

    #[test]
    fn stray_joker_suit_joins_the_joker_group() {
        let groups = group_cards_by_suit(&["52_joker_B.png", "54_joker_X.png", "00_spades_A.png"]);
        let suits: Vec<_> = groups.iter().map(|g| g.suit.as_str()).collect();
        assert_eq!(suits, ["spades", "joker"]);
        assert_eq!(groups[1].file_names(), ["52_joker_B.png", "54_joker_X.png"]);
    }

    #[test]
    fn stem_strips_only_one_extension() {
        let card = parse_marker_file("x_y_z.png.png").unwrap();
        assert_eq!(card.rank, "z.png");
        assert_eq!(card.stem(), "x_y_z.png");
    }
}
