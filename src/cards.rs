use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCardError {
    #[error("invalid rank '{0}'")]
    Rank(String),
    #[error("invalid suit '{0}'")]
    Suit(String),
    #[error("invalid card '{0}'")]
    Card(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }
}

impl Display for Suit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Suit {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "♠" => Ok(Suit::Spades),
            "h" | "♥" => Ok(Suit::Hearts),
            "d" | "♦" => Ok(Suit::Diamonds),
            "c" | "♣" => Ok(Suit::Clubs),
            _ => Err(ParseCardError::Suit(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
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
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
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
        Rank::Ace,
    ];

    /// Numeric value, 2 through 14 (ace high).
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    /// A, K, Q, J or T.
    pub fn is_broadway(self) -> bool {
        self >= Rank::Ten
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_label())
    }
}

impl FromStr for Rank {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "2" => Ok(Rank::Two),
            "3" => Ok(Rank::Three),
            "4" => Ok(Rank::Four),
            "5" => Ok(Rank::Five),
            "6" => Ok(Rank::Six),
            "7" => Ok(Rank::Seven),
            "8" => Ok(Rank::Eight),
            "9" => Ok(Rank::Nine),
            "T" | "10" => Ok(Rank::Ten),
            "J" => Ok(Rank::Jack),
            "Q" => Ok(Rank::Queen),
            "K" => Ok(Rank::King),
            "A" => Ok(Rank::Ace),
            _ => Err(ParseCardError::Rank(s.to_string())),
        }
    }
}

/// A single playing card. Serialized as its two-character notation (`"Qs"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, SerializeDisplay, DeserializeFromStr,
)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn rank_value(&self) -> u8 {
        self.rank.value()
    }

    pub fn notation(&self) -> String {
        format!("{}{}", self.rank.short_label(), self.suit.letter())
    }

    /// Rank followed by the suit glyph, for terminal output.
    pub fn pretty(&self) -> String {
        format!("{}{}", self.rank.short_label(), self.suit.symbol())
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.notation())
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .char_indices()
            .last()
            .map(|(idx, _)| idx)
            .filter(|idx| *idx > 0)
            .ok_or_else(|| ParseCardError::Card(s.to_string()))?;
        let (rank, suit) = trimmed.split_at(split);
        Ok(Card::new(rank.parse()?, suit.parse()?))
    }
}

/// Parses a compact card list: `"9d7d8d"`, `"9d 7d 8d"` or `"9d,7d,8d"`.
pub fn parse_cards(input: &str) -> Result<Vec<Card>, ParseCardError> {
    let compact: Vec<char> = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    let mut cards = Vec::with_capacity(compact.len() / 2);
    let mut idx = 0;
    while idx < compact.len() {
        let rank_len = if compact[idx] == '1' && compact.get(idx + 1) == Some(&'0') {
            2
        } else {
            1
        };
        let end = idx + rank_len + 1;
        if end > compact.len() {
            return Err(ParseCardError::Card(compact[idx..].iter().collect()));
        }
        let token: String = compact[idx..end].iter().collect();
        cards.push(token.parse()?);
        idx = end;
    }
    Ok(cards)
}

pub fn standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

pub fn deal_unique_cards<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Card> {
    let mut deck = standard_deck();
    deck.shuffle(rng);
    deck.into_iter().take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_and_spaced_lists() {
        let compact = parse_cards("9d7d8d").unwrap();
        let spaced = parse_cards("9d 7d, 8d").unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(compact[0], Card::new(Rank::Nine, Suit::Diamonds));
    }

    #[test]
    fn ten_accepts_both_spellings() {
        assert_eq!(parse_cards("Ts10h").unwrap().len(), 2);
        assert_eq!("10h".parse::<Card>().unwrap().rank, Rank::Ten);
    }

    #[test]
    fn rejects_dangling_rank() {
        assert!(parse_cards("AsK").is_err());
        assert!("Zx".parse::<Card>().is_err());
    }

    #[test]
    fn notation_round_trips_through_display() {
        let card = Card::new(Rank::Queen, Suit::Spades);
        assert_eq!(card.to_string(), "Qs");
        assert_eq!(card.pretty(), "Q♠");
        assert_eq!("Qs".parse::<Card>().unwrap(), card);
    }
}
