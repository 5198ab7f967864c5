use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{Card, Rank, Suit};

const WHEEL_ACE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    pub fn label(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawFlags {
    pub has_flush_draw: bool,
    #[serde(rename = "hasOESD")]
    pub has_oesd: bool,
    pub has_gutshot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandEvaluation {
    pub category: HandCategory,
    /// Tiebreak values, most significant first.
    pub ranks: Vec<u8>,
    pub flags: DrawFlags,
}

impl HandEvaluation {
    pub fn label(&self) -> &'static str {
        self.category.label()
    }
}

/// Compares two evaluations by category, then tiebreak ranks. Draw flags are
/// ignored.
pub fn compare(a: &HandEvaluation, b: &HandEvaluation) -> std::cmp::Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| a.ranks.cmp(&b.ranks))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("at least 5 cards required, got {found}")]
    InsufficientCards { found: usize },
}

/// Bit `v` set for every rank value present; aces also set bit 1.
fn rank_mask<'a>(cards: impl IntoIterator<Item = &'a Card>) -> u16 {
    let mut mask = 0u16;
    for card in cards {
        mask |= 1 << card.rank_value();
        if card.rank == Rank::Ace {
            mask |= 1 << WHEEL_ACE;
        }
    }
    mask
}

/// Values present in `mask`, ascending, with the low ace as 1.
fn mask_values(mask: u16) -> Vec<u8> {
    (WHEEL_ACE..=Rank::Ace.value())
        .filter(|v| mask & (1 << v) != 0)
        .collect()
}

fn straight_high(mask: u16) -> Option<u8> {
    (5u8..=Rank::Ace.value()).rev().find(|&high| {
        let needed: u16 = (0..5).fold(0, |acc, i| acc | 1 << (high - i));
        mask & needed == needed
    })
}

/// Highest `k` values from `desc`, skipping the excluded ones.
fn top_kickers(desc: &[u8], exclude: &[u8], k: usize) -> Vec<u8> {
    desc.iter()
        .copied()
        .filter(|v| !exclude.contains(v))
        .take(k)
        .collect()
}

fn has_open_ended(mask: u16) -> bool {
    mask_values(mask)
        .into_iter()
        .tuple_windows()
        .any(|(low, _, _, high)| high - low == 3)
}

fn has_gutshot(mask: u16) -> bool {
    (WHEEL_ACE..=10).any(|start| {
        let present = (start..start + 5).filter(|v| mask & (1 << v) != 0).count();
        present == 4
    })
}

fn draw_flags(cards: &[Card], suit_counts: &[u8; 4]) -> DrawFlags {
    let mask = rank_mask(cards);
    let has_oesd = has_open_ended(mask);
    DrawFlags {
        has_flush_draw: suit_counts.iter().copied().max().unwrap_or(0) == 4,
        has_oesd,
        has_gutshot: !has_oesd && has_gutshot(mask),
    }
}

/// Evaluates hero and board cards together (up to seven cards).
///
/// Fewer than five cards is not an error condition for callers: it means there
/// is no made hand yet.
pub fn evaluate(hero: &[Card], board: &[Card]) -> Result<HandEvaluation, EvalError> {
    let cards: Vec<Card> = hero.iter().chain(board.iter()).copied().collect();
    if cards.len() < 5 {
        return Err(EvalError::InsufficientCards { found: cards.len() });
    }

    let values_desc: Vec<u8> = cards
        .iter()
        .map(Card::rank_value)
        .sorted_unstable_by(|a, b| b.cmp(a))
        .collect();

    let mut suit_counts = [0u8; 4];
    let mut rank_counts = [0u8; 15];
    for card in &cards {
        suit_counts[card.suit.index()] += 1;
        rank_counts[card.rank_value() as usize] += 1;
    }

    let flush_suit: Option<Suit> = Suit::ALL
        .into_iter()
        .find(|suit| suit_counts[suit.index()] >= 5);

    // (count, value), biggest group first, ties broken by higher rank.
    let groups: Vec<(u8, u8)> = (2u8..=14)
        .filter(|&v| rank_counts[v as usize] > 0)
        .map(|v| (rank_counts[v as usize], v))
        .sorted_unstable_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)))
        .collect();
    let first = groups.first().copied().unwrap_or((0, 0));
    let second = groups.get(1).copied().unwrap_or((0, 0));

    let flush_values: Vec<u8> = flush_suit
        .map(|suit| {
            cards
                .iter()
                .filter(|c| c.suit == suit)
                .map(Card::rank_value)
                .sorted_unstable_by(|a, b| b.cmp(a))
                .collect()
        })
        .unwrap_or_default();
    let straight_flush_high = flush_suit.and_then(|suit| {
        straight_high(rank_mask(cards.iter().filter(|c| c.suit == suit)))
    });
    let straight = straight_high(rank_mask(&cards));

    let (category, ranks) = if let Some(high) = straight_flush_high {
        (HandCategory::StraightFlush, vec![high])
    } else if first.0 == 4 {
        let quad = first.1;
        let mut ranks = vec![quad];
        ranks.extend(top_kickers(&values_desc, &[quad], 1));
        (HandCategory::FourOfAKind, ranks)
    } else if first.0 == 3 && second.0 >= 2 {
        (HandCategory::FullHouse, vec![first.1, second.1])
    } else if flush_suit.is_some() {
        (
            HandCategory::Flush,
            flush_values.into_iter().take(5).collect(),
        )
    } else if let Some(high) = straight {
        (HandCategory::Straight, vec![high])
    } else if first.0 == 3 {
        let trips = first.1;
        let mut ranks = vec![trips];
        ranks.extend(top_kickers(&values_desc, &[trips], 2));
        (HandCategory::ThreeOfAKind, ranks)
    } else if first.0 == 2 && second.0 == 2 {
        let (high, low) = (first.1.max(second.1), first.1.min(second.1));
        let mut ranks = vec![high, low];
        ranks.extend(top_kickers(&values_desc, &[high, low], 1));
        (HandCategory::TwoPair, ranks)
    } else if first.0 == 2 {
        let pair = first.1;
        let mut ranks = vec![pair];
        ranks.extend(top_kickers(&values_desc, &[pair], 3));
        (HandCategory::OnePair, ranks)
    } else {
        (
            HandCategory::HighCard,
            values_desc.iter().copied().take(5).collect(),
        )
    };

    Ok(HandEvaluation {
        category,
        ranks,
        flags: draw_flags(&cards, &suit_counts),
    })
}
