use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};
use crate::evaluator::{DrawFlags, HandCategory, evaluate};
use crate::game::Street;

const GOOD_KICKER_MIN: u8 = Rank::Queen as u8;
const FLUSH_DRAW_OUTS: u8 = 9;
const OPEN_ENDED_OUTS: u8 = 8;
const GUTSHOT_OUTS: u8 = 4;
const MAX_OUTS: u8 = 17;
const SEMI_BLUFF_MIN_OUTS: u8 = 4;

/// Coarse strength bucket, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandTier {
    #[default]
    Aire,
    Media,
    Fuerte,
    MuyFuerte,
}

impl HandTier {
    pub fn as_str(self) -> &'static str {
        match self {
            HandTier::Aire => "AIRE",
            HandTier::Media => "MEDIA",
            HandTier::Fuerte => "FUERTE",
            HandTier::MuyFuerte => "MUY_FUERTE",
        }
    }
}

impl Display for HandTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandSnapshot {
    pub hand_tier: HandTier,
    pub outs: u8,
    pub has_blockers_for_bluff: bool,
    /// `None` until hero and board make at least five cards.
    pub made_category: Option<HandCategory>,
    pub label: String,
    pub ranks: Vec<u8>,
    pub flags: DrawFlags,
}

/// Highest and second-highest distinct board values (0 when missing).
fn top_board_values(board: &[Card]) -> (u8, u8) {
    let mut values: Vec<u8> = board.iter().map(Card::rank_value).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.dedup();
    (
        values.first().copied().unwrap_or(0),
        values.get(1).copied().unwrap_or(0),
    )
}

fn hole_values(hero: &[Card]) -> Option<[u8; 2]> {
    match hero {
        [a, b] => Some([a.rank_value(), b.rank_value()]),
        _ => None,
    }
}

fn is_top_two_pair(hero: &[Card], board: &[Card]) -> bool {
    let (top, second) = top_board_values(board);
    match hole_values(hero) {
        Some(hole) if top > 0 && second > 0 => hole.contains(&top) && hole.contains(&second),
        _ => false,
    }
}

fn is_top_pair_good_kicker(hero: &[Card], board: &[Card]) -> bool {
    let (top, _) = top_board_values(board);
    match hole_values(hero) {
        Some(hole) if top > 0 && hole.contains(&top) => {
            let kicker = hole.iter().copied().find(|v| *v != top).unwrap_or(0);
            kicker >= GOOD_KICKER_MIN
        }
        _ => false,
    }
}

fn is_overpair(hero: &[Card], board: &[Card]) -> bool {
    let (top, _) = top_board_values(board);
    match hole_values(hero) {
        Some([a, b]) => a == b && a > top,
        None => false,
    }
}

fn outs_for(flags: &DrawFlags, river: bool) -> u8 {
    if river {
        return 0;
    }
    let mut outs = 0;
    if flags.has_flush_draw {
        outs += FLUSH_DRAW_OUTS;
    }
    if flags.has_oesd {
        outs += OPEN_ENDED_OUTS;
    }
    if flags.has_gutshot {
        outs += GUTSHOT_OUTS;
    }
    outs.min(MAX_OUTS)
}

/// Reduces hero and board cards to tier, outs and a bluff-blocker hint.
///
/// Never fails: with no hero or board cards, or fewer than five cards in
/// total, the zero snapshot (`AIRE`, no outs) is returned.
pub fn build_snapshot(hero: &[Card], board: &[Card]) -> HandSnapshot {
    if hero.is_empty() || board.is_empty() {
        return HandSnapshot::default();
    }
    let Ok(evaluation) = evaluate(hero, board) else {
        return HandSnapshot::default();
    };

    let category = evaluation.category;
    let hand_tier = if category >= HandCategory::ThreeOfAKind || is_top_two_pair(hero, board) {
        HandTier::MuyFuerte
    } else if category == HandCategory::TwoPair
        || is_top_pair_good_kicker(hero, board)
        || is_overpair(hero, board)
    {
        HandTier::Fuerte
    } else if category == HandCategory::OnePair {
        HandTier::Media
    } else {
        HandTier::Aire
    };

    let river = board.len() >= Street::River.board_len();
    let outs = outs_for(&evaluation.flags, river);

    let high_blocker = hero
        .iter()
        .any(|c| matches!(c.rank, Rank::Ace | Rank::King));
    let has_blockers_for_bluff =
        hand_tier == HandTier::Aire && (high_blocker || (!river && outs >= SEMI_BLUFF_MIN_OUTS));

    HandSnapshot {
        hand_tier,
        outs,
        has_blockers_for_bluff,
        made_category: Some(category),
        label: evaluation.label().to_string(),
        ranks: evaluation.ranks,
        flags: evaluation.flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn snap(hero: &str, board: &str) -> HandSnapshot {
        build_snapshot(&parse_cards(hero).unwrap(), &parse_cards(board).unwrap())
    }

    #[test]
    fn empty_inputs_give_the_zero_snapshot() {
        let snapshot = snap("AsKs", "");
        assert_eq!(snapshot.hand_tier, HandTier::Aire);
        assert_eq!(snapshot.outs, 0);
        assert!(!snapshot.has_blockers_for_bluff);
        assert_eq!(snapshot.made_category, None);
    }

    #[test]
    fn top_two_pair_is_very_strong() {
        let snapshot = snap("KsQd", "Kh Qc 4d");
        assert_eq!(snapshot.made_category, Some(HandCategory::TwoPair));
        assert_eq!(snapshot.hand_tier, HandTier::MuyFuerte);
    }

    #[test]
    fn bottom_two_pair_is_strong() {
        let snapshot = snap("Qs4d", "Kh Qc 4c");
        assert_eq!(snapshot.hand_tier, HandTier::Fuerte);
    }

    #[test]
    fn top_pair_needs_a_queen_kicker() {
        assert_eq!(snap("AsQd", "Ah 7c 2d").hand_tier, HandTier::Fuerte);
        assert_eq!(snap("AsJd", "Ah 7c 2d").hand_tier, HandTier::Media);
    }

    #[test]
    fn overpair_is_strong() {
        assert_eq!(snap("JsJd", "Th 7c 2d").hand_tier, HandTier::Fuerte);
        assert_eq!(snap("9s9d", "Th 7c 2d").hand_tier, HandTier::Media);
    }

    #[test]
    fn air_with_an_ace_has_blockers() {
        let snapshot = snap("As3d", "Kh 8c 7d 2s Jc");
        assert_eq!(snapshot.hand_tier, HandTier::Aire);
        assert!(snapshot.has_blockers_for_bluff);
    }

    #[test]
    fn drawing_air_has_blockers_before_the_river() {
        let snapshot = snap("9s8s", "7s 2s Kd");
        assert_eq!(snapshot.hand_tier, HandTier::Aire);
        assert_eq!(snapshot.outs, 9);
        assert!(snapshot.has_blockers_for_bluff);
    }
}
