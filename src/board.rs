use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};
use crate::game::TurnDynamic;

const COORDINATED_MAX_GAP: u8 = 4;

/// Flop texture label. Rules are keyed by these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardType {
    Monocolor,
    PareadoOfensivo,
    PareadoDefensivo,
    PareadoNeutro,
    OfensivoCoord,
    NeutroCoord,
    DefensivoCoord,
    OfensivoSeco,
    NeutroSeco,
    DefensivoSeco,
}

impl BoardType {
    pub const ALL: [BoardType; 10] = [
        BoardType::Monocolor,
        BoardType::PareadoOfensivo,
        BoardType::PareadoDefensivo,
        BoardType::PareadoNeutro,
        BoardType::OfensivoCoord,
        BoardType::NeutroCoord,
        BoardType::DefensivoCoord,
        BoardType::OfensivoSeco,
        BoardType::NeutroSeco,
        BoardType::DefensivoSeco,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BoardType::Monocolor => "MONOCOLOR",
            BoardType::PareadoOfensivo => "PAREADO_OFENSIVO",
            BoardType::PareadoDefensivo => "PAREADO_DEFENSIVO",
            BoardType::PareadoNeutro => "PAREADO_NEUTRO",
            BoardType::OfensivoCoord => "OFENSIVO_COORD",
            BoardType::NeutroCoord => "NEUTRO_COORD",
            BoardType::DefensivoCoord => "DEFENSIVO_COORD",
            BoardType::OfensivoSeco => "OFENSIVO_SECO",
            BoardType::NeutroSeco => "NEUTRO_SECO",
            BoardType::DefensivoSeco => "DEFENSIVO_SECO",
        }
    }
}

impl Display for BoardType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn paired_bucket(rank: Rank) -> BoardType {
    if rank.is_broadway() {
        BoardType::PareadoOfensivo
    } else if rank <= Rank::Eight {
        BoardType::PareadoDefensivo
    } else {
        BoardType::PareadoNeutro
    }
}

/// Labels a flop. The result does not depend on card order.
pub fn classify(flop: &[Card; 3]) -> BoardType {
    if flop.iter().map(|c| c.suit).all_equal() {
        return BoardType::Monocolor;
    }

    let ranks: Vec<Rank> = flop
        .iter()
        .map(|c| c.rank)
        .sorted_unstable_by(|a, b| b.cmp(a))
        .collect();
    if let Some((paired, _)) = ranks.iter().tuple_windows().find(|(a, b)| a == b) {
        return paired_bucket(*paired);
    }

    let has = |wanted: &[Rank]| ranks.iter().any(|r| wanted.contains(r));
    let (high, mid, low) = (ranks[0], ranks[1], ranks[2]);
    let suits = flop.iter().map(|c| c.suit).unique().count();
    let coordinated = high.value() - low.value() <= COORDINATED_MAX_GAP || suits == 2;

    if coordinated {
        if has(&[Rank::Ace, Rank::King]) {
            BoardType::OfensivoCoord
        } else if has(&[Rank::Queen, Rank::Jack]) {
            BoardType::NeutroCoord
        } else if high >= Rank::Ten && mid >= Rank::Eight {
            BoardType::OfensivoCoord
        } else {
            BoardType::DefensivoCoord
        }
    } else if has(&[Rank::Ace, Rank::King, Rank::Queen]) {
        BoardType::OfensivoSeco
    } else if has(&[Rank::Jack, Rank::Ten]) {
        BoardType::NeutroSeco
    } else {
        BoardType::DefensivoSeco
    }
}

/// An overcard (A, K or Q) new to the board, or a card pairing the flop,
/// favours the preflop aggressor. Everything else leaves the turn static.
pub fn turn_dynamic(flop: &[Card], turn: Card) -> TurnDynamic {
    let pairs_flop = flop.iter().any(|c| c.rank == turn.rank);
    if big_overcard_turn(flop, turn) || pairs_flop {
        TurnDynamic::Aggressor
    } else {
        TurnDynamic::Static
    }
}

/// An A, K or Q turn whose rank is not already on the flop.
pub fn big_overcard_turn(flop: &[Card], turn: Card) -> bool {
    turn.rank >= Rank::Queen && flop.iter().all(|c| c.rank != turn.rank)
}

/// True when the turn brings a third card of a suit already twice on the flop.
pub fn board_completed_flush(flop: &[Card], turn: Card) -> bool {
    suit_count(flop, turn.suit) >= 2
}

fn suit_count(cards: &[Card], suit: Suit) -> usize {
    cards.iter().filter(|c| c.suit == suit).count()
}
