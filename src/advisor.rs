use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::board::{self, BoardType};
use crate::cards::Card;
use crate::context::DecisionContext;
use crate::evaluator::HandCategory;
use crate::game::{Action, ActionDecision, Position, Street, TurnDynamic, VillainProfile};
use crate::rules::{RulesDocument, select};
use crate::snapshot::{HandSnapshot, build_snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdviseError {
    #[error("board must hold 3, 4 or 5 cards, got {0}")]
    BoardLength(usize),
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
}

/// Fixed for the whole hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandSetup {
    pub hero: [Card; 2],
    pub position: Position,
    #[serde(default)]
    pub villain_profile: VillainProfile,
}

/// Everything computed for one street; the next street reads its memory
/// from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetAdvice {
    pub street: Street,
    pub board: Vec<Card>,
    pub board_type: BoardType,
    pub snapshot: HandSnapshot,
    pub context: DecisionContext,
    pub decision: ActionDecision,
    pub label: String,
}

fn completed_draw(snapshot: &HandSnapshot) -> bool {
    matches!(
        snapshot.made_category,
        Some(
            HandCategory::Straight
                | HandCategory::Flush
                | HandCategory::FullHouse
                | HandCategory::FourOfAKind
                | HandCategory::StraightFlush
        )
    )
}

fn decide(
    board: Vec<Card>,
    snapshot: HandSnapshot,
    context: DecisionContext,
    decision: ActionDecision,
) -> StreetAdvice {
    let label = decision.label();
    debug!(
        street = %context.street,
        pos = %context.pos,
        board_type = %context.board_type,
        tier = %context.hand_tier,
        outs = context.outs,
        rule = decision.rule_id.as_deref().unwrap_or("-"),
        %label,
        "street advice"
    );
    StreetAdvice {
        street: context.street,
        board_type: context.board_type,
        board,
        snapshot,
        context,
        decision,
        label,
    }
}

fn board_top(board: &[Card]) -> u8 {
    board.iter().map(Card::rank_value).max().unwrap_or(0)
}

fn has_top_pair(hero: &[Card; 2], board: &[Card]) -> bool {
    let top = board_top(board);
    top > 0 && hero.iter().any(|c| c.rank_value() == top)
}

fn is_overpair(hero: &[Card; 2], board: &[Card]) -> bool {
    hero[0].rank == hero[1].rank && hero[0].rank_value() > board_top(board)
}

/// Strong enough to keep betting a dynamic dry high-card turn.
fn is_strong_made(hero: &[Card; 2], flop: &[Card], turn: Card, made: Option<HandCategory>) -> bool {
    let board: Vec<Card> = flop.iter().copied().chain([turn]).collect();
    match made {
        Some(category) if category >= HandCategory::TwoPair => true,
        _ if is_overpair(hero, &board) => true,
        Some(HandCategory::OnePair) => {
            has_top_pair(hero, &board) && board::big_overcard_turn(flop, turn)
        }
        _ => false,
    }
}

/// Dry high-card flops check pairs back on a static turn, and check pairs
/// and high cards on a dynamic one unless hero is strong or has 4+ outs.
/// Applies in both positions, after rule selection.
fn dry_high_turn_override(
    hero: &[Card; 2],
    flop: &[Card],
    turn: Card,
    snapshot: &HandSnapshot,
    context: &DecisionContext,
) -> Option<ActionDecision> {
    if context.board_type != BoardType::OfensivoSeco {
        return None;
    }
    let made = snapshot.made_category;
    let pair = made == Some(HandCategory::OnePair);
    let high = made == Some(HandCategory::HighCard);

    let (reason, rule_id) = if context.turn_dynamic == TurnDynamic::Static {
        if !pair {
            return None;
        }
        (
            "Dry high flop, static turn: check medium hands for showdown.",
            "OVERRIDE_ODRY_TURN_STATIC_MEDIUM_CHECK",
        )
    } else {
        let strong = is_strong_made(hero, flop, turn, made);
        if !(pair || high) || strong || context.outs >= 4 {
            return None;
        }
        (
            "Dry high flop, dynamic turn: check medium hands and air.",
            "OVERRIDE_ODRY_TURN_DYNAMIC_PAIR_HIGH_CHECK",
        )
    };
    Some(ActionDecision {
        action: Action::Check,
        size: None,
        plan: "SD_CONTROL".to_string(),
        reason: reason.to_string(),
        rule_id: Some(rule_id.to_string()),
    })
}

pub fn advise_flop(rules: &RulesDocument, setup: &HandSetup, flop: [Card; 3]) -> StreetAdvice {
    let board = flop.to_vec();
    let snapshot = build_snapshot(&setup.hero, &board);
    let board_type = board::classify(&flop);

    let mut context = DecisionContext::new(setup.position, Street::Flop, board_type, snapshot.hand_tier);
    context.outs = snapshot.outs;
    context.villain_profile = setup.villain_profile;
    context.has_blockers_for_bluff = snapshot.has_blockers_for_bluff;

    let decision = select(rules, &context);
    decide(board, snapshot, context, decision)
}

/// Board type stays the flop's; the turn only feeds texture flags. On
/// `OFENSIVO_SECO` flops the dry high-card override may replace the rule's
/// pick.
pub fn advise_turn(
    rules: &RulesDocument,
    setup: &HandSetup,
    flop: &StreetAdvice,
    turn: Card,
) -> StreetAdvice {
    let mut board = flop.board.clone();
    board.push(turn);
    let snapshot = build_snapshot(&setup.hero, &board);

    let mut context = DecisionContext::new(
        setup.position,
        Street::Turn,
        flop.board_type,
        snapshot.hand_tier,
    );
    context.outs = snapshot.outs;
    context.villain_profile = setup.villain_profile;
    context.flop_action = Some(flop.decision.action);
    context.flop_size = flop.decision.size;
    context.flop_plan = flop.decision.plan.clone();
    context.xr_outcome = flop.context.xr_outcome;
    context.turn_dynamic = board::turn_dynamic(&flop.board, turn);
    context.hero_completed_draw = completed_draw(&snapshot);
    context.board_completed_draw = board::board_completed_flush(&flop.board, turn);
    context.has_blockers_for_bluff = snapshot.has_blockers_for_bluff;

    let selected = select(rules, &context);
    let decision =
        match dry_high_turn_override(&setup.hero, &flop.board, turn, &snapshot, &context) {
            Some(forced) => {
                debug!(
                    replaced = selected.rule_id.as_deref().unwrap_or("-"),
                    rule = forced.rule_id.as_deref().unwrap_or("-"),
                    "dry high-card turn override"
                );
                forced
            }
            None => selected,
        };
    decide(board, snapshot, context, decision)
}

/// River decisions carry turn texture and flop memory; outs are always 0.
pub fn advise_river(
    rules: &RulesDocument,
    setup: &HandSetup,
    turn: &StreetAdvice,
    river: Card,
) -> StreetAdvice {
    let mut board = turn.board.clone();
    board.push(river);
    let snapshot = build_snapshot(&setup.hero, &board);

    let mut context = turn.context.clone();
    context.street = Street::River;
    context.hand_tier = snapshot.hand_tier;
    context.outs = 0;
    context.villain_profile = setup.villain_profile;
    context.has_blockers_for_bluff = snapshot.has_blockers_for_bluff;

    let decision = select(rules, &context);
    decide(board, snapshot, context, decision)
}

/// Checks that hero and board cards are distinct and the board is 3 to 5
/// cards long.
pub fn validate_cards(hero: &[Card], board: &[Card]) -> Result<(), AdviseError> {
    if !(3..=5).contains(&board.len()) {
        return Err(AdviseError::BoardLength(board.len()));
    }
    if let Some(card) = hero.iter().chain(board).duplicates().next() {
        return Err(AdviseError::DuplicateCard(*card));
    }
    Ok(())
}

/// Runs flop, turn and river (as far as the board goes), each street
/// feeding the next.
pub fn advise_streets(
    rules: &RulesDocument,
    setup: &HandSetup,
    board: &[Card],
) -> Result<Vec<StreetAdvice>, AdviseError> {
    validate_cards(&setup.hero, board)?;
    let flop = advise_flop(rules, setup, [board[0], board[1], board[2]]);
    let mut streets = vec![flop];
    if let Some(&turn_card) = board.get(3) {
        let turn = advise_turn(rules, setup, &streets[0], turn_card);
        streets.push(turn);
    }
    if let Some(&river_card) = board.get(4) {
        let river = advise_river(rules, setup, &streets[1], river_card);
        streets.push(river);
    }
    Ok(streets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn setup(hero: &str, position: Position) -> HandSetup {
        let cards = parse_cards(hero).unwrap();
        HandSetup {
            hero: [cards[0], cards[1]],
            position,
            villain_profile: VillainProfile::Default,
        }
    }

    #[test]
    fn flop_memory_flows_into_the_turn() {
        let rules = RulesDocument::embedded().unwrap();
        let setup = setup("AsAd", Position::OutOfPosition);
        let board = parse_cards("Ac 7h 2d 9s").unwrap();
        let streets = advise_streets(&rules, &setup, &board).unwrap();

        let flop = &streets[0];
        assert_eq!(flop.decision.rule_id.as_deref(), Some("OOP_F_MONSTER_XR"));
        let turn = &streets[1];
        assert_eq!(turn.context.flop_action, Some(Action::CheckRaise));
        assert_eq!(turn.context.flop_plan, "XR");
        assert_eq!(turn.board_type, flop.board_type);
    }

    #[test]
    fn river_keeps_turn_texture_and_zeroes_outs() {
        let rules = RulesDocument::embedded().unwrap();
        let setup = setup("9s8s", Position::InPosition);
        let board = parse_cards("Ks 7s 2d Qs 3h").unwrap();
        let streets = advise_streets(&rules, &setup, &board).unwrap();

        let turn = &streets[1];
        assert!(turn.context.board_completed_draw);
        assert!(turn.context.hero_completed_draw);
        let river = &streets[2];
        assert_eq!(river.context.turn_dynamic, turn.context.turn_dynamic);
        assert!(river.context.board_completed_draw);
        assert_eq!(river.context.outs, 0);
    }

    #[test]
    fn rejects_duplicates_and_bad_lengths() {
        let rules = RulesDocument::embedded().unwrap();
        let setup = setup("AsKs", Position::InPosition);
        let short = parse_cards("2c3c").unwrap();
        assert_eq!(
            advise_streets(&rules, &setup, &short),
            Err(AdviseError::BoardLength(2))
        );
        let dup = parse_cards("As 7c 2d").unwrap();
        assert_eq!(
            advise_streets(&rules, &setup, &dup),
            Err(AdviseError::DuplicateCard("As".parse().unwrap()))
        );
    }

    fn turn_advice(hero: &str, position: Position, board: &str) -> StreetAdvice {
        let rules = RulesDocument::embedded().unwrap();
        let board = parse_cards(board).unwrap();
        let mut streets = advise_streets(&rules, &setup(hero, position), &board).unwrap();
        streets.remove(1)
    }

    #[test]
    fn static_dry_turn_checks_any_pair_in_both_positions() {
        for (hero, position) in [
            ("AhAd", Position::InPosition),
            ("9h9d", Position::OutOfPosition),
            ("Kh5h", Position::OutOfPosition),
        ] {
            let turn = turn_advice(hero, position, "Ks 7d 2c 4h");
            assert_eq!(turn.board_type, BoardType::OfensivoSeco);
            assert_eq!(turn.context.turn_dynamic, TurnDynamic::Static);
            assert_eq!(turn.decision.action, Action::Check, "{hero}");
            assert_eq!(turn.decision.size, None);
            assert_eq!(turn.decision.plan, "SD_CONTROL");
            assert_eq!(
                turn.decision.rule_id.as_deref(),
                Some("OVERRIDE_ODRY_TURN_STATIC_MEDIUM_CHECK"),
                "{hero}"
            );
        }
    }

    #[test]
    fn static_dry_turn_leaves_two_pair_to_the_rules() {
        let turn = turn_advice("Kh7h", Position::InPosition, "Ks 7d 2c 4h");
        assert_eq!(turn.decision.rule_id.as_deref(), Some("IP_T_NEUTRAL_STRONG"));
        assert_eq!(turn.label, "BET 50%");
    }

    #[test]
    fn dynamic_dry_turn_checks_weak_pairs_and_air() {
        for (hero, position) in [
            ("9h9d", Position::InPosition),
            ("6h5h", Position::OutOfPosition),
        ] {
            let turn = turn_advice(hero, position, "Ks 7d 2c Qh");
            assert_eq!(turn.context.turn_dynamic, TurnDynamic::Aggressor);
            assert_eq!(
                turn.decision.rule_id.as_deref(),
                Some("OVERRIDE_ODRY_TURN_DYNAMIC_PAIR_HIGH_CHECK"),
                "{hero}"
            );
            assert_eq!(turn.decision.action, Action::Check);
        }
    }

    #[test]
    fn dynamic_dry_turn_keeps_betting_strong_hands_and_draws() {
        for (hero, board) in [
            ("AhAd", "Ks 7d 2c Qh"),
            ("AhJc", "Ks 7d 2c Ad"),
            ("JhTh", "Ks 7d 2c Qh"),
        ] {
            let turn = turn_advice(hero, Position::InPosition, board);
            let rule = turn.decision.rule_id.unwrap_or_default();
            assert!(!rule.starts_with("OVERRIDE_"), "{hero} on {board}: {rule}");
        }
    }

    #[test]
    fn other_board_types_are_never_overridden() {
        let turn = turn_advice("9h9d", Position::OutOfPosition, "Js 6d 2c 4h");
        assert_eq!(turn.board_type, BoardType::NeutroSeco);
        assert_eq!(turn.decision.rule_id.as_deref(), Some("OOP_T_MEDIA"));
    }
}
