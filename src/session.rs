use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::advisor::{HandSetup, StreetAdvice, advise_flop, advise_river, advise_turn};
use crate::cards::Card;
use crate::game::{Position, Street, VillainProfile};
use crate::preflop::{PreflopAdvice, RangeChart, Scenario, Seat, postflop_position, starting_hand};
use crate::rules::RulesDocument;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("card {0} is already in play")]
    DuplicateCard(Card),
    #[error("{street} needs {expected} card(s), got {found}")]
    WrongCardCount {
        street: Street,
        expected: usize,
        found: usize,
    },
    #[error("hero folded preflop; there is no postflop play")]
    Folded,
    #[error("the river has already been dealt")]
    Complete,
}

/// Parameters for starting a hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHand {
    pub hero: [Card; 2],
    pub hero_seat: Seat,
    #[serde(default)]
    pub villain_seat: Option<Seat>,
    #[serde(default)]
    pub scenario: Scenario,
    #[serde(default)]
    pub villain_profile: VillainProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandStatus {
    Folded,
    AwaitingFlop,
    AwaitingTurn,
    AwaitingRiver,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandState {
    pub hand_id: Uuid,
    pub hero: [Card; 2],
    pub starting_hand: String,
    pub hero_seat: Seat,
    pub villain_seat: Option<Seat>,
    pub scenario: Scenario,
    pub preflop: PreflopAdvice,
    pub position: Position,
    pub status: HandStatus,
    pub streets: Vec<StreetAdvice>,
}

/// One hand walked street by street. Each street's advice is derived from
/// the previous one and never changed afterwards.
pub struct HandSession {
    id: Uuid,
    rules: Arc<RulesDocument>,
    request: NewHand,
    preflop: PreflopAdvice,
    setup: HandSetup,
    streets: Vec<StreetAdvice>,
}

impl HandSession {
    pub fn new(
        rules: Arc<RulesDocument>,
        chart: &RangeChart,
        request: NewHand,
    ) -> Result<Self, SessionError> {
        let [a, b] = request.hero;
        if a == b {
            return Err(SessionError::DuplicateCard(a));
        }

        if request.scenario.needs_villain() && request.villain_seat.is_none() {
            debug!(scenario = ?request.scenario, "no villain seat; using the default range slot");
        }
        let hand = starting_hand(a, b);
        let preflop = chart.advise(
            request.hero_seat,
            request.scenario,
            request.villain_seat,
            &hand,
        );
        let setup = HandSetup {
            hero: request.hero,
            position: postflop_position(request.hero_seat, request.villain_seat),
            villain_profile: request.villain_profile,
        };
        let id = Uuid::new_v4();
        debug!(%id, %hand, seat = %request.hero_seat, preflop = %preflop.label, "hand started");

        Ok(Self {
            id,
            rules,
            request,
            preflop,
            setup,
            streets: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> HandStatus {
        if !self.preflop.continues() {
            return HandStatus::Folded;
        }
        match self.streets.len() {
            0 => HandStatus::AwaitingFlop,
            1 => HandStatus::AwaitingTurn,
            2 => HandStatus::AwaitingRiver,
            _ => HandStatus::Complete,
        }
    }

    pub fn state(&self) -> HandState {
        let [a, b] = self.request.hero;
        HandState {
            hand_id: self.id,
            hero: self.request.hero,
            starting_hand: starting_hand(a, b),
            hero_seat: self.request.hero_seat,
            villain_seat: self.request.villain_seat,
            scenario: self.request.scenario,
            preflop: self.preflop.clone(),
            position: self.setup.position,
            status: self.status(),
            streets: self.streets.clone(),
        }
    }

    fn cards_in_play(&self) -> impl Iterator<Item = &Card> {
        self.setup
            .hero
            .iter()
            .chain(self.streets.last().map_or(&[][..], |s| s.board.as_slice()))
    }

    /// Deals the next street: three cards for the flop, then one each for
    /// turn and river.
    pub fn deal(&mut self, cards: &[Card]) -> Result<&StreetAdvice, SessionError> {
        let street = match self.status() {
            HandStatus::Folded => return Err(SessionError::Folded),
            HandStatus::Complete => return Err(SessionError::Complete),
            HandStatus::AwaitingFlop => Street::Flop,
            HandStatus::AwaitingTurn => Street::Turn,
            HandStatus::AwaitingRiver => Street::River,
        };
        let expected = if street == Street::Flop { 3 } else { 1 };
        if cards.len() != expected {
            return Err(SessionError::WrongCardCount {
                street,
                expected,
                found: cards.len(),
            });
        }
        if let Some(card) = self.cards_in_play().chain(cards).duplicates().next() {
            return Err(SessionError::DuplicateCard(*card));
        }

        let advice = match (self.streets.last(), cards) {
            (None, &[a, b, c]) => advise_flop(&self.rules, &self.setup, [a, b, c]),
            (Some(flop), &[turn]) if street == Street::Turn => {
                advise_turn(&self.rules, &self.setup, flop, turn)
            }
            (Some(turn_advice), &[river]) => {
                advise_river(&self.rules, &self.setup, turn_advice, river)
            }
            _ => {
                return Err(SessionError::WrongCardCount {
                    street,
                    expected,
                    found: cards.len(),
                });
            }
        };
        self.streets.push(advice);
        Ok(&self.streets[self.streets.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn hand(hero: &str, seat: Seat) -> HandSession {
        let cards = parse_cards(hero).unwrap();
        let request = NewHand {
            hero: [cards[0], cards[1]],
            hero_seat: seat,
            villain_seat: None,
            scenario: Scenario::FirstIn,
            villain_profile: VillainProfile::Default,
        };
        HandSession::new(
            Arc::new(RulesDocument::embedded().unwrap()),
            &RangeChart::embedded().unwrap(),
            request,
        )
        .unwrap()
    }

    #[test]
    fn walks_flop_turn_river() {
        let mut session = hand("AhKh", Seat::Btn);
        assert_eq!(session.status(), HandStatus::AwaitingFlop);
        session.deal(&parse_cards("Qh7c2d").unwrap()).unwrap();
        session.deal(&parse_cards("9s").unwrap()).unwrap();
        let river = session.deal(&parse_cards("3c").unwrap()).unwrap();
        assert_eq!(river.street, Street::River);
        assert_eq!(river.board.len(), 5);
        assert_eq!(session.status(), HandStatus::Complete);
        assert_eq!(
            session.deal(&parse_cards("4c").unwrap()).unwrap_err(),
            SessionError::Complete
        );
    }

    #[test]
    fn rejects_cards_already_in_play() {
        let mut session = hand("AhKh", Seat::Btn);
        let err = session.deal(&parse_cards("Ah7c2d").unwrap()).unwrap_err();
        assert_eq!(err, SessionError::DuplicateCard("Ah".parse().unwrap()));
        session.deal(&parse_cards("Qh7c2d").unwrap()).unwrap();
        let err = session.deal(&parse_cards("7c").unwrap()).unwrap_err();
        assert_eq!(err, SessionError::DuplicateCard("7c".parse().unwrap()));
    }

    #[test]
    fn wrong_card_count_is_rejected() {
        let mut session = hand("AhKh", Seat::Btn);
        let err = session.deal(&parse_cards("Qh7c").unwrap()).unwrap_err();
        assert!(matches!(err, SessionError::WrongCardCount { expected: 3, found: 2, .. }));
    }

    #[test]
    fn folded_hands_have_no_postflop() {
        let mut session = hand("7d2c", Seat::Utg);
        assert_eq!(session.status(), HandStatus::Folded);
        assert_eq!(
            session.deal(&parse_cards("Qh7c2d").unwrap()).unwrap_err(),
            SessionError::Folded
        );
    }
}
