use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::advisor::{HandSetup, StreetAdvice, advise_streets};
use crate::board::BoardType;
use crate::cards::{Card, deal_unique_cards};
use crate::game::{Position, Street, VillainProfile};
use crate::rules::RulesDocument;

const PROFILES: [VillainProfile; 3] = [
    VillainProfile::Default,
    VillainProfile::Bad,
    VillainProfile::Good,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzConfig {
    pub hands: u32,
    pub seed: Option<u64>,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            hands: 1000,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzReport {
    pub hands: u32,
    pub board_types: BTreeMap<BoardType, u32>,
    /// Action label tallies per street.
    pub actions: BTreeMap<Street, BTreeMap<String, u32>>,
    pub fallbacks: BTreeMap<Street, u32>,
    pub violations: Vec<String>,
}

impl FuzzReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    fn record(&mut self, streets: &[StreetAdvice]) {
        if let Some(flop) = streets.first() {
            *self.board_types.entry(flop.board_type).or_default() += 1;
        }
        for advice in streets {
            *self
                .actions
                .entry(advice.street)
                .or_default()
                .entry(advice.label.clone())
                .or_default() += 1;
            if advice.decision.is_fallback() {
                *self.fallbacks.entry(advice.street).or_default() += 1;
            }
            if advice.label.is_empty() || advice.label == "—" {
                self.violations.push(format!(
                    "{} [{}]: empty action label",
                    advice.street,
                    describe(&advice.board)
                ));
            }
            if advice.street == Street::River && advice.context.outs != 0 {
                self.violations.push(format!(
                    "RIVER [{}]: outs {} on a complete board",
                    describe(&advice.board),
                    advice.context.outs
                ));
            }
        }
    }
}

fn describe(board: &[Card]) -> String {
    board.iter().map(Card::notation).collect::<Vec<_>>().join(" ")
}

/// Deals `config.hands` random spots through flop, turn and river.
pub fn run(rules: &RulesDocument, config: &FuzzConfig) -> FuzzReport {
    let seed = config.seed.unwrap_or_else(rand::random);
    debug!(seed, hands = config.hands, "fuzzing rules");
    let mut rng = StdRng::seed_from_u64(seed);
    run_with_rng(rules, config.hands, &mut rng)
}

pub fn run_with_rng<R: Rng>(rules: &RulesDocument, hands: u32, rng: &mut R) -> FuzzReport {
    let mut report = FuzzReport {
        hands,
        ..FuzzReport::default()
    };

    for _ in 0..hands {
        let cards = deal_unique_cards(rng, 7);
        let position = if rng.gen_bool(0.5) {
            Position::InPosition
        } else {
            Position::OutOfPosition
        };
        let villain_profile = PROFILES.choose(rng).copied().unwrap_or_default();
        let setup = HandSetup {
            hero: [cards[0], cards[1]],
            position,
            villain_profile,
        };

        match advise_streets(rules, &setup, &cards[2..]) {
            Ok(streets) => report.record(&streets),
            Err(err) => {
                warn!(%err, "fuzz spot rejected");
                report.violations.push(err.to_string());
            }
        }
    }

    report
}
