use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::cards::Card;
use crate::game::Position;

pub const EMBEDDED_RANGES: &str = include_str!("../rules/ranges-nl5-9max.json");

#[derive(Debug, Error)]
pub enum PreflopError {
    #[error("failed to read ranges from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid range chart: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown seat '{0}'")]
    UnknownSeat(String),
}

/// 9-max table seats in preflop acting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Seat {
    Utg,
    Utg1,
    Mp,
    Hj,
    Co,
    Btn,
    Sb,
    Bb,
}

impl Seat {
    pub const ALL: [Seat; 8] = [
        Seat::Utg,
        Seat::Utg1,
        Seat::Mp,
        Seat::Hj,
        Seat::Co,
        Seat::Btn,
        Seat::Sb,
        Seat::Bb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Seat::Utg => "UTG",
            Seat::Utg1 => "UTG1",
            Seat::Mp => "MP",
            Seat::Hj => "HJ",
            Seat::Co => "CO",
            Seat::Btn => "BTN",
            Seat::Sb => "SB",
            Seat::Bb => "BB",
        }
    }

    pub fn is_blind(self) -> bool {
        matches!(self, Seat::Sb | Seat::Bb)
    }

    /// Index in postflop acting order: blinds first, button last.
    fn postflop_order(self) -> usize {
        match self {
            Seat::Sb => 0,
            Seat::Bb => 1,
            Seat::Utg => 2,
            Seat::Utg1 => 3,
            Seat::Mp => 4,
            Seat::Hj => 5,
            Seat::Co => 6,
            Seat::Btn => 7,
        }
    }
}

impl Display for Seat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Seat {
    type Err = PreflopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Seat::ALL
            .into_iter()
            .find(|seat| seat.as_str() == wanted)
            .ok_or_else(|| PreflopError::UnknownSeat(s.to_string()))
    }
}

/// Who acted before hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scenario {
    #[default]
    #[serde(rename = "firstIn")]
    FirstIn,
    #[serde(rename = "overLimp")]
    OverLimp,
    #[serde(rename = "vsOpen")]
    VsOpen,
    #[serde(rename = "vs3bet")]
    Vs3Bet,
}

impl Scenario {
    pub fn needs_villain(self) -> bool {
        matches!(self, Scenario::VsOpen | Scenario::Vs3Bet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreflopKind {
    Raise,
    Call,
    Fold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflopAdvice {
    pub label: String,
    pub kind: PreflopKind,
    pub explanation: String,
}

impl PreflopAdvice {
    fn new(label: &str, kind: PreflopKind, explanation: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            kind,
            explanation: explanation.into(),
        }
    }

    fn fold(explanation: impl Into<String>) -> Self {
        Self::new("Fold", PreflopKind::Fold, explanation)
    }

    /// Whether the hand sees a flop.
    pub fn continues(&self) -> bool {
        matches!(self.kind, PreflopKind::Raise | PreflopKind::Call)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FirstIn {
    open_raise: Vec<String>,
    open_limp: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OverLimp {
    iso_raise: Vec<String>,
    over_limp: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FacingSlot {
    call: Vec<String>,
    three_bet: Vec<String>,
    four_bet: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SeatRanges {
    first_in: FirstIn,
    over_limp: OverLimp,
    vs_open: HashMap<String, FacingSlot>,
    #[serde(rename = "vs3bet")]
    vs_three_bet: HashMap<String, FacingSlot>,
}

fn contains(list: &[String], hand: &str) -> bool {
    list.iter().any(|h| h == hand)
}

/// Picks `vs<SEAT>`, then `default`, then an empty slot.
fn facing_slot(
    slots: &HashMap<String, FacingSlot>,
    villain: Option<Seat>,
) -> FacingSlot {
    villain
        .and_then(|seat| slots.get(&format!("vs{seat}")))
        .or_else(|| slots.get("default"))
        .cloned()
        .unwrap_or_default()
}

/// Preflop range chart keyed by hero seat.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RangeChart {
    #[serde(default)]
    pub version: Option<String>,
    positions: HashMap<Seat, SeatRanges>,
}

impl RangeChart {
    pub fn from_json(raw: &str) -> Result<Self, PreflopError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn embedded() -> Result<Self, PreflopError> {
        Self::from_json(EMBEDDED_RANGES)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, PreflopError> {
        let chart = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| PreflopError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json(&raw)?
            }
            None => Self::embedded()?,
        };
        info!(
            version = chart.version.as_deref().unwrap_or("-"),
            seats = chart.positions.len(),
            "loaded preflop ranges"
        );
        Ok(chart)
    }

    pub fn advise(
        &self,
        hero: Seat,
        scenario: Scenario,
        villain: Option<Seat>,
        hand: &str,
    ) -> PreflopAdvice {
        let Some(ranges) = self.positions.get(&hero) else {
            return PreflopAdvice::fold(format!("No chart data for {hero}."));
        };
        let villain_label = villain.map_or_else(|| "any".to_string(), |s| s.to_string());

        match scenario {
            Scenario::FirstIn => {
                let spot = &ranges.first_in;
                if contains(&spot.open_raise, hand) {
                    PreflopAdvice::new("Open Raise", PreflopKind::Raise, "First in: open raise.")
                } else if contains(&spot.open_limp, hand) {
                    PreflopAdvice::new("Open Limp", PreflopKind::Call, "First in: limp.")
                } else {
                    PreflopAdvice::fold("First in: outside the opening range.")
                }
            }
            Scenario::OverLimp => {
                let spot = &ranges.over_limp;
                if contains(&spot.iso_raise, hand) {
                    PreflopAdvice::new("Iso Raise", PreflopKind::Raise, "Facing limpers: isolate.")
                } else if contains(&spot.over_limp, hand) {
                    PreflopAdvice::new("Overlimp", PreflopKind::Call, "Facing limpers: overlimp.")
                } else {
                    PreflopAdvice::fold("Facing limpers: outside the range.")
                }
            }
            Scenario::VsOpen => {
                let slot = facing_slot(&ranges.vs_open, villain);
                if contains(&slot.three_bet, hand) {
                    PreflopAdvice::new(
                        "3bet vs OR",
                        PreflopKind::Raise,
                        format!("Facing an open from {villain_label}: 3bet."),
                    )
                } else if contains(&slot.call, hand) {
                    PreflopAdvice::new(
                        "Call vs OR",
                        PreflopKind::Call,
                        format!("Facing an open from {villain_label}: call."),
                    )
                } else {
                    PreflopAdvice::fold(format!(
                        "Facing an open from {villain_label}: outside the range."
                    ))
                }
            }
            Scenario::Vs3Bet => {
                let slot = facing_slot(&ranges.vs_three_bet, villain);
                if contains(&slot.four_bet, hand) {
                    PreflopAdvice::new(
                        "4bet vs 3bet",
                        PreflopKind::Raise,
                        format!("Facing a 3bet from {villain_label}: 4bet."),
                    )
                } else if contains(&slot.call, hand) {
                    PreflopAdvice::new(
                        "Call vs 3bet",
                        PreflopKind::Call,
                        format!("Facing a 3bet from {villain_label}: call."),
                    )
                } else {
                    PreflopAdvice::fold(format!(
                        "Facing a 3bet from {villain_label}: outside the range."
                    ))
                }
            }
        }
    }
}

/// Chart notation for two hole cards: `AA`, `AKs`, `QJo`, higher rank first.
pub fn starting_hand(a: Card, b: Card) -> String {
    let (high, low) = if a.rank >= b.rank { (a, b) } else { (b, a) };
    if high.rank == low.rank {
        return format!("{}{}", high.rank, low.rank);
    }
    let suffix = if high.suit == low.suit { 's' } else { 'o' };
    format!("{}{}{suffix}", high.rank, low.rank)
}

/// Hero is in position when acting after the villain postflop. With no
/// villain, the blinds are out of position and every other seat is in.
pub fn postflop_position(hero: Seat, villain: Option<Seat>) -> Position {
    let in_position = match villain {
        Some(villain) => hero.postflop_order() > villain.postflop_order(),
        None => !hero.is_blind(),
    };
    if in_position {
        Position::InPosition
    } else {
        Position::OutOfPosition
    }
}
