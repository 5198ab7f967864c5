use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Position {
    #[serde(rename = "IP")]
    InPosition,
    #[serde(rename = "OOP")]
    OutOfPosition,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::InPosition => "IP",
            Position::OutOfPosition => "OOP",
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Postflop betting round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Street {
    Flop,
    Turn,
    River,
}

impl Street {
    pub fn as_str(self) -> &'static str {
        match self {
            Street::Flop => "FLOP",
            Street::Turn => "TURN",
            Street::River => "RIVER",
        }
    }

    /// Board cards visible once this street is dealt.
    pub fn board_len(self) -> usize {
        match self {
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

impl Display for Street {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[default]
    Check,
    Bet,
    CheckCall,
    CheckFold,
    CheckRaise,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Check => "CHECK",
            Action::Bet => "BET",
            Action::CheckCall => "CHECK_CALL",
            Action::CheckFold => "CHECK_FOLD",
            Action::CheckRaise => "CHECK_RAISE",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VillainProfile {
    #[default]
    Default,
    Bad,
    Good,
}

impl VillainProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            VillainProfile::Default => "DEFAULT",
            VillainProfile::Bad => "BAD",
            VillainProfile::Good => "GOOD",
        }
    }
}

/// Which side the turn card favours.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnDynamic {
    #[default]
    Static,
    Aggressor,
    Defender,
}

impl TurnDynamic {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnDynamic::Static => "STATIC",
            TurnDynamic::Aggressor => "AGGRESSOR",
            TurnDynamic::Defender => "DEFENDER",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum XrOutcome {
    #[default]
    Unknown,
    Success,
    Fail,
}

impl XrOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            XrOutcome::Unknown => "UNKNOWN",
            XrOutcome::Success => "SUCCESS",
            XrOutcome::Fail => "FAIL",
        }
    }
}

pub const NO_PLAN: &str = "NONE";

/// The recommendation for one street.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionDecision {
    pub action: Action,
    /// Bet size as a percentage of the pot.
    pub size: Option<u32>,
    pub plan: String,
    pub reason: String,
    pub rule_id: Option<String>,
}

impl ActionDecision {
    /// Safe default used whenever no rule applies.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Check,
            size: None,
            plan: NO_PLAN.to_string(),
            reason: reason.into(),
            rule_id: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.rule_id.is_none()
    }

    pub fn label(&self) -> String {
        format_action(self.action.as_str(), self.size)
    }
}

/// Display string for an action and optional size, e.g. `BET 75%` or
/// `CHECK/CALL`. Empty input renders as an em dash.
pub fn format_action(action: &str, size: Option<u32>) -> String {
    let action = action.trim().to_uppercase();
    if action.is_empty() {
        return "—".to_string();
    }

    match (action.as_str(), size) {
        ("CHECK", _) => "CHECK".to_string(),
        ("BET", Some(size)) => format!("BET {size}%"),
        ("BET", None) => "BET".to_string(),
        ("CHECK_CALL", _) => "CHECK/CALL".to_string(),
        ("CHECK_FOLD", _) => "CHECK/FOLD".to_string(),
        ("CHECK_RAISE", _) => "CHECK/RAISE".to_string(),
        (other, Some(size)) => format!("{other} {size}%"),
        (other, None) => other.to_string(),
    }
}
