use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::RulesError;
use super::condition::Condition;
use crate::game::{Action, Position, Street};

/// The rule table shipped with the crate.
pub const EMBEDDED_RULES: &str = include_str!("../../rules/postflop-srp-initiative-v2.json");

/// What a matching rule recommends. Every field is optional and filled with
/// defaults when the decision is built.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleEffect {
    #[serde(default)]
    pub action: Option<Action>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: Option<String>,
    /// Lower runs first; missing sorts after every numbered rule.
    #[serde(default)]
    pub priority: Option<f64>,
    /// Missing means the rule always matches.
    #[serde(default)]
    pub when: Option<Condition>,
    #[serde(rename = "do", default)]
    pub effect: RuleEffect,
}

impl Rule {
    pub fn sort_key(&self) -> f64 {
        self.priority.unwrap_or(f64::INFINITY)
    }

    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<unnamed>")
    }
}

pub type Ruleset = Vec<Rule>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RulesDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub rulesets: HashMap<Position, HashMap<Street, Ruleset>>,
}

impl RulesDocument {
    pub fn from_json(raw: &str) -> Result<Self, RulesError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn embedded() -> Result<Self, RulesError> {
        Self::from_json(EMBEDDED_RULES)
    }

    pub fn from_path(path: &Path) -> Result<Self, RulesError> {
        let raw = fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates a rules document. `None` selects the embedded
    /// table. Malformed conditions are logged, and rejected when `strict`.
    pub fn load(path: Option<&Path>, strict: bool) -> Result<Self, RulesError> {
        let document = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::embedded()?,
        };
        document.validate(strict)?;
        info!(
            source = %path.map_or_else(|| "embedded".to_string(), |p| p.display().to_string()),
            version = document.version.as_deref().unwrap_or("-"),
            rules = document.rule_count(),
            "loaded postflop rules"
        );
        Ok(document)
    }

    pub fn ruleset(&self, pos: Position, street: Street) -> Option<&[Rule]> {
        self.rulesets
            .get(&pos)
            .and_then(|streets| streets.get(&street))
            .map(Vec::as_slice)
    }

    pub fn rule_count(&self) -> usize {
        self.rulesets
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }

    fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rulesets
            .values()
            .flat_map(HashMap::values)
            .flatten()
    }

    /// Ids of rules whose `when` clause contains malformed nodes.
    pub fn malformed_rules(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .rules()
            .filter(|rule| rule.when.as_ref().is_some_and(|w| w.malformed_count() > 0))
            .map(|rule| rule.label().to_string())
            .collect();
        ids.sort();
        ids
    }

    pub fn validate(&self, strict: bool) -> Result<(), RulesError> {
        for rule in self.rules() {
            if rule.id.is_none() {
                warn!("rule without an id; its decisions will carry no rule id");
            }
            let malformed = rule.when.as_ref().map_or(0, Condition::malformed_count);
            if malformed > 0 {
                warn!(
                    rule = rule.label(),
                    nodes = malformed,
                    "malformed condition never matches"
                );
            }
        }

        let rule_ids = self.malformed_rules();
        if strict && !rule_ids.is_empty() {
            return Err(RulesError::MalformedConditions { rule_ids });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_rules_cover_every_position_and_street() {
        let document = RulesDocument::embedded().unwrap();
        for pos in [Position::InPosition, Position::OutOfPosition] {
            for street in [Street::Flop, Street::Turn, Street::River] {
                let rules = document.ruleset(pos, street).unwrap_or_default();
                assert!(!rules.is_empty(), "{pos}/{street} is empty");
            }
        }
        assert!(document.malformed_rules().is_empty());
        assert!(document.validate(true).is_ok());
    }

    #[test]
    fn missing_rulesets_key_fails_to_load() {
        let err = RulesDocument::from_json(r#"{"version": "x"}"#).unwrap_err();
        assert!(matches!(err, RulesError::Json(_)));
    }

    #[test]
    fn unknown_action_fails_to_load() {
        let raw = r#"{"rulesets": {"IP": {"FLOP": [{"id": "X", "do": {"action": "SHOVE"}}]}}}"#;
        assert!(RulesDocument::from_json(raw).is_err());
    }

    #[test]
    fn strict_mode_rejects_malformed_conditions() {
        let raw = r#"{"rulesets": {"OOP": {"RIVER": [
            {"id": "BROKEN", "when": {"between": ["outs", 1, 4]}, "do": {"action": "BET", "size": 50}},
            {"id": "OK", "do": {"action": "CHECK"}}
        ]}}}"#;
        let document = RulesDocument::from_json(raw).unwrap();
        assert!(document.validate(false).is_ok());
        match document.validate(true) {
            Err(RulesError::MalformedConditions { rule_ids }) => {
                assert_eq!(rule_ids, vec!["BROKEN".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
