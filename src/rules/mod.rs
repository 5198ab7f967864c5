//! Declarative postflop rule engine: a condition AST, the rules document it
//! lives in, and the priority-ordered selector.

use std::path::PathBuf;

use thiserror::Error;

pub mod condition;
pub mod document;
pub mod select;

pub use condition::{CompareOp, Condition};
pub use document::{EMBEDDED_RULES, Rule, RuleEffect, RulesDocument};
pub use select::{select, select_from};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rules document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed conditions in rules {rule_ids:?}")]
    MalformedConditions { rule_ids: Vec<String> },
}
