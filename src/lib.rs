pub mod advisor;
pub mod board;
pub mod cards;
pub mod config;
pub mod console;
pub mod context;
pub mod evaluator;
pub mod fuzz;
pub mod game;
pub mod preflop;
pub mod rules;
pub mod session;
pub mod snapshot;
pub mod web;

pub use advisor::{HandSetup, StreetAdvice, advise_flop, advise_river, advise_streets, advise_turn};
pub use config::AdvisorConfig;
pub use context::DecisionContext;
pub use game::{Action, ActionDecision, Position, Street};
pub use rules::{RulesDocument, select};
