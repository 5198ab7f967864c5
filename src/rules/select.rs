use serde_json::{Map, Value};
use tracing::debug;

use super::document::{Rule, RulesDocument};
use crate::context::DecisionContext;
use crate::game::{ActionDecision, NO_PLAN};

pub const NO_RULE_MATCHED: &str = "no rule matched";

/// Picks the decision for `ctx`: the first rule, by ascending priority, whose
/// condition holds. Never fails; unmatched lookups fall back to `CHECK`.
pub fn select(document: &RulesDocument, ctx: &DecisionContext) -> ActionDecision {
    let Some(rules) = document
        .ruleset(ctx.pos, ctx.street)
        .filter(|rules| !rules.is_empty())
    else {
        let reason = format!("no ruleset for {}/{}", ctx.pos, ctx.street);
        debug!(%reason, "fallback decision");
        return ActionDecision::fallback(reason);
    };

    select_from(rules, &ctx.record())
}

/// Runs a single ruleset against a flat context record.
pub fn select_from(rules: &[Rule], record: &Map<String, Value>) -> ActionDecision {
    let mut ordered: Vec<&Rule> = rules.iter().collect();
    // Stable, so equal priorities keep their authored order.
    ordered.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));

    let matched = ordered
        .into_iter()
        .find(|rule| rule.when.as_ref().is_none_or(|when| when.evaluate(record)));

    match matched {
        Some(rule) => {
            debug!(rule = rule.label(), "rule matched");
            decision_for(rule)
        }
        None => {
            debug!("{NO_RULE_MATCHED}");
            ActionDecision::fallback(NO_RULE_MATCHED)
        }
    }
}

fn decision_for(rule: &Rule) -> ActionDecision {
    let effect = &rule.effect;
    ActionDecision {
        action: effect.action.unwrap_or_default(),
        size: effect.size,
        plan: effect.plan.clone().unwrap_or_else(|| NO_PLAN.to_string()),
        reason: effect
            .reason
            .clone()
            .or_else(|| rule.id.clone())
            .unwrap_or_else(|| "match".to_string()),
        rule_id: rule.id.clone(),
    }
}
