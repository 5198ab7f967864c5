use owo_colors::OwoColorize;

use crate::advisor::StreetAdvice;
use crate::cards::Card;
use crate::preflop::{PreflopAdvice, PreflopKind};

/// Terminal rendering of advice, colored unless `no_color` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    pub no_color: bool,
}

fn join_cards(cards: &[Card], render: fn(&Card) -> String) -> String {
    cards.iter().map(render).collect::<Vec<_>>().join(" ")
}

impl Console {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    pub fn preflop_line(&self, hand: &str, advice: &PreflopAdvice) -> String {
        if self.no_color {
            return format!("Preflop {hand}: {} ({})", advice.label, advice.explanation);
        }
        let label = match advice.kind {
            PreflopKind::Raise => advice.label.bold().green().to_string(),
            PreflopKind::Call => advice.label.bold().yellow().to_string(),
            PreflopKind::Fold => advice.label.bold().red().to_string(),
        };
        format!(
            "{} {} {} {}",
            "Preflop".bold().cyan(),
            hand.bold().white(),
            label,
            advice.explanation.dimmed()
        )
    }

    pub fn street_line(&self, advice: &StreetAdvice) -> String {
        let rule = advice.decision.rule_id.as_deref().unwrap_or("fallback");
        if self.no_color {
            let board = join_cards(&advice.board, Card::notation);
            return format!(
                "{} [{}] {} | {} | {} {} outs | {} | plan {} | {} ({})",
                advice.street,
                board,
                advice.board_type,
                advice.snapshot.label,
                advice.snapshot.hand_tier,
                advice.context.outs,
                advice.label,
                advice.decision.plan,
                advice.decision.reason,
                rule
            );
        }
        let board = join_cards(&advice.board, Card::pretty);
        format!(
            "{} [{}] {} | {} | {} {} outs | {} | plan {} | {} ({})",
            advice.street.as_str().bold().cyan(),
            board.bold().blue(),
            advice.board_type.as_str().magenta(),
            advice.snapshot.label.white(),
            advice.snapshot.hand_tier.as_str().bold().white(),
            advice.context.outs,
            advice.label.bold().green(),
            advice.decision.plan.yellow(),
            advice.decision.reason,
            rule.dimmed()
        )
    }

    pub fn print_preflop(&self, hand: &str, advice: &PreflopAdvice) {
        println!("{}", self.preflop_line(hand, advice));
    }

    pub fn print_street(&self, advice: &StreetAdvice) {
        println!("{}", self.street_line(advice));
    }
}
