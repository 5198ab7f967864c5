use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::board::BoardType;
use crate::game::{Action, NO_PLAN, Position, Street, TurnDynamic, VillainProfile, XrOutcome};
use crate::snapshot::HandTier;

fn no_plan() -> String {
    NO_PLAN.to_string()
}

/// Everything the rule engine may look at for one decision.
///
/// Prior-street memory and turn texture fields default to "nothing happened"
/// so a flop context can be written with only the first four fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionContext {
    pub pos: Position,
    pub street: Street,
    pub board_type: BoardType,
    pub hand_tier: HandTier,
    #[serde(default)]
    pub outs: u8,
    #[serde(default)]
    pub villain_profile: VillainProfile,
    #[serde(default)]
    pub flop_action: Option<Action>,
    #[serde(default)]
    pub flop_size: Option<u32>,
    #[serde(default = "no_plan")]
    pub flop_plan: String,
    #[serde(default)]
    pub xr_outcome: XrOutcome,
    #[serde(default)]
    pub turn_dynamic: TurnDynamic,
    #[serde(default)]
    pub hero_completed_draw: bool,
    #[serde(default)]
    pub board_completed_draw: bool,
    #[serde(default)]
    pub has_blockers_for_bluff: bool,
}

impl DecisionContext {
    pub fn new(pos: Position, street: Street, board_type: BoardType, hand_tier: HandTier) -> Self {
        Self {
            pos,
            street,
            board_type,
            hand_tier,
            outs: 0,
            villain_profile: VillainProfile::Default,
            flop_action: None,
            flop_size: None,
            flop_plan: no_plan(),
            xr_outcome: XrOutcome::Unknown,
            turn_dynamic: TurnDynamic::Static,
            hero_completed_draw: false,
            board_completed_draw: false,
            has_blockers_for_bluff: false,
        }
    }

    /// Flat key/value view that rule conditions are evaluated against.
    /// Keys are the camelCase wire names; absent memory is `null`.
    pub fn record(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(record)) => record,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_matches_the_serialized_form() {
        let mut ctx = DecisionContext::new(
            Position::OutOfPosition,
            Street::Turn,
            BoardType::NeutroSeco,
            HandTier::Media,
        );
        ctx.flop_action = Some(Action::CheckRaise);
        ctx.flop_plan = "XR".to_string();

        let serialized = serde_json::to_value(&ctx).unwrap();
        assert_eq!(Value::Object(ctx.record()), serialized);
    }

    #[test]
    fn record_carries_every_field() {
        let mut ctx = DecisionContext::new(
            Position::InPosition,
            Street::River,
            BoardType::OfensivoCoord,
            HandTier::Fuerte,
        );
        ctx.outs = 9;
        ctx.villain_profile = VillainProfile::Good;
        ctx.flop_size = Some(75);
        ctx.xr_outcome = XrOutcome::Success;
        ctx.turn_dynamic = TurnDynamic::Defender;
        ctx.hero_completed_draw = true;
        ctx.board_completed_draw = true;
        ctx.has_blockers_for_bluff = true;

        let record = ctx.record();
        assert_eq!(record.len(), 14);
        assert_eq!(record["flopSize"], json!(75));
        assert_eq!(record["turnDynamic"], json!("DEFENDER"));
        let back: DecisionContext = serde_json::from_value(Value::Object(record)).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn missing_memory_fields_take_defaults() {
        let ctx: DecisionContext = serde_json::from_value(json!({
            "pos": "IP",
            "street": "FLOP",
            "boardType": "MONOCOLOR",
            "handTier": "AIRE"
        }))
        .unwrap();
        assert_eq!(
            ctx,
            DecisionContext::new(
                Position::InPosition,
                Street::Flop,
                BoardType::Monocolor,
                HandTier::Aire
            )
        );
        assert_eq!(ctx.record()["flopAction"], Value::Null);
        assert_eq!(ctx.record()["flopPlan"], json!("NONE"));
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let result = serde_json::from_value::<DecisionContext>(json!({
            "pos": "MIDDLE",
            "street": "FLOP",
            "boardType": "MONOCOLOR",
            "handTier": "AIRE"
        }));
        assert!(result.is_err());
    }
}
