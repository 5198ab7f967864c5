use postflop_advisor::cards::parse_cards;
use postflop_advisor::evaluator::HandCategory;
use postflop_advisor::snapshot::{HandSnapshot, HandTier, build_snapshot};

fn snap(hero: &str, board: &str) -> HandSnapshot {
    let hero = parse_cards(hero).expect("hero parses");
    let board = parse_cards(board).expect("board parses");
    build_snapshot(&hero, &board)
}

#[test]
fn flush_draw_plus_open_ender_is_seventeen_outs() {
    let snapshot = snap("9h 8h", "7h 6c 2h");
    assert!(snapshot.flags.has_flush_draw);
    assert!(snapshot.flags.has_oesd);
    assert_eq!(snapshot.outs, 17);
    assert_eq!(snapshot.hand_tier, HandTier::Aire);
    assert!(snapshot.has_blockers_for_bluff);
}

#[test]
fn flush_draw_plus_gutshot_adds_up() {
    let snapshot = snap("9h 8h", "Jh 7c 2h");
    assert!(snapshot.flags.has_flush_draw);
    assert!(snapshot.flags.has_gutshot);
    assert_eq!(snapshot.outs, 13);
}

#[test]
fn river_has_no_outs() {
    let snapshot = snap("9h 8h", "7h 6c 2h Kd Qs");
    assert!(snapshot.flags.has_flush_draw);
    assert_eq!(snapshot.outs, 0);
    assert_eq!(snapshot.made_category, Some(HandCategory::HighCard));
    assert!(!snapshot.has_blockers_for_bluff);
}

#[test]
fn trips_are_very_strong() {
    let snapshot = snap("7s 7d", "7h Kc 2d");
    assert_eq!(snapshot.hand_tier, HandTier::MuyFuerte);
    assert_eq!(snapshot.label, "Three of a Kind");
}

#[test]
fn snapshot_serializes_camel_case() {
    let snapshot = snap("Qs Jh", "9d 7d 8d");
    let json = serde_json::to_value(&snapshot).expect("serializes");
    assert_eq!(json["handTier"], "AIRE");
    assert!(json["flags"].get("hasOESD").is_some());
    assert!(json.get("hasBlockersForBluff").is_some());
}
