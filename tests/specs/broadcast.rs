//! End-to-end broadcast specs: sensor lines in, ordered events out.

use crate::prelude::*;
use cl_core::{GameEvent, Side};

#[tokio::test]
async fn snapshots_become_an_ordered_move_broadcast() {
    let rig = Rig::new();
    rig.go_live("live").await;

    for line in [START, AFTER_E4, AFTER_E4_E5, AFTER_E4_E5_NF3] {
        rig.script.push_line(line);
    }
    rig.wait_for_moves("live", 3).await;

    let game = rig.service.game_state("live").unwrap();
    assert_eq!(game.ledger.len(), 4);
    assert!(game.ledger[0].is_bootstrap());
    let sans: Vec<Option<&str>> = game.ledger[1..]
        .iter()
        .map(|r| r.san.as_deref())
        .collect();
    assert_eq!(sans, [Some("e4"), Some("e5"), Some("Nf3")]);
    assert!(game.ledger.iter().all(|r| r.legal));

    // Observers got game_started first (plus the source status), then
    // exactly one event per move, in ledger order.
    rig.wait_for("five events", || rig.observer.event_count() >= 5)
        .await;
    let events = rig.observer.events();
    assert!(matches!(&events[0], GameEvent::GameStarted { game_id, .. } if game_id == "live"));
    let moves: Vec<(u32, Side, Option<String>)> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Move {
                index, mover, san, ..
            } => Some((*index, *mover, san.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        moves,
        [
            (1, Side::White, Some("e4".to_string())),
            (2, Side::Black, Some("e5".to_string())),
            (3, Side::White, Some("Nf3".to_string())),
        ]
    );
}

#[tokio::test]
async fn repeated_sensor_reads_do_not_duplicate_moves() {
    let rig = Rig::new();
    rig.go_live("live").await;

    for line in [START, START, AFTER_E4, AFTER_E4, AFTER_E4] {
        rig.script.push_line(line);
    }
    rig.wait_for_moves("live", 1).await;

    // Give any stragglers a chance to (incorrectly) land.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let game = rig.service.game_state("live").unwrap();
    assert_eq!(game.move_count(), 1);
}

#[tokio::test]
async fn positions_carry_inferred_fields() {
    let rig = Rig::new();
    rig.go_live("live").await;

    rig.script.push_line(START);
    rig.script.push_line(AFTER_E4);
    rig.wait_for_moves("live", 1).await;

    let game = rig.service.game_state("live").unwrap();
    let position = &game.ledger[1].position;
    assert_eq!(position.turn, Side::Black);
    assert_eq!(position.en_passant.as_deref(), Some("e3"));
    assert_eq!(position.fullmove, 1);
    assert_eq!(
        position.fen(),
        format!("{AFTER_E4} b KQkq e3 1 1")
    );
}

#[tokio::test]
async fn off_air_games_accumulate_silently() {
    let rig = Rig::new();
    rig.go_live("live").await;
    rig.service
        .inject("other", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
        .await
        .unwrap();

    rig.wait_for("game_started only", || rig.observer.event_count() >= 1)
        .await;
    let events = rig.observer.events();
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GameEvent::Move { game_id, .. } if game_id == "other")),
        "off-air game leaked move events: {events:?}"
    );
    assert_eq!(rig.service.game_state("other").unwrap().ledger.len(), 1);
}
