//! Bad input and failure specs: the stream must survive everything short
//! of its source dying.

use crate::prelude::*;
use cl_core::{GameEvent, SourceState};

#[tokio::test]
async fn malformed_lines_never_stall_the_stream() {
    let rig = Rig::new();
    rig.go_live("live").await;

    rig.script.push_line(START);
    rig.script.push_line("not a board at all");
    rig.script.push_line("9/9/9/9/9/9/9/9");
    rig.script.push_raw(b"\xff\xfe\xfd");
    rig.script.push_line("");
    rig.script.push_line(AFTER_E4);

    rig.wait_for_moves("live", 1).await;
    let game = rig.service.game_state("live").unwrap();
    assert_eq!(game.ledger.len(), 2);
    assert_eq!(game.ledger[1].san.as_deref(), Some("e4"));
}

#[tokio::test]
async fn unexplainable_placement_is_recorded_as_illegal() {
    let rig = Rig::new();
    rig.go_live("live").await;

    // The board jumps two plies at once; no single legal move explains it.
    rig.script.push_line(START);
    rig.script.push_line(AFTER_E4_E5);
    rig.wait_for_moves("live", 1).await;

    let game = rig.service.game_state("live").unwrap();
    let record = &game.ledger[1];
    assert!(!record.legal);
    assert_eq!(record.san, None);
    assert_eq!(record.position.board.as_str(), AFTER_E4_E5);

    // The stream keeps going from the reported board. The jump swallowed
    // white's ply, so the next reconstructable move is black's.
    rig.script
        .push_line("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/8/PPPP1PPP/RNBQKBNR");
    rig.wait_for_moves("live", 2).await;
    let game = rig.service.game_state("live").unwrap();
    assert_eq!(game.ledger[2].san.as_deref(), Some("Nc6"));
    assert!(game.ledger[2].legal);
}

#[tokio::test]
async fn source_failure_reports_disconnect_and_keeps_the_ledger() {
    let rig = Rig::new();
    rig.go_live("live").await;

    rig.script.push_line(START);
    rig.script.push_line(AFTER_E4);
    rig.wait_for_moves("live", 1).await;

    rig.script.fail_next();
    rig.wait_for("disconnect event", || {
        rig.observer.events().iter().any(|e| {
            matches!(
                e,
                GameEvent::SourceStatus {
                    state: SourceState::Disconnected,
                    ..
                }
            )
        })
    })
    .await;

    assert!(rig.script.is_closed());
    let game = rig.service.game_state("live").unwrap();
    assert_eq!(game.move_count(), 1);
}

#[tokio::test]
async fn completed_games_stay_finished() {
    let rig = Rig::new();
    rig.service.inject("done", &format!("{START} w KQkq - 0 1")).await.unwrap();
    rig.service.end_game().await.unwrap();
    rig.service.update_result("done", "1-0").unwrap();

    assert!(rig.service.start_game("done").await.is_err());
    assert_eq!(rig.store.load("done").unwrap().meta.result, "1-0");
}
