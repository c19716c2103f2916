//! Persistence specs: a game survives its process.

use crate::prelude::*;
use cl_engine::Service;
use std::time::Duration;

#[tokio::test]
async fn a_broadcast_game_survives_a_restart() {
    // The games directory must outlive the first rig, like a real disk.
    let dir = tempfile::tempdir().unwrap();
    let ledger_before;
    {
        let rig = Rig::over(dir.path());
        rig.go_live("live").await;
        for line in [START, AFTER_E4, AFTER_E4_E5] {
            rig.script.push_line(line);
        }
        rig.wait_for_moves("live", 2).await;
        rig.service.shutdown().await.unwrap();
        ledger_before = rig.service.game_state("live").unwrap().ledger;
    }

    // "Restart": a brand new service over the same directory.
    let store = cl_storage::GameStore::open(dir.path().join("games")).unwrap();
    let service = Service::new(store).with_poll_interval(Duration::from_millis(5));
    let game = service.game_state("live").unwrap();
    assert_eq!(game.ledger, ledger_before);
    assert_eq!(game.current_fen(), format!("{AFTER_E4_E5} w KQkq e6 2 2"));

    // And it can go straight back on air and keep growing.
    service.start_game("live").await.unwrap();
    service
        .inject("live", &format!("{AFTER_E4_E5_NF3} b KQkq - 3 2"))
        .await
        .unwrap();
    assert_eq!(service.game_state("live").unwrap().move_count(), 3);
}

#[tokio::test]
async fn disconnect_saves_everything_ingested() {
    let rig = Rig::new();
    rig.go_live("live").await;
    rig.script.push_line(START);
    rig.script.push_line(AFTER_E4);
    rig.wait_for_moves("live", 1).await;

    rig.service.disconnect_source().await.unwrap();

    let saved = rig.store.load("live").unwrap();
    assert_eq!(saved.move_count(), 1);
    assert_eq!(saved.ledger[1].san.as_deref(), Some("e4"));
}

#[tokio::test]
async fn listing_reflects_results_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    {
        let rig = Rig::over(dir.path());
        rig.service
            .inject("first", &format!("{START} w KQkq - 0 1"))
            .await
            .unwrap();
        rig.service.end_game().await.unwrap();
        rig.service.update_result("first", "1/2-1/2").unwrap();
    }

    let store = cl_storage::GameStore::open(dir.path().join("games")).unwrap();
    let service = Service::new(store);
    let listing = service.list_games().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].id, "first");
    assert_eq!(listing[0].result, "1/2-1/2");
}
