// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cl_adapters::{FakeObserver, FakeSource};
use cl_core::GameEvent;
use cl_storage::GameStore;

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR";

struct Fixture {
    _dir: tempfile::TempDir,
    ledger: Arc<GameLedger>,
    hub: Arc<BroadcastHub>,
    script: FakeSource,
    observer: FakeObserver,
}

fn fixture() -> (Fixture, Ingestor<FakeSource>) {
    let dir = tempfile::tempdir().unwrap();
    let store = GameStore::open(dir.path().join("games")).unwrap();
    let ledger = Arc::new(GameLedger::new(store));
    let hub = Arc::new(BroadcastHub::new());
    let observer = FakeObserver::new();
    hub.subscribe(Arc::new(observer.clone()));
    let script = FakeSource::new();

    let ingestor = Ingestor::new(
        script.clone(),
        "g1".to_string(),
        Arc::clone(&ledger),
        Arc::clone(&hub),
        Duration::from_millis(5),
        Arc::new(AtomicBool::new(false)),
    );
    (
        Fixture {
            _dir: dir,
            ledger,
            hub,
            script,
            observer,
        },
        ingestor,
    )
}

async fn wait_for_events(observer: &FakeObserver, count: usize) -> Vec<GameEvent> {
    for _ in 0..200 {
        if observer.event_count() >= count {
            return observer.events();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {count} events, saw {:?}", observer.events());
}

#[tokio::test]
async fn cycle_records_valid_snapshots_in_order() {
    let (fx, mut ingestor) = fixture();
    fx.script.push_line(START);
    fx.script.push_line(AFTER_E4);

    ingestor.cycle().await.unwrap();

    let game = fx.ledger.snapshot("g1").unwrap();
    assert_eq!(game.ledger.len(), 2);
    assert!(game.ledger[0].is_bootstrap());
    assert_eq!(game.ledger[1].san.as_deref(), Some("e4"));
}

#[tokio::test]
async fn published_when_game_is_on_air() {
    let (fx, mut ingestor) = fixture();
    fx.hub.start("g1").unwrap();
    fx.script.push_line(START);
    fx.script.push_line(AFTER_E4);

    ingestor.cycle().await.unwrap();

    let events = wait_for_events(&fx.observer, 1).await;
    assert!(matches!(&events[0], GameEvent::Move { san, .. } if san.as_deref() == Some("e4")));
}

#[tokio::test]
async fn malformed_lines_are_discarded_and_reported_once() {
    let (fx, mut ingestor) = fixture();
    fx.script.push_line("not a board");
    fx.script.push_line("not a board");
    fx.script.push_line(START);

    ingestor.cycle().await.unwrap();

    // The bad line never reached the ledger, the good one did.
    let game = fx.ledger.snapshot("g1").unwrap();
    assert_eq!(game.ledger.len(), 1);
    // Tracker cleared by the valid line.
    assert_eq!(ingestor.last_reported, None);

    fx.script.push_line("still bad");
    ingestor.cycle().await.unwrap();
    assert_eq!(ingestor.last_reported.as_deref(), Some("still bad"));
}

#[tokio::test]
async fn empty_line_resets_the_malformed_tracker() {
    let (_fx, mut ingestor) = fixture();
    ingestor.last_reported = Some("bad".to_string());
    assert_eq!(ingestor.screen(b"   \r"), None);
    assert_eq!(ingestor.last_reported, None);
}

#[tokio::test]
async fn invalid_bytes_are_replaced_not_fatal() {
    let (fx, mut ingestor) = fixture();
    fx.script.push_raw(b"\xff\xfe not utf8");
    fx.script.push_line(START);

    ingestor.cycle().await.unwrap();
    assert_eq!(fx.ledger.snapshot("g1").unwrap().ledger.len(), 1);
}

#[tokio::test]
async fn reset_request_clears_source_and_completer() {
    let dir = tempfile::tempdir().unwrap();
    let store = GameStore::open(dir.path().join("games")).unwrap();
    let ledger = Arc::new(GameLedger::new(store));
    let hub = Arc::new(BroadcastHub::new());
    let script = FakeSource::new();
    let reset = Arc::new(AtomicBool::new(false));

    let mut ingestor = Ingestor::new(
        script.clone(),
        "g1".to_string(),
        ledger,
        hub,
        Duration::from_millis(5),
        Arc::clone(&reset),
    );

    script.push_line("stale");
    reset.store(true, Ordering::SeqCst);
    ingestor.cycle().await.unwrap();

    assert_eq!(script.reset_count(), 1);
    assert_eq!(script.pending(), 0);
    assert!(!reset.load(Ordering::SeqCst));
}

#[tokio::test]
async fn fatal_source_failure_emits_disconnect_and_stops() {
    let (fx, ingestor) = fixture();
    let observer = fx.observer.clone();
    fx.script.fail_next();

    let (_shutdown, shutdown_rx) = tokio::sync::watch::channel(false);
    let task = tokio::spawn(ingestor.run(shutdown_rx));

    let events = wait_for_events(&observer, 1).await;
    assert!(matches!(
        &events[0],
        GameEvent::SourceStatus {
            state: cl_core::SourceState::Disconnected,
            ..
        }
    ));
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("ingest task should stop after a fatal failure")
        .unwrap();
    assert!(fx.script.is_closed());
}

#[tokio::test]
async fn shutdown_runs_a_final_drain() {
    let (fx, ingestor) = fixture();
    let (shutdown, shutdown_rx) = tokio::sync::watch::channel(false);
    let task = tokio::spawn(ingestor.run(shutdown_rx));

    fx.script.push_line(START);
    shutdown.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("ingest task should honor shutdown")
        .unwrap();

    assert_eq!(fx.ledger.snapshot("g1").unwrap().ledger.len(), 1);
    assert!(fx.script.is_closed());
}
