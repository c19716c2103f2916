//! Shared fixture for the behavioral specs.

use cl_adapters::{FakeObserver, FakeSource};
use cl_engine::Service;
use cl_storage::GameStore;
use std::sync::Arc;
use std::time::Duration;

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR";
pub const AFTER_E4_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR";
pub const AFTER_E4_E5_NF3: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R";

/// One wired-up engine: temp store, fast-polling service, scripted
/// source handle and a recording observer.
pub struct Rig {
    _dir: Option<tempfile::TempDir>,
    pub store: GameStore,
    pub service: Service,
    pub script: FakeSource,
    pub observer: FakeObserver,
}

impl Rig {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut rig = Self::over(dir.path());
        rig._dir = Some(dir);
        rig
    }

    /// Build over a directory the caller owns. Restart specs use this so
    /// the games directory outlives the rig.
    pub fn over(root: &std::path::Path) -> Self {
        let store = GameStore::open(root.join("games")).unwrap();
        let service =
            Service::new(store.clone()).with_poll_interval(Duration::from_millis(5));
        let observer = FakeObserver::new();
        service.subscribe(Arc::new(observer.clone()));
        Self {
            _dir: None,
            store,
            service,
            script: FakeSource::new(),
            observer,
        }
    }

    /// Broadcast `game_id` and attach the scripted source to it.
    pub async fn go_live(&self, game_id: &str) {
        self.service.start_game(game_id).await.unwrap();
        self.service
            .connect_source(game_id, self.script.clone())
            .await
            .unwrap();
    }

    pub async fn wait_for<F: Fn() -> bool>(&self, what: &str, check: F) {
        for _ in 0..400 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "timed out waiting for {what}; observer saw {:?}",
            self.observer.events()
        );
    }

    pub async fn wait_for_moves(&self, game_id: &str, count: usize) {
        self.wait_for(&format!("{count} moves in {game_id}"), || {
            self.service
                .game_state(game_id)
                .map(|g| g.move_count() >= count)
                .unwrap_or(false)
        })
        .await;
    }
}
