// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator surface: everything the daemon (and tests) drive the engine
//! through.

use crate::error::EngineError;
use crate::hub::BroadcastHub;
use crate::ingest::{Ingestor, DEFAULT_POLL_INTERVAL};
use crate::ledger::GameLedger;
use cl_adapters::{Observer, SnapshotSource};
use cl_core::{Game, GameEvent, MoveRecord, Position, SourceState};
use cl_storage::{GameStore, GameSummary};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Results a game can be marked with
const VALID_RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// How long an orderly disconnect waits for the ingest task's final
/// drain before aborting it.
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

struct SourceHandle {
    game_id: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    reset_requested: Arc<AtomicBool>,
}

pub struct Service {
    ledger: Arc<GameLedger>,
    hub: Arc<BroadcastHub>,
    source: tokio::sync::Mutex<Option<SourceHandle>>,
    poll_interval: Duration,
}

impl Service {
    /// Build a service over a store. Must be called within a tokio
    /// runtime (the hub spawns its dispatcher).
    pub fn new(store: GameStore) -> Self {
        Self {
            ledger: Arc::new(GameLedger::new(store)),
            hub: Arc::new(BroadcastHub::new()),
            source: tokio::sync::Mutex::new(None),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Lower the source poll interval; tests use this to keep waits short.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn subscribe(&self, observer: Arc<dyn Observer>) {
        self.hub.subscribe(observer);
    }

    /// Put a game on air.
    ///
    /// A completed game cannot be restarted. If another game was on air
    /// it is persisted before the switch. A connected source feeding the
    /// new game has its stale backlog discarded.
    pub async fn start_game(&self, game_id: &str) -> Result<(), EngineError> {
        let snapshot = self.ledger.snapshot(game_id)?;
        if !snapshot.in_progress() {
            return Err(EngineError::GameCompleted(game_id.to_string()));
        }

        let replaced = self.hub.start(game_id)?;
        if let Some(previous) = replaced {
            info!(from = %previous, to = game_id, "switching broadcast");
            self.ledger.save(&previous)?;
        }

        let source = self.source.lock().await;
        if let Some(handle) = source.as_ref() {
            if handle.game_id == game_id {
                handle.reset_requested.store(true, Ordering::SeqCst);
            }
        }
        drop(source);

        self.hub.emit(GameEvent::game_started(&snapshot));
        Ok(())
    }

    /// Take the current game off air, persisting it.
    pub async fn end_game(&self) -> Result<String, EngineError> {
        let game_id = self.hub.end()?;
        self.ledger.save(&game_id)?;
        self.hub.emit(GameEvent::GameEnded {
            game_id: game_id.clone(),
        });
        info!(game_id = %game_id, "broadcast ended");
        Ok(game_id)
    }

    /// Append a position to a game directly, bypassing any source.
    ///
    /// With nothing on air the game is promoted to broadcasting first.
    /// Records for the on-air game are published; a game accumulating
    /// silently is persisted immediately instead, so nothing injected is
    /// ever lost to a crash.
    pub async fn inject(
        &self,
        game_id: &str,
        fen: &str,
    ) -> Result<Vec<MoveRecord>, EngineError> {
        let position: Position = fen.parse()?;

        if self.hub.current().is_none() {
            self.start_game(game_id).await?;
        }

        let appended = self.ledger.with_game(game_id, |game| {
            game.enqueue(position);
            game.drain_pending()
        })?;

        if self.hub.current().as_deref() == Some(game_id) {
            self.hub.publish(game_id, &appended);
        } else {
            self.ledger.save(game_id)?;
        }
        Ok(appended)
    }

    /// Attach a snapshot source feeding `game_id` and start polling it.
    pub async fn connect_source<S: SnapshotSource>(
        &self,
        game_id: &str,
        source: S,
    ) -> Result<(), EngineError> {
        let mut slot = self.source.lock().await;
        if slot.is_some() {
            return Err(EngineError::SourceAlreadyConnected);
        }

        // Ensure the game exists before the first snapshot arrives.
        self.ledger.with_game(game_id, |_| ())?;

        let describe = source.describe();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let reset_requested = Arc::new(AtomicBool::new(false));
        let ingestor = Ingestor::new(
            source,
            game_id.to_string(),
            Arc::clone(&self.ledger),
            Arc::clone(&self.hub),
            self.poll_interval,
            Arc::clone(&reset_requested),
        );
        let task = tokio::spawn(ingestor.run(shutdown_rx));

        *slot = Some(SourceHandle {
            game_id: game_id.to_string(),
            shutdown,
            task,
            reset_requested,
        });
        self.hub.emit(GameEvent::SourceStatus {
            state: SourceState::Connected,
            message: describe,
        });
        Ok(())
    }

    /// Detach the source: signal the ingest task, wait briefly for its
    /// final drain, then persist the fed game.
    pub async fn disconnect_source(&self) -> Result<(), EngineError> {
        let handle = self
            .source
            .lock()
            .await
            .take()
            .ok_or(EngineError::SourceNotConnected)?;

        let _ = handle.shutdown.send(true);
        let mut task = handle.task;
        match tokio::time::timeout(DISCONNECT_GRACE, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "ingest task panicked"),
            Err(_) => {
                warn!("ingest task did not stop in time, aborting");
                task.abort();
            }
        }

        self.ledger.save(&handle.game_id)?;
        self.hub.emit(GameEvent::SourceStatus {
            state: SourceState::Disconnected,
            message: "disconnected by operator".to_string(),
        });
        Ok(())
    }

    /// Current state of one game.
    pub fn game_state(&self, game_id: &str) -> Result<Game, EngineError> {
        self.ledger.snapshot(game_id)
    }

    /// Every known game, stored or in memory.
    pub fn list_games(&self) -> Result<Vec<GameSummary>, EngineError> {
        self.ledger.list()
    }

    /// Edit a game's metadata in place. The result field goes through
    /// `update_result`, which validates it.
    pub fn update_meta(
        &self,
        game_id: &str,
        f: impl FnOnce(&mut cl_core::GameMeta),
    ) -> Result<(), EngineError> {
        self.ledger.with_game(game_id, |game| f(&mut game.meta))?;
        self.ledger.save(game_id)?;
        Ok(())
    }

    /// Record a game's final (or reset to in-progress) result.
    pub fn update_result(&self, game_id: &str, result: &str) -> Result<(), EngineError> {
        if !VALID_RESULTS.contains(&result) {
            return Err(EngineError::InvalidResult(result.to_string()));
        }
        self.ledger.with_game(game_id, |game| {
            game.meta.result = result.to_string();
        })?;
        self.ledger.save(game_id)?;
        Ok(())
    }

    /// Orderly teardown: detach any source, end any broadcast.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        match self.disconnect_source().await {
            Ok(()) | Err(EngineError::SourceNotConnected) => {}
            Err(e) => return Err(e),
        }
        match self.end_game().await {
            Ok(_) | Err(EngineError::NotBroadcasting) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
