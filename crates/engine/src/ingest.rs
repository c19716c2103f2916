// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot ingest loop: poll a source, screen raw lines, complete them
//! into positions and feed the ledger.

use crate::hub::BroadcastHub;
use crate::ledger::GameLedger;
use cl_adapters::{SnapshotSource, SourceError};
use cl_core::{BoardSnapshot, Completer, GameEvent, SourceState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Ingestor<S: SnapshotSource> {
    source: S,
    completer: Completer,
    game_id: String,
    ledger: Arc<GameLedger>,
    hub: Arc<BroadcastHub>,
    poll: Duration,
    reset_requested: Arc<AtomicBool>,
    /// Last malformed line already complained about, to keep a stuck
    /// sensor from flooding the log.
    last_reported: Option<String>,
}

impl<S: SnapshotSource> Ingestor<S> {
    pub fn new(
        source: S,
        game_id: String,
        ledger: Arc<GameLedger>,
        hub: Arc<BroadcastHub>,
        poll: Duration,
        reset_requested: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            completer: Completer::new(),
            game_id,
            ledger,
            hub,
            poll,
            reset_requested,
            last_reported: None,
        }
    }

    /// Poll until shut down or the source fails fatally.
    ///
    /// A fatal failure emits a disconnected status and ends the session;
    /// anything less is logged and retried on the next tick. On an
    /// orderly shutdown one final drain runs so nothing readable is left
    /// behind.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(source = %self.source.describe(), game_id = %self.game_id, "ingest started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if let Err(e) = self.cycle().await {
                        warn!(error = %e, "final drain failed");
                    }
                    self.source.close().await;
                    info!(game_id = %self.game_id, "ingest stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.cycle().await {
                        if e.is_fatal() {
                            warn!(error = %e, source = %self.source.describe(), "source failed, ending ingest");
                            self.hub.emit(GameEvent::SourceStatus {
                                state: SourceState::Disconnected,
                                message: format!("{}: {e}", self.source.describe()),
                            });
                            self.source.close().await;
                            return;
                        }
                        warn!(error = %e, "transient source error");
                    }
                }
            }
        }
    }

    /// One poll: drain everything readable, then process the batch.
    async fn cycle(&mut self) -> Result<(), SourceError> {
        if self.reset_requested.swap(false, Ordering::SeqCst) {
            self.source.reset_buffer().await?;
            self.completer = Completer::new();
            self.last_reported = None;
        }

        let mut batch = Vec::new();
        while self.source.is_readable().await? {
            match self.source.read_line().await? {
                Some(raw) => {
                    if let Some(snapshot) = self.screen(&raw) {
                        batch.push(snapshot);
                    }
                }
                None => break,
            }
        }

        for snapshot in batch {
            let position = self.completer.complete(snapshot);
            let appended = self
                .ledger
                .with_game(&self.game_id, |game| {
                    game.enqueue(position);
                    game.drain_pending()
                });
            match appended {
                Ok(records) => self.hub.publish(&self.game_id, &records),
                // A ledger hiccup must not stop the stream.
                Err(e) => warn!(game_id = %self.game_id, error = %e, "failed to record position"),
            }
        }
        Ok(())
    }

    /// Decode and validate one raw line. Invalid bytes are replaced, not
    /// fatal; an identical consecutive malformed line is only reported
    /// once; empty lines and any valid line reset that tracker.
    fn screen(&mut self, raw: &[u8]) -> Option<BoardSnapshot> {
        let text = String::from_utf8_lossy(raw);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.last_reported = None;
            return None;
        }
        match BoardSnapshot::parse(trimmed) {
            Ok(snapshot) => {
                self.last_reported = None;
                Some(snapshot)
            }
            Err(e) => {
                if self.last_reported.as_deref() != Some(trimmed) {
                    warn!(line = trimmed, error = %e, "discarding malformed snapshot line");
                    self.last_reported = Some(trimmed.to_string());
                }
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
