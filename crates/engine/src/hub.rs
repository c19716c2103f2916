// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast hub: one game on air, events fanned out to observers.
//!
//! All events flow through a single unbounded channel into one
//! dispatcher task, which delivers them to every subscribed observer in
//! order. The single consumer is what guarantees observers see moves in
//! ledger order even when ingest and operator commands race.

use cl_adapters::Observer;
use cl_core::{GameEvent, MoveRecord};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::EngineError;

type Observers = Arc<RwLock<Vec<Arc<dyn Observer>>>>;

pub struct BroadcastHub {
    broadcasting: Mutex<Option<String>>,
    observers: Observers,
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl BroadcastHub {
    /// Create the hub and spawn its dispatcher task. Must be called from
    /// within a tokio runtime. The dispatcher exits when the hub drops.
    pub fn new() -> Self {
        let observers: Observers = Arc::new(RwLock::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(dispatch(rx, Arc::clone(&observers)));
        Self {
            broadcasting: Mutex::new(None),
            observers,
            tx,
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn Observer>) {
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    /// Put a game on air, returning the id of the game it replaced.
    ///
    /// Restarting the game already on air is an error; switching to a
    /// different game is not, the caller is expected to persist the
    /// replaced one.
    pub fn start(&self, game_id: &str) -> Result<Option<String>, EngineError> {
        let mut broadcasting = self.broadcasting.lock().unwrap_or_else(|e| e.into_inner());
        if broadcasting.as_deref() == Some(game_id) {
            return Err(EngineError::AlreadyBroadcasting(game_id.to_string()));
        }
        Ok(broadcasting.replace(game_id.to_string()))
    }

    /// Take the current game off air, returning its id.
    pub fn end(&self) -> Result<String, EngineError> {
        self.broadcasting
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(EngineError::NotBroadcasting)
    }

    pub fn current(&self) -> Option<String> {
        self.broadcasting
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Send move events for freshly appended records, if their game is
    /// the one on air. Bootstrap entries produce no event.
    pub fn publish(&self, game_id: &str, records: &[MoveRecord]) {
        if self.current().as_deref() != Some(game_id) {
            debug!(game_id, count = records.len(), "records for off-air game, not publishing");
            return;
        }
        for record in records {
            if let Some(event) = GameEvent::from_record(game_id, record) {
                self.emit(event);
            }
        }
    }

    /// Queue an event for delivery regardless of broadcast state.
    pub fn emit(&self, event: GameEvent) {
        // Send only fails once the dispatcher is gone, during shutdown.
        let _ = self.tx.send(event);
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

async fn dispatch(mut rx: mpsc::UnboundedReceiver<GameEvent>, observers: Observers) {
    while let Some(event) = rx.recv().await {
        let recipients: Vec<Arc<dyn Observer>> = observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in recipients {
            if let Err(e) = observer.notify(&event).await {
                warn!(observer = observer.name(), error = %e, "event delivery failed");
            }
        }
    }
    debug!("event dispatcher stopped");
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
