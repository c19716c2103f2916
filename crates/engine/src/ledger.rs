// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory game registry over the persistent store.
//!
//! Games are loaded lazily and then live in memory, one lock per game,
//! so snapshot drain for the broadcasting game never contends with a
//! status query for another. Persistence is explicit: callers decide
//! when a game is worth flushing to disk.

use crate::error::EngineError;
use cl_core::Game;
use cl_storage::{GameStore, GameSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct GameLedger {
    store: GameStore,
    games: Mutex<HashMap<String, Arc<Mutex<Game>>>>,
}

impl GameLedger {
    pub fn new(store: GameStore) -> Self {
        Self {
            store,
            games: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a game, loading it from the store (or creating it) on first
    /// access.
    fn game(&self, id: &str) -> Result<Arc<Mutex<Game>>, EngineError> {
        let mut games = self.games.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(game) = games.get(id) {
            return Ok(Arc::clone(game));
        }
        let loaded = Arc::new(Mutex::new(self.store.load_or_create(id)?));
        games.insert(id.to_string(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Run `f` with exclusive access to one game.
    pub fn with_game<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Game) -> R,
    ) -> Result<R, EngineError> {
        let game = self.game(id)?;
        let mut guard = game.lock().unwrap_or_else(|e| e.into_inner());
        Ok(f(&mut guard))
    }

    /// Clone of the current state of a game.
    pub fn snapshot(&self, id: &str) -> Result<Game, EngineError> {
        self.with_game(id, |game| game.clone())
    }

    /// Flush a game to the store. The game is cloned under its lock and
    /// written outside it, so disk latency never blocks ingest.
    pub fn save(&self, id: &str) -> Result<(), EngineError> {
        let snapshot = self.snapshot(id)?;
        self.store.save(&snapshot)?;
        Ok(())
    }

    /// Stored games plus any in-memory games not yet flushed.
    pub fn list(&self) -> Result<Vec<GameSummary>, EngineError> {
        let mut summaries = self.store.list()?;
        let games = self.games.lock().unwrap_or_else(|e| e.into_inner());
        for (id, game) in games.iter() {
            if summaries.iter().any(|s| &s.id == id) {
                continue;
            }
            let game = game.lock().unwrap_or_else(|e| e.into_inner());
            summaries.push(GameSummary {
                id: game.id.clone(),
                white: game.meta.white.clone(),
                black: game.meta.black.clone(),
                date: game.meta.date.clone(),
                result: game.meta.result.clone(),
            });
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
