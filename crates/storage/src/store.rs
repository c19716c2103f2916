// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed game store.
//!
//! Each game is one pretty-printed JSON file named `<id>.json`. Saves go
//! through a temp file and rename so a crash mid-write never leaves a
//! half-written game behind.

use cl_core::Game;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from the game store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt game file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("game not found: {0}")]
    NotFound(String),
    #[error("invalid game id: {0}")]
    InvalidGameId(String),
}

/// Listing entry: enough to render a game index without loading ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub id: String,
    pub white: Option<String>,
    pub black: Option<String>,
    pub date: Option<String>,
    pub result: String,
}

/// One JSON document per game under `root`.
#[derive(Debug, Clone)]
pub struct GameStore {
    root: PathBuf,
}

impl GameStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a game by id.
    pub fn load(&self, id: &str) -> Result<Game, StoreError> {
        let path = self.game_path(id)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map_err(|source| StoreError::Corrupt { path, source })
    }

    /// Load a game, or hand back a fresh one if nothing is stored yet.
    pub fn load_or_create(&self, id: &str) -> Result<Game, StoreError> {
        match self.load(id) {
            Ok(game) => Ok(game),
            Err(StoreError::NotFound(_)) => {
                // Validated by load's game_path already, but load_or_create
                // must not mint files for ids load would reject.
                Ok(Game::new(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Persist a game atomically.
    pub fn save(&self, game: &Game) -> Result<(), StoreError> {
        let path = self.game_path(&game.id)?;
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(game).map_err(|source| StoreError::Corrupt {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        debug!(game_id = %game.id, moves = game.move_count(), "game saved");
        Ok(())
    }

    pub fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.game_path(id)?.exists())
    }

    /// Summaries of every stored game, sorted by id. Unreadable files are
    /// skipped rather than failing the whole listing.
    pub fn list(&self) -> Result<Vec<GameSummary>, StoreError> {
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.load(id) {
                Ok(game) => summaries.push(GameSummary {
                    id: game.id,
                    white: game.meta.white,
                    black: game.meta.black,
                    date: game.meta.date,
                    result: game.meta.result,
                }),
                Err(e) => debug!(game_id = id, error = %e, "skipping unreadable game file"),
            }
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    /// Map an id to its file, rejecting anything that could escape the
    /// store directory.
    fn game_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidGameId(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
