// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Game state: metadata, the append-only ledger and the pending queue.
//!
//! A `Game` is plain data. Mutual exclusion around it is the engine's
//! job (one lock per game, see `cl-engine`); nothing here is thread-safe
//! by itself.

use crate::position::Position;
use crate::reconstruct;
use crate::record::MoveRecord;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Result string for a game still in progress
pub const RESULT_IN_PROGRESS: &str = "*";

/// Seven-tag-style game metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMeta {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: String,
}

impl Default for GameMeta {
    fn default() -> Self {
        Self {
            event: None,
            site: None,
            date: None,
            round: None,
            white: None,
            black: None,
            result: RESULT_IN_PROGRESS.to_string(),
        }
    }
}

/// One game: identifier, metadata, ledger and pending snapshot queue.
///
/// The pending queue is transient and never persisted; the ledger and
/// metadata round-trip losslessly through storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub meta: GameMeta,
    pub ledger: Vec<MoveRecord>,
    #[serde(skip)]
    pending: VecDeque<Position>,
}

impl Game {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            meta: GameMeta::default(),
            ledger: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// Append a completed position to the pending queue.
    pub fn enqueue(&mut self, position: Position) {
        self.pending.push_back(position);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Process every queued position in order, appending the resulting
    /// records to the ledger. Returns exactly the newly appended records.
    ///
    /// A candidate identical to the last appended position is a repeated
    /// read and is skipped, which keeps duplicate snapshots from growing
    /// the ledger.
    pub fn drain_pending(&mut self) -> Vec<MoveRecord> {
        let mut appended = Vec::new();
        while let Some(candidate) = self.pending.pop_front() {
            if self.ledger.last().map(|r| &r.position) == Some(&candidate) {
                continue;
            }
            let record = reconstruct::next_record(self.ledger.last(), candidate);
            self.ledger.push(record.clone());
            appended.push(record);
        }
        appended
    }

    pub fn last_record(&self) -> Option<&MoveRecord> {
        self.ledger.last()
    }

    /// FEN of the latest known position, or the starting position for a
    /// game whose ledger is still empty.
    pub fn current_fen(&self) -> String {
        self.ledger
            .last()
            .map(|r| r.position.fen())
            .unwrap_or_else(|| Position::start().fen())
    }

    /// FEN of the first recorded position, falling back to the standard
    /// start placement before anything has been observed.
    pub fn initial_fen(&self) -> String {
        self.ledger
            .first()
            .map(|r| r.position.fen())
            .unwrap_or_else(|| Position::start().fen())
    }

    /// Number of moves, excluding the bootstrap entry.
    pub fn move_count(&self) -> usize {
        self.ledger.len().saturating_sub(1)
    }

    pub fn in_progress(&self) -> bool {
        self.meta.result == RESULT_IN_PROGRESS
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod tests;
