// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated piece-placement snapshots as reported by the board sensor.
//!
//! A snapshot is only the placement field of a position: eight ranks
//! separated by `/`, most significant rank first, using digits for gaps
//! and the standard piece letters. The sensor reports nothing else.

use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, Board};
use std::fmt;
use thiserror::Error;

/// Placement string for the standard starting position.
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Errors produced while validating a raw placement line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid character {found:?} in placement: {line}")]
    InvalidChar { line: String, found: char },
    #[error("expected 8 ranks, found {found}: {line}")]
    RankCount { line: String, found: usize },
    #[error("rank {rank} covers {files} files, expected 8: {line}")]
    FileSum { line: String, rank: usize, files: u32 },
    #[error("placement does not describe a board: {0}")]
    Unreadable(String),
}

/// A syntactically valid piece-placement string.
///
/// Invariant: by construction, the string has exactly 8 `/`-separated
/// ranks whose digit runs and piece letters sum to 8 files each.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoardSnapshot(String);

impl BoardSnapshot {
    /// Validate a raw line against the board-placement grammar.
    pub fn parse(line: &str) -> Result<Self, SnapshotError> {
        for c in line.chars() {
            if !matches!(c, '1'..='8' | '/' | 'p' | 'n' | 'b' | 'r' | 'q' | 'k'
                | 'P' | 'N' | 'B' | 'R' | 'Q' | 'K')
            {
                return Err(SnapshotError::InvalidChar {
                    line: line.to_string(),
                    found: c,
                });
            }
        }

        let ranks: Vec<&str> = line.split('/').collect();
        if ranks.len() != 8 {
            return Err(SnapshotError::RankCount {
                line: line.to_string(),
                found: ranks.len(),
            });
        }

        for (i, rank) in ranks.iter().enumerate() {
            let files: u32 = rank
                .chars()
                .map(|c| c.to_digit(10).unwrap_or(1))
                .sum();
            if files != 8 {
                return Err(SnapshotError::FileSum {
                    line: line.to_string(),
                    rank: i + 1,
                    files,
                });
            }
        }

        Ok(Self(line.to_string()))
    }

    /// Snapshot of the standard starting position
    pub fn start() -> Self {
        Self(START_PLACEMENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Materialize the placement as a board for square-level queries.
    ///
    /// Grammar validation does not guarantee a readable board (a rank
    /// like `44` passes the file-sum check), so this can still fail.
    pub fn to_board(&self) -> Result<Board, SnapshotError> {
        let fen: Fen = format!("{} w - - 0 1", self.0)
            .parse()
            .map_err(|_| SnapshotError::Unreadable(self.0.clone()))?;
        Ok(fen.into_setup().board)
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BoardSnapshot {
    type Error = SnapshotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BoardSnapshot> for String {
    fn from(value: BoardSnapshot) -> Self {
        value.0
    }
}

impl std::str::FromStr for BoardSnapshot {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
