// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable move records, the entries of a game's ledger.

use crate::position::{Position, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a game's append-only history.
///
/// Index 0 is the bootstrap entry: the first observed position, with no
/// mover and no move fields. It is never delivered as a move event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Sequence index within the ledger, 0-based
    pub index: u32,
    /// The position after this move (as reported, not re-derived)
    pub position: Position,
    /// Side that moved; `None` only for the bootstrap entry
    pub mover: Option<Side>,
    /// Algebraic notation, when the move could be reconstructed
    pub san: Option<String>,
    /// Coordinate notation, when the move could be reconstructed
    pub uci: Option<String>,
    /// Letter of the piece moved (uppercase white, lowercase black)
    pub piece: Option<char>,
    /// Origin square
    pub from: Option<String>,
    /// Destination square
    pub to: Option<String>,
    /// False when no legal move explains this position
    pub legal: bool,
    pub recorded_at: DateTime<Utc>,
}

impl MoveRecord {
    /// Build the bootstrap entry for an empty ledger.
    pub fn bootstrap(position: Position) -> Self {
        Self {
            index: 0,
            position,
            mover: None,
            san: None,
            uci: None,
            piece: None,
            from: None,
            to: None,
            legal: true,
            recorded_at: Utc::now(),
        }
    }

    /// True for the ledger's index-0 entry.
    pub fn is_bootstrap(&self) -> bool {
        self.index == 0 && self.mover.is_none()
    }
}
