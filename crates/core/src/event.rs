// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer event contract.
//!
//! Everything observers ever see is one of these events. The transport
//! that carries them (socket, web push, log line) is an adapter concern.

use crate::game::Game;
use crate::position::Side;
use crate::record::MoveRecord;
use serde::{Deserialize, Serialize};

/// Connectivity of the snapshot source, as reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceState {
    Connected,
    Disconnected,
}

/// Events fanned out to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A game broadcast began
    GameStarted {
        game_id: String,
        initial_fen: String,
        event: Option<String>,
        white: Option<String>,
        black: Option<String>,
    },
    /// A new move was appended to the broadcasting game's ledger
    Move {
        game_id: String,
        index: u32,
        fen: String,
        mover: Side,
        san: Option<String>,
        uci: Option<String>,
        legal: bool,
        piece: Option<char>,
        from: Option<String>,
        to: Option<String>,
    },
    /// The broadcast for a game ended
    GameEnded { game_id: String },
    /// The snapshot source connected or dropped
    SourceStatus {
        state: SourceState,
        message: String,
    },
}

impl GameEvent {
    /// Build the `game_started` event for a game.
    pub fn game_started(game: &Game) -> Self {
        Self::GameStarted {
            game_id: game.id.clone(),
            initial_fen: game.initial_fen(),
            event: game.meta.event.clone(),
            white: game.meta.white.clone(),
            black: game.meta.black.clone(),
        }
    }

    /// Build the move event for a ledger record.
    ///
    /// Returns `None` for the bootstrap entry, which is only ever
    /// delivered as part of `game_started`.
    pub fn from_record(game_id: &str, record: &MoveRecord) -> Option<Self> {
        let mover = record.mover?;
        Some(Self::Move {
            game_id: game_id.to_string(),
            index: record.index,
            fen: record.position.fen(),
            mover,
            san: record.san.clone(),
            uci: record.uci.clone(),
            legal: record.legal,
            piece: record.piece,
            from: record.from.clone(),
            to: record.to.clone(),
        })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
