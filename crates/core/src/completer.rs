// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Position completer: infers the non-observable position fields from
//! successive board snapshots.
//!
//! One `Completer` lives per open source. It remembers the last snapshot
//! and the running side-to-move, castling rights, en passant target and
//! move counters, and turns each incoming `BoardSnapshot` into a full
//! `Position`.
//!
//! Known simplification, carried over deliberately: the halfmove clock
//! increments on every new snapshot and never resets on pawn moves or
//! captures. The raw board alone cannot distinguish a capture from a
//! quiet move without full move inference, and downstream consumers do
//! not depend on fifty-move accounting.

use crate::position::{CastlingRights, Position, Side};
use crate::snapshot::{BoardSnapshot, SnapshotError};
use shakmaty::{Board, Color, Piece, Rank, Role, Square};
use tracing::warn;

const WHITE_PAWN: Piece = Piece {
    color: Color::White,
    role: Role::Pawn,
};
const BLACK_PAWN: Piece = Piece {
    color: Color::Black,
    role: Role::Pawn,
};
const WHITE_KING: Piece = Piece {
    color: Color::White,
    role: Role::King,
};
const BLACK_KING: Piece = Piece {
    color: Color::Black,
    role: Role::King,
};
const WHITE_ROOK: Piece = Piece {
    color: Color::White,
    role: Role::Rook,
};
const BLACK_ROOK: Piece = Piece {
    color: Color::Black,
    role: Role::Rook,
};

/// Per-source state machine completing snapshots into positions.
#[derive(Debug, Clone)]
pub struct Completer {
    last_board: Option<BoardSnapshot>,
    turn: Side,
    castling: CastlingRights,
    en_passant: Option<String>,
    halfmove: u32,
    fullmove: u32,
}

impl Completer {
    pub fn new() -> Self {
        Self {
            last_board: None,
            turn: Side::White,
            castling: CastlingRights::full(),
            en_passant: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// Complete a snapshot into a full position.
    ///
    /// Never fails: an internal error degrades to a best-effort position
    /// carrying the prior side and castling state with the en passant
    /// target cleared. Partial information beats dropping the snapshot.
    pub fn complete(&mut self, snapshot: BoardSnapshot) -> Position {
        // Duplicate read: the sensor repeated itself, re-emit unchanged.
        if self.last_board.as_ref() == Some(&snapshot) {
            return self.position_for(snapshot);
        }

        let previous = self.last_board.replace(snapshot.clone());

        let Some(previous) = previous else {
            // First snapshot for this source: canonical defaults.
            return self.position_for(snapshot);
        };

        match self.advance(&previous, &snapshot) {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, board = %snapshot, "completion heuristic failed, degrading");
                self.en_passant = None;
                self.position_for(snapshot)
            }
        }
    }

    /// Step the inferred state forward for a genuinely new snapshot.
    ///
    /// Both boards are parsed before any state is mutated, so a failure
    /// leaves the completer exactly where it was.
    fn advance(
        &mut self,
        previous: &BoardSnapshot,
        next: &BoardSnapshot,
    ) -> Result<Position, SnapshotError> {
        let prev_board = previous.to_board()?;
        let next_board = next.to_board()?;

        self.turn = self.turn.flip();
        if self.turn == Side::White {
            // Black just moved
            self.fullmove += 1;
        }

        self.revoke_castling(&next_board);
        self.en_passant = detect_en_passant(&prev_board, &next_board);
        self.halfmove += 1;

        Ok(self.position_for(next.clone()))
    }

    /// Revoke castling rights whose king or rook has left its origin square.
    fn revoke_castling(&mut self, board: &Board) {
        if self.castling.white_any() && board.piece_at(Square::E1) != Some(WHITE_KING) {
            self.castling.revoke_white();
        }
        if self.castling.black_any() && board.piece_at(Square::E8) != Some(BLACK_KING) {
            self.castling.revoke_black();
        }
        if self.castling.white_queenside() && board.piece_at(Square::A1) != Some(WHITE_ROOK) {
            self.castling.revoke_white_queenside();
        }
        if self.castling.white_kingside() && board.piece_at(Square::H1) != Some(WHITE_ROOK) {
            self.castling.revoke_white_kingside();
        }
        if self.castling.black_queenside() && board.piece_at(Square::A8) != Some(BLACK_ROOK) {
            self.castling.revoke_black_queenside();
        }
        if self.castling.black_kingside() && board.piece_at(Square::H8) != Some(BLACK_ROOK) {
            self.castling.revoke_black_kingside();
        }
    }

    fn position_for(&self, board: BoardSnapshot) -> Position {
        Position {
            board,
            turn: self.turn,
            castling: self.castling,
            en_passant: self.en_passant.clone(),
            halfmove: self.halfmove,
            fullmove: self.fullmove,
        }
    }
}

impl Default for Completer {
    fn default() -> Self {
        Self::new()
    }
}

/// Find an en passant target: a pawn that vacated its starting rank while
/// a same-colored pawn now sits two ranks further along the same file.
/// The target is the intermediate square. Detection is reset on every
/// step; a target never persists across positions.
fn detect_en_passant(previous: &Board, next: &Board) -> Option<String> {
    for square in Square::ALL {
        if next.piece_at(square).is_some() {
            continue;
        }
        let Some(vacated) = previous.piece_at(square) else {
            continue;
        };

        if vacated == WHITE_PAWN && square.rank() == Rank::Second {
            let landing = Square::from_coords(square.file(), Rank::Fourth);
            if next.piece_at(landing) == Some(WHITE_PAWN) {
                return Some(Square::from_coords(square.file(), Rank::Third).to_string());
            }
        }
        if vacated == BLACK_PAWN && square.rank() == Rank::Seventh {
            let landing = Square::from_coords(square.file(), Rank::Fifth);
            if next.piece_at(landing) == Some(BLACK_PAWN) {
                return Some(Square::from_coords(square.file(), Rank::Sixth).to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "completer_tests.rs"]
mod tests;
