// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Move reconstruction: the inverse problem of determining which move
//! was played between two successive positions.
//!
//! Given the last recorded position and a new candidate, enumerate the
//! legal moves of the side to move and find the one whose resulting
//! board matches the candidate's board. Chess guarantees at most one
//! legal move reproduces a given board from a given position, so a match
//! is unambiguous. When nothing matches (sensor noise, a multi-ply jump,
//! a physically illegal placement) the candidate is still recorded, with
//! the legality flag lowered, so the ledger stays synchronized with the
//! physical board.

use crate::position::{Position, Side};
use crate::record::MoveRecord;
use chrono::Utc;
use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, Position as _, Role,
};
use tracing::debug;

/// Produce the next ledger entry for `candidate`.
///
/// With an empty ledger (`last` is `None`) the candidate becomes the
/// bootstrap entry. Otherwise the mover is always the side to move of
/// the previous position, whether or not the move could be reconstructed.
pub fn next_record(last: Option<&MoveRecord>, candidate: Position) -> MoveRecord {
    let Some(last) = last else {
        return MoveRecord::bootstrap(candidate);
    };

    let mover = last.position.turn;
    let index = last.index + 1;

    match find_move(&last.position, &candidate) {
        Some(found) => MoveRecord {
            index,
            position: candidate,
            mover: Some(mover),
            san: Some(found.san),
            uci: Some(found.uci),
            piece: Some(found.piece),
            from: found.from,
            to: Some(found.to),
            legal: true,
            recorded_at: Utc::now(),
        },
        None => {
            debug!(index, "no legal move reproduces candidate board");
            MoveRecord {
                index,
                position: candidate,
                mover: Some(mover),
                san: None,
                uci: None,
                piece: None,
                from: None,
                to: None,
                legal: false,
                recorded_at: Utc::now(),
            }
        }
    }
}

struct FoundMove {
    san: String,
    uci: String,
    piece: char,
    from: Option<String>,
    to: String,
}

fn find_move(prior: &Position, candidate: &Position) -> Option<FoundMove> {
    // A prior position that the rules engine rejects (for instance an
    // earlier illegal placement) cannot seed move enumeration.
    let chess = to_chess(prior)?;
    let target = candidate.board.to_board().ok()?;

    for m in chess.legal_moves() {
        let mut applied = chess.clone();
        applied.play_unchecked(&m);
        if *applied.board() == target {
            let san = San::from_move(&chess, &m).to_string();
            let uci = UciMove::from_move(&m, CastlingMode::Standard).to_string();
            return Some(FoundMove {
                san,
                uci,
                piece: piece_letter(m.role(), prior.turn),
                from: m.from().map(|sq| sq.to_string()),
                to: m.to().to_string(),
            });
        }
    }
    None
}

fn to_chess(position: &Position) -> Option<Chess> {
    let fen: Fen = position.fen().parse().ok()?;
    fen.into_position(CastlingMode::Standard).ok()
}

fn piece_letter(role: Role, mover: Side) -> char {
    let letter = match role {
        Role::Pawn => 'p',
        Role::Knight => 'n',
        Role::Bishop => 'b',
        Role::Rook => 'r',
        Role::Queen => 'q',
        Role::King => 'k',
    };
    match mover {
        Side::White => letter.to_ascii_uppercase(),
        Side::Black => letter,
    }
}

#[cfg(test)]
#[path = "reconstruct_tests.rs"]
mod tests;
