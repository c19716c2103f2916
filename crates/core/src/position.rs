// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full six-field positions and their component types.

use crate::snapshot::{BoardSnapshot, SnapshotError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

// Shape of a full position string: placement, side, castling, en passant,
// halfmove clock, fullmove number. Individual fields are re-validated after
// the match.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static POSITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-8pnbrqkPNBRQK/]+ [wb] [KQkq-]+ [a-h1-8-]+ \d+ \d+$")
        .expect("constant regex pattern is valid")
});

/// Errors produced while parsing a full position string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("position does not match `<placement> <w|b> <castling> <square> <int> <int>`: {0}")]
    Shape(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("invalid castling rights field: {0}")]
    Castling(String),
    #[error("invalid en passant square: {0}")]
    EnPassant(String),
    #[error("invalid move counter: {0}")]
    Counter(String),
    #[error("fullmove number must be positive")]
    ZeroFullmove,
}

/// Side to move (or side that moved, on a record)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Side {
    pub fn flip(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Castling availability for both sides.
///
/// Rights can only be revoked, never granted back: the fields are private
/// and the only mutators clear them. This is what makes castling rights
/// monotonically non-increasing over a game's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    white_kingside: bool,
    white_queenside: bool,
    black_kingside: bool,
    black_queenside: bool,
}

impl CastlingRights {
    /// All four rights available (fresh game)
    pub fn full() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn white_any(&self) -> bool {
        self.white_kingside || self.white_queenside
    }

    pub fn black_any(&self) -> bool {
        self.black_kingside || self.black_queenside
    }

    pub fn white_kingside(&self) -> bool {
        self.white_kingside
    }

    pub fn white_queenside(&self) -> bool {
        self.white_queenside
    }

    pub fn black_kingside(&self) -> bool {
        self.black_kingside
    }

    pub fn black_queenside(&self) -> bool {
        self.black_queenside
    }

    pub fn revoke_white(&mut self) {
        self.white_kingside = false;
        self.white_queenside = false;
    }

    pub fn revoke_black(&mut self) {
        self.black_kingside = false;
        self.black_queenside = false;
    }

    pub fn revoke_white_kingside(&mut self) {
        self.white_kingside = false;
    }

    pub fn revoke_white_queenside(&mut self) {
        self.white_queenside = false;
    }

    pub fn revoke_black_kingside(&mut self) {
        self.black_kingside = false;
    }

    pub fn revoke_black_queenside(&mut self) {
        self.black_queenside = false;
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::none() {
            return write!(f, "-");
        }
        if self.white_kingside {
            write!(f, "K")?;
        }
        if self.white_queenside {
            write!(f, "Q")?;
        }
        if self.black_kingside {
            write!(f, "k")?;
        }
        if self.black_queenside {
            write!(f, "q")?;
        }
        Ok(())
    }
}

impl FromStr for CastlingRights {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Self::none());
        }
        if s.is_empty() {
            return Err(PositionError::Castling(s.to_string()));
        }
        let mut rights = Self::none();
        for c in s.chars() {
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => return Err(PositionError::Castling(s.to_string())),
            }
        }
        Ok(rights)
    }
}

/// A complete position: placement plus the five inferred fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub board: BoardSnapshot,
    pub turn: Side,
    pub castling: CastlingRights,
    /// Target square like `e3`, if a double pawn push was just detected
    pub en_passant: Option<String>,
    pub halfmove: u32,
    pub fullmove: u32,
}

impl Position {
    /// The standard starting position with canonical defaults.
    pub fn start() -> Self {
        Self {
            board: BoardSnapshot::start(),
            turn: Side::White,
            castling: CastlingRights::full(),
            en_passant: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// Render the position as a FEN-style string
    pub fn fen(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.board,
            self.turn,
            self.castling,
            self.en_passant.as_deref().unwrap_or("-"),
            self.halfmove,
            self.fullmove
        )
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !POSITION_PATTERN.is_match(s) {
            return Err(PositionError::Shape(s.to_string()));
        }

        let mut fields = s.split(' ');
        // The regex guarantees six fields; missing ones fall through to Shape.
        let mut next = || fields.next().ok_or_else(|| PositionError::Shape(s.to_string()));

        let board = BoardSnapshot::parse(next()?)?;
        let turn = match next()? {
            "w" => Side::White,
            "b" => Side::Black,
            other => return Err(PositionError::Shape(other.to_string())),
        };
        let castling = next()?.parse()?;
        let en_passant = parse_ep_square(next()?)?;
        let halfmove = parse_counter(next()?)?;
        let fullmove = parse_counter(next()?)?;
        if fullmove == 0 {
            return Err(PositionError::ZeroFullmove);
        }

        Ok(Self {
            board,
            turn,
            castling,
            en_passant,
            halfmove,
            fullmove,
        })
    }
}

fn parse_ep_square(s: &str) -> Result<Option<String>, PositionError> {
    if s == "-" {
        return Ok(None);
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('a'..='h'), Some('1'..='8'), None) => Ok(Some(s.to_string())),
        _ => Err(PositionError::EnPassant(s.to_string())),
    }
}

fn parse_counter(s: &str) -> Result<u32, PositionError> {
    s.parse().map_err(|_| PositionError::Counter(s.to_string()))
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod tests;
