// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cl-core: domain logic for the ChessLink position-stream engine
//!
//! This crate provides:
//! - Validated board snapshots and full six-field positions
//! - The position completer (infers side to move, castling rights,
//!   en passant target and clocks from successive snapshots)
//! - Move reconstruction between consecutive positions
//! - The per-game ledger data model and observer event types
//!
//! Everything here is pure: no I/O, no tasks. The engine crate wires
//! these pieces to sources, storage and observers.

pub mod completer;
pub mod event;
pub mod game;
pub mod position;
pub mod reconstruct;
pub mod record;
pub mod snapshot;

// Re-exports
pub use completer::Completer;
pub use event::{GameEvent, SourceState};
pub use game::{Game, GameMeta};
pub use position::{CastlingRights, Position, PositionError, Side};
pub use record::MoveRecord;
pub use snapshot::{BoardSnapshot, SnapshotError};
