// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use cl_adapters::SourceError;
use cl_core::PositionError;
use cl_storage::StoreError;
use thiserror::Error;

/// Errors that can occur in the engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("position error: {0}")]
    Position(#[from] PositionError),
    #[error("game already broadcasting: {0}")]
    AlreadyBroadcasting(String),
    #[error("no game is broadcasting")]
    NotBroadcasting,
    #[error("game already completed: {0}")]
    GameCompleted(String),
    #[error("a snapshot source is already connected")]
    SourceAlreadyConnected,
    #[error("no snapshot source is connected")]
    SourceNotConnected,
    #[error("invalid result string: {0}")]
    InvalidResult(String),
}
