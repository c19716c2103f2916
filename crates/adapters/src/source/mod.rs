// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot sources: where raw board placement lines come from

mod file;
mod tcp;

pub use file::FileSource;
pub use tcp::TcpSource;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSource;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a snapshot source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("i/o failure on snapshot source: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot source closed by peer")]
    Closed,
}

impl SourceError {
    /// Fatal errors end the ingest session; anything else is retried on
    /// the next poll.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Closed => true,
            Self::Io(e) => !matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted
            ),
        }
    }
}

/// A line-oriented feed of board placements.
///
/// The ingest loop owns its source exclusively, so methods take
/// `&mut self`; implementations need no internal locking.
#[async_trait]
pub trait SnapshotSource: Send + 'static {
    /// True when at least one complete line is waiting to be read.
    async fn is_readable(&mut self) -> Result<bool, SourceError>;

    /// Read the next complete line, without its terminator.
    ///
    /// `Ok(None)` means no complete line is available yet.
    async fn read_line(&mut self) -> Result<Option<Vec<u8>>, SourceError>;

    /// Discard any buffered, unread input.
    async fn reset_buffer(&mut self) -> Result<(), SourceError>;

    /// Release the underlying handle. Errors during teardown are ignored.
    async fn close(&mut self);

    /// Human-readable description for logs and status events.
    fn describe(&self) -> String;
}
