// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer transports: where game events go

use async_trait::async_trait;
use cl_core::GameEvent;
use thiserror::Error;
use tracing::info;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeObserver;

/// Errors from event delivery
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("event delivery failed: {0}")]
    Delivery(String),
}

/// Anything that wants the event stream.
///
/// Delivery failures are logged and skipped by the dispatcher; one slow
/// or broken observer must not stall the others.
#[async_trait]
pub trait Observer: Send + Sync + 'static {
    async fn notify(&self, event: &GameEvent) -> Result<(), ObserverError>;

    /// Name used when logging delivery failures.
    fn name(&self) -> &str;
}

/// Observer that writes every event to the log. The daemon installs one
/// so a broadcast is traceable without any external observer attached.
#[derive(Debug, Clone, Default)]
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observer for LogObserver {
    async fn notify(&self, event: &GameEvent) -> Result<(), ObserverError> {
        info!(event = ?event, "game event");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
