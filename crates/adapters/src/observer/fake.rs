// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake observer for testing

use super::{Observer, ObserverError};
use async_trait::async_trait;
use cl_core::GameEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Records every delivered event; can be told to reject deliveries.
#[derive(Clone, Default)]
pub struct FakeObserver {
    events: Arc<Mutex<Vec<GameEvent>>>,
    failing: Arc<AtomicBool>,
}

impl FakeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events delivered so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Make every subsequent delivery fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Observer for FakeObserver {
    async fn notify(&self, event: &GameEvent) -> Result<(), ObserverError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ObserverError::Delivery("fake observer is failing".to_string()));
        }
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
