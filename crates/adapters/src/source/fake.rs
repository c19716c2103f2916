// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake snapshot source for testing

use super::{SnapshotSource, SourceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    lines: VecDeque<Vec<u8>>,
    fail: bool,
    closed: bool,
    resets: u32,
}

/// Scripted source: hand it lines from the test, optionally tell it to
/// fail. Clones share state so the test keeps a handle while the ingest
/// loop owns another.
#[derive(Clone, Default)]
pub struct FakeSource {
    inner: Arc<Mutex<Inner>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one line for the ingest loop to read.
    pub fn push_line(&self, line: &str) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .lines
            .push_back(line.as_bytes().to_vec());
    }

    /// Queue raw bytes, for feeding invalid encodings.
    pub fn push_raw(&self, line: &[u8]) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .lines
            .push_back(line.to_vec());
    }

    /// Make the next read fail fatally.
    pub fn fail_next(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).fail = true;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).closed
    }

    pub fn reset_count(&self) -> u32 {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).resets
    }

    pub fn pending(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .lines
            .len()
    }
}

#[async_trait]
impl SnapshotSource for FakeSource {
    async fn is_readable(&mut self) -> Result<bool, SourceError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner.fail || !inner.lines.is_empty())
    }

    async fn read_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.fail {
            inner.fail = false;
            return Err(SourceError::Closed);
        }
        Ok(inner.lines.pop_front())
    }

    async fn reset_buffer(&mut self) -> Result<(), SourceError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.lines.clear();
        inner.resets += 1;
        Ok(())
    }

    async fn close(&mut self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).closed = true;
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
