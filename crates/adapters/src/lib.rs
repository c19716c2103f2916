// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: snapshot sources and observer transports

pub mod observer;
pub mod source;

pub use observer::{LogObserver, Observer, ObserverError};
pub use source::{FileSource, SnapshotSource, SourceError, TcpSource};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use observer::FakeObserver;
#[cfg(any(test, feature = "test-support"))]
pub use source::FakeSource;
