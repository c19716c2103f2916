// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ChessLink reconstruction engine: ledger bookkeeping, snapshot ingest
//! and event broadcast

mod error;
mod hub;
mod ingest;
mod ledger;
mod service;

pub use error::EngineError;
pub use hub::BroadcastHub;
pub use ledger::GameLedger;
pub use service::Service;
