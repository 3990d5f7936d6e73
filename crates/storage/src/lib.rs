// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tg-storage: the transactional persistence store (C1).
//!
//! Durable state is event-sourced: every mutation is appended to a
//! [`Wal`] as a [`tg_core::Event`], then folded into a [`MaterializedState`]
//! in memory. [`Store`] is the facade the engine and daemon actually talk
//! to — it serialises writes per plan, commits the WAL entry before
//! returning, and periodically checkpoints the materialized state to a
//! [`Snapshot`] so startup replay doesn't have to walk the whole log.

mod error;
mod snapshot;
mod state;
mod store;
mod wal;

pub use error::StoreError;
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{LogEntry, LogLevel, MaterializedState, NodeSnapshot};
pub use store::{PlanSnapshot, Store};
pub use wal::{Wal, WalError};
