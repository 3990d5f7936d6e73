// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::wal::WalError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plan {0} already exists")]
    PlanExists(String),
    #[error("plan {0} not found")]
    PlanNotFound(String),
    #[error("node {0} not found in plan {1}")]
    NodeNotFound(u32, String),
    #[error("wal error: {0}")]
    Wal(#[from] WalError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
