// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for crash recovery.
//!
//! Snapshots store the complete materialized state at a point in time,
//! identified by the WAL sequence number. Recovery loads the newest valid
//! snapshot and replays WAL entries after that sequence.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::MaterializedState;

/// Current snapshot schema version.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {0} is newer than this binary's {CURRENT_SNAPSHOT_VERSION}")]
    TooNew(u32),
}

/// A snapshot of the materialized state at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    /// WAL sequence number at the time of snapshot.
    pub seq: u64,
    pub state: MaterializedState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(seq: u64, state: MaterializedState, created_at: DateTime<Utc>) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at }
    }

    /// Write the snapshot atomically: write to a `.tmp` sibling, rotate the
    /// previous file into a zstd-compressed `.bak` chain, then rename into
    /// place.
    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("tmp");
        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        if path.exists() {
            let bak = rotate_bak_path(path);
            compress_to_bak(path, &bak)?;
            fs::remove_file(path)?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path)?;
        Self::from_json_bytes(&bytes)
    }

    /// Read a rotated backup, which is stored zstd-compressed.
    fn read_bak(path: &Path) -> Result<Self, SnapshotError> {
        let compressed = fs::read(path)?;
        let bytes = zstd::stream::decode_all(compressed.as_slice())?;
        Self::from_json_bytes(&bytes)
    }

    fn from_json_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snap: Snapshot = serde_json::from_slice(bytes)?;
        if snap.version > CURRENT_SNAPSHOT_VERSION {
            return Err(SnapshotError::TooNew(snap.version));
        }
        Ok(snap)
    }

    /// Load the newest snapshot that parses cleanly, trying the primary
    /// file and then each rotated (compressed) backup in order.
    pub fn load_newest(path: &Path) -> Option<Self> {
        if let Ok(snap) = Self::read(path) {
            return Some(snap);
        }
        for n in 1..=MAX_BAK_FILES {
            let bak = if n == 1 { path.with_extension("bak") } else { path.with_extension(format!("bak.{n}")) };
            if let Ok(snap) = Self::read_bak(&bak) {
                return Some(snap);
            }
        }
        None
    }
}

/// Compress `src`'s bytes into `dst` at zstd's default level.
fn compress_to_bak(src: &Path, dst: &Path) -> Result<(), SnapshotError> {
    let input = File::open(src)?;
    let output = File::create(dst)?;
    zstd::stream::copy_encode(input, output, 0)?;
    Ok(())
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`. The
/// oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
