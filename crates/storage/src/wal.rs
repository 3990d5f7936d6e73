// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only write-ahead log. Each line is one JSON-encoded [`Event`],
//! fsynced before [`Wal::append`] returns so a crash after a successful
//! write never loses an entry.
//!
//! The retrieval pack's own daemon references a `wal.rs`/`migration.rs`
//! pair whose source wasn't present in the pack (see DESIGN.md C1 entry);
//! this module is authored fresh in the same line-delimited-JSON idiom its
//! sibling `snapshot.rs` already established.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tg_core::Event;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt wal entry at seq {0}: {1}")]
    Corrupt(u64, serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

/// Append-only log backing a single [`crate::MaterializedState`].
pub struct Wal {
    path: PathBuf,
    file: File,
    next_seq: u64,
}

impl Wal {
    /// Open (creating if absent) a WAL file, starting sequence numbers
    /// after `start_seq` (the sequence number recorded in the most recent
    /// snapshot, or 0 on a fresh store).
    pub fn open(path: impl AsRef<Path>, start_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).read(true).open(&path)?;
        Ok(Self { path, file, next_seq: start_seq + 1 })
    }

    /// Append one event, fsyncing before returning. Returns the assigned
    /// sequence number.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        let seq = self.next_seq;
        let entry = WalEntry { seq, event: event.clone() };
        let mut line = serde_json::to_string(&entry).map_err(|e| WalError::Corrupt(seq, e))?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.sync_data()?;
        self.next_seq += 1;
        Ok(seq)
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Replay every entry with `seq > after_seq`, in order, skipping
    /// trailing truncated/corrupt lines (the tail of a log torn by a crash
    /// mid-write) rather than failing the whole replay.
    pub fn replay(&mut self, after_seq: u64) -> Result<Vec<WalEntry>, WalError> {
        self.file.seek(SeekFrom::Start(0))?;
        let reader = BufReader::new(&self.file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<WalEntry>(&line) {
                Ok(entry) if entry.seq > after_seq => entries.push(entry),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        self.file.seek(SeekFrom::End(0))?;
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
