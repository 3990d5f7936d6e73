// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Bus (C2): per-plan broadcast of lifecycle events and log lines to
//! any number of live WebSocket subscribers, with late-subscriber replay of
//! the last 50 log lines read straight from the store so a client that
//! connects mid-run sees recent history instead of a blank screen.
//!
//! One `tokio::sync::broadcast` channel per plan, created lazily and kept
//! alive for the bus's own lifetime — a plan that finishes still accepts
//! subscribers (an operator reconnecting to read the tail of a completed
//! run), so channels are never torn down explicitly.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tg_core::{Event, PlanId};
use tg_storage::{LogEntry, Store};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;
const LOG_REPLAY_LINES: usize = 50;

/// One message forwarded to live subscribers of a plan's stream.
#[derive(Debug, Clone)]
pub enum BusMessage {
    Event(Event),
    Log(LogEntry),
}

#[derive(Clone)]
pub struct EventBus {
    store: Store,
    channels: Arc<Mutex<HashMap<PlanId, broadcast::Sender<BusMessage>>>>,
}

impl EventBus {
    pub fn new(store: Store) -> Self {
        Self { store, channels: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn channel(&self, plan_id: PlanId) -> broadcast::Sender<BusMessage> {
        self.channels
            .lock()
            .entry(plan_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Broadcast a lifecycle event to a plan's live subscribers. A send with
    /// no subscribers is not an error — the bus doesn't require anyone to
    /// be listening.
    pub fn publish_event(&self, event: Event) {
        if let Some(plan_id) = event.plan_id() {
            let _ = self.channel(*plan_id).send(BusMessage::Event(event));
        }
    }

    pub fn publish_log(&self, entry: LogEntry) {
        let _ = self.channel(entry.plan_id).send(BusMessage::Log(entry));
    }

    /// Subscribe to a plan's stream. Returns the last 50 log lines (oldest
    /// first, read from the store) to replay before forwarding whatever
    /// arrives on the returned receiver.
    pub fn subscribe(&self, plan_id: PlanId) -> (Vec<LogEntry>, broadcast::Receiver<BusMessage>) {
        let backlog = self.store.get_logs(&plan_id, LOG_REPLAY_LINES);
        (backlog, self.channel(plan_id).subscribe())
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
