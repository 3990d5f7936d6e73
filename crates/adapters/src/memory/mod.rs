// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory Collaborator (C9): short-term session breadcrumbs plus long-term
//! recall. The retrieval pack carries no vector-DB crate, so
//! [`JsonFileMemoryAdapter`] degrades the original's vector similarity
//! search to keyword overlap scoring over a JSON-file-backed store — see
//! DESIGN.md for the deliberate deviation.

mod json_file;

pub use json_file::JsonFileMemoryAdapter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tg_core::{NodeId, PlanId};

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One completed-node breadcrumb.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub plan_id: PlanId,
    pub node_id: NodeId,
    pub task: String,
    pub tool: String,
    pub output: String,
    pub ts_ms: u64,
}

/// One recalled long-term fact, with a relevance score (higher is better).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recollection {
    pub key: String,
    pub value: String,
    pub category: String,
    pub score: f64,
}

/// Session breadcrumbs plus cross-session recall. Writes are fire-and-forget
/// from the engine's perspective — a memory outage must never fail a plan.
#[async_trait]
pub trait MemoryAdapter: Clone + Send + Sync + 'static {
    async fn add_step(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        task: &str,
        tool: &str,
        output: &str,
    ) -> Result<(), MemoryError>;

    async fn session_breadcrumbs(&self, plan_id: PlanId) -> Result<Vec<Breadcrumb>, MemoryError>;

    async fn wipe_session(&self, plan_id: PlanId) -> Result<usize, MemoryError>;

    async fn remember(&self, key: &str, value: &str, category: &str) -> Result<(), MemoryError>;

    async fn recall(&self, query: &str, n_results: usize) -> Result<Vec<Recollection>, MemoryError>;

    async fn wipe_all(&self) -> Result<(), MemoryError>;

    async fn stats(&self) -> Result<(usize, usize), MemoryError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct State {
        short: Vec<Breadcrumb>,
        long: Vec<(String, String, String)>,
    }

    /// In-memory fake for engine tests: no filesystem, records every call.
    #[derive(Clone, Default)]
    pub struct FakeMemoryAdapter {
        inner: Arc<Mutex<State>>,
    }

    impl FakeMemoryAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
            self.inner.lock().short.clone()
        }
    }

    #[async_trait]
    impl MemoryAdapter for FakeMemoryAdapter {
        async fn add_step(
            &self,
            plan_id: PlanId,
            node_id: NodeId,
            task: &str,
            tool: &str,
            output: &str,
        ) -> Result<(), MemoryError> {
            self.inner.lock().short.push(Breadcrumb {
                plan_id,
                node_id,
                task: task.to_string(),
                tool: tool.to_string(),
                output: output.chars().take(500).collect(),
                ts_ms: 0,
            });
            Ok(())
        }

        async fn session_breadcrumbs(&self, plan_id: PlanId) -> Result<Vec<Breadcrumb>, MemoryError> {
            Ok(self.inner.lock().short.iter().filter(|b| b.plan_id == plan_id).cloned().collect())
        }

        async fn wipe_session(&self, plan_id: PlanId) -> Result<usize, MemoryError> {
            let mut inner = self.inner.lock();
            let before = inner.short.len();
            inner.short.retain(|b| b.plan_id != plan_id);
            Ok(before - inner.short.len())
        }

        async fn remember(&self, key: &str, value: &str, category: &str) -> Result<(), MemoryError> {
            self.inner.lock().long.push((key.to_string(), value.to_string(), category.to_string()));
            Ok(())
        }

        async fn recall(&self, query: &str, n_results: usize) -> Result<Vec<Recollection>, MemoryError> {
            let inner = self.inner.lock();
            Ok(inner
                .long
                .iter()
                .filter(|(k, v, _)| k.contains(query) || v.contains(query))
                .take(n_results)
                .map(|(k, v, c)| Recollection {
                    key: k.clone(),
                    value: v.clone(),
                    category: c.clone(),
                    score: 1.0,
                })
                .collect())
        }

        async fn wipe_all(&self) -> Result<(), MemoryError> {
            let mut inner = self.inner.lock();
            inner.short.clear();
            inner.long.clear();
            Ok(())
        }

        async fn stats(&self) -> Result<(usize, usize), MemoryError> {
            let inner = self.inner.lock();
            Ok((inner.short.len(), inner.long.len()))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeMemoryAdapter;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
