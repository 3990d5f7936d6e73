// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-file-backed [`MemoryAdapter`]. `recall` scores long-term facts by
//! keyword overlap against the query rather than vector similarity — the
//! retrieval pack has no embedding/vector-DB crate to ground a real ANN
//! search on, so this is a documented simplification, not an oversight.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tg_core::{NodeId, PlanId};
use tokio::sync::Mutex;

use super::{Breadcrumb, MemoryAdapter, MemoryError, Recollection};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LongTermFact {
    key: String,
    value: String,
    category: String,
    ts_ms: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Store {
    short: Vec<Breadcrumb>,
    long: Vec<LongTermFact>,
}

#[derive(Clone)]
pub struct JsonFileMemoryAdapter {
    path: PathBuf,
    lock: std::sync::Arc<Mutex<()>>,
}

impl JsonFileMemoryAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: std::sync::Arc::new(Mutex::new(())) }
    }

    async fn load(&self) -> Result<Store, MemoryError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Store::default()),
            Err(e) => Err(MemoryError::Io(e)),
        }
    }

    async fn save(&self, store: &Store) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(store)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    fn now_ms() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }

    fn overlap_score(query: &str, haystack: &str) -> f64 {
        let q: HashSet<&str> = query.split_whitespace().collect();
        if q.is_empty() {
            return 0.0;
        }
        let h: HashSet<&str> = haystack.split_whitespace().collect();
        let hits = q.iter().filter(|w| h.contains(*w)).count();
        hits as f64 / q.len() as f64
    }
}

#[async_trait]
impl MemoryAdapter for JsonFileMemoryAdapter {
    async fn add_step(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        task: &str,
        tool: &str,
        output: &str,
    ) -> Result<(), MemoryError> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        let truncated: String = output.chars().take(500).collect();
        store.short.retain(|b| !(b.plan_id == plan_id && b.node_id == node_id));
        store.short.push(Breadcrumb {
            plan_id,
            node_id,
            task: task.to_string(),
            tool: tool.to_string(),
            output: truncated,
            ts_ms: Self::now_ms(),
        });
        self.save(&store).await
    }

    async fn session_breadcrumbs(&self, plan_id: PlanId) -> Result<Vec<Breadcrumb>, MemoryError> {
        let _guard = self.lock.lock().await;
        let mut items: Vec<Breadcrumb> =
            self.load().await?.short.into_iter().filter(|b| b.plan_id == plan_id).collect();
        items.sort_by_key(|b| b.node_id);
        Ok(items)
    }

    async fn wipe_session(&self, plan_id: PlanId) -> Result<usize, MemoryError> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        let before = store.short.len();
        store.short.retain(|b| b.plan_id != plan_id);
        let removed = before - store.short.len();
        self.save(&store).await?;
        Ok(removed)
    }

    async fn remember(&self, key: &str, value: &str, category: &str) -> Result<(), MemoryError> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        store.long.retain(|f| f.key != key);
        store.long.push(LongTermFact {
            key: key.to_string(),
            value: value.to_string(),
            category: category.to_string(),
            ts_ms: Self::now_ms(),
        });
        self.save(&store).await
    }

    async fn recall(&self, query: &str, n_results: usize) -> Result<Vec<Recollection>, MemoryError> {
        let store = self.load().await?;
        let query_lower = query.to_lowercase();
        let mut scored: Vec<Recollection> = store
            .long
            .iter()
            .map(|f| {
                let haystack = format!("{} {}", f.key, f.value).to_lowercase();
                Recollection {
                    key: f.key.clone(),
                    value: f.value.clone(),
                    category: f.category.clone(),
                    score: Self::overlap_score(&query_lower, &haystack),
                }
            })
            .filter(|r| r.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n_results);
        Ok(scored)
    }

    async fn wipe_all(&self) -> Result<(), MemoryError> {
        let _guard = self.lock.lock().await;
        self.save(&Store::default()).await
    }

    async fn stats(&self) -> Result<(usize, usize), MemoryError> {
        let store = self.load().await?;
        Ok((store.short.len(), store.long.len()))
    }
}

#[cfg(test)]
#[path = "json_file_tests.rs"]
mod tests;
