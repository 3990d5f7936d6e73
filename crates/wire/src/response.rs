// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response envelopes for routes whose shape doesn't already exist in
//! `tg-core`. `Plan`/`Dag`/`Node` serialize directly and have no wrapper
//! here — see `crates/core/src/dag.rs`.

use serde::{Deserialize, Serialize};
use tg_core::{Plan, PlanId};

/// `POST /plans/{id}/kill` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillResponse {
    pub status: &'static str,
    pub plan_id: PlanId,
}

impl KillResponse {
    pub fn new(plan_id: PlanId) -> Self {
        Self { status: "killed", plan_id }
    }
}

/// `POST /plans/{id}/nodes/{node_id}/rewind` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewindResponse {
    pub plan: Plan,
    pub idempotency_warnings: Vec<String>,
}

/// One entry of `GET /plans/{id}/logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub node_id: Option<u32>,
    pub level: String,
    pub message: String,
    pub at_ms: u64,
}

/// `GET /plans/{id}/memory/session` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMemoryResponse {
    pub plan_id: PlanId,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub stats: MemoryStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub node_id: u32,
    pub task: String,
    pub tool: String,
    pub output: String,
    pub ts_ms: u64,
}

/// `DELETE /plans/{id}/memory/session` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipeSessionResponse {
    pub plan_id: PlanId,
    pub wiped: usize,
}

/// `GET /memory/long-term` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallResponse {
    pub query: String,
    pub results: Vec<Recollection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recollection {
    pub key: String,
    pub value: String,
    pub category: String,
    pub score: f64,
}

/// `GET /memory/stats` response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemoryStats {
    pub short_term: usize,
    pub long_term: usize,
}

/// `GET /mcp/servers/{name}/tools` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolSummary {
    pub name: String,
    pub description: String,
}

/// Uniform error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
