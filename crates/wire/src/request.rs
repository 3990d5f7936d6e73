// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request bodies accepted by the daemon's HTTP routes.
//!
//! Shapes are grounded on `examples/original_source/AMSAB/backend/models/state.py`
//! (`NodeApprovalRequest`, `RewindRequest`) and the inline Pydantic bodies in
//! `.../backend/api/routes/{goals,mcp}.py`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `POST /goals` body — a natural-language goal plus the tool/permission
/// context the planner needs to avoid proposing disabled tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitGoalRequest {
    pub goal: String,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub permissions: HashMap<String, bool>,
}

/// `POST /plans/{id}/nodes/{node_id}/approve` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeApprovalRequest {
    pub approved: bool,
    #[serde(default)]
    pub edited_args: Option<serde_json::Map<String, serde_json::Value>>,
}

/// `POST /plans/{id}/nodes/{node_id}/rewind` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewindRequest {
    #[serde(default)]
    pub new_args: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub new_tool: Option<String>,
}

/// `POST /mcp/servers` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterServerRequest {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `POST /memory/long-term` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberRequest {
    pub key: String,
    pub value: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

/// `GET /memory/long-term` query string.
#[derive(Debug, Clone, Deserialize)]
pub struct RecallQuery {
    pub query: String,
    #[serde(default = "default_recall_n")]
    pub n: usize,
}

fn default_recall_n() -> usize {
    5
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
