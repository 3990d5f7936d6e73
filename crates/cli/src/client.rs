// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin `reqwest` wrapper over the daemon's HTTP surface (C8). One method
//! per route, mirroring the donor's own `DaemonClient` query/command
//! methods — except this orchestrator's daemon speaks HTTP+JSON rather
//! than a Unix-socket framed protocol, so `send`/`send_simple` become a
//! single `request` helper around `reqwest::RequestBuilder`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use tg_core::{Plan, PlanId};
use tg_wire::{
    ErrorResponse, KillResponse, LogLine, McpToolSummary, MemoryStats, NodeApprovalRequest,
    RecallResponse, RegisterServerRequest, RememberRequest, RewindRequest, RewindResponse,
    SessionMemoryResponse, SubmitGoalRequest, WipeSessionResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach daemon at {url}: {source}")]
    Connect { url: String, #[source] source: reqwest::Error },
    #[error("request to {url} failed: {source}")]
    Request { url: String, #[source] source: reqwest::Error },
    #[error("daemon returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Daemon base URL + optional bearer token, resolved from CLI flags/env by
/// `main.rs` and passed down to every command handler.
#[derive(Clone)]
pub struct DaemonClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { base_url: base_url.into(), token, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let mut req = self.http.request(method, &url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(|source| {
            if source.is_connect() {
                ClientError::Connect { url: url.clone(), source }
            } else {
                ClientError::Request { url: url.clone(), source }
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(ClientError::Api { status, message });
        }
        resp.json::<T>().await.map_err(|source| ClientError::Request { url, source })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<(), T>(Method::POST, path, None).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<(), T>(Method::DELETE, path, None).await
    }

    pub async fn submit_goal(
        &self,
        goal: String,
        allowed_tools: Vec<String>,
        permissions: HashMap<String, bool>,
    ) -> Result<Plan, ClientError> {
        self.post("/api/goals", &SubmitGoalRequest { goal, allowed_tools, permissions }).await
    }

    pub async fn list_plans(&self) -> Result<Vec<Plan>, ClientError> {
        self.get("/api/plans").await
    }

    pub async fn get_plan(&self, plan_id: &PlanId) -> Result<Plan, ClientError> {
        self.get(&format!("/api/plans/{plan_id}")).await
    }

    pub async fn approve_plan(&self, plan_id: &PlanId) -> Result<Plan, ClientError> {
        self.post_empty(&format!("/api/plans/{plan_id}/approve")).await
    }

    pub async fn kill_plan(&self, plan_id: &PlanId) -> Result<KillResponse, ClientError> {
        self.post_empty(&format!("/api/plans/{plan_id}/kill")).await
    }

    pub async fn get_logs(&self, plan_id: &PlanId) -> Result<Vec<LogLine>, ClientError> {
        self.get(&format!("/api/plans/{plan_id}/logs")).await
    }

    pub async fn approve_node(
        &self,
        plan_id: &PlanId,
        node_id: u32,
        approved: bool,
        edited_args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<Plan, ClientError> {
        let body = NodeApprovalRequest { approved, edited_args };
        self.post(&format!("/api/plans/{plan_id}/nodes/{node_id}/approve"), &body).await
    }

    pub async fn rewind_node(
        &self,
        plan_id: &PlanId,
        node_id: u32,
        new_args: Option<serde_json::Map<String, serde_json::Value>>,
        new_tool: Option<String>,
    ) -> Result<RewindResponse, ClientError> {
        let body = RewindRequest { new_args, new_tool };
        self.post(&format!("/api/plans/{plan_id}/nodes/{node_id}/rewind"), &body).await
    }

    pub async fn session_memory(&self, plan_id: &PlanId) -> Result<SessionMemoryResponse, ClientError> {
        self.get(&format!("/api/plans/{plan_id}/memory/session")).await
    }

    pub async fn wipe_session_memory(&self, plan_id: &PlanId) -> Result<WipeSessionResponse, ClientError> {
        self.delete(&format!("/api/plans/{plan_id}/memory/session")).await
    }

    pub async fn remember(&self, key: String, value: String, category: String) -> Result<(), ClientError> {
        self.post::<_, serde_json::Value>("/api/memory/long-term", &RememberRequest { key, value, category })
            .await?;
        Ok(())
    }

    pub async fn recall(&self, query: &str, n: usize) -> Result<RecallResponse, ClientError> {
        self.get(&format!("/api/memory/long-term?query={}&n={n}", urlencode(query))).await
    }

    pub async fn wipe_all_memory(&self) -> Result<(), ClientError> {
        self.delete::<serde_json::Value>("/api/memory/all").await?;
        Ok(())
    }

    pub async fn memory_stats(&self) -> Result<MemoryStats, ClientError> {
        self.get("/api/memory/stats").await
    }

    pub async fn register_mcp_server(
        &self,
        name: String,
        base_url: String,
        api_key: String,
        timeout_secs: Option<u64>,
    ) -> Result<(), ClientError> {
        let body = RegisterServerRequest { name, base_url, api_key, timeout_secs };
        self.post::<_, serde_json::Value>("/api/mcp/servers", &body).await?;
        Ok(())
    }

    pub async fn list_mcp_servers(&self) -> Result<Vec<String>, ClientError> {
        self.get("/api/mcp/servers").await
    }

    pub async fn list_mcp_tools(&self, server_name: &str) -> Result<Vec<McpToolSummary>, ClientError> {
        self.get(&format!("/api/mcp/servers/{server_name}/tools")).await
    }
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
