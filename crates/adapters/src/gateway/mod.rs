// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote-Tool Gateway Client (C10): bridges `Tool::Remote` nodes to any
//! MCP-compliant tool server over JSON-RPC 2.0. Registered servers are
//! looked up by name; an unregistered server name is a hard error rather
//! than a silent no-op.

mod mcp;

pub use mcp::McpGatewayAdapter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown MCP server: {0}")]
    UnknownServer(String),
    #[error("MCP error: {0}")]
    Remote(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Static connection details for one registered MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// One tool a server advertises via `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: serde_json::Value,
}

#[async_trait]
pub trait GatewayAdapter: Clone + Send + Sync + 'static {
    async fn list_tools(&self, server: &str) -> Result<Vec<McpTool>, GatewayError>;

    async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, GatewayError>;

    fn list_servers(&self) -> Vec<String>;

    /// Register (or replace) a server at runtime. In-memory only — not
    /// persisted across restarts, since remote tool servers are operational
    /// configuration, not plan state.
    fn register_server(&self, config: McpServerConfig);
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct State {
        servers: HashMap<String, Vec<McpTool>>,
        responses: HashMap<(String, String), Result<String, String>>,
        calls: Vec<(String, String, serde_json::Map<String, serde_json::Value>)>,
    }

    /// In-memory fake gateway for engine tests: servers and their canned
    /// responses are registered up front, no network calls are made.
    #[derive(Clone)]
    pub struct FakeGatewayAdapter {
        inner: Arc<Mutex<State>>,
    }

    impl Default for FakeGatewayAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(State {
                    servers: HashMap::new(),
                    responses: HashMap::new(),
                    calls: Vec::new(),
                })),
            }
        }
    }

    impl FakeGatewayAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn register_server(&self, name: impl Into<String>, tools: Vec<McpTool>) {
            self.inner.lock().servers.insert(name.into(), tools);
        }

        pub fn script_response(
            &self,
            server: impl Into<String>,
            tool: impl Into<String>,
            response: Result<String, String>,
        ) {
            self.inner.lock().responses.insert((server.into(), tool.into()), response);
        }

        pub fn calls(&self) -> Vec<(String, String, serde_json::Map<String, serde_json::Value>)> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl GatewayAdapter for FakeGatewayAdapter {
        async fn list_tools(&self, server: &str) -> Result<Vec<McpTool>, GatewayError> {
            self.inner
                .lock()
                .servers
                .get(server)
                .cloned()
                .ok_or_else(|| GatewayError::UnknownServer(server.to_string()))
        }

        async fn call_tool(
            &self,
            server: &str,
            tool: &str,
            arguments: &serde_json::Map<String, serde_json::Value>,
        ) -> Result<String, GatewayError> {
            let mut inner = self.inner.lock();
            if !inner.servers.contains_key(server) {
                return Err(GatewayError::UnknownServer(server.to_string()));
            }
            inner.calls.push((server.to_string(), tool.to_string(), arguments.clone()));
            match inner.responses.get(&(server.to_string(), tool.to_string())) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(e)) => Err(GatewayError::Remote(e.clone())),
                None => Ok(String::new()),
            }
        }

        fn list_servers(&self) -> Vec<String> {
            self.inner.lock().servers.keys().cloned().collect()
        }

        fn register_server(&self, config: McpServerConfig) {
            self.inner.lock().servers.entry(config.name).or_default();
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeGatewayAdapter;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
