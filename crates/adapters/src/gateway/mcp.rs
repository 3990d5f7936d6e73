// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;

use super::{GatewayAdapter, GatewayError, McpServerConfig, McpTool};

/// Registration is in-memory only — remote tool servers are operational
/// configuration, not plan state, so they do not survive a restart.
#[derive(Clone)]
pub struct McpGatewayAdapter {
    client: reqwest::Client,
    servers: Arc<RwLock<HashMap<String, McpServerConfig>>>,
}

impl McpGatewayAdapter {
    pub fn new(servers: Vec<McpServerConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            servers: Arc::new(RwLock::new(
                servers.into_iter().map(|s| (s.name.clone(), s)).collect(),
            )),
        }
    }

    fn server(&self, name: &str) -> Result<McpServerConfig, GatewayError> {
        self.servers.read().get(name).cloned().ok_or_else(|| GatewayError::UnknownServer(name.to_string()))
    }

    fn request(&self, server: &McpServerConfig, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.timeout(Duration::from_secs(server.timeout_secs));
        if server.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&server.api_key)
        }
    }
}

#[async_trait]
impl GatewayAdapter for McpGatewayAdapter {
    async fn list_tools(&self, server: &str) -> Result<Vec<McpTool>, GatewayError> {
        let server = self.server(server)?;
        let url = format!("{}/tools/list", server.base_url.trim_end_matches('/'));
        let resp = self.request(&server, self.client.get(&url)).send().await?;
        let data: serde_json::Value = resp.error_for_status()?.json().await?;
        let tools = data["tools"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|t| McpTool {
                name: t["name"].as_str().unwrap_or_default().to_string(),
                description: t["description"].as_str().unwrap_or_default().to_string(),
                input_schema: t.get("inputSchema").cloned().unwrap_or(serde_json::Value::Null),
            })
            .collect();
        Ok(tools)
    }

    async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, GatewayError> {
        let server_cfg = self.server(server)?;
        let url = format!("{}/mcp", server_cfg.base_url.trim_end_matches('/'));
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": tool, "arguments": arguments },
        });
        tracing::info!(server, tool, "calling MCP tool");
        let resp = self.request(&server_cfg, self.client.post(&url)).json(&payload).send().await?;
        let data: serde_json::Value = resp.error_for_status()?.json().await?;

        if let Some(error) = data.get("error") {
            return Err(GatewayError::Remote(error.to_string()));
        }

        let result = data.get("result").cloned().unwrap_or(serde_json::Value::Null);
        if let Some(content) = result.get("content").and_then(|c| c.as_array()) {
            let text = content
                .iter()
                .filter(|c| c.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|c| c.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(text);
        }
        Ok(result.to_string())
    }

    fn list_servers(&self) -> Vec<String> {
        self.servers.read().keys().cloned().collect()
    }

    fn register_server(&self, config: McpServerConfig) {
        self.servers.write().insert(config.name.clone(), config);
    }
}
