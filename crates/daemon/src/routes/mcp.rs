// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote-Tool Gateway admin routes — `POST/GET /api/mcp/servers`,
//! `GET /api/mcp/servers/{name}/tools`. Grounded on
//! `examples/original_source/AMSAB/backend/api/routes/mcp.py`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use tg_adapters::{GatewayAdapter, McpServerConfig};
use tg_wire::{McpToolSummary, RegisterServerRequest};

use crate::error::AppError;
use crate::state::AppState;

pub async fn register_server(
    State(state): State<AppState>,
    Json(body): Json<RegisterServerRequest>,
) -> (StatusCode, Json<Value>) {
    let name = body.name.clone();
    state.gateway.register_server(McpServerConfig {
        name: body.name,
        base_url: body.base_url,
        api_key: body.api_key,
        timeout_secs: body.timeout_secs.unwrap_or(30),
    });
    (StatusCode::CREATED, Json(serde_json::json!({ "status": "registered", "name": name })))
}

pub async fn list_servers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.gateway.list_servers())
}

pub async fn list_tools(
    State(state): State<AppState>,
    Path(server_name): Path<String>,
) -> Result<Json<Vec<McpToolSummary>>, AppError> {
    let tools: Vec<McpToolSummary> = state
        .gateway
        .list_tools(&server_name)
        .await?
        .into_iter()
        .map(|t| McpToolSummary { name: t.name, description: t.description })
        .collect();
    Ok(Json(tools))
}

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod tests;
