// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/WS surface (C8): route assembly, grounded on the exact REST shapes
//! in `examples/original_source/AMSAB/backend/api/routes/{goals,ws,mcp}.py`
//! and on `mofa-gateway`'s own router-building/middleware convention
//! (CORS + tracing layers, a health/ready split, a bearer-token filter that
//! is a no-op when no token is configured).

mod auth;
mod goals;
mod health;
mod mcp;
mod memory;
mod nodes;
mod ws;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/goals", post(goals::submit_goal))
        .route("/plans", get(goals::list_plans))
        .route("/plans/:plan_id", get(goals::get_plan))
        .route("/plans/:plan_id/approve", post(goals::approve_plan))
        .route("/plans/:plan_id/kill", post(goals::kill_plan))
        .route("/plans/:plan_id/logs", get(goals::get_logs))
        .route("/plans/:plan_id/nodes/:node_id/approve", post(nodes::approve_node))
        .route("/plans/:plan_id/nodes/:node_id/rewind", post(nodes::rewind_node))
        .route("/plans/:plan_id/memory/session", get(memory::get_session_memory))
        .route("/plans/:plan_id/memory/session", delete(memory::wipe_session_memory))
        .route("/memory/long-term", post(memory::remember))
        .route("/memory/long-term", get(memory::recall))
        .route("/memory/all", delete(memory::wipe_all_memory))
        .route("/memory/stats", get(memory::memory_stats))
        .route("/mcp/servers", post(mcp::register_server))
        .route("/mcp/servers", get(mcp::list_servers))
        .route("/mcp/servers/:server_name/tools", get(mcp::list_tools))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest("/api", api)
        .route("/ws/plans/:plan_id", get(ws::plan_ws))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
