// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /health` (liveness, always 200) and `GET /ready` (readiness, probes
//! the store), split the way `mofa-gateway`'s `handlers/health.rs` does it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let plan_count = state.store.list_plans().len();
    (StatusCode::OK, Json(json!({ "status": "ready", "plans": plan_count })))
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
