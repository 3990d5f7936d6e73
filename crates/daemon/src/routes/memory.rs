// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory Collaborator routes (C9) — session breadcrumbs plus long-term
//! recall, grounded on the Memory Vault section of
//! `examples/original_source/AMSAB/backend/api/routes/goals.py`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;
use tg_adapters::MemoryAdapter;
use tg_core::PlanId;
use tg_wire::{Breadcrumb, MemoryStats, RecallQuery, RecallResponse, Recollection, RememberRequest, SessionMemoryResponse, WipeSessionResponse};

use crate::error::AppError;
use crate::state::AppState;

pub async fn get_session_memory(
    State(state): State<AppState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<SessionMemoryResponse>, AppError> {
    let breadcrumbs = state
        .memory
        .session_breadcrumbs(plan_id)
        .await?
        .into_iter()
        .map(|b| Breadcrumb { node_id: b.node_id.0, task: b.task, tool: b.tool, output: b.output, ts_ms: b.ts_ms })
        .collect();
    let (short_term, long_term) = state.memory.stats().await?;
    Ok(Json(SessionMemoryResponse { plan_id, breadcrumbs, stats: MemoryStats { short_term, long_term } }))
}

pub async fn wipe_session_memory(
    State(state): State<AppState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<WipeSessionResponse>, AppError> {
    let wiped = state.memory.wipe_session(plan_id).await?;
    Ok(Json(WipeSessionResponse { plan_id, wiped }))
}

pub async fn remember(
    State(state): State<AppState>,
    Json(body): Json<RememberRequest>,
) -> Result<Json<Value>, AppError> {
    state.memory.remember(&body.key, &body.value, &body.category).await?;
    Ok(Json(serde_json::json!({ "status": "stored", "key": body.key })))
}

pub async fn recall(
    State(state): State<AppState>,
    Query(params): Query<RecallQuery>,
) -> Result<Json<RecallResponse>, AppError> {
    let results = state
        .memory
        .recall(&params.query, params.n)
        .await?
        .into_iter()
        .map(|r| Recollection { key: r.key, value: r.value, category: r.category, score: r.score })
        .collect();
    Ok(Json(RecallResponse { query: params.query, results }))
}

pub async fn wipe_all_memory(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.memory.wipe_all().await?;
    Ok(Json(serde_json::json!({ "status": "all_memory_wiped" })))
}

pub async fn memory_stats(State(state): State<AppState>) -> Result<Json<MemoryStats>, AppError> {
    let (short_term, long_term) = state.memory.stats().await?;
    Ok(Json(MemoryStats { short_term, long_term }))
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
