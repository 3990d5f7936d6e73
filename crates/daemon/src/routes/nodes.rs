// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node HITL approval and time-travel rewind —
//! `POST /api/plans/{id}/nodes/{node_id}/{approve,rewind}`.

use axum::extract::{Path, State};
use axum::Json;
use tg_core::{NodeId, NodeStatus, Plan, PlanId, Tool};
use tg_storage::NodeFields;
use tg_wire::{NodeApprovalRequest, RewindRequest, RewindResponse};

use crate::error::AppError;
use crate::state::AppState;

pub async fn approve_node(
    State(state): State<AppState>,
    Path((plan_id, node_id)): Path<(PlanId, u32)>,
    Json(body): Json<NodeApprovalRequest>,
) -> Result<Json<Plan>, AppError> {
    let node_id = NodeId::new(node_id);
    let status = if body.approved { NodeStatus::Approved } else { NodeStatus::Skipped };
    state.store.upsert_node(plan_id, node_id, NodeFields { status: Some(status), args: body.edited_args, ..Default::default() })?;
    let plan = state.store.get_plan(&plan_id).ok_or_else(|| AppError::NotFound(format!("plan {plan_id} not found")))?;
    Ok(Json(plan))
}

/// Forks the plan at `node_id`; the new branch is created in `Draft` and
/// left for the caller to separately call `approve` on — the operator
/// decides whether to start execution, per this orchestrator's design
/// (the branch is not auto-driven the way a node's own approval is).
pub async fn rewind_node(
    State(state): State<AppState>,
    Path((plan_id, node_id)): Path<(PlanId, u32)>,
    Json(body): Json<RewindRequest>,
) -> Result<Json<RewindResponse>, AppError> {
    let node_id = NodeId::new(node_id);
    let new_tool = body.new_tool.as_deref().map(Tool::from);
    let outcome =
        tg_engine::rewind(&state.store, &state.clock, plan_id, node_id, body.new_args, new_tool)?;
    Ok(Json(RewindResponse { plan: outcome.branch, idempotency_warnings: outcome.warnings }))
}

#[cfg(test)]
#[path = "nodes_tests.rs"]
mod tests;
