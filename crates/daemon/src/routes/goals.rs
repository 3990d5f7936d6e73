// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Goal submission and plan lifecycle routes — `POST /api/goals`,
//! `GET /api/plans[/{id}]`, `POST /api/plans/{id}/{approve,kill}`,
//! `GET /api/plans/{id}/logs`. Grounded on
//! `examples/original_source/AMSAB/backend/api/routes/goals.py`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tg_adapters::PlannerAdapter;
use tg_core::{Plan, PlanId, PlanStatus};
use tg_storage::LogLevel;
use tg_wire::{KillResponse, LogLine, SubmitGoalRequest};

use crate::error::AppError;
use crate::state::AppState;

fn log_level_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

fn fetch_plan(state: &AppState, plan_id: PlanId) -> Result<Plan, AppError> {
    state.store.get_plan(&plan_id).ok_or_else(|| AppError::NotFound(format!("plan {plan_id} not found")))
}

pub async fn submit_goal(
    State(state): State<AppState>,
    Json(body): Json<SubmitGoalRequest>,
) -> Result<(StatusCode, Json<Plan>), AppError> {
    if body.goal.trim().is_empty() {
        return Err(AppError::BadRequest("goal must not be empty".to_string()));
    }
    let allowed_tools =
        if body.allowed_tools.is_empty() { state.default_allowed_tools.clone() } else { body.allowed_tools };

    let mut dag = state
        .planner
        .plan(&tg_adapters::PlanRequest { goal: body.goal.clone(), allowed_tools, permissions: body.permissions })
        .await?;
    tg_engine::sanitize_dag(&mut dag);

    let plan = state.store.create_plan(PlanId::new(), body.goal, dag, None)?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<Plan>> {
    Json(state.store.list_plans())
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<Plan>, AppError> {
    Ok(Json(fetch_plan(&state, plan_id)?))
}

pub async fn approve_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<Plan>, AppError> {
    let plan = fetch_plan(&state, plan_id)?;
    if plan.status != PlanStatus::Draft {
        return Err(AppError::BadRequest(format!("plan is already {}", plan.status)));
    }
    state.store.approve_plan(plan_id)?;

    let executor = state.executor.clone();
    tokio::spawn(async move { executor.drive_plan(plan_id).await });

    Ok(Json(fetch_plan(&state, plan_id)?))
}

pub async fn kill_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<KillResponse>, AppError> {
    state.executor.kill(plan_id).await?;
    Ok(Json(KillResponse::new(plan_id)))
}

pub async fn get_logs(State(state): State<AppState>, Path(plan_id): Path<PlanId>) -> Json<Vec<LogLine>> {
    let logs: Vec<LogLine> = state
        .store
        .get_logs(&plan_id, 500)
        .into_iter()
        .map(|l| LogLine {
            node_id: l.node_id,
            level: log_level_str(l.level).to_string(),
            message: l.message,
            at_ms: l.at_ms,
        })
        .collect();
    Json(logs)
}

#[cfg(test)]
#[path = "goals_tests.rs"]
mod tests;
