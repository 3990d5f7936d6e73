// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide error type. Each downstream crate keeps its own `thiserror`
//! enum (`StoreError`, `ExecutorError`, `RewindError`, `PlannerError`,
//! `GatewayError`, `MemoryError`); this one only adds the HTTP-boundary
//! variants and maps everything to a status code plus `tg_wire::ErrorResponse`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use tg_adapters::{GatewayError, MemoryError, PlannerError};
use tg_engine::{ExecutorError, RewindError};
use tg_storage::StoreError;
use tg_wire::ErrorResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("engine error: {0}")]
    Executor(#[from] ExecutorError),
    #[error("rewind error: {0}")]
    Rewind(#[from] RewindError),
    #[error("planner error: {0}")]
    Planner(#[from] PlannerError),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::PlanNotFound(_) | StoreError::NodeNotFound(_, _)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Store(StoreError::PlanExists(_)) => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Executor(ExecutorError::PlanNotFound(_) | ExecutorError::NodeNotFound(_, _)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Executor(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Rewind(RewindError::PlanNotFound(_) | RewindError::NodeNotFound(_, _)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Rewind(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Planner(_) => StatusCode::BAD_GATEWAY,
            AppError::Gateway(GatewayError::UnknownServer(_)) => StatusCode::NOT_FOUND,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Memory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
