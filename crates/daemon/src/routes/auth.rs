// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token gate for the `/api` surface, mirroring the donor's own
//! `ListenCtx.auth_token`: when unset, every request passes through
//! unauthenticated (development only); when set, a missing or mismatched
//! `Authorization: Bearer <token>` header is rejected.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::state::AppState;
use tg_wire::ErrorResponse;

pub async fn require_bearer_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.auth_token.as_deref() else {
        return next.run(request).await;
    };

    let supplied = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match supplied {
        Some(token) if token == expected => next.run(request).await,
        _ => {
            (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("missing or invalid bearer token")))
                .into_response()
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
