// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /ws/plans/{plan_id}` — live plan event stream. Bare route, outside
//! the `/api` prefix and its auth gate, mirroring
//! `examples/original_source/AMSAB/backend/api/routes/ws.py`: on connect the
//! last 50 log lines are replayed as `log_line` frames, then every further
//! [`tg_engine::BusMessage`] is forwarded as it's published. The client may
//! send a `"ping"` text frame and gets `"pong"` back; anything else read
//! from the socket is ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde_json::json;
use tg_core::PlanId;
use tracing::debug;

use crate::state::AppState;

pub async fn plan_ws(
    State(state): State<AppState>,
    Path(plan_id): Path<PlanId>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, plan_id))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, plan_id: PlanId) {
    let (backlog, mut rx) = state.bus.subscribe(plan_id);

    for entry in backlog {
        let frame = json!({ "event": "log_line", "plan_id": plan_id, "data": entry });
        if socket.send(Message::Text(frame.to_string())).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = rx.recv() => {
                let frame = match msg {
                    Ok(tg_engine::BusMessage::Event(event)) => {
                        json!({ "event": event.name(), "plan_id": plan_id, "data": event })
                    }
                    Ok(tg_engine::BusMessage::Log(entry)) => {
                        json!({ "event": "log_line", "plan_id": plan_id, "data": entry })
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(plan = %plan_id, skipped, "ws subscriber lagged, dropping frames");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                if socket.send(Message::Text(frame.to_string())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) if text == "ping" => {
                        if socket.send(Message::Text("pong".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => break,
                }
            }
        }
    }

    debug!(plan = %plan_id, "websocket disconnected");
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
