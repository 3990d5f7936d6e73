// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tg-wire: request/response bodies for the daemon's HTTP + WebSocket
//! surface (C8) and the gateway/memory ambient endpoints (C9/C10).
//!
//! Kept deliberately thin — a transport seam, not a second copy of the
//! domain model. Anything already shaped correctly by `tg-core` (`Plan`,
//! `Dag`, `Node`) is serialized as-is rather than re-wrapped; this crate
//! only adds the handful of request bodies and response envelopes that
//! have no natural home in the core data model.

pub mod request;
pub mod response;

pub use request::{
    NodeApprovalRequest, RecallQuery, RegisterServerRequest, RememberRequest, RewindRequest,
    SubmitGoalRequest,
};
pub use response::{
    ErrorResponse, KillResponse, LogLine, McpToolSummary, MemoryStats, RecallResponse,
    Recollection, RewindResponse, SessionMemoryResponse, WipeSessionResponse,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
