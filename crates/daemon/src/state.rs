// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state injected into every axum handler, grounded on
//! `mofa-gateway`'s own `AppState` — one `Clone`-able struct of `Arc`-backed
//! handles, built once in `main.rs` and handed to the router via
//! `.with_state(...)`.

use tg_adapters::{JsonFileMemoryAdapter, McpGatewayAdapter};
use tg_core::SystemClock;
use tg_engine::{EventBus, Executor};
use tg_storage::Store;

use crate::planner_router::PlannerRouter;

pub type AppExecutor =
    Executor<tg_adapters::DockerSandboxAdapter, PlannerRouter, JsonFileMemoryAdapter, McpGatewayAdapter, SystemClock>;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub bus: EventBus,
    pub executor: AppExecutor,
    pub memory: JsonFileMemoryAdapter,
    pub gateway: McpGatewayAdapter,
    pub planner: PlannerRouter,
    pub clock: SystemClock,
    pub default_allowed_tools: Vec<String>,
    pub auth_token: Option<String>,
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
