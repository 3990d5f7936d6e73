// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared route-test fixture: a real `AppState` over an in-memory store and
//! an unreachable planner endpoint (`127.0.0.1:0`), so handlers that never
//! touch the network exercise the exact production wiring, and handlers
//! that do (goal submission) exercise the documented connection-failure
//! path rather than a stub.

use tg_adapters::sandbox::SandboxConfig;
use tg_adapters::{DockerSandboxAdapter, HostedPlannerAdapter, JsonFileMemoryAdapter, McpGatewayAdapter};
use tg_core::SystemClock;
use tg_engine::{EventBus, Executor};
use tg_storage::Store;

use crate::planner_router::PlannerRouter;
use crate::state::AppState;

pub(crate) fn build_state(tmp: &tempfile::TempDir, auth_token: Option<String>) -> AppState {
    let store = Store::in_memory(tmp.path()).expect("store");
    let bus = EventBus::new(store.clone());
    let sandbox = DockerSandboxAdapter::new(SandboxConfig::default());
    let planner = PlannerRouter::hosted_only(HostedPlannerAdapter::new("http://127.0.0.1:0", "", "test-model"));
    let memory = JsonFileMemoryAdapter::new(tmp.path().join("memory.json"));
    let gateway = McpGatewayAdapter::new(vec![]);
    let clock = SystemClock;

    let executor =
        Executor::new(store.clone(), bus.clone(), sandbox, planner.clone(), memory.clone(), gateway.clone(), clock.clone());

    AppState {
        store,
        bus,
        executor,
        memory,
        gateway,
        planner,
        clock,
        default_allowed_tools: vec!["web_search".to_string(), "filesystem_read".to_string()],
        auth_token,
    }
}
