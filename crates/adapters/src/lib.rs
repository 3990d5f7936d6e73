// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tg-adapters: the external-world seams the DAG Engine drives through —
//! sandbox containers (C3), the planner LLM (C7), the memory collaborator
//! (C9), and the remote-tool gateway client (C10). Each seam is a trait so
//! `tg-engine` can be exercised against a fake in tests; this crate supplies
//! both the real, network/process-touching implementation and (behind
//! `test-support`) the fake.

pub mod gateway;
pub mod memory;
pub mod planner;
pub mod sandbox;

pub use gateway::{GatewayAdapter, GatewayError, McpGatewayAdapter, McpServerConfig, McpTool};
pub use memory::{Breadcrumb, JsonFileMemoryAdapter, MemoryAdapter, MemoryError, Recollection};
pub use planner::{HostedPlannerAdapter, LocalPlannerAdapter, PlanRequest, PlannerAdapter, PlannerError};
pub use sandbox::{DockerSandboxAdapter, ExecutionResult, SandboxAdapter, SandboxConfig, SandboxError};

#[cfg(any(test, feature = "test-support"))]
pub use gateway::FakeGatewayAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use memory::FakeMemoryAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use planner::FakePlannerAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use sandbox::FakeSandboxAdapter;
