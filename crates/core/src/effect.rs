// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the driver needs to perform.
//!
//! Keeping dispatch as data (rather than calling adapters directly from the
//! scheduling loop) is what makes the DAG Engine's scheduling logic
//! unit-testable against a fake executor with no real containers, HTTP
//! calls, or clock involved.

use crate::dag::{NodeId, PlanId, Tool};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Emit an event into the event bus / WAL.
    Emit { event: crate::event::Event },

    /// Run a single node inside the sandbox executor.
    RunSandbox {
        plan_id: PlanId,
        node_id: NodeId,
        tool: Tool,
        /// Fully resolved arguments (placeholders already substituted).
        resolved_args: serde_json::Map<String, serde_json::Value>,
        #[serde(with = "duration_serde")]
        timeout: Duration,
    },

    /// Kill every container belonging to a plan (targeted, by name prefix).
    KillPlanContainers { plan_id: PlanId },

    /// Fire-and-forget breadcrumb write to the memory collaborator.
    WriteBreadcrumb {
        plan_id: PlanId,
        node_id: NodeId,
        tool: Tool,
        task: String,
        output: String,
    },

    /// Ask the Planner Adapter for a patch after a node failure.
    RequestPatch { plan_id: PlanId, node_id: NodeId, error: String },

    /// Fire-and-forget fact-count query to the memory collaborator, folded
    /// into the `node:completed` event payload.
    QueryMemoryStats { plan_id: PlanId, node_id: NodeId },

    /// Invoke a remote tool through the JSON-RPC gateway.
    CallRemoteTool { server: String, tool: String, arguments: HashMap<String, serde_json::Value> },
}

impl Effect {
    /// Effect name for log spans (e.g. "run_sandbox", "emit").
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Emit { .. } => "emit",
            Effect::RunSandbox { .. } => "run_sandbox",
            Effect::KillPlanContainers { .. } => "kill_plan_containers",
            Effect::WriteBreadcrumb { .. } => "write_breadcrumb",
            Effect::RequestPatch { .. } => "request_patch",
            Effect::CallRemoteTool { .. } => "call_remote_tool",
            Effect::QueryMemoryStats { .. } => "query_memory_stats",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit { event } => vec![("event", event.log_summary())],
            Effect::RunSandbox { plan_id, node_id, tool, .. } => vec![
                ("plan_id", plan_id.to_string()),
                ("node_id", node_id.to_string()),
                ("tool", tool.name().to_string()),
            ],
            Effect::KillPlanContainers { plan_id } => vec![("plan_id", plan_id.to_string())],
            Effect::WriteBreadcrumb { plan_id, node_id, tool, .. } => vec![
                ("plan_id", plan_id.to_string()),
                ("node_id", node_id.to_string()),
                ("tool", tool.name().to_string()),
            ],
            Effect::RequestPatch { plan_id, node_id, .. } => {
                vec![("plan_id", plan_id.to_string()), ("node_id", node_id.to_string())]
            }
            Effect::CallRemoteTool { server, tool, .. } => {
                vec![("server", server.clone()), ("tool", tool.clone())]
            }
            Effect::QueryMemoryStats { plan_id, node_id } => {
                vec![("plan_id", plan_id.to_string()), ("node_id", node_id.to_string())]
            }
        }
    }

    /// Whether to log both "started" and "completed" for this effect, vs.
    /// just "executed" — keeps high-frequency effects (log line emission)
    /// out of the normal-verbosity path.
    pub fn verbose(&self) -> bool {
        match self {
            Effect::Emit { .. } => false,
            Effect::WriteBreadcrumb { .. } => false,
            Effect::QueryMemoryStats { .. } => false,
            _ => true,
        }
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
