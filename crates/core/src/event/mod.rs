// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL events for the task-graph orchestrator: the append-only log that
//! [`crate::dag::Plan`]/[`crate::dag::Node`] state is folded from.
//!
//! Serializes with `{"type": "event:name", ...fields}` format, matching the
//! rest of this workspace's persisted-event convention. Unknown type tags
//! deserialize to `Custom` so a WAL written by a newer binary never fails
//! to parse under an older one.

use crate::dag::{Dag, NodeId, NodeStatus, PlanId, PlanStatus};
use crate::decision::DecisionSummary;
use serde::{Deserialize, Serialize};

/// Short/long-term fact counts from the memory collaborator, snapshotted
/// into a [`Event::NodeCompleted`] payload at the moment a node finishes —
/// see `examples/original_source/AMSAB/backend/core/orchestrator.py`'s
/// `mem_stats` (`memory_vault.stats()`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub short_term: usize,
    pub long_term: usize,
}

// Not `Eq`: carries a `Dag`, whose nodes carry `serde_json::Value` args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "plan:created")]
    PlanCreated { plan_id: PlanId, goal: String, dag: Dag, parent: Option<PlanId>, created_at_ms: u64 },

    #[serde(rename = "plan:approved")]
    PlanApproved { plan_id: PlanId },

    #[serde(rename = "plan:status_changed")]
    PlanStatusChanged { plan_id: PlanId, status: PlanStatus },

    #[serde(rename = "plan:dag_replaced")]
    PlanDagReplaced { plan_id: PlanId, dag: Dag },

    /// Every node reached a terminal status and at least one completed.
    #[serde(rename = "plan:completed")]
    PlanCompleted { plan_id: PlanId, token_total: u64 },

    /// Every node reached a terminal status with none completed, or the
    /// kill switch was activated mid-run (`reason: Some("kill_switch")`).
    #[serde(rename = "plan:failed")]
    PlanFailed {
        plan_id: PlanId,
        #[serde(default)]
        reason: Option<String>,
    },

    #[serde(rename = "node:awaiting_approval")]
    NodeAwaitingApproval {
        plan_id: PlanId,
        node_id: NodeId,
        tool: String,
        args: serde_json::Map<String, serde_json::Value>,
        decision_summary: DecisionSummary,
    },

    #[serde(rename = "node:approved")]
    NodeApproved {
        plan_id: PlanId,
        node_id: NodeId,
        #[serde(default)]
        edited_args: Option<serde_json::Map<String, serde_json::Value>>,
    },

    #[serde(rename = "node:skipped")]
    NodeSkipped { plan_id: PlanId, node_id: NodeId },

    #[serde(rename = "node:started")]
    NodeStarted { plan_id: PlanId, node_id: NodeId, task: String, tool: String, started_at_ms: u64 },

    #[serde(rename = "node:log_line")]
    NodeLogLine { plan_id: PlanId, node_id: NodeId, line: String },

    #[serde(rename = "node:completed")]
    NodeCompleted {
        plan_id: PlanId,
        node_id: NodeId,
        result: String,
        /// First 200 characters of `result`, the live-subscriber payload
        /// spec fixes — `result` itself stays full-length for persistence
        /// and downstream context substitution.
        output_preview: String,
        memory_stats: MemoryStats,
        token_usage: u64,
        completed_at_ms: u64,
    },

    #[serde(rename = "node:failed")]
    NodeFailed { plan_id: PlanId, node_id: NodeId, error: String, completed_at_ms: u64 },

    #[serde(rename = "node:status_reset")]
    NodeStatusReset {
        plan_id: PlanId,
        node_id: NodeId,
        #[serde(default)]
        new_status: NodeStatus,
        #[serde(default)]
        new_args: Option<serde_json::Map<String, serde_json::Value>>,
        #[serde(default)]
        new_tool: Option<String>,
    },

    #[serde(rename = "node:appended")]
    NodeAppended { plan_id: PlanId, node: crate::dag::Node },

    /// Catch-all for unknown event types (extensibility).
    #[serde(other, skip_serializing)]
    Custom,
}

impl Event {
    pub fn name(&self) -> &str {
        match self {
            Event::PlanCreated { .. } => "plan:created",
            Event::PlanApproved { .. } => "plan:approved",
            Event::PlanStatusChanged { .. } => "plan:status_changed",
            Event::PlanDagReplaced { .. } => "plan:dag_replaced",
            Event::PlanCompleted { .. } => "plan:completed",
            Event::PlanFailed { .. } => "plan:failed",
            Event::NodeAwaitingApproval { .. } => "node:awaiting_approval",
            Event::NodeApproved { .. } => "node:approved",
            Event::NodeSkipped { .. } => "node:skipped",
            Event::NodeStarted { .. } => "node:started",
            Event::NodeLogLine { .. } => "node:log_line",
            Event::NodeCompleted { .. } => "node:completed",
            Event::NodeFailed { .. } => "node:failed",
            Event::NodeStatusReset { .. } => "node:status_reset",
            Event::NodeAppended { .. } => "node:appended",
            Event::Custom => "custom",
        }
    }

    /// Single-line, human-readable summary for structured log fields.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Event::PlanCreated { plan_id, .. } => format!("{t} plan={plan_id}"),
            Event::PlanApproved { plan_id } => format!("{t} plan={plan_id}"),
            Event::PlanStatusChanged { plan_id, status } => {
                format!("{t} plan={plan_id} status={status}")
            }
            Event::PlanDagReplaced { plan_id, .. } => format!("{t} plan={plan_id}"),
            Event::PlanCompleted { plan_id, token_total } => {
                format!("{t} plan={plan_id} token_total={token_total}")
            }
            Event::PlanFailed { plan_id, reason } => {
                format!("{t} plan={plan_id} reason={}", reason.as_deref().unwrap_or("-"))
            }
            Event::NodeAwaitingApproval { plan_id, node_id, tool, .. } => {
                format!("{t} plan={plan_id} node={node_id} tool={tool}")
            }
            Event::NodeApproved { plan_id, node_id, .. } => {
                format!("{t} plan={plan_id} node={node_id}")
            }
            Event::NodeSkipped { plan_id, node_id } => format!("{t} plan={plan_id} node={node_id}"),
            Event::NodeStarted { plan_id, node_id, tool, .. } => {
                format!("{t} plan={plan_id} node={node_id} tool={tool}")
            }
            Event::NodeLogLine { plan_id, node_id, .. } => format!("{t} plan={plan_id} node={node_id}"),
            Event::NodeCompleted { plan_id, node_id, token_usage, .. } => {
                format!("{t} plan={plan_id} node={node_id} tokens={token_usage}")
            }
            Event::NodeFailed { plan_id, node_id, .. } => format!("{t} plan={plan_id} node={node_id}"),
            Event::NodeStatusReset { plan_id, node_id, .. } => {
                format!("{t} plan={plan_id} node={node_id}")
            }
            Event::NodeAppended { plan_id, node } => format!("{t} plan={plan_id} node={}", node.id),
            Event::Custom => t.to_string(),
        }
    }

    pub fn plan_id(&self) -> Option<&PlanId> {
        match self {
            Event::PlanCreated { plan_id, .. }
            | Event::PlanApproved { plan_id }
            | Event::PlanStatusChanged { plan_id, .. }
            | Event::PlanDagReplaced { plan_id, .. }
            | Event::PlanCompleted { plan_id, .. }
            | Event::PlanFailed { plan_id, .. }
            | Event::NodeAwaitingApproval { plan_id, .. }
            | Event::NodeApproved { plan_id, .. }
            | Event::NodeSkipped { plan_id, .. }
            | Event::NodeStarted { plan_id, .. }
            | Event::NodeLogLine { plan_id, .. }
            | Event::NodeCompleted { plan_id, .. }
            | Event::NodeFailed { plan_id, .. }
            | Event::NodeStatusReset { plan_id, .. }
            | Event::NodeAppended { plan_id, .. } => Some(plan_id),
            Event::Custom => None,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
