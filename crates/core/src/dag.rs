// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plan / DAG / Node data model — the unit of work the engine drives from
//! `approved` to `completed` or `failed`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

crate::define_id! {
    /// Opaque identifier for a plan. Branches get a fresh id; the original
    /// plan id is recorded as `parent`.
    pub struct PlanId("pln-");
}

/// A node's position within a DAG. Unlike [`PlanId`], node ids are small
/// integers assigned by the planner, unique only within their own plan,
/// starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Built-in tool registry. `Remote` is a passthrough to the remote-tool
/// gateway; any tool name not recognised here deserializes to `Remote` with
/// the original name preserved so the executor can still route it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tool {
    WebSearch,
    Scraper,
    FilesystemRead,
    FilesystemWrite,
    FilesystemDelete,
    InterpretCode,
    ShellExec,
    DraftEmail,
    SendEmail,
    Remote(String),
}

impl serde::Serialize for Tool {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Tool {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Tool::from(s.as_str()))
    }
}

impl From<&str> for Tool {
    fn from(s: &str) -> Self {
        match s {
            "web_search" => Tool::WebSearch,
            "scraper" => Tool::Scraper,
            "filesystem_read" => Tool::FilesystemRead,
            "filesystem_write" => Tool::FilesystemWrite,
            "filesystem_delete" => Tool::FilesystemDelete,
            "interpret_code" => Tool::InterpretCode,
            "shell_exec" => Tool::ShellExec,
            "draft_email" => Tool::DraftEmail,
            "send_email" => Tool::SendEmail,
            other => Tool::Remote(other.to_string()),
        }
    }
}

impl Tool {
    /// Canonical wire name, used for both serialization and sandbox dispatch.
    pub fn name(&self) -> &str {
        match self {
            Tool::WebSearch => "web_search",
            Tool::Scraper => "scraper",
            Tool::FilesystemRead => "filesystem_read",
            Tool::FilesystemWrite => "filesystem_write",
            Tool::FilesystemDelete => "filesystem_delete",
            Tool::InterpretCode => "interpret_code",
            Tool::ShellExec => "shell_exec",
            Tool::DraftEmail => "draft_email",
            Tool::SendEmail => "send_email",
            Tool::Remote(name) => name,
        }
    }

    /// Tools that perturb the outside world. Rewinding a node in the
    /// downstream closure whose tool is in this set produces an
    /// idempotency-hazard warning.
    pub fn is_side_effect(&self) -> bool {
        matches!(
            self,
            Tool::FilesystemWrite
                | Tool::FilesystemDelete
                | Tool::SendEmail
                | Tool::DraftEmail
                | Tool::Remote(_)
        )
    }

    /// Tools that require a bridged network inside the sandbox; everything
    /// else runs with `--network none`.
    pub fn needs_network(&self) -> bool {
        matches!(self, Tool::WebSearch | Tool::Scraper | Tool::Remote(_))
    }
}

crate::simple_display! {
    Tool {
        WebSearch => "web_search",
        Scraper => "scraper",
        FilesystemRead => "filesystem_read",
        FilesystemWrite => "filesystem_write",
        FilesystemDelete => "filesystem_delete",
        InterpretCode => "interpret_code",
        ShellExec => "shell_exec",
        DraftEmail => "draft_email",
        SendEmail => "send_email",
        Remote(..) => "remote",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    High,
}

/// Node lifecycle. See `pending -> ... -> {completed, failed, skipped}` in
/// the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Pending,
    AwaitingApproval,
    Approved,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl NodeStatus {
    /// A node in any of these statuses counts as "resolved" for a
    /// downstream dependency's readiness check. Failed counts as resolved
    /// by design — see DESIGN.md's Open Question decision — so a plan
    /// whose root fails still advances instead of stalling forever.
    pub fn is_resolved(&self) -> bool {
        matches!(self, NodeStatus::Completed | NodeStatus::Failed | NodeStatus::Skipped)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_resolved()
    }
}

crate::simple_display! {
    NodeStatus {
        Pending => "pending",
        AwaitingApproval => "awaiting_approval",
        Approved => "approved",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Skipped => "skipped",
    }
}

/// A single node in a plan's DAG.
// Not `Eq`: `args` is a `serde_json::Map<String, Value>` and `Value` only
// implements `PartialEq` (it can hold an f64).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub task: String,
    pub tool: Tool,
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub dependencies: Vec<NodeId>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub token_usage: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
}

impl Default for NodeStatus {
    fn default() -> Self {
        NodeStatus::Pending
    }
}

impl Node {
    pub fn new(
        id: NodeId,
        task: impl Into<String>,
        tool: Tool,
        args: serde_json::Map<String, serde_json::Value>,
        dependencies: Vec<NodeId>,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            id,
            task: task.into(),
            tool,
            args,
            dependencies,
            risk_level,
            status: NodeStatus::Pending,
            result: None,
            error: None,
            token_usage: 0,
            started_at_ms: None,
            completed_at_ms: None,
        }
    }

    /// Reset a terminal node back to `pending`, clearing result/error — the
    /// transition used by both patch `retry`/`replace` and rewind.
    pub fn reset_to_pending(&mut self) {
        self.status = NodeStatus::Pending;
        self.result = None;
        self.error = None;
        self.started_at_ms = None;
        self.completed_at_ms = None;
    }

    /// The context-map value downstream nodes see for this node's output.
    /// Failures are prefixed so downstream nodes can still reference them.
    pub fn context_output(&self) -> Option<String> {
        match self.status {
            NodeStatus::Completed => self.result.clone(),
            NodeStatus::Failed => {
                Some(format!("[FAILED] {}", self.error.as_deref().unwrap_or("unknown error")))
            }
            _ => None,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn builder(id: NodeId, tool: Tool) -> NodeBuilder {
        NodeBuilder::new(id, tool)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct NodeBuilder {
    node: Node,
}

#[cfg(any(test, feature = "test-support"))]
impl NodeBuilder {
    pub fn new(id: NodeId, tool: Tool) -> Self {
        Self { node: Node::new(id, "test task", tool, serde_json::Map::new(), vec![], RiskLevel::Low) }
    }

    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.node.task = task.into();
        self
    }

    pub fn args(mut self, args: serde_json::Map<String, serde_json::Value>) -> Self {
        self.node.args = args;
        self
    }

    pub fn dependencies(mut self, deps: Vec<NodeId>) -> Self {
        self.node.dependencies = deps;
        self
    }

    pub fn risk(mut self, risk: RiskLevel) -> Self {
        self.node.risk_level = risk;
        self
    }

    pub fn status(mut self, status: NodeStatus) -> Self {
        self.node.status = status;
        self
    }

    pub fn result(mut self, result: impl Into<String>) -> Self {
        self.node.result = Some(result.into());
        self
    }

    pub fn build(self) -> Node {
        self.node
    }
}

/// The directed acyclic graph a plan drives to completion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dag {
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub expected_outcome: String,
    pub nodes: Vec<Node>,
}

impl Dag {
    pub fn new(goal: impl Into<String>, expected_outcome: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self { goal: goal.into(), expected_outcome: expected_outcome.into(), nodes }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Pending nodes whose every dependency is resolved — see
    /// [`NodeStatus::is_resolved`].
    pub fn ready_nodes(&self) -> Vec<NodeId> {
        let resolved: HashSet<NodeId> =
            self.nodes.iter().filter(|n| n.status.is_resolved()).map(|n| n.id).collect();
        self.nodes
            .iter()
            .filter(|n| {
                n.status == NodeStatus::Pending && n.dependencies.iter().all(|d| resolved.contains(d))
            })
            .map(|n| n.id)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.nodes.iter().all(|n| n.status.is_terminal())
    }

    /// At least one node completed -> plan completed; otherwise failed.
    pub fn overall_success(&self) -> bool {
        self.nodes.iter().any(|n| n.status == NodeStatus::Completed)
    }

    pub fn total_tokens(&self) -> u64 {
        self.nodes.iter().map(|n| n.token_usage).sum()
    }

    /// Structural-only transitive downstream closure of `seed`, ignoring
    /// current node status — used by the rewind engine.
    pub fn downstream_closure(&self, seed: NodeId) -> HashSet<NodeId> {
        let mut affected: HashSet<NodeId> = HashSet::from([seed]);
        loop {
            let mut grew = false;
            for node in &self.nodes {
                if affected.contains(&node.id) {
                    continue;
                }
                if node.dependencies.iter().any(|d| affected.contains(d)) {
                    affected.insert(node.id);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        affected
    }

    pub fn context_map(&self) -> HashMap<String, String> {
        self.nodes
            .iter()
            .filter_map(|n| n.context_output().map(|out| (format!("node_{}_output", n.id), out)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Draft,
    Approved,
    Running,
    Paused,
    Completed,
    Failed,
}

crate::simple_display! {
    PlanStatus {
        Draft => "draft",
        Approved => "approved",
        Running => "running",
        Paused => "paused",
        Completed => "completed",
        Failed => "failed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub goal: String,
    pub dag: Dag,
    pub status: PlanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<PlanId>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Plan {
    pub fn new(id: PlanId, goal: impl Into<String>, dag: Dag, parent: Option<PlanId>, now_ms: u64) -> Self {
        let goal = goal.into();
        Self {
            id,
            goal,
            dag,
            status: PlanStatus::Draft,
            parent,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }
}

/// A single patch action against an existing node, produced by the
/// Planner Adapter's self-correction pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PatchAction {
    Retry {
        node_id: NodeId,
        #[serde(default)]
        new_args: Option<serde_json::Map<String, serde_json::Value>>,
        #[serde(default)]
        new_tool: Option<Tool>,
    },
    Bypass {
        node_id: NodeId,
        #[serde(default)]
        bypass_reason: Option<String>,
    },
    Replace {
        node_id: NodeId,
        #[serde(default)]
        new_tool: Option<Tool>,
        new_args: serde_json::Map<String, serde_json::Value>,
    },
}

impl PatchAction {
    pub fn node_id(&self) -> NodeId {
        match self {
            PatchAction::Retry { node_id, .. }
            | PatchAction::Bypass { node_id, .. }
            | PatchAction::Replace { node_id, .. } => *node_id,
        }
    }
}

/// A planner-issued patch: per-node actions plus optional brand-new nodes.
/// The engine does not validate acyclicity of `new_nodes` — see DESIGN.md.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub patch_nodes: Vec<PatchAction>,
    #[serde(default)]
    pub new_nodes: Vec<Node>,
}

#[cfg(test)]
#[path = "dag_tests.rs"]
mod tests;
