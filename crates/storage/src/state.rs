// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state folded from the WAL: plans (with their DAGs inline),
//! append-only logs, and per-node completion snapshots.
//!
//! Grounded on the donor's own `MaterializedState::apply_event` contract
//! (`crates/daemon/src/storage/state/mod.rs`): handlers are idempotent —
//! assignment rather than mutation, existence-guarded inserts — because
//! the executor applies an event to this struct immediately for in-process
//! visibility *and* again during WAL replay on startup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tg_core::{Dag, Decision, DecisionOutcome, Event, Plan, PlanId, PlanStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub plan_id: PlanId,
    pub node_id: Option<u32>,
    pub level: LogLevel,
    pub message: String,
    pub at_ms: u64,
}

/// The `{output, context_keys}` pair written at `completed`, read back by
/// the rewind engine and by operator inspection tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub output: String,
    pub context_keys: Vec<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub plans: HashMap<PlanId, Plan>,
    #[serde(default)]
    pub logs: HashMap<PlanId, Vec<LogEntry>>,
    #[serde(default)]
    pub snapshots: HashMap<PlanId, HashMap<u32, NodeSnapshot>>,
    /// HITL gates, keyed by plan then node id. Kept even after resolution so
    /// an operator can see how a node was approved or skipped; the Node
    /// itself only carries the current status, not the decision it passed
    /// through.
    #[serde(default)]
    pub decisions: HashMap<PlanId, HashMap<u32, Decision>>,
}

impl MaterializedState {
    pub fn get_plan(&self, id: &PlanId) -> Option<&Plan> {
        self.plans.get(id)
    }

    pub fn list_plans_newest_first(&self) -> Vec<&Plan> {
        let mut plans: Vec<&Plan> = self.plans.values().collect();
        plans.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        plans
    }

    /// Apply a single WAL event to derive the next state.
    ///
    /// # Idempotency
    ///
    /// All handlers MUST be idempotent: applying the same event twice
    /// produces the same state as applying it once, since the DAG Engine
    /// applies events both for immediate visibility and again when a
    /// restarted process replays the WAL.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::PlanCreated { plan_id, goal, dag, parent, created_at_ms } => {
                self.plans.entry(*plan_id).or_insert_with(|| {
                    Plan::new(*plan_id, goal.clone(), dag.clone(), *parent, *created_at_ms)
                });
            }
            Event::PlanApproved { plan_id } => {
                if let Some(plan) = self.plans.get_mut(plan_id) {
                    plan.status = PlanStatus::Approved;
                }
            }
            Event::PlanStatusChanged { plan_id, status } => {
                if let Some(plan) = self.plans.get_mut(plan_id) {
                    plan.status = *status;
                }
            }
            Event::PlanDagReplaced { plan_id, dag } => {
                if let Some(plan) = self.plans.get_mut(plan_id) {
                    plan.dag = dag.clone();
                }
            }
            Event::PlanCompleted { plan_id, .. } => {
                if let Some(plan) = self.plans.get_mut(plan_id) {
                    plan.status = PlanStatus::Completed;
                }
            }
            Event::PlanFailed { plan_id, .. } => {
                if let Some(plan) = self.plans.get_mut(plan_id) {
                    plan.status = PlanStatus::Failed;
                }
            }
            Event::NodeAwaitingApproval { plan_id, node_id, decision_summary, .. } => {
                self.set_node_status(plan_id, *node_id, tg_core::NodeStatus::AwaitingApproval);
                self.decisions.entry(*plan_id).or_default().entry(node_id.0).or_insert_with(|| {
                    Decision::new(*plan_id, *node_id, decision_summary.clone(), 0)
                });
            }
            Event::NodeApproved { plan_id, node_id, edited_args } => {
                if let Some(node) = self.node_mut(plan_id, *node_id) {
                    node.status = tg_core::NodeStatus::Approved;
                    if let Some(args) = edited_args {
                        node.args = args.clone();
                    }
                }
                self.resolve_decision(plan_id, *node_id, DecisionOutcome::Approved);
            }
            Event::NodeSkipped { plan_id, node_id } => {
                self.set_node_status(plan_id, *node_id, tg_core::NodeStatus::Skipped);
                self.resolve_decision(plan_id, *node_id, DecisionOutcome::Skipped);
            }
            Event::NodeStarted { plan_id, node_id, started_at_ms, .. } => {
                if let Some(node) = self.node_mut(plan_id, *node_id) {
                    node.status = tg_core::NodeStatus::Running;
                    node.started_at_ms = Some(*started_at_ms);
                }
            }
            Event::NodeLogLine { plan_id, node_id, line } => {
                // Node-scoped log lines fold into `logs` so WAL replay
                // restores them; plan-scoped lines (no node id) go through
                // `Store::record_log` directly since `Event` has no variant
                // for them and are not durable across a restart.
                self.record_log(LogEntry {
                    plan_id: *plan_id,
                    node_id: Some(node_id.0),
                    level: LogLevel::Info,
                    message: line.clone(),
                    at_ms: 0,
                });
            }
            Event::NodeCompleted { plan_id, node_id, result, token_usage, completed_at_ms, .. } => {
                if let Some(node) = self.node_mut(plan_id, *node_id) {
                    node.status = tg_core::NodeStatus::Completed;
                    node.result = Some(result.clone());
                    node.token_usage = *token_usage;
                    node.completed_at_ms = Some(*completed_at_ms);
                }
            }
            Event::NodeFailed { plan_id, node_id, error, completed_at_ms } => {
                if let Some(node) = self.node_mut(plan_id, *node_id) {
                    node.status = tg_core::NodeStatus::Failed;
                    node.error = Some(error.clone());
                    node.completed_at_ms = Some(*completed_at_ms);
                }
            }
            Event::NodeStatusReset { plan_id, node_id, new_status, new_args, new_tool } => {
                if let Some(node) = self.node_mut(plan_id, *node_id) {
                    node.status = *new_status;
                    node.result = None;
                    node.error = None;
                    node.started_at_ms = None;
                    node.completed_at_ms = None;
                    if let Some(args) = new_args {
                        node.args = args.clone();
                    }
                    if let Some(tool) = new_tool {
                        node.tool = tg_core::Tool::from(tool.as_str());
                    }
                }
            }
            Event::NodeAppended { plan_id, node } => {
                if let Some(plan) = self.plans.get_mut(plan_id) {
                    if !plan.dag.nodes.iter().any(|n| n.id == node.id) {
                        plan.dag.nodes.push(node.clone());
                    }
                }
            }
            Event::Custom => {}
        }
    }

    fn node_mut(&mut self, plan_id: &PlanId, node_id: tg_core::NodeId) -> Option<&mut tg_core::Node> {
        self.plans.get_mut(plan_id).and_then(|p| p.dag.get_mut(node_id))
    }

    fn set_node_status(&mut self, plan_id: &PlanId, node_id: tg_core::NodeId, status: tg_core::NodeStatus) {
        if let Some(node) = self.node_mut(plan_id, node_id) {
            node.status = status;
        }
    }

    fn resolve_decision(&mut self, plan_id: &PlanId, node_id: tg_core::NodeId, outcome: DecisionOutcome) {
        if let Some(decision) = self.decisions.get_mut(plan_id).and_then(|m| m.get_mut(&node_id.0)) {
            if !decision.is_resolved() {
                decision.resolve(outcome, 0);
            }
        }
    }

    pub fn get_decision(&self, plan_id: &PlanId, node_id: u32) -> Option<&Decision> {
        self.decisions.get(plan_id).and_then(|m| m.get(&node_id))
    }

    pub fn record_log(&mut self, entry: LogEntry) {
        self.logs.entry(entry.plan_id).or_default().push(entry);
    }

    pub fn record_snapshot(&mut self, plan_id: PlanId, node_id: u32, snapshot: NodeSnapshot) {
        self.snapshots.entry(plan_id).or_default().insert(node_id, snapshot);
    }

    pub fn get_snapshot(&self, plan_id: &PlanId, node_id: u32) -> Option<&NodeSnapshot> {
        self.snapshots.get(plan_id).and_then(|m| m.get(&node_id))
    }

    /// Deep-copy a plan's DAG as a new plan id, used by the rewind engine.
    pub fn fork_dag(&self, plan_id: &PlanId) -> Option<Dag> {
        self.plans.get(plan_id).map(|p| p.dag.clone())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
