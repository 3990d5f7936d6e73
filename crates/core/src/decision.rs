// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decision summary presented at a human-in-the-loop approval gate.

use crate::dag::{NodeId, PlanId};
use serde::{Deserialize, Serialize};

/// The `{action, intent, logic}` triple shown to a human before a
/// high-risk node is allowed to run.
///
/// - `action`: what will actually execute (tool + argument summary).
/// - `intent`: the node's task description, in the planner's own words.
/// - `logic`: why the node is reachable now — the parent goal plus the
///   dependency ids and context keys that fed its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub action: String,
    pub intent: String,
    pub logic: String,
}

impl DecisionSummary {
    pub fn new(
        action: impl Into<String>,
        intent: impl Into<String>,
        logic: impl Into<String>,
    ) -> Self {
        Self { action: action.into(), intent: intent.into(), logic: logic.into() }
    }
}

/// How a human resolves an awaiting-approval node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved,
    Skipped,
}

/// A human-in-the-loop gate awaiting (or resolved by) an operator decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub plan_id: PlanId,
    pub node_id: NodeId,
    pub summary: DecisionSummary,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DecisionOutcome>,
}

impl Decision {
    pub fn new(
        plan_id: PlanId,
        node_id: NodeId,
        summary: DecisionSummary,
        created_at_ms: u64,
    ) -> Self {
        Self { plan_id, node_id, summary, created_at_ms, resolved_at_ms: None, outcome: None }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn resolve(&mut self, outcome: DecisionOutcome, resolved_at_ms: u64) {
        self.outcome = Some(outcome);
        self.resolved_at_ms = Some(resolved_at_ms);
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
