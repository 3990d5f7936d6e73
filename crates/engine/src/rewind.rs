// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rewind/Branch Engine (C6): forks a plan at a chosen node for
//! time-travel debugging, resetting its downstream closure to `pending`
//! under a fresh plan id.
//!
//! Grounded on the original's `Orchestrator.rewind_node`/`_downstream`
//! (`backend/core/orchestrator.py`): the fixpoint closure and side-effect
//! warning list are carried over verbatim in shape, reusing
//! [`tg_core::Dag::downstream_closure`] and [`tg_core::Tool::is_side_effect`]
//! rather than re-deriving them here.

use thiserror::Error;
use tg_core::{Clock, NodeId, Plan, PlanId, PlanStatus};
use tg_storage::{Store, StoreError};

#[derive(Debug, Error)]
pub enum RewindError {
    #[error("plan {0} not found")]
    PlanNotFound(PlanId),
    #[error("node {0} not found in plan {1}")]
    NodeNotFound(NodeId, PlanId),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of a rewind: the newly created branch plan plus any
/// idempotency-hazard warnings the caller should surface to the operator.
#[derive(Debug, Clone)]
pub struct RewindOutcome {
    pub branch: Plan,
    pub warnings: Vec<String>,
}

/// Fork `plan_id` at `node_id`, resetting it and everything structurally
/// downstream of it to `pending`. `new_args`/`new_tool` override the target
/// node only. Returns the new branch plan and idempotency warnings for any
/// already-completed side-effect node caught in the closure.
pub fn rewind(
    store: &Store,
    clock: &impl Clock,
    plan_id: PlanId,
    node_id: NodeId,
    new_args: Option<serde_json::Map<String, serde_json::Value>>,
    new_tool: Option<tg_core::Tool>,
) -> Result<RewindOutcome, RewindError> {
    let source = store.get_plan(&plan_id).ok_or(RewindError::PlanNotFound(plan_id))?;
    if source.dag.get(node_id).is_none() {
        return Err(RewindError::NodeNotFound(node_id, plan_id));
    }

    let affected = source.dag.downstream_closure(node_id);

    let mut warnings = Vec::new();
    for node in &source.dag.nodes {
        if affected.contains(&node.id)
            && node.status == tg_core::NodeStatus::Completed
            && node.tool.is_side_effect()
        {
            warnings.push(format!(
                "node {} ('{}') has already run in the real world — rewinding may re-trigger it",
                node.id,
                node.tool.name()
            ));
        }
    }

    let mut branch_dag = source.dag.clone();
    for node in &mut branch_dag.nodes {
        if affected.contains(&node.id) {
            node.reset_to_pending();
        }
    }
    if let Some(target) = branch_dag.get_mut(node_id) {
        if let Some(args) = new_args {
            target.args = args;
        }
        if let Some(tool) = new_tool {
            target.tool = tool;
        }
    }

    let branch_id = PlanId::new();
    let now_ms = clock.epoch_ms();
    let branch = Plan {
        id: branch_id,
        goal: source.goal.clone(),
        dag: branch_dag,
        status: PlanStatus::Draft,
        parent: Some(plan_id),
        created_at_ms: now_ms,
        updated_at_ms: now_ms,
    };

    store.insert_branch(branch.clone())?;
    Ok(RewindOutcome { branch, warnings })
}

#[cfg(test)]
#[path = "rewind_tests.rs"]
mod tests;
