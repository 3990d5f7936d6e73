// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Store`]: the transactional facade the engine and daemon talk to.
//!
//! Every mutating call appends one [`Event`] to the WAL (fsynced before the
//! call returns) and folds it into the in-memory [`MaterializedState`]
//! under the same write guard, so a read issued immediately after a write
//! observes it. Writes are serialized by a single mutex — the WAL is one
//! physical file, so per-plan serialization collapses to the same
//! guarantee a per-plan lock would give, with a simpler implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Map;
use tg_core::{Dag, Event, Node, NodeId, NodeStatus, Plan, PlanId, PlanStatus, Tool};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::snapshot::Snapshot;
use crate::state::{LogEntry, LogLevel, MaterializedState, NodeSnapshot};
use crate::wal::Wal;

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

struct Inner {
    wal: Wal,
    state: MaterializedState,
    snapshot_path: PathBuf,
    /// How many WAL entries to accumulate before writing a fresh snapshot.
    checkpoint_every: u64,
    since_checkpoint: u64,
}

/// Durable, transactional store backing plans/nodes/logs (C1).
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

/// Fields that may be supplied to [`Store::upsert_node`]; `None` leaves the
/// existing value untouched.
#[derive(Debug, Default, Clone)]
pub struct NodeFields {
    pub status: Option<NodeStatus>,
    pub args: Option<Map<String, serde_json::Value>>,
    pub tool: Option<Tool>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub token_usage: Option<u64>,
    pub started_at_ms: Option<u64>,
    pub completed_at_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PlanSnapshot {
    pub output: String,
    pub context_keys: Vec<String>,
}

impl From<NodeSnapshot> for PlanSnapshot {
    fn from(s: NodeSnapshot) -> Self {
        Self { output: s.output, context_keys: s.context_keys }
    }
}

impl Store {
    /// Open a store rooted at `dir`, replaying the newest snapshot (if any)
    /// plus every WAL entry written since.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let snapshot_path = dir.join("snapshot.json");
        let wal_path = dir.join("wal.jsonl");

        let (mut state, start_seq) = match Snapshot::load_newest(&snapshot_path) {
            Some(snap) => {
                info!(seq = snap.seq, "loaded snapshot");
                (snap.state, snap.seq)
            }
            None => (MaterializedState::default(), 0),
        };

        let mut wal = Wal::open(&wal_path, start_seq)?;
        let entries = wal.replay(start_seq)?;
        let replayed = entries.len();
        for entry in entries {
            state.apply_event(&entry.event);
        }
        info!(replayed, "store opened");

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                wal,
                state,
                snapshot_path,
                checkpoint_every: 200,
                since_checkpoint: 0,
            })),
        })
    }

    /// In-memory store with no durability, for tests.
    #[cfg(any(test, feature = "test-support"))]
    pub fn in_memory(tmp_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(tmp_dir)
    }

    fn write(&self, inner: &mut Inner, event: Event) -> Result<(), StoreError> {
        inner.wal.append(&event)?;
        inner.state.apply_event(&event);
        inner.since_checkpoint += 1;
        if inner.since_checkpoint >= inner.checkpoint_every {
            self.checkpoint_locked(inner)?;
        }
        Ok(())
    }

    fn checkpoint_locked(&self, inner: &mut Inner) -> Result<(), StoreError> {
        let snap = Snapshot::new(inner.wal.next_seq().saturating_sub(1), inner.state.clone(), Utc::now());
        snap.write(&inner.snapshot_path)?;
        inner.since_checkpoint = 0;
        Ok(())
    }

    /// Force a checkpoint now (used on graceful shutdown).
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        self.checkpoint_locked(&mut inner)
    }

    /// Append an already-constructed event and fold it into state. This is
    /// the WAL-persistence half of `Effect::Emit` — the engine builds the
    /// event (it has the plan goal, dependency ids and context map that
    /// `upsert_node`'s generic field-diff path does not) and hands it here
    /// verbatim.
    pub fn emit(&self, event: Event) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        self.write(&mut inner, event)
    }

    pub fn get_decision(&self, plan_id: &PlanId, node_id: u32) -> Option<tg_core::Decision> {
        self.inner.lock().state.get_decision(plan_id, node_id).cloned()
    }

    pub fn create_plan(
        &self,
        plan_id: PlanId,
        goal: impl Into<String>,
        dag: Dag,
        parent: Option<PlanId>,
    ) -> Result<Plan, StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.plans.contains_key(&plan_id) {
            return Err(StoreError::PlanExists(plan_id.to_string()));
        }
        let goal = goal.into();
        let created_at_ms = now_ms();
        self.write(
            &mut inner,
            Event::PlanCreated { plan_id, goal, dag, parent, created_at_ms },
        )?;
        Ok(inner.state.get_plan(&plan_id).expect("just inserted").clone())
    }

    pub fn get_plan(&self, plan_id: &PlanId) -> Option<Plan> {
        self.inner.lock().state.get_plan(plan_id).cloned()
    }

    pub fn list_plans(&self) -> Vec<Plan> {
        self.inner.lock().state.list_plans_newest_first().into_iter().cloned().collect()
    }

    pub fn update_plan(&self, plan_id: PlanId, status: PlanStatus, dag: Option<Dag>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.state.plans.contains_key(&plan_id) {
            return Err(StoreError::PlanNotFound(plan_id.to_string()));
        }
        if let Some(dag) = dag {
            self.write(&mut inner, Event::PlanDagReplaced { plan_id, dag })?;
        }
        self.write(&mut inner, Event::PlanStatusChanged { plan_id, status })?;
        Ok(())
    }

    pub fn approve_plan(&self, plan_id: PlanId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.state.plans.contains_key(&plan_id) {
            return Err(StoreError::PlanNotFound(plan_id.to_string()));
        }
        self.write(&mut inner, Event::PlanApproved { plan_id })
    }

    pub fn kill_plan(&self, plan_id: PlanId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        self.write(&mut inner, Event::PlanFailed { plan_id, reason: Some("kill_switch".to_string()) })
    }

    /// Insert a node if `node_id` is absent; otherwise apply the supplied
    /// field subset. All non-scalar values go through `tg_core`'s own
    /// serialisation, so nothing here needs a bespoke stable-text format.
    pub fn upsert_node(&self, plan_id: PlanId, node_id: NodeId, fields: NodeFields) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let plan = inner.state.get_plan(&plan_id).ok_or_else(|| StoreError::PlanNotFound(plan_id.to_string()))?;
        if plan.dag.get(node_id).is_none() {
            let node = Node::new(
                node_id,
                String::new(),
                fields.tool.clone().unwrap_or(Tool::Remote("unknown".into())),
                fields.args.clone().unwrap_or_default(),
                vec![],
                tg_core::RiskLevel::Low,
            );
            self.write(&mut inner, Event::NodeAppended { plan_id, node })?;
        }

        if let Some(status) = fields.status {
            match status {
                NodeStatus::AwaitingApproval => {
                    let node = inner
                        .state
                        .get_plan(&plan_id)
                        .and_then(|p| p.dag.get(node_id))
                        .cloned()
                        .ok_or_else(|| StoreError::NodeNotFound(node_id.0, plan_id.to_string()))?;
                    let summary = tg_core::DecisionSummary::new("", node.task.clone(), "");
                    self.write(
                        &mut inner,
                        Event::NodeAwaitingApproval {
                            plan_id,
                            node_id,
                            tool: node.tool.name().to_string(),
                            args: node.args.clone(),
                            decision_summary: summary,
                        },
                    )?;
                }
                NodeStatus::Approved => {
                    self.write(
                        &mut inner,
                        Event::NodeApproved { plan_id, node_id, edited_args: fields.args.clone() },
                    )?;
                }
                NodeStatus::Skipped => {
                    self.write(&mut inner, Event::NodeSkipped { plan_id, node_id })?;
                }
                NodeStatus::Running => {
                    let node = inner
                        .state
                        .get_plan(&plan_id)
                        .and_then(|p| p.dag.get(node_id))
                        .cloned()
                        .ok_or_else(|| StoreError::NodeNotFound(node_id.0, plan_id.to_string()))?;
                    self.write(
                        &mut inner,
                        Event::NodeStarted {
                            plan_id,
                            node_id,
                            task: node.task,
                            tool: node.tool.name().to_string(),
                            started_at_ms: fields.started_at_ms.unwrap_or_else(now_ms),
                        },
                    )?;
                }
                NodeStatus::Completed => {
                    let result = fields.result.clone().unwrap_or_default();
                    let output_preview = result.chars().take(200).collect();
                    self.write(
                        &mut inner,
                        Event::NodeCompleted {
                            plan_id,
                            node_id,
                            result,
                            output_preview,
                            memory_stats: tg_core::MemoryStats::default(),
                            token_usage: fields.token_usage.unwrap_or(0),
                            completed_at_ms: fields.completed_at_ms.unwrap_or_else(now_ms),
                        },
                    )?;
                }
                NodeStatus::Failed => {
                    self.write(
                        &mut inner,
                        Event::NodeFailed {
                            plan_id,
                            node_id,
                            error: fields.error.clone().unwrap_or_default(),
                            completed_at_ms: fields.completed_at_ms.unwrap_or_else(now_ms),
                        },
                    )?;
                }
                NodeStatus::Pending => {
                    self.write(
                        &mut inner,
                        Event::NodeStatusReset {
                            plan_id,
                            node_id,
                            new_status: NodeStatus::Pending,
                            new_args: fields.args.clone(),
                            new_tool: fields.tool.as_ref().map(|t| t.name().to_string()),
                        },
                    )?;
                }
            }
        } else if fields.args.is_some() || fields.tool.is_some() {
            self.write(
                &mut inner,
                Event::NodeStatusReset {
                    plan_id,
                    node_id,
                    new_status: inner
                        .state
                        .get_plan(&plan_id)
                        .and_then(|p| p.dag.get(node_id))
                        .map(|n| n.status)
                        .unwrap_or(NodeStatus::Pending),
                    new_args: fields.args.clone(),
                    new_tool: fields.tool.as_ref().map(|t| t.name().to_string()),
                },
            )?;
        }
        Ok(())
    }

    /// Records a log line. Node-scoped lines are also appended to the WAL
    /// (as a bare `{plan_id, node_id, line}` event, reconstructed with
    /// default level/timestamp on replay) so they survive a restart;
    /// `MaterializedState::record_log` itself is called directly here with
    /// the real level and timestamp, bypassing `apply_event`, so a line
    /// logged now is never double-recorded.
    pub fn append_log(&self, plan_id: PlanId, node_id: Option<NodeId>, level: LogLevel, message: impl Into<String>) {
        let mut inner = self.inner.lock();
        let message = message.into();
        if let Some(node_id) = node_id {
            let event = Event::NodeLogLine { plan_id, node_id, line: message.clone() };
            if inner.wal.append(&event).is_ok() {
                inner.since_checkpoint += 1;
            }
        }
        inner.state.record_log(LogEntry {
            plan_id,
            node_id: node_id.map(|n| n.0),
            level,
            message,
            at_ms: now_ms(),
        });
    }

    /// Oldest-first, capped at `limit`.
    pub fn get_logs(&self, plan_id: &PlanId, limit: usize) -> Vec<LogEntry> {
        let inner = self.inner.lock();
        let logs = inner.state.logs.get(plan_id).cloned().unwrap_or_default();
        if logs.len() > limit {
            logs[logs.len() - limit..].to_vec()
        } else {
            logs
        }
    }

    pub fn record_snapshot(&self, plan_id: PlanId, node_id: u32, output: String, context_keys: Vec<String>) {
        let mut inner = self.inner.lock();
        inner.state.record_snapshot(plan_id, node_id, NodeSnapshot { output, context_keys });
    }

    pub fn get_snapshot(&self, plan_id: &PlanId, node_id: u32) -> Option<PlanSnapshot> {
        self.inner.lock().state.get_snapshot(plan_id, node_id).cloned().map(PlanSnapshot::from)
    }

    /// Insert a plan that was constructed elsewhere (the rewind engine's
    /// deep-copied branch DAG) as a brand-new plan row.
    pub fn insert_branch(&self, plan: Plan) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.plans.contains_key(&plan.id) {
            return Err(StoreError::PlanExists(plan.id.to_string()));
        }
        self.write(
            &mut inner,
            Event::PlanCreated {
                plan_id: plan.id,
                goal: plan.goal,
                dag: plan.dag,
                parent: plan.parent,
                created_at_ms: plan.created_at_ms,
            },
        )?;
        if plan.status != PlanStatus::Draft {
            self.write(&mut inner, Event::PlanStatusChanged { plan_id: plan.id, status: plan.status })?;
        }
        Ok(())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if self.since_checkpoint > 0 {
            let snap = Snapshot::new(self.wal.next_seq().saturating_sub(1), self.state.clone(), Utc::now());
            if let Err(e) = snap.write(&self.snapshot_path) {
                warn!(error = %e, "failed to write final checkpoint on drop");
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
