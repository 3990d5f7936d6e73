// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DAG Engine (C5): drives a plan from `approved` to `completed`/`failed`.
//!
//! Grounded on the donor's own `Executor<S, A, N, C: Clock>`
//! (`crates/engine/src/executor.rs`): dispatch stays effect-as-data — the
//! scheduling loop and per-node dispatch logic build [`Effect`] values and
//! hand them to [`Executor::execute`], which applies them and logs via
//! `effect.fields()`/`effect.verbose()`, the same split that keeps the
//! donor's scheduling logic testable against a fake executor with no real
//! containers or network calls. The scheduling semantics themselves —
//! ready-set computation treating `failed` as resolved, the HITL poll loop,
//! last-500-char error truncation, patch application — are grounded on
//! `examples/original_source/AMSAB/backend/core/orchestrator.py`
//! (`execute_plan`/`_run_node_inner`/`_apply_patch`).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tg_adapters::{GatewayAdapter, GatewayError, MemoryAdapter, PlannerAdapter, PlannerError, SandboxAdapter, SandboxError};
use tg_core::{
    Clock, DecisionSummary, Effect, Event, MemoryStats, Node, NodeId, NodeStatus, PatchAction, Patch, Plan,
    PlanId, PlanStatus, RiskLevel, Tool,
};
use tg_storage::{LogEntry, LogLevel, Store, StoreError};
use tracing::{debug, error, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(120);
const FAILURE_TAIL_CHARS: usize = 500;
const OUTPUT_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("plan {0} not found")]
    PlanNotFound(PlanId),
    #[error("node {0} not found in plan {1}")]
    NodeNotFound(NodeId, PlanId),
    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
    #[error("planner error: {0}")]
    Planner(#[from] PlannerError),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("effect produced an outcome its caller did not expect")]
    UnexpectedOutcome,
}

/// Result of executing one [`Effect`]. Most effects are fire-and-forget
/// (`None`); the three that feed data back into the scheduling loop each
/// get their own variant rather than a generic `Box<dyn Any>`.
#[derive(Debug, Clone)]
pub enum EffectOutcome {
    None,
    Sandbox(tg_adapters::ExecutionResult),
    Patch(Patch),
    Remote(String),
    MemoryStats(MemoryStats),
}

/// Shared kill-switch: the daemon's kill route signals a plan id here; the
/// scheduling loop consumes the signal at the top of its next iteration.
#[derive(Clone, Default)]
pub struct KillSwitch {
    signaled: Arc<Mutex<HashSet<PlanId>>>,
}

impl KillSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self, plan_id: PlanId) {
        self.signaled.lock().insert(plan_id);
    }

    /// Non-removing check, used inside a node dispatch to abandon early.
    pub fn is_signaled(&self, plan_id: PlanId) -> bool {
        self.signaled.lock().contains(&plan_id)
    }

    /// Removing check, used once per scheduling-loop iteration.
    pub fn take(&self, plan_id: PlanId) -> bool {
        self.signaled.lock().remove(&plan_id)
    }
}

/// Drives plans to completion against a `Clock` and a
/// `SandboxAdapter`/`PlannerAdapter`/`MemoryAdapter`/`GatewayAdapter`
/// quadruple, so the scheduling loop is unit-testable against fakes.
#[derive(Clone)]
pub struct Executor<S, P, M, G, C> {
    store: Store,
    bus: crate::bus::EventBus,
    sandbox: S,
    planner: P,
    memory: M,
    gateway: G,
    clock: C,
    kill_switch: KillSwitch,
    running: Arc<Mutex<HashSet<PlanId>>>,
}

impl<S, P, M, G, C> Executor<S, P, M, G, C>
where
    S: SandboxAdapter,
    P: PlannerAdapter,
    M: MemoryAdapter,
    G: GatewayAdapter,
    C: Clock,
{
    pub fn new(
        store: Store,
        bus: crate::bus::EventBus,
        sandbox: S,
        planner: P,
        memory: M,
        gateway: G,
        clock: C,
    ) -> Self {
        Self {
            store,
            bus,
            sandbox,
            planner,
            memory,
            gateway,
            clock,
            kill_switch: KillSwitch::new(),
            running: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// A cloneable handle the daemon's kill route can hold onto independent
    /// of the executor itself.
    pub fn kill_switch(&self) -> KillSwitch {
        self.kill_switch.clone()
    }

    pub async fn kill(&self, plan_id: PlanId) -> Result<(), ExecutorError> {
        self.kill_switch.signal(plan_id);
        self.execute(Effect::KillPlanContainers { plan_id }).await?;
        Ok(())
    }

    /// Execute one effect, logging start/completion the way the donor's own
    /// executor does: verbose effects log both "executing" and "effect
    /// completed"; quiet ones (log-line emission, breadcrumbs) log once on
    /// completion to keep high-frequency effects out of the normal path.
    pub async fn execute(&self, effect: Effect) -> Result<EffectOutcome, ExecutorError> {
        let name = effect.name();
        let verbose = effect.verbose();
        let field_str = || effect.fields().iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(" ");
        if verbose {
            info!(effect = name, fields = %field_str(), "executing effect");
        }
        let outcome = self.execute_inner(effect).await;
        match &outcome {
            Ok(_) if verbose => info!(effect = name, "effect completed"),
            Ok(_) => debug!(effect = name, "effect completed"),
            Err(err) => warn!(effect = name, error = %err, "effect failed"),
        }
        outcome
    }

    async fn execute_inner(&self, effect: Effect) -> Result<EffectOutcome, ExecutorError> {
        match effect {
            Effect::Emit { event } => {
                self.store.emit(event.clone())?;
                self.bus.publish_event(event);
                Ok(EffectOutcome::None)
            }
            Effect::RunSandbox { plan_id, node_id, tool, resolved_args, timeout } => {
                let node = self.fetch_node(plan_id, node_id)?;
                let (log_tx, mut log_rx) = tokio::sync::mpsc::unbounded_channel();
                let store = self.store.clone();
                let bus = self.bus.clone();
                let clock = self.clock.clone();
                let forward = tokio::spawn(async move {
                    while let Some(line) = log_rx.recv().await {
                        store.append_log(plan_id, Some(node_id), LogLevel::Info, line.clone());
                        bus.publish_log(LogEntry {
                            plan_id,
                            node_id: Some(node_id.0),
                            level: LogLevel::Info,
                            message: line,
                            at_ms: clock.epoch_ms(),
                        });
                    }
                });
                let result =
                    self.sandbox.run_node(plan_id, node_id, &tool, &node.task, &resolved_args, timeout, log_tx).await?;
                let _ = forward.await;
                Ok(EffectOutcome::Sandbox(result))
            }
            Effect::KillPlanContainers { plan_id } => {
                self.sandbox.kill_plan(plan_id).await?;
                Ok(EffectOutcome::None)
            }
            Effect::WriteBreadcrumb { plan_id, node_id, tool, task, output } => {
                if let Err(e) = self.memory.add_step(plan_id, node_id, &task, tool.name(), &output).await {
                    warn!(%plan_id, %node_id, error = %e, "breadcrumb write failed, continuing without it");
                }
                Ok(EffectOutcome::None)
            }
            Effect::RequestPatch { plan_id, node_id, error } => {
                let dag = self.fetch_plan(plan_id)?.dag;
                let patch = self.planner.patch(node_id.0, &error, &dag).await?;
                Ok(EffectOutcome::Patch(patch))
            }
            Effect::CallRemoteTool { server, tool, arguments } => {
                let args: serde_json::Map<String, Value> = arguments.into_iter().collect();
                let output = self.gateway.call_tool(&server, &tool, &args).await?;
                Ok(EffectOutcome::Remote(output))
            }
            Effect::QueryMemoryStats { plan_id, node_id } => {
                let (short_term, long_term) = self.memory.stats().await.unwrap_or_else(|e| {
                    warn!(%plan_id, %node_id, error = %e, "memory stats query failed, defaulting to zero");
                    (0, 0)
                });
                Ok(EffectOutcome::MemoryStats(MemoryStats { short_term, long_term }))
            }
        }
    }

    fn fetch_plan(&self, plan_id: PlanId) -> Result<Plan, ExecutorError> {
        self.store.get_plan(&plan_id).ok_or(ExecutorError::PlanNotFound(plan_id))
    }

    fn fetch_node(&self, plan_id: PlanId, node_id: NodeId) -> Result<Node, ExecutorError> {
        self.fetch_plan(plan_id)?.dag.get(node_id).cloned().ok_or(ExecutorError::NodeNotFound(node_id, plan_id))
    }

    /// Drive `plan_id` to completion. A plan id already being driven is a
    /// no-op (re-entry guard) rather than an error, since the daemon may
    /// call this more than once for the same approval event.
    pub async fn drive_plan(&self, plan_id: PlanId) {
        if !self.running.lock().insert(plan_id) {
            warn!(%plan_id, "drive_plan already running for this plan, ignoring duplicate");
            return;
        }
        info!(%plan_id, "drive_plan started");
        if let Err(err) = self.drive_plan_inner(plan_id).await {
            error!(%plan_id, error = %err, "drive_plan crashed");
            let _ = self.store.update_plan(plan_id, PlanStatus::Failed, None);
            self.store.append_log(plan_id, None, LogLevel::Error, format!("internal error: {err}"));
        }
        self.running.lock().remove(&plan_id);
    }

    async fn drive_plan_inner(&self, plan_id: PlanId) -> Result<(), ExecutorError> {
        let mut context: HashMap<String, String> = self.fetch_plan(plan_id)?.dag.context_map();
        self.execute(Effect::Emit { event: Event::PlanStatusChanged { plan_id, status: PlanStatus::Running } })
            .await?;

        let mut dispatched: HashSet<NodeId> = HashSet::new();

        loop {
            if self.kill_switch.take(plan_id) {
                self.execute(Effect::Emit {
                    event: Event::PlanFailed { plan_id, reason: Some("kill_switch".to_string()) },
                })
                .await?;
                self.store.append_log(
                    plan_id,
                    None,
                    LogLevel::Warn,
                    "kill switch activated — execution terminated".to_string(),
                );
                return Ok(());
            }

            let dag = self.fetch_plan(plan_id)?.dag;
            let ready: Vec<NodeId> = dag.ready_nodes().into_iter().filter(|id| !dispatched.contains(id)).collect();

            if ready.is_empty() {
                if dag.is_complete() {
                    let status = if dag.overall_success() { PlanStatus::Completed } else { PlanStatus::Failed };
                    let token_total = dag.total_tokens();
                    self.store.update_plan(plan_id, status, None)?;
                    let event = if status == PlanStatus::Completed {
                        Event::PlanCompleted { plan_id, token_total }
                    } else {
                        Event::PlanFailed { plan_id, reason: None }
                    };
                    self.execute(Effect::Emit { event }).await?;
                    info!(%plan_id, ?status, token_total, "plan finished");
                    return Ok(());
                }
                tokio::time::sleep(POLL_INTERVAL).await;
                continue;
            }

            dispatched.extend(ready.iter().copied());

            let mut set = tokio::task::JoinSet::new();
            for node_id in ready {
                let executor = self.clone();
                let context_snapshot = context.clone();
                set.spawn(async move { executor.dispatch_node(plan_id, node_id, context_snapshot).await });
            }
            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok(Ok(Some((key, value)))) => {
                        context.insert(key, value);
                    }
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => warn!(%plan_id, error = %e, "node dispatch failed"),
                    Err(join_err) => error!(%plan_id, error = %join_err, "node dispatch task panicked"),
                }
            }

            self.store.update_plan(plan_id, PlanStatus::Running, None)?;
        }
    }

    /// Dispatch a single ready node: HITL gate, run, success/failure
    /// handling. Returns the `(node_<id>_output, value)` pair to merge into
    /// the shared context, or `None` if the node was skipped.
    async fn dispatch_node(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        context: HashMap<String, String>,
    ) -> Result<Option<(String, String)>, ExecutorError> {
        let mut node = self.fetch_node(plan_id, node_id)?;

        if node.risk_level == RiskLevel::High && node.status == NodeStatus::Pending {
            if !self.await_approval(plan_id, node_id, &node, &context).await? {
                return Ok(None);
            }
            node = self.fetch_node(plan_id, node_id)?;
        }

        let started_at_ms = self.clock.epoch_ms();
        self.execute(Effect::Emit {
            event: Event::NodeStarted {
                plan_id,
                node_id,
                task: node.task.clone(),
                tool: node.tool.name().to_string(),
                started_at_ms,
            },
        })
        .await?;
        self.store.append_log(
            plan_id,
            Some(node_id),
            LogLevel::Info,
            format!("node {node_id} started: {}", node.task),
        );

        let resolved_args = crate::resolver::resolve_args(&node.tool, &node.args, &context);

        let run_result = if let Tool::Remote(name) = &node.tool {
            let server = node.args.get("server").and_then(|v| v.as_str()).unwrap_or("default").to_string();
            let mut arguments: HashMap<String, Value> = resolved_args.clone().into_iter().collect();
            arguments.remove("server");
            match self.execute(Effect::CallRemoteTool { server, tool: name.clone(), arguments }).await {
                Ok(EffectOutcome::Remote(output)) => {
                    Ok(tg_adapters::ExecutionResult { stdout: output, exit_code: 0, token_usage: 0 })
                }
                Ok(_) => Err(ExecutorError::UnexpectedOutcome),
                Err(e) => Err(e),
            }
        } else {
            match self
                .execute(Effect::RunSandbox {
                    plan_id,
                    node_id,
                    tool: node.tool.clone(),
                    resolved_args,
                    timeout: DEFAULT_NODE_TIMEOUT,
                })
                .await
            {
                Ok(EffectOutcome::Sandbox(result)) => Ok(result),
                Ok(_) => Err(ExecutorError::UnexpectedOutcome),
                Err(e) => Err(e),
            }
        };

        match run_result {
            Ok(result) if result.success() => self.handle_node_success(plan_id, node_id, &node, result).await,
            Ok(result) => self.handle_node_failure(plan_id, node_id, &node, tail(&result.stdout, FAILURE_TAIL_CHARS)).await,
            Err(e) => self.handle_node_failure(plan_id, node_id, &node, tail(&e.to_string(), FAILURE_TAIL_CHARS)).await,
        }
    }

    async fn handle_node_success(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        node: &Node,
        result: tg_adapters::ExecutionResult,
    ) -> Result<Option<(String, String)>, ExecutorError> {
        let completed_at_ms = self.clock.epoch_ms();

        let context_keys = vec![format!("node_{node_id}_output")];
        self.store.record_snapshot(plan_id, node_id.0, result.stdout.clone(), context_keys);
        self.store.append_log(plan_id, Some(node_id), LogLevel::Info, format!("node {node_id} completed"));

        self.execute(Effect::WriteBreadcrumb {
            plan_id,
            node_id,
            tool: node.tool.clone(),
            task: node.task.clone(),
            output: result.stdout.clone(),
        })
        .await?;

        let memory_stats = match self.execute(Effect::QueryMemoryStats { plan_id, node_id }).await {
            Ok(EffectOutcome::MemoryStats(stats)) => stats,
            _ => MemoryStats::default(),
        };

        self.execute(Effect::Emit {
            event: Event::NodeCompleted {
                plan_id,
                node_id,
                result: result.stdout.clone(),
                output_preview: preview(&result.stdout, OUTPUT_PREVIEW_CHARS),
                memory_stats,
                token_usage: result.token_usage,
                completed_at_ms,
            },
        })
        .await?;

        Ok(Some((format!("node_{node_id}_output"), result.stdout)))
    }

    async fn handle_node_failure(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        _node: &Node,
        error: String,
    ) -> Result<Option<(String, String)>, ExecutorError> {
        let completed_at_ms = self.clock.epoch_ms();
        self.execute(Effect::Emit {
            event: Event::NodeFailed { plan_id, node_id, error: error.clone(), completed_at_ms },
        })
        .await?;
        self.store.append_log(plan_id, Some(node_id), LogLevel::Error, format!("node {node_id} failed: {error}"));

        match self.execute(Effect::RequestPatch { plan_id, node_id, error: error.clone() }).await {
            Ok(EffectOutcome::Patch(patch)) => {
                if let Err(e) = self.apply_patch(plan_id, patch).await {
                    warn!(%plan_id, %node_id, error = %e, "failed to apply planner patch");
                } else {
                    self.store.append_log(plan_id, Some(node_id), LogLevel::Info, format!("planner patched node {node_id}"));
                }
            }
            Ok(_) => {}
            Err(e) => warn!(%plan_id, %node_id, error = %e, "planner patch request failed, node stays failed"),
        }

        Ok(Some((format!("node_{node_id}_output"), format!("[FAILED] {error}"))))
    }

    /// Apply a planner-issued patch: per-node actions plus optional new
    /// nodes appended verbatim. Acyclicity of `new_nodes` is not validated —
    /// see DESIGN.md's Open Question decision.
    async fn apply_patch(&self, plan_id: PlanId, patch: Patch) -> Result<(), ExecutorError> {
        let mut dag = self.fetch_plan(plan_id)?.dag;
        for action in &patch.patch_nodes {
            let Some(node) = dag.get_mut(action.node_id()) else { continue };
            match action {
                PatchAction::Retry { new_args, new_tool, .. } => {
                    node.reset_to_pending();
                    if let Some(args) = new_args {
                        for (k, v) in args {
                            node.args.insert(k.clone(), v.clone());
                        }
                    }
                    if let Some(tool) = new_tool {
                        node.tool = tool.clone();
                    }
                }
                PatchAction::Bypass { .. } => node.status = NodeStatus::Skipped,
                PatchAction::Replace { new_tool, new_args, .. } => {
                    node.reset_to_pending();
                    if let Some(tool) = new_tool {
                        node.tool = tool.clone();
                    }
                    node.args = new_args.clone();
                }
            }
        }
        dag.nodes.extend(patch.new_nodes);
        self.execute(Effect::Emit { event: Event::PlanDagReplaced { plan_id, dag } }).await?;
        Ok(())
    }

    /// High-risk gate: emit the decision summary, then poll until a human
    /// resolves it. Returns `true` if approved, `false` if skipped or the
    /// plan was killed while waiting.
    async fn await_approval(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        node: &Node,
        context: &HashMap<String, String>,
    ) -> Result<bool, ExecutorError> {
        let plan = self.fetch_plan(plan_id)?;
        let context_keys: Vec<&String> = context.keys().collect();
        let decision_summary = DecisionSummary::new(
            format!("execute '{}' with args: {}", node.tool.name(), Value::Object(node.args.clone())),
            format!("fulfill sub-task: '{}'", node.task),
            format!(
                "part of plan goal '{}'. depends on nodes: {:?}. resolved context keys: {:?}.",
                plan.goal, node.dependencies, context_keys
            ),
        );
        self.execute(Effect::Emit {
            event: Event::NodeAwaitingApproval {
                plan_id,
                node_id,
                tool: node.tool.name().to_string(),
                args: node.args.clone(),
                decision_summary,
            },
        })
        .await?;

        loop {
            if self.kill_switch.is_signaled(plan_id) {
                return Ok(false);
            }
            let current = self.fetch_node(plan_id, node_id)?;
            match current.status {
                NodeStatus::Approved => return Ok(true),
                NodeStatus::Skipped => return Ok(false),
                NodeStatus::AwaitingApproval => tokio::time::sleep(POLL_INTERVAL).await,
                // The store already moved the node past the gate by some
                // other path (e.g. a concurrent patch); don't hang.
                _ => return Ok(true),
            }
        }
    }
}

/// Last `max_chars` characters of `s`, respecting char boundaries — the
/// Rust equivalent of the donor's `result.output[-500:]` slice.
fn tail(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total <= max_chars {
        s.to_string()
    } else {
        s.chars().skip(total - max_chars).collect()
    }
}

/// First `max_chars` characters of `s`, respecting char boundaries — the
/// Rust equivalent of the donor's `result.output[:200]` slice.
fn preview(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
