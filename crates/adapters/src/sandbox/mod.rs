// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox Executor (C3): runs a single node inside a disposable container.

mod docker;

pub use docker::{DockerSandboxAdapter, SandboxConfig};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tg_core::{NodeId, PlanId, Tool};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sandbox setup failed: {0}")]
    Setup(String),
}

/// Result of running one node to completion (including a non-zero exit).
/// Timeouts are represented as `exit_code: 124`, matching a shell's own
/// convention — not as an `Err`, since a timed-out node is a normal
/// (failed) execution outcome, not an adapter malfunction.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub stdout: String,
    pub exit_code: i32,
    pub token_usage: u64,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Per-node disposable container lifecycle: resource caps, read-only root
/// fs, tool-scoped network allow-list, wall-clock timeout, targeted kill.
#[async_trait]
pub trait SandboxAdapter: Clone + Send + Sync + 'static {
    /// Run one node to completion. `resolved_args` has already been through
    /// the Argument Resolver — placeholders are substituted. Every stdout
    /// line is forwarded to `log_tx` as it is produced.
    async fn run_node(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        tool: &Tool,
        task: &str,
        resolved_args: &serde_json::Map<String, serde_json::Value>,
        timeout: Duration,
        log_tx: UnboundedSender<String>,
    ) -> Result<ExecutionResult, SandboxError>;

    /// Terminate every container belonging to `plan_id`, by name-prefix match.
    async fn kill_plan(&self, plan_id: PlanId) -> Result<(), SandboxError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// A scripted response for one (tool, task) pair, falling back to the
    /// adapter-wide default when no specific script matches.
    #[derive(Clone)]
    pub struct ScriptedRun {
        pub result: Result<ExecutionResult, String>,
        pub lines: Vec<String>,
    }

    struct State {
        default: ScriptedRun,
        by_node: HashMap<(PlanId, NodeId), ScriptedRun>,
        killed: Vec<PlanId>,
        calls: Vec<(PlanId, NodeId, String)>,
    }

    /// In-memory fake sandbox for engine tests: no containers, no
    /// processes — just programmable per-node results.
    #[derive(Clone)]
    pub struct FakeSandboxAdapter {
        inner: Arc<Mutex<State>>,
    }

    impl Default for FakeSandboxAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(State {
                    default: ScriptedRun {
                        result: Ok(ExecutionResult {
                            stdout: "ok".into(),
                            exit_code: 0,
                            token_usage: 1,
                        }),
                        lines: vec!["ok".into()],
                    },
                    by_node: HashMap::new(),
                    killed: Vec::new(),
                    calls: Vec::new(),
                })),
            }
        }
    }

    impl FakeSandboxAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_default_success(&self, stdout: impl Into<String>) {
            let stdout = stdout.into();
            let mut inner = self.inner.lock();
            inner.default = ScriptedRun {
                result: Ok(ExecutionResult { stdout: stdout.clone(), exit_code: 0, token_usage: 1 }),
                lines: vec![stdout],
            };
        }

        pub fn script_node(
            &self,
            plan_id: PlanId,
            node_id: NodeId,
            result: Result<ExecutionResult, String>,
            lines: Vec<String>,
        ) {
            self.inner.lock().by_node.insert((plan_id, node_id), ScriptedRun { result, lines });
        }

        pub fn fail_node(&self, plan_id: PlanId, node_id: NodeId, stdout: impl Into<String>) {
            let stdout = stdout.into();
            self.script_node(
                plan_id,
                node_id,
                Ok(ExecutionResult { stdout: stdout.clone(), exit_code: 1, token_usage: 0 }),
                vec![stdout],
            );
        }

        pub fn killed_plans(&self) -> Vec<PlanId> {
            self.inner.lock().killed.clone()
        }

        pub fn calls(&self) -> Vec<(PlanId, NodeId, String)> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl SandboxAdapter for FakeSandboxAdapter {
        async fn run_node(
            &self,
            plan_id: PlanId,
            node_id: NodeId,
            tool: &Tool,
            _task: &str,
            _resolved_args: &serde_json::Map<String, serde_json::Value>,
            _timeout: Duration,
            log_tx: UnboundedSender<String>,
        ) -> Result<ExecutionResult, SandboxError> {
            let scripted = {
                let mut inner = self.inner.lock();
                inner.calls.push((plan_id, node_id, tool.name().to_string()));
                inner
                    .by_node
                    .get(&(plan_id, node_id))
                    .cloned()
                    .unwrap_or_else(|| inner.default.clone())
            };
            for line in &scripted.lines {
                let _ = log_tx.send(line.clone());
            }
            scripted.result.map_err(SandboxError::Setup)
        }

        async fn kill_plan(&self, plan_id: PlanId) -> Result<(), SandboxError> {
            self.inner.lock().killed.push(plan_id);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSandboxAdapter, ScriptedRun};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
