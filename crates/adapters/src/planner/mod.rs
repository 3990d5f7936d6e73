// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Planner Adapter (C7): the LLM seam that turns a goal into a [`Dag`] and,
//! on node failure, into a self-correction [`Patch`]. Hybrid routing — a
//! local model for cheap planning, a hosted model for the harder
//! self-correction call — mirrors the real collaborator's own split.

mod hosted;
mod local;

pub use hosted::HostedPlannerAdapter;
pub use local::LocalPlannerAdapter;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tg_core::{Dag, Patch};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("cannot reach planner backend at {0}: {1}")]
    Unreachable(String, String),
    #[error("planner request timed out")]
    Timeout,
    #[error("planner returned invalid JSON: {0}")]
    InvalidJson(String),
    #[error("planner http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Everything the planner needs to turn a goal into a graph: the goal
/// itself, the tool registry available to it, and which permissions the
/// operator has enabled (tools gated on a disabled permission must be
/// left out of the plan).
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub goal: String,
    pub allowed_tools: Vec<String>,
    pub permissions: HashMap<String, bool>,
}

/// Goal-to-graph planner plus failure-driven self-correction. Implementations
/// return the raw LLM output only — sanitisation against known hallucination
/// patterns happens downstream in the engine, not here, so the adapter stays
/// a thin transport seam.
#[async_trait]
pub trait PlannerAdapter: Clone + Send + Sync + 'static {
    async fn plan(&self, request: &PlanRequest) -> Result<Dag, PlannerError>;

    async fn patch(&self, node_id: u32, error: &str, dag: &Dag) -> Result<Patch, PlannerError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct State {
        plan_result: Result<Dag, String>,
        patch_result: Result<Patch, String>,
        plan_calls: Vec<PlanRequest>,
        patch_calls: Vec<(u32, String)>,
    }

    /// Scripted planner for engine tests: no network calls, one programmable
    /// plan response and one programmable patch response.
    #[derive(Clone)]
    pub struct FakePlannerAdapter {
        inner: Arc<Mutex<State>>,
    }

    impl Default for FakePlannerAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(State {
                    plan_result: Ok(Dag::new("", "", vec![])),
                    patch_result: Ok(Patch::default()),
                    plan_calls: Vec::new(),
                    patch_calls: Vec::new(),
                })),
            }
        }
    }

    impl FakePlannerAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_plan(&self, dag: Dag) {
            self.inner.lock().plan_result = Ok(dag);
        }

        pub fn fail_plan(&self, error: impl Into<String>) {
            self.inner.lock().plan_result = Err(error.into());
        }

        pub fn set_patch(&self, patch: Patch) {
            self.inner.lock().patch_result = Ok(patch);
        }

        pub fn plan_calls(&self) -> usize {
            self.inner.lock().plan_calls.len()
        }

        pub fn patch_calls(&self) -> Vec<(u32, String)> {
            self.inner.lock().patch_calls.clone()
        }
    }

    #[async_trait]
    impl PlannerAdapter for FakePlannerAdapter {
        async fn plan(&self, request: &PlanRequest) -> Result<Dag, PlannerError> {
            let mut inner = self.inner.lock();
            inner.plan_calls.push(request.clone());
            inner.plan_result.clone().map_err(PlannerError::InvalidJson)
        }

        async fn patch(&self, node_id: u32, error: &str, _dag: &Dag) -> Result<Patch, PlannerError> {
            let mut inner = self.inner.lock();
            inner.patch_calls.push((node_id, error.to_string()));
            inner.patch_result.clone().map_err(PlannerError::InvalidJson)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePlannerAdapter;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
