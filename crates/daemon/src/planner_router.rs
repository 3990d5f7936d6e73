// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hybrid planner routing: the initial plan goes to the local backend when
//! one is configured (cheap, private), self-correction patches always go to
//! the hosted backend — `LocalPlannerAdapter::patch` itself refuses to
//! handle them, so routing the call there would be a guaranteed error, not
//! just a worse answer.

use async_trait::async_trait;
use tg_adapters::{HostedPlannerAdapter, LocalPlannerAdapter, PlanRequest, PlannerAdapter, PlannerError};
use tg_core::{Dag, Patch};

#[derive(Clone)]
pub enum PlannerRouter {
    HostedOnly(HostedPlannerAdapter),
    WithLocal { local: LocalPlannerAdapter, hosted: HostedPlannerAdapter },
}

impl PlannerRouter {
    pub fn hosted_only(hosted: HostedPlannerAdapter) -> Self {
        Self::HostedOnly(hosted)
    }

    pub fn with_local(local: LocalPlannerAdapter, hosted: HostedPlannerAdapter) -> Self {
        Self::WithLocal { local, hosted }
    }
}

#[async_trait]
impl PlannerAdapter for PlannerRouter {
    async fn plan(&self, request: &PlanRequest) -> Result<Dag, PlannerError> {
        match self {
            PlannerRouter::HostedOnly(hosted) => hosted.plan(request).await,
            PlannerRouter::WithLocal { local, .. } => local.plan(request).await,
        }
    }

    async fn patch(&self, node_id: u32, error: &str, dag: &Dag) -> Result<Patch, PlannerError> {
        match self {
            PlannerRouter::HostedOnly(hosted) => hosted.patch(node_id, error, dag).await,
            PlannerRouter::WithLocal { hosted, .. } => hosted.patch(node_id, error, dag).await,
        }
    }
}

#[cfg(test)]
#[path = "planner_router_tests.rs"]
mod tests;
