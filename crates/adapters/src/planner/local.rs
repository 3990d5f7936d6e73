// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ollama-compatible local backend for the Planner Adapter — cheap, private
//! task extraction when `use_local_planner` is enabled. Self-correction
//! patches always go through [`super::HostedPlannerAdapter`] instead; local
//! models aren't trusted with that harder reasoning step.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tg_core::{Dag, Patch};

use super::{PlanRequest, PlannerAdapter, PlannerError};

const SYSTEM_PROMPT: &str = include_str!("system_prompt.txt");

#[derive(Clone)]
pub struct LocalPlannerAdapter {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl LocalPlannerAdapter {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(180))
                .build()
                .expect("reqwest client"),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl PlannerAdapter for LocalPlannerAdapter {
    async fn plan(&self, request: &PlanRequest) -> Result<Dag, PlannerError> {
        let enabled: Vec<&str> =
            request.permissions.iter().filter(|(_, v)| **v).map(|(k, _)| k.as_str()).collect();
        let user_content = format!(
            "Goal: {}\n\nAvailable tools: [{}]\nEnabled permissions: {}.",
            request.goal,
            request.allowed_tools.join(", "),
            enabled.join(", "),
        );
        let prompt = format!("{SYSTEM_PROMPT}\n\nUser: {user_content}\n\nOutput JSON:");
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "format": "json",
        });
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let resp = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                PlannerError::Timeout
            } else {
                PlannerError::Unreachable(url.clone(), e.to_string())
            }
        })?;
        let value: serde_json::Value = resp.json().await?;
        let raw = value["response"].as_str().unwrap_or("{}");
        serde_json::from_str(raw).map_err(|e| PlannerError::InvalidJson(e.to_string()))
    }

    async fn patch(&self, _node_id: u32, _error: &str, _dag: &Dag) -> Result<Patch, PlannerError> {
        Err(PlannerError::InvalidJson(
            "local planner does not support self-correction patches, route to the hosted adapter"
                .to_string(),
        ))
    }
}
