// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenAI-compatible hosted backend for the Planner Adapter. Used for the
//! initial plan when local routing is disabled, and always for
//! self-correction patches — patch reasoning is judged not worth routing
//! to the cheaper local model.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tg_core::{Dag, Patch};

use super::{PlanRequest, PlannerAdapter, PlannerError};

const SYSTEM_PROMPT: &str = include_str!("system_prompt.txt");

#[derive(Clone)]
pub struct HostedPlannerAdapter {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HostedPlannerAdapter {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("reqwest client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn chat_json(&self, user_content: String) -> Result<String, PlannerError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_content},
            ],
            "response_format": {"type": "json_object"},
            "temperature": 0.2,
        });
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlannerError::Timeout
                } else {
                    PlannerError::Unreachable(url.clone(), e.to_string())
                }
            })?;
        let value: serde_json::Value = resp.json().await?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PlannerError::InvalidJson("missing choices[0].message.content".to_string()))
    }
}

#[async_trait]
impl PlannerAdapter for HostedPlannerAdapter {
    async fn plan(&self, request: &PlanRequest) -> Result<Dag, PlannerError> {
        let enabled: Vec<&str> =
            request.permissions.iter().filter(|(_, v)| **v).map(|(k, _)| k.as_str()).collect();
        let disabled: Vec<&str> =
            request.permissions.iter().filter(|(_, v)| !**v).map(|(k, _)| k.as_str()).collect();
        let user_content = format!(
            "Goal: {}\n\nAvailable tools: [{}]\nEnabled permissions: {}. Disabled: {}. Do not include tools that require disabled permissions.",
            request.goal,
            request.allowed_tools.join(", "),
            enabled.join(", "),
            disabled.join(", "),
        );
        let raw = self.chat_json(user_content).await?;
        serde_json::from_str(&raw).map_err(|e| PlannerError::InvalidJson(e.to_string()))
    }

    async fn patch(&self, node_id: u32, error: &str, dag: &Dag) -> Result<Patch, PlannerError> {
        let dag_json =
            serde_json::to_string_pretty(dag).map_err(|e| PlannerError::InvalidJson(e.to_string()))?;
        let user_content = format!(
            "Node ID {node_id} failed with error: '{error}'.\n\
             Current graph:\n{dag_json}\n\n\
             Provide a Patch JSON with patch_nodes (retry|bypass|replace) and optional new_nodes."
        );
        let raw = self.chat_json(user_content).await?;
        serde_json::from_str(&raw).map_err(|e| PlannerError::InvalidJson(e.to_string()))
    }
}
