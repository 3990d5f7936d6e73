// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-variable configuration, in the donor's own explicit,
//! fail-fast style (`Config::load`/`Config::from_env` in
//! `crates/daemon/src/lifecycle.rs` and `mofa-gateway/src/main.rs`): every
//! required value is parsed up front and a missing/unparsable one aborts
//! startup with a clear error rather than limping along with a silent
//! default.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tg_adapters::sandbox::SandboxConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("env var {0} is set but not valid: {1}")]
    Invalid(&'static str, String),
    #[error("env var {0} is required when {1} is set")]
    MissingDependent(&'static str, &'static str),
}

/// Planner backend wiring. The hosted backend is always configured — it
/// alone handles self-correction patches (`LocalPlannerAdapter::patch`
/// always errors) — and is also used for the initial plan unless `local`
/// is set, mirroring the original's `use_ollama_for_planning` toggle.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub hosted: HostedPlannerConfig,
    pub local: Option<LocalPlannerConfig>,
}

#[derive(Debug, Clone)]
pub struct HostedPlannerConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct LocalPlannerConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `host:port` the HTTP/WS surface binds to.
    pub bind_addr: String,
    /// Root directory for the WAL/snapshot store.
    pub state_dir: PathBuf,
    /// JSON file backing the memory collaborator (C9).
    pub memory_path: PathBuf,
    pub sandbox: SandboxConfig,
    pub planner: PlannerConfig,
    /// Bearer token required on every request when set; auth is disabled
    /// (development only) when absent.
    pub auth_token: Option<String>,
    /// Tool names the planner is allowed to propose, independent of the
    /// per-request `allowed_tools`/`permissions` the caller supplies.
    pub default_allowed_tools: Vec<String>,
    pub log_path: PathBuf,
}

fn env_var(key: &'static str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env_var(key) {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid(key, v)),
    }
}

impl Config {
    /// Load configuration from the process environment. Fails fast on an
    /// unparsable value instead of silently falling back to a default —
    /// the donor's own `Config::load` convention.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_var("TG_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_env("TG_PORT", 8080)?;
        let bind_addr = format!("{host}:{port}");

        let state_dir = env_var("TG_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/var/lib/task-graph/state"));
        let memory_path = env_var("TG_MEMORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join("memory.json"));
        let log_path = env_var("TG_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join("logs").join("tgd.log"));

        let sandbox = SandboxConfig {
            workspace_dir: env_var("TG_SANDBOX_WORKSPACE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| state_dir.join("workspace")),
            image: env_var("TG_SANDBOX_IMAGE")
                .unwrap_or_else(|| "task-graph/sandbox-runner:latest".to_string()),
            memory_limit: env_var("TG_SANDBOX_MEMORY_LIMIT").unwrap_or_else(|| "512m".to_string()),
            cpu_limit: env_var("TG_SANDBOX_CPU_LIMIT").unwrap_or_else(|| "1.0".to_string()),
            tmpfs_size: env_var("TG_SANDBOX_TMPFS_SIZE").unwrap_or_else(|| "64m".to_string()),
            airgap_network: env_var("TG_SANDBOX_AIRGAP_NETWORK").unwrap_or_else(|| "none".to_string()),
            timeout: Duration::from_secs(parse_env("TG_SANDBOX_TIMEOUT_SECS", 120u64)?),
        };

        let hosted = HostedPlannerConfig {
            base_url: env_var("TG_PLANNER_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            api_key: env_var("TG_PLANNER_API_KEY").unwrap_or_default(),
            model: env_var("TG_PLANNER_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
        };
        let use_local_planner: bool = parse_env("TG_USE_LOCAL_PLANNER", false)?;
        let local = if use_local_planner {
            let base_url = env_var("TG_OLLAMA_BASE_URL")
                .ok_or(ConfigError::MissingDependent("TG_OLLAMA_BASE_URL", "TG_USE_LOCAL_PLANNER"))?;
            let model = env_var("TG_OLLAMA_MODEL").unwrap_or_else(|| "llama3".to_string());
            Some(LocalPlannerConfig { base_url, model })
        } else {
            None
        };
        let planner = PlannerConfig { hosted, local };

        let auth_token = env_var("TG_AUTH_TOKEN");
        let default_allowed_tools = env_var("TG_ALLOWED_TOOLS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_else(|| {
                vec![
                    "web_search",
                    "scraper",
                    "filesystem_read",
                    "filesystem_write",
                    "filesystem_delete",
                    "interpret_code",
                    "shell_exec",
                    "draft_email",
                    "send_email",
                ]
                .into_iter()
                .map(str::to_string)
                .collect()
            });

        Ok(Self {
            bind_addr,
            state_dir,
            memory_path,
            sandbox,
            planner,
            auth_token,
            default_allowed_tools,
            log_path,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
