// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker-backed [`SandboxAdapter`] — one transient container per node.
//!
//! Grounded on `examples/original_source/AMSAB/backend/core/executor.py`
//! for the contract (container naming, resource caps, network allow-list,
//! timeout-as-exit-124, name-prefix kill) and on the donor daemon's
//! `daemon/src/adapters/agent/docker/mod.rs` for the Rust subprocess idiom
//! (`tokio::process::Command`, line-buffered stdout forwarded to a channel).

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tg_core::{NodeId, PlanId, Tool};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use super::{ExecutionResult, SandboxAdapter, SandboxError};

/// Tools that need outbound network access; everything else runs air-gapped.
const NETWORK_TOOLS: &[&str] = &["web_search", "scraper", "http_request"];

/// Tunables for [`DockerSandboxAdapter`], overridable per deployment.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Host directory each node's per-plan/per-node scratch dir is created under.
    pub workspace_dir: PathBuf,
    /// Docker image the runner script executes inside (must have Python 3).
    pub image: String,
    pub memory_limit: String,
    pub cpu_limit: String,
    pub tmpfs_size: String,
    /// Network mode for tools outside [`NETWORK_TOOLS`].
    pub airgap_network: String,
    pub timeout: Duration,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("/var/lib/task-graph/workspace"),
            image: "task-graph/sandbox-runner:latest".to_string(),
            memory_limit: "512m".to_string(),
            cpu_limit: "1.0".to_string(),
            tmpfs_size: "64m".to_string(),
            airgap_network: "none".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Clone)]
pub struct DockerSandboxAdapter {
    config: SandboxConfig,
}

impl DockerSandboxAdapter {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    fn container_name(plan_id: PlanId, node_id: NodeId) -> String {
        format!("{}-node{}", plan_id.short(8), node_id)
    }

    fn docker_command(&self, plan_id: PlanId, node_id: NodeId, task_dir: &std::path::Path, tool: &Tool) -> Command {
        let network = if NETWORK_TOOLS.contains(&tool.name()) || tool.needs_network() {
            "bridge"
        } else {
            self.config.airgap_network.as_str()
        };
        let mut cmd = Command::new("docker");
        cmd.args(["run", "--rm"])
            .arg("--name")
            .arg(Self::container_name(plan_id, node_id))
            .args(["--network", network])
            .args(["--memory", &self.config.memory_limit])
            .args(["--cpus", &self.config.cpu_limit])
            .arg("--read-only")
            .arg("--tmpfs")
            .arg(format!("/tmp:size={}", self.config.tmpfs_size))
            .arg("-v")
            .arg(format!("{}:/workspace:ro", task_dir.display()))
            .arg("-v")
            .arg(format!("{}:/output:rw", task_dir.display()))
            .args(["-w", "/workspace"])
            .arg(&self.config.image)
            .args(["python3", "runner.py"]);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl SandboxAdapter for DockerSandboxAdapter {
    async fn run_node(
        &self,
        plan_id: PlanId,
        node_id: NodeId,
        tool: &Tool,
        task: &str,
        resolved_args: &serde_json::Map<String, serde_json::Value>,
        timeout: Duration,
        log_tx: UnboundedSender<String>,
    ) -> Result<ExecutionResult, SandboxError> {
        let task_dir = self.config.workspace_dir.join(plan_id.as_str()).join(format!("node_{node_id}"));
        tokio::fs::create_dir_all(&task_dir).await?;

        let script = build_runner_script(tool, resolved_args, task);
        tokio::fs::write(task_dir.join("runner.py"), script).await?;

        let mut cmd = self.docker_command(plan_id, node_id, &task_dir, tool);
        tracing::info!(%plan_id, %node_id, tool = tool.name(), "starting sandbox container");

        let mut child = cmd.spawn()?;
        let stdout = child.stdout.take().expect("piped stdout");
        let stderr = child.stderr.take().expect("piped stderr");

        let mut lines = Vec::new();
        let run = async {
            let mut out_reader = BufReader::new(stdout).lines();
            let mut err_reader = BufReader::new(stderr).lines();
            loop {
                tokio::select! {
                    line = out_reader.next_line() => match line {
                        Ok(Some(l)) => { let _ = log_tx.send(l.clone()); lines.push(l); }
                        Ok(None) => break,
                        Err(_) => break,
                    },
                    line = err_reader.next_line() => match line {
                        Ok(Some(l)) => { let _ = log_tx.send(l.clone()); lines.push(l); }
                        Ok(None) => {}
                        Err(_) => {}
                    },
                }
            }
            child.wait().await
        };

        let exit_code = match tokio::time::timeout(timeout, run).await {
            Ok(Ok(status)) => status.code().unwrap_or(-1),
            Ok(Err(e)) => return Err(SandboxError::Io(e)),
            Err(_) => {
                let line = format!("Timeout after {}s", timeout.as_secs());
                let _ = log_tx.send(line.clone());
                lines.push(line);
                let _ = self.kill_plan(plan_id).await;
                124
            }
        };

        tracing::info!(%plan_id, %node_id, exit_code, "sandbox container finished");
        Ok(ExecutionResult { stdout: lines.join("\n"), exit_code, token_usage: 0 })
    }

    async fn kill_plan(&self, plan_id: PlanId) -> Result<(), SandboxError> {
        let prefix = plan_id.short(8);
        let list = Command::new("docker")
            .args(["ps", "--filter", &format!("name={prefix}"), "--quiet"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await?;
        let ids: Vec<&str> = std::str::from_utf8(&list.stdout)
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        tracing::warn!(%plan_id, containers = ?ids, "kill switch: terminating containers");
        let _ = Command::new("docker")
            .arg("kill")
            .args(&ids)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await?;
        Ok(())
    }
}

/// Assemble the self-contained Python runner script for one tool + its
/// already-resolved arguments. The boilerplate always prints a single JSON
/// envelope so the adapter never has to parse ad hoc stdout; the tool
/// implementations themselves are fixed, one per entry in the tool registry.
fn build_runner_script(
    tool: &Tool,
    args: &serde_json::Map<String, serde_json::Value>,
    task: &str,
) -> String {
    let args_json = serde_json::to_string_pretty(args).unwrap_or_else(|_| "{}".to_string());
    let body = tool_implementation(tool);
    let task = task.replace('\n', " ");
    let tool_name = tool.name();
    let footer = r#"if __name__ == "__main__":
    try:
        result = run(ARGS)
        print(json.dumps({"status": "ok", "output": result}))
    except Exception as exc:
        print(json.dumps({"status": "error", "error": str(exc)}))
        sys.exit(1)
"#;
    format!(
        "# auto-generated sandbox runner\n# task: {task}\n# tool: {tool_name}\nimport json, sys\n\nARGS = {args_json}\n\n{body}\n\n{footer}"
    )
}

fn tool_implementation(tool: &Tool) -> &'static str {
    match tool {
        Tool::WebSearch => {
            r#"def run(args):
    import urllib.request, urllib.parse, ssl, re
    query = urllib.parse.quote_plus(args.get("query", ""))
    url = f"https://lite.duckduckgo.com/lite/?q={query}"
    req = urllib.request.Request(url, headers={"User-Agent": "Mozilla/5.0"})
    ctx = ssl.create_default_context()
    ctx.check_hostname = False
    ctx.verify_mode = ssl.CERT_NONE
    with urllib.request.urlopen(req, timeout=20, context=ctx) as r:
        html = r.read().decode(errors="replace")
    snippets = re.findall(r'class="result-snippet"[^>]*>(.*?)</td>', html, re.DOTALL)
    titles = re.findall(r'class="result-link"[^>]*>(.*?)</a>', html, re.DOTALL)
    if snippets:
        results = []
        for i, (t, s) in enumerate(zip(titles, snippets), 1):
            t_clean = re.sub(r"<[^>]+>", "", t).strip()
            s_clean = re.sub(r"<[^>]+>", "", s).strip()
            results.append(f"{i}. {t_clean}\n   {s_clean}")
        return "\n\n".join(results[:10])
    text = re.sub(r"<[^>]+>", " ", html)
    return re.sub(r"\s+", " ", text).strip()[:4000]
"#
        }
        Tool::Scraper => {
            r#"def run(args):
    import urllib.request, urllib.error, ssl, re
    url = args.get("url", "")
    if not url:
        return "Error: no url provided"
    req = urllib.request.Request(url, headers={"User-Agent": "Mozilla/5.0"})
    ctx = ssl.create_default_context()
    ctx.check_hostname = False
    ctx.verify_mode = ssl.CERT_NONE
    try:
        with urllib.request.urlopen(req, timeout=20, context=ctx) as r:
            html = r.read().decode(errors="replace")
    except urllib.error.URLError as e:
        raise RuntimeError(f"cannot reach {url}: {e}")
    html = re.sub(r"<(script|style)[^>]*>.*?</\1>", "", html, flags=re.DOTALL | re.IGNORECASE)
    text = re.sub(r"<[^>]+>", " ", html)
    return re.sub(r"\s+", " ", text).strip()[:6000]
"#
        }
        Tool::FilesystemRead => {
            r#"def run(args):
    import os
    path = args.get("path", "")
    if not path or not os.path.exists(path):
        return f"File not found: {path}"
    with open(path) as f:
        return f.read()
"#
        }
        Tool::FilesystemWrite => {
            r#"def run(args):
    path = args.get("filename", args.get("path", "output.txt"))
    content = args.get("content", "")
    with open(f"/output/{path}", "w") as f:
        f.write(str(content))
    return f"Written to {path}"
"#
        }
        Tool::FilesystemDelete => {
            r#"def run(args):
    import os
    path = args.get("filename", args.get("path", ""))
    target = f"/output/{path}" if path and not path.startswith("/") else path
    if not target or not os.path.exists(target):
        return f"Nothing to delete at {target}"
    os.remove(target)
    return f"Deleted {target}"
"#
        }
        Tool::InterpretCode => {
            r#"def run(args):
    import io, contextlib
    code = args.get("code", args.get("script", "")).strip()
    if not code:
        return "Error: no code provided in args"
    buf = io.StringIO()
    local_vars = {}
    compiled = compile(code, "<sandbox>", "exec")
    with contextlib.redirect_stdout(buf):
        exec(compiled, local_vars)
    stdout = buf.getvalue().strip()
    return stdout if stdout else "(no output -- add print() calls to your code)"
"#
        }
        Tool::ShellExec => {
            r#"def run(args):
    import subprocess
    command = args.get("command", "")
    if not command:
        return "Error: no command provided"
    proc = subprocess.run(command, shell=True, capture_output=True, text=True, timeout=60)
    out = proc.stdout + proc.stderr
    if proc.returncode != 0:
        raise RuntimeError(f"exit {proc.returncode}: {out[-500:]}")
    return out
"#
        }
        Tool::DraftEmail => {
            r#"def run(args):
    to = args.get("to", "")
    subject = args.get("subject", "")
    body = args.get("body", "")
    return f"[DRAFT] To:{to} Subject:{subject}\n{body}"
"#
        }
        Tool::SendEmail => {
            r#"def run(args):
    to = args.get("to", "")
    subject = args.get("subject", "")
    body = args.get("body", "")
    return f"[SENT] To:{to} Subject:{subject}\n{body}"
"#
        }
        Tool::Remote(_) => {
            r#"def run(args):
    return "[task-graph] remote tools are dispatched through the gateway, not the sandbox."
"#
        }
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
