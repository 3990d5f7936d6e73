//! Shared fixtures for black-box specifications: spawn the real `tgd`
//! daemon binary, drive it with the real `tg` CLI binary, assert on
//! stdout/stderr/exit codes. No route or engine behavior is mocked; the
//! planner backend is pointed at a closed local port so tests exercise the
//! documented "planner unreachable" error path instead of requiring
//! network access or API credentials.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Returns the path to a workspace binary, preferring the directory the
/// test binary itself was built into (works under `cargo test` and
/// `cargo llvm-cov` alike).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

fn tg_binary() -> PathBuf {
    binary_path("tg")
}

fn tgd_binary() -> PathBuf {
    binary_path("tgd")
}

/// Bind an ephemeral port, then release it. There is a brief race between
/// release and the daemon binding the same port; `Daemon::start` retries
/// its readiness probe to ride that out.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Issue a bare HTTP/1.1 GET and return `(status_code, body)`. Used only
/// for liveness polling against `/health` and `/ready`, which take no
/// auth and return small JSON bodies.
pub fn http_get(addr: SocketAddr, path: &str) -> std::io::Result<(u16, String)> {
    let mut stream = TcpStream::connect_timeout(&addr, Duration::from_millis(200))?;
    stream.set_read_timeout(Some(Duration::from_millis(500)))?;
    write!(stream, "GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n")?;
    let mut buf = String::new();
    stream.read_to_string(&mut buf)?;
    let status = buf
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);
    let body = buf.split("\r\n\r\n").nth(1).unwrap_or("").to_string();
    Ok((status, body))
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F: FnMut() -> bool>(timeout_ms: u64, mut condition: F) -> bool {
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
    }
    false
}

/// A running `tgd` instance bound to a private state dir and an ephemeral
/// port, with its planner pointed at a closed port so goal submission
/// deterministically fails with a 502 rather than hanging on a real
/// network call. Killed on drop.
pub struct Daemon {
    child: Child,
    addr: SocketAddr,
    pub token: String,
    _state_dir: tempfile::TempDir,
}

impl Daemon {
    /// Start a daemon with no auth token configured.
    pub fn start() -> Self {
        Self::start_with_token(None)
    }

    /// Start a daemon that requires the given bearer token on `/api`.
    pub fn start_with_token(token: Option<&str>) -> Self {
        let state_dir = tempfile::tempdir().expect("tempdir");
        let port = free_port();
        let dead_planner_port = free_port();
        let addr: SocketAddr = format!("127.0.0.1:{port}").parse().expect("addr");
        let token = token.map(str::to_string).unwrap_or_default();

        let mut cmd = Command::new(tgd_binary());
        cmd.env("TG_HOST", "127.0.0.1")
            .env("TG_PORT", port.to_string())
            .env("TG_STATE_DIR", state_dir.path())
            .env("TG_PLANNER_BASE_URL", format!("http://127.0.0.1:{dead_planner_port}"))
            .env("TG_USE_LOCAL_PLANNER", "false")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if token.is_empty() {
            cmd.env_remove("TG_AUTH_TOKEN");
        } else {
            cmd.env("TG_AUTH_TOKEN", &token);
        }

        let child = cmd.spawn().expect("tgd should spawn");
        let daemon = Self { child, addr, token, _state_dir: state_dir };

        let ready = wait_for(SPEC_WAIT_MAX_MS, || http_get(daemon.addr, "/health").map(|(s, _)| s == 200).unwrap_or(false));
        assert!(ready, "tgd did not become healthy in time");
        daemon
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// A `tg` invocation pre-wired to this daemon's URL and token.
    pub fn tg(&self) -> CliBuilder {
        cli().env("TG_DAEMON_URL", &self.url()).env_opt("TG_AUTH_TOKEN", non_empty(&self.token))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Fluent builder for `tg` invocations.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
    clear_envs: Vec<String>,
}

impl CliBuilder {
    fn new() -> Self {
        Self { args: Vec::new(), envs: Vec::new(), clear_envs: vec!["TG_DAEMON_URL".into(), "TG_AUTH_TOKEN".into()] }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string()));
        self
    }

    fn env_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.env(key, v),
            None => self,
        }
    }

    fn command(self) -> Command {
        let mut cmd = Command::new(tg_binary());
        cmd.args(&self.args);
        for key in &self.clear_envs {
            cmd.env_remove(key);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("tg should run");
        assert!(
            output.status.success(),
            "expected tg to pass, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("tg should run");
        assert!(
            !output.status.success(),
            "expected tg to fail, but it passed\nstdout: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain {expected:?}\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain {expected:?}\nstderr: {stderr}");
        self
    }
}
