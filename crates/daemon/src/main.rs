// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Graph Daemon (tgd)
//!
//! Owns the event-sourced plan store, the scheduling executor, and the
//! HTTP/WS surface the CLI and any other client talk to.

mod config;
mod error;
mod planner_router;
mod routes;
mod state;

use std::path::Path;

use tg_adapters::{DockerSandboxAdapter, HostedPlannerAdapter, JsonFileMemoryAdapter, LocalPlannerAdapter, McpGatewayAdapter};
use tg_core::SystemClock;
use tg_engine::{EventBus, Executor};
use tg_storage::Store;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::config::Config;
use crate::planner_router::PlannerRouter;
use crate::state::AppState;

fn setup_logging(log_path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("tgd.log"));
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let _log_guard = setup_logging(&config.log_path)?;

    info!(bind_addr = %config.bind_addr, state_dir = %config.state_dir.display(), "starting task graph daemon");

    std::fs::create_dir_all(&config.state_dir)?;
    let store = Store::open(&config.state_dir)?;
    let bus = EventBus::new(store.clone());

    let sandbox = DockerSandboxAdapter::new(config.sandbox.clone());
    let hosted = HostedPlannerAdapter::new(
        config.planner.hosted.base_url.clone(),
        config.planner.hosted.api_key.clone(),
        config.planner.hosted.model.clone(),
    );
    let planner = match &config.planner.local {
        Some(local) => {
            let local_adapter = LocalPlannerAdapter::new(local.base_url.clone(), local.model.clone());
            PlannerRouter::with_local(local_adapter, hosted)
        }
        None => PlannerRouter::hosted_only(hosted),
    };
    let memory = JsonFileMemoryAdapter::new(config.memory_path.clone());
    let gateway = McpGatewayAdapter::new(Vec::new());
    let clock = SystemClock;

    let executor =
        Executor::new(store.clone(), bus.clone(), sandbox, planner.clone(), memory.clone(), gateway.clone(), clock.clone());

    let state = AppState {
        store,
        bus,
        executor,
        memory,
        gateway,
        planner,
        clock,
        default_allowed_tools: config.default_allowed_tools.clone(),
        auth_token: config.auth_token.clone(),
    };

    let router = routes::build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("task graph daemon shut down cleanly");
    Ok(())
}

/// Waits for SIGTERM or Ctrl-C, whichever comes first — mirroring the
/// donor's own `Arc<Notify>`-driven shutdown, minus the cross-task fan-out
/// this process doesn't need (axum's graceful shutdown future is the only
/// consumer).
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received sigterm, shutting down"),
    }
}
