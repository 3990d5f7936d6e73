// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tg - Task Graph operator CLI
//!
//! A thin HTTP client over the daemon's REST surface (C8): submit goals,
//! approve/kill plans, resolve HITL gates, rewind branches, and inspect
//! the memory collaborator and remote-tool gateway.

mod client;
mod color;
mod commands;
mod exit_error;
mod output;
mod table;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use client::DaemonClient;
use commands::{goal, mcp, memory, node, plan};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "tg", version, about = "Task Graph - an autonomous task-graph orchestrator CLI")]
struct Cli {
    /// Daemon base URL
    #[arg(long, env = "TG_DAEMON_URL", default_value = "http://127.0.0.1:8080", global = true)]
    daemon_url: String,

    /// Bearer token; required when the daemon enforces TG_AUTH_TOKEN
    #[arg(long, env = "TG_AUTH_TOKEN", global = true)]
    token: Option<String>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a natural-language goal to the planner
    Goal(goal::GoalArgs),
    /// Inspect and drive plans
    Plan(plan::PlanArgs),
    /// Resolve HITL gates and rewind branches
    Node(node::NodeArgs),
    /// Inspect/seed/wipe the memory collaborator
    Memory(memory::MemoryArgs),
    /// Manage remote-tool gateway servers
    Mcp(mcp::McpArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |err| err.code);
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(code);
    }
}

/// Render an anyhow error, skipping a redundant source chain when the
/// top-level Display already contains every cause's text (common for
/// `thiserror` variants built with `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {i}: {cause}"));
    }
    buf
}

async fn run() -> Result<()> {
    let matches = Cli::command().styles(color::styles()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let format = cli.output;
    let client = DaemonClient::new(cli.daemon_url, cli.token);

    match cli.command {
        Commands::Goal(args) => goal::handle(args.command, &client, format).await,
        Commands::Plan(args) => plan::handle(args.command, &client, format).await,
        Commands::Node(args) => node::handle(args.command, &client, format).await,
        Commands::Memory(args) => memory::handle(args.command, &client, format).await,
        Commands::Mcp(args) => mcp::handle(args.command, &client, format).await,
    }
}
