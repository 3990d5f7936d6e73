// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg goal submit` — the entry point that hands a natural-language goal
//! to the Planner Adapter and gets back a `draft` plan.

use std::collections::HashMap;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct GoalArgs {
    #[command(subcommand)]
    pub command: GoalCommand,
}

#[derive(Subcommand)]
pub enum GoalCommand {
    /// Submit a natural-language goal; returns a draft plan for review
    Submit {
        /// The goal text, e.g. "summarize the top 3 HN posts about Rust"
        goal: String,
        /// Tool names the planner may use (repeatable); defaults to the
        /// daemon's configured allow-list when omitted
        #[arg(long = "tool")]
        tools: Vec<String>,
        /// Permission override in key=true|false form (repeatable)
        #[arg(long = "allow", value_parser = parse_permission)]
        allow: Vec<(String, bool)>,
    },
}

pub async fn handle(command: GoalCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        GoalCommand::Submit { goal, tools, allow } => {
            let permissions: HashMap<String, bool> = allow.into_iter().collect();
            let plan = client.submit_goal(goal, tools, permissions).await?;
            format_or_json(format, &plan, || {
                println!("{} {}", color::header("Plan:"), plan.id);
                println!("{} {}", color::context("Status:"), color::status(&plan.status.to_string()));
                println!("{} {}", color::context("Nodes: "), plan.dag.nodes.len());
                println!();
                println!("Approve with: tg plan approve {}", plan.id);
            })?;
        }
    }
    Ok(())
}

/// Parse a `key=true|false` pair for `--allow`.
fn parse_permission(s: &str) -> Result<(String, bool), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=true|false, got {s:?}"))?;
    let parsed = value
        .parse::<bool>()
        .map_err(|_| format!("expected true|false for {key:?}, got {value:?}"))?;
    Ok((key.to_string(), parsed))
}

#[cfg(test)]
#[path = "goal_tests.rs"]
mod tests;
