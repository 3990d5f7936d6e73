// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg node ...` — resolve a HITL gate (C5 §4.5) or fork a branch off a
//! completed node (C6 §4.6).

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tg_core::PlanId;

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommand,
}

#[derive(Subcommand)]
pub enum NodeCommand {
    /// Approve (or reject) a node awaiting a high-risk approval gate
    Approve {
        /// Plan id
        plan: String,
        /// Node id
        node: u32,
        /// Skip the node instead of approving it
        #[arg(long)]
        reject: bool,
        /// Replace the node's args with this JSON object before running
        #[arg(long = "args")]
        edited_args: Option<String>,
    },
    /// Fork the plan at this node, resetting it and its downstream
    /// closure to pending in a new branch
    Rewind {
        /// Plan id
        plan: String,
        /// Node id
        node: u32,
        /// Replace the node's tool in the branch
        #[arg(long)]
        tool: Option<String>,
        /// Replace the node's args (JSON object) in the branch
        #[arg(long = "args")]
        args: Option<String>,
    },
}

pub async fn handle(command: NodeCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        NodeCommand::Approve { plan, node, reject, edited_args } => {
            let edited_args = edited_args.map(parse_args_json).transpose()?;
            let plan_result =
                client.approve_node(&PlanId::from(plan.as_str()), node, !reject, edited_args).await?;
            format_or_json(format, &plan_result, || {
                let verb = if reject { "Skipped" } else { "Approved" };
                println!("{verb} node {node} in plan {}", plan_result.id);
            })?;
        }

        NodeCommand::Rewind { plan, node, tool, args } => {
            let new_args = args.map(parse_args_json).transpose()?;
            let resp = client.rewind_node(&PlanId::from(plan.as_str()), node, new_args, tool).await?;
            format_or_json(format, &resp, || {
                println!("Branched into {}", resp.plan.id);
                if resp.idempotency_warnings.is_empty() {
                    println!("No idempotency warnings.");
                } else {
                    println!("{}", color::warn("Idempotency warnings:"));
                    for warning in &resp.idempotency_warnings {
                        println!("  - {warning}");
                    }
                }
                println!("Branch is draft; approve with: tg plan approve {}", resp.plan.id);
            })?;
        }
    }
    Ok(())
}

fn parse_args_json(raw: String) -> Result<serde_json::Map<String, serde_json::Value>> {
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("--args must be valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("--args must be a JSON object"),
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
