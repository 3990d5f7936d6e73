// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg plan ...` — list/show/approve/kill a plan, tail its log store.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use tg_core::{Plan, PlanId};

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_or_json, format_time_ago, handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct PlanArgs {
    #[command(subcommand)]
    pub command: PlanCommand,
}

#[derive(Subcommand)]
pub enum PlanCommand {
    /// List all plans, newest first
    List {},
    /// Show a single plan's DAG and node statuses
    Show {
        /// Plan id
        id: String,
    },
    /// Approve a draft plan, starting the scheduling loop
    Approve {
        /// Plan id
        id: String,
    },
    /// Kill a running plan; in-flight containers are terminated by name prefix
    Kill {
        /// Plan id
        id: String,
    },
    /// Print the plan's append-only log store
    Logs {
        /// Plan id
        id: String,
    },
}

pub async fn handle(command: PlanCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        PlanCommand::List {} => {
            let plans = client.list_plans().await?;
            handle_list(format, &plans, "No plans", |items| {
                format_plan_list(&mut std::io::stdout(), items)
            })?;
        }

        PlanCommand::Show { id } => {
            let plan = client.get_plan(&PlanId::from(id.as_str())).await?;
            format_or_json(format, &plan, || format_plan_detail(&mut std::io::stdout(), &plan))?;
        }

        PlanCommand::Approve { id } => {
            let plan = client.approve_plan(&PlanId::from(id.as_str())).await?;
            format_or_json(format, &plan, || {
                println!("Approved {} -> {}", plan.id, color::status(&plan.status.to_string()));
            })?;
        }

        PlanCommand::Kill { id } => {
            let resp = client.kill_plan(&PlanId::from(id.as_str())).await?;
            format_or_json(format, &resp, || {
                println!("Killed {}", resp.plan_id);
            })?;
        }

        PlanCommand::Logs { id } => {
            let logs = client.get_logs(&PlanId::from(id.as_str())).await?;
            handle_list(format, &logs, "No log entries", |items| {
                for line in items {
                    let node = line.node_id.map(|n| format!("node {n}")).unwrap_or_else(|| "plan".to_string());
                    println!(
                        "{} [{}] {}: {}",
                        color::muted(&format_time_ago(line.at_ms)),
                        line.level,
                        node,
                        line.message
                    );
                }
            })?;
        }
    }
    Ok(())
}

fn format_plan_list(out: &mut impl Write, plans: &[Plan]) {
    let cols = vec![
        Column::muted("ID").with_max(23),
        Column::status("STATUS"),
        Column::right("NODES"),
        Column::left("AGE"),
        Column::left("GOAL").with_max(60),
    ];
    let mut table = Table::new(cols);
    for plan in plans {
        table.row(vec![
            plan.id.to_string(),
            plan.status.to_string(),
            plan.dag.nodes.len().to_string(),
            format_time_ago(plan.created_at_ms),
            plan.goal.clone(),
        ]);
    }
    table.render(out);
}

fn format_plan_detail(out: &mut impl Write, plan: &Plan) {
    let _ = writeln!(out, "{} {}", color::header("Plan:"), plan.id);
    let _ = writeln!(out, "{} {}", color::context("Goal:  "), plan.goal);
    let _ = writeln!(out, "{} {}", color::context("Status:"), color::status(&plan.status.to_string()));
    if let Some(ref parent) = plan.parent {
        let _ = writeln!(out, "{} {}", color::context("Parent:"), parent);
    }
    let _ = writeln!(out, "{} {}", color::context("Age:   "), format_time_ago(plan.created_at_ms));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", color::header("Nodes:"));

    let cols = vec![
        Column::right("ID"),
        Column::status("STATUS"),
        Column::risk("RISK"),
        Column::left("TOOL"),
        Column::left("TASK").with_max(50),
    ];
    let mut table = Table::new(cols);
    for node in &plan.dag.nodes {
        let risk = if node.risk_level == tg_core::RiskLevel::High { "high" } else { "low" };
        table.row(vec![
            node.id.to_string(),
            node.status.to_string(),
            risk.to_string(),
            node.tool.name().to_string(),
            node.task.clone(),
        ]);
    }
    table.render(out);
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
