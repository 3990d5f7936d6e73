// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg memory ...` — inspect/seed/wipe the memory collaborator (C9): a
//! plan's breadcrumb trail plus the long-term fact store shared across
//! every plan.

use anyhow::Result;
use clap::{Args, Subcommand};
use tg_core::PlanId;

use crate::client::DaemonClient;
use crate::color;
use crate::output::{format_or_json, format_time_ago, handle_list, OutputFormat};

#[derive(Args)]
pub struct MemoryArgs {
    #[command(subcommand)]
    pub command: MemoryCommand,
}

#[derive(Subcommand)]
pub enum MemoryCommand {
    /// Show a plan's breadcrumb trail
    Session {
        /// Plan id
        plan: String,
    },
    /// Wipe a plan's breadcrumb trail
    WipeSession {
        /// Plan id
        plan: String,
    },
    /// Seed a long-term fact
    Remember {
        key: String,
        value: String,
        #[arg(long, default_value = "general")]
        category: String,
    },
    /// Recall facts by keyword overlap
    Recall {
        query: String,
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
    /// Wipe every long-term fact and every plan's breadcrumb trail
    WipeAll {},
    /// Short-term vs. long-term entry counts
    Stats {},
}

pub async fn handle(command: MemoryCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        MemoryCommand::Session { plan } => {
            let resp = client.session_memory(&PlanId::from(plan.as_str())).await?;
            format_or_json(format, &resp, || {
                if resp.breadcrumbs.is_empty() {
                    println!("No breadcrumbs recorded for this plan");
                    return;
                }
                for b in &resp.breadcrumbs {
                    println!(
                        "{} node {} [{}]: {}",
                        color::muted(&format_time_ago(b.ts_ms)),
                        b.node_id,
                        b.tool,
                        b.output
                    );
                }
            })?;
        }

        MemoryCommand::WipeSession { plan } => {
            let resp = client.wipe_session_memory(&PlanId::from(plan.as_str())).await?;
            format_or_json(format, &resp, || {
                println!("Wiped {} breadcrumb(s) for {}", resp.wiped, resp.plan_id);
            })?;
        }

        MemoryCommand::Remember { key, value, category } => {
            client.remember(key.clone(), value, category).await?;
            println!("Remembered {key}");
        }

        MemoryCommand::Recall { query, limit } => {
            let resp = client.recall(&query, limit).await?;
            handle_list(format, &resp.results, "No matches", |items| {
                for r in items {
                    println!("[{:.2}] ({}) {} = {}", r.score, r.category, r.key, r.value);
                }
            })?;
        }

        MemoryCommand::WipeAll {} => {
            client.wipe_all_memory().await?;
            println!("Wiped all memory.");
        }

        MemoryCommand::Stats {} => {
            let stats = client.memory_stats().await?;
            format_or_json(format, &stats, || {
                println!("{} {}", color::context("Short-term breadcrumbs:"), stats.short_term);
                println!("{} {}", color::context("Long-term facts:      "), stats.long_term);
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
