// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tg mcp ...` — register/inspect remote-tool gateway servers (C10).

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Args)]
pub struct McpArgs {
    #[command(subcommand)]
    pub command: McpCommand,
}

#[derive(Subcommand)]
pub enum McpCommand {
    /// Register a remote-tool gateway server
    Register {
        /// Server name, used as the `remote` tool's namespace
        name: String,
        /// JSON-RPC base URL
        base_url: String,
        /// Bearer token sent on every call to this server
        #[arg(long, default_value = "")]
        api_key: String,
        /// Per-call timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// List registered server names
    List {},
    /// List the tools a registered server exposes (`tools/list`)
    Tools {
        /// Server name
        server: String,
    },
}

pub async fn handle(command: McpCommand, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match command {
        McpCommand::Register { name, base_url, api_key, timeout_secs } => {
            client.register_mcp_server(name.clone(), base_url, api_key, timeout_secs).await?;
            println!("Registered server {name}");
        }

        McpCommand::List {} => {
            let servers = client.list_mcp_servers().await?;
            handle_list(format, &servers, "No registered servers", |items| {
                for name in items {
                    println!("{name}");
                }
            })?;
        }

        McpCommand::Tools { server } => {
            let tools = client.list_mcp_tools(&server).await?;
            handle_list(format, &tools, "No tools reported", |items| {
                for t in items {
                    println!("{} - {}", t.name, t.description);
                }
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod tests;
