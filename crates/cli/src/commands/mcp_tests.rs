// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;

#[derive(Parser)]
struct Harness {
    #[command(subcommand)]
    command: McpCommand,
}

#[test]
fn register_defaults_api_key_to_empty() {
    let harness = Harness::try_parse_from(["tg", "register", "search", "http://localhost:9000"]).unwrap();
    match harness.command {
        McpCommand::Register { name, base_url, api_key, timeout_secs } => {
            assert_eq!(name, "search");
            assert_eq!(base_url, "http://localhost:9000");
            assert_eq!(api_key, "");
            assert_eq!(timeout_secs, None);
        }
        _ => panic!("expected Register"),
    }
}
