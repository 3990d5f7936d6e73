//! `--help` renders every top-level subcommand, with no daemon required.

use crate::prelude::*;

#[test]
fn top_level_help_lists_all_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("goal")
        .stdout_has("plan")
        .stdout_has("node")
        .stdout_has("memory")
        .stdout_has("mcp");
}

#[test]
fn goal_submit_help_documents_repeatable_flags() {
    cli()
        .args(&["goal", "submit", "--help"])
        .passes()
        .stdout_has("--tool")
        .stdout_has("--allow");
}

#[test]
fn node_rewind_help_documents_branch_flags() {
    cli()
        .args(&["node", "rewind", "--help"])
        .passes()
        .stdout_has("--tool")
        .stdout_has("--args");
}

#[test]
fn unknown_subcommand_fails_with_clap_usage_error() {
    cli().args(&["frobnicate"]).fails().stderr_has("unrecognized subcommand");
}
