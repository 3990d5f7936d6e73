//! Argument-validation and connectivity errors that never touch a daemon.

use crate::prelude::*;

#[test]
fn missing_required_argument_is_a_clap_usage_error() {
    cli().args(&["goal", "submit"]).fails().stderr_has("required");
}

#[test]
fn allow_flag_rejects_non_bool_value() {
    cli()
        .args(&["goal", "submit", "do a thing", "--allow", "send_email=maybe"])
        .fails()
        .stderr_has("true|false");
}

#[test]
fn node_approve_rejects_invalid_args_json() {
    cli()
        .env("TG_DAEMON_URL", "http://127.0.0.1:1")
        .args(&["node", "approve", "pln-doesnotmatter", "1", "--args", "{not json"])
        .fails()
        .stderr_has("--args must be valid JSON");
}

#[test]
fn node_rewind_rejects_non_object_args_json() {
    cli()
        .env("TG_DAEMON_URL", "http://127.0.0.1:1")
        .args(&["node", "rewind", "pln-doesnotmatter", "1", "--args", "[1,2,3]"])
        .fails()
        .stderr_has("--args must be a JSON object");
}

#[test]
fn unreachable_daemon_reports_connect_failure_and_exits_nonzero() {
    // Port 1 is a reserved low port nothing in this suite binds to.
    cli()
        .env("TG_DAEMON_URL", "http://127.0.0.1:1")
        .args(&["plan", "list"])
        .fails()
        .stderr_has("could not reach daemon");
}
