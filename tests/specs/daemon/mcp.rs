//! Remote-Tool Gateway admin surface (C10): registration is local
//! bookkeeping (no network call), while listing a server's tools makes a
//! real JSON-RPC call and so surfaces a connection failure against a
//! closed port, just like goal submission does against the planner.

use crate::prelude::*;

#[test]
fn register_then_list_shows_the_server_name() {
    let daemon = Daemon::start();
    daemon
        .tg()
        .args(&["mcp", "register", "search", "http://127.0.0.1:1", "--api-key", "k"])
        .passes()
        .stdout_has("Registered server search");

    daemon.tg().args(&["mcp", "list"]).passes().stdout_has("search");
}

#[test]
fn mcp_list_is_empty_before_any_registration() {
    let daemon = Daemon::start();
    daemon.tg().args(&["mcp", "list"]).passes().stdout_has("No registered servers");
}

#[test]
fn listing_tools_of_an_unreachable_server_fails_cleanly() {
    let daemon = Daemon::start();
    daemon.tg().args(&["mcp", "register", "dead", "http://127.0.0.1:1"]).passes();
    daemon.tg().args(&["mcp", "tools", "dead"]).fails();
}

#[test]
fn listing_tools_of_an_unregistered_server_is_a_404() {
    let daemon = Daemon::start();
    daemon.tg().args(&["mcp", "tools", "ghost"]).fails().stderr_has("404");
}
