//! Node-level HITL/rewind routes (C5/C6) against a plan id the daemon has
//! never seen, over a real HTTP round trip.

use crate::prelude::*;

#[test]
fn approving_a_node_on_an_unknown_plan_is_a_404() {
    let daemon = Daemon::start();
    daemon.tg().args(&["node", "approve", "pln-ghost", "1"]).fails().stderr_has("not found");
}

#[test]
fn rewinding_a_node_on_an_unknown_plan_is_a_404() {
    let daemon = Daemon::start();
    daemon
        .tg()
        .args(&["node", "rewind", "pln-ghost", "1", "--tool", "web_search"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn rewind_with_valid_json_args_still_404s_cleanly_on_an_unknown_plan() {
    let daemon = Daemon::start();
    daemon
        .tg()
        .args(&["node", "rewind", "pln-ghost", "1", "--args", "{\"query\": \"rust async\"}"])
        .fails()
        .stderr_has("not found");
}
