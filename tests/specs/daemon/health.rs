//! Liveness/readiness endpoints and a real `tg plan list` round trip
//! against a freshly booted, empty daemon.

use crate::prelude::*;

#[test]
fn health_is_always_ok() {
    let daemon = Daemon::start();
    let (status, body) = http_get(daemon.addr(), "/health").unwrap();
    assert_eq!(status, 200);
    assert!(body.contains("\"status\":\"ok\""), "body: {body}");
}

#[test]
fn ready_reports_zero_plans_on_a_fresh_store() {
    let daemon = Daemon::start();
    let (status, body) = http_get(daemon.addr(), "/ready").unwrap();
    assert_eq!(status, 200);
    assert!(body.contains("\"plans\":0"), "body: {body}");
}

#[test]
fn plan_list_is_empty_on_a_fresh_daemon() {
    let daemon = Daemon::start();
    daemon.tg().args(&["plan", "list"]).passes().stdout_has("No plans");
}

#[test]
fn plan_list_json_renders_an_empty_array() {
    let daemon = Daemon::start();
    let run = daemon.tg().args(&["-o", "json", "plan", "list"]).passes();
    similar_asserts::assert_eq!(run.stdout(), "[]\n");
}

#[test]
fn plan_show_on_unknown_id_surfaces_a_404() {
    let daemon = Daemon::start();
    daemon.tg().args(&["plan", "show", "pln-nonexistent"]).fails().stderr_has("not found");
}
