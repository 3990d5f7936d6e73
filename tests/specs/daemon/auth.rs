//! Bearer-token enforcement on the `/api` surface; `/health` and `/ready`
//! stay open regardless.

use crate::prelude::*;

#[test]
fn api_requests_without_a_token_are_rejected_when_auth_is_configured() {
    let daemon = Daemon::start_with_token(Some("s3cret"));
    cli()
        .env("TG_DAEMON_URL", &daemon.url())
        .args(&["plan", "list"])
        .fails()
        .stderr_has("401");
}

#[test]
fn api_requests_with_the_wrong_token_are_rejected() {
    let daemon = Daemon::start_with_token(Some("s3cret"));
    cli()
        .env("TG_DAEMON_URL", &daemon.url())
        .env("TG_AUTH_TOKEN", "wrong")
        .args(&["plan", "list"])
        .fails()
        .stderr_has("401");
}

#[test]
fn api_requests_with_the_right_token_pass() {
    let daemon = Daemon::start_with_token(Some("s3cret"));
    daemon.tg().args(&["plan", "list"]).passes().stdout_has("No plans");
}

#[test]
fn health_ignores_auth_configuration() {
    let daemon = Daemon::start_with_token(Some("s3cret"));
    let (status, _) = http_get(daemon.addr(), "/health").unwrap();
    assert_eq!(status, 200);
}
