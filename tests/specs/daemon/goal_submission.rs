//! Goal submission against a daemon whose planner backend is unreachable
//! by construction (`Daemon::start` points it at a closed port). This
//! exercises the real validation path plus the documented planner-down
//! error, without needing network access or a model API key.

use crate::prelude::*;

#[test]
fn empty_goal_is_rejected_before_the_planner_is_ever_called() {
    let daemon = Daemon::start();
    daemon
        .tg()
        .args(&["goal", "submit", "   "])
        .fails()
        .stderr_has("400")
        .stderr_has("must not be empty");
}

#[test]
fn goal_submission_surfaces_a_planner_bad_gateway() {
    let daemon = Daemon::start();
    daemon
        .tg()
        .args(&["goal", "submit", "summarize the top HN posts about rust", "--tool", "web_search"])
        .fails()
        .stderr_has("502");
}

#[test]
fn approving_a_nonexistent_plan_is_a_404() {
    let daemon = Daemon::start();
    daemon.tg().args(&["plan", "approve", "pln-ghost"]).fails().stderr_has("not found");
}

#[test]
fn killing_a_nonexistent_plan_is_a_404() {
    let daemon = Daemon::start();
    daemon.tg().args(&["plan", "kill", "pln-ghost"]).fails().stderr_has("not found");
}
