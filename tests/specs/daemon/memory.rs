//! Long-term memory collaborator round trip (C9): pure local JSON-file
//! storage, no network involved, so the happy path is fully exercisable.

use crate::prelude::*;

#[test]
fn remember_then_recall_finds_the_fact() {
    let daemon = Daemon::start();
    daemon
        .tg()
        .args(&["memory", "remember", "rust-edition", "2021", "--category", "build"])
        .passes()
        .stdout_has("Remembered rust-edition");

    daemon
        .tg()
        .args(&["memory", "recall", "rust-edition"])
        .passes()
        .stdout_has("rust-edition")
        .stdout_has("2021");
}

#[test]
fn stats_count_long_term_facts_after_remember() {
    let daemon = Daemon::start();
    daemon.tg().args(&["memory", "remember", "k", "v"]).passes();
    let run = daemon.tg().args(&["-o", "json", "memory", "stats"]).passes();
    let stats: serde_json::Value = serde_json::from_str(&run.stdout()).expect("valid json");
    assert_eq!(stats["short_term"], 0);
    assert_eq!(stats["long_term"], 1);
}

#[test]
fn wipe_all_clears_long_term_facts() {
    let daemon = Daemon::start();
    daemon.tg().args(&["memory", "remember", "k", "v"]).passes();
    daemon.tg().args(&["memory", "wipe-all"]).passes().stdout_has("Wiped all memory");
    daemon.tg().args(&["memory", "recall", "k"]).passes().stdout_has("No matches");
}

#[test]
fn session_memory_is_empty_for_a_plan_with_no_breadcrumbs() {
    let daemon = Daemon::start();
    daemon
        .tg()
        .args(&["memory", "session", "pln-untouched"])
        .passes()
        .stdout_has("No breadcrumbs recorded for this plan");
}
