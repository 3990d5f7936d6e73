// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tg_core::{Dag, Node, NodeId, PlanStatus, RiskLevel, Tool};

fn sample_plan() -> Plan {
    let node = Node::new(NodeId::new(1), "search the web", Tool::WebSearch, Default::default(), vec![], RiskLevel::Low);
    let dag = Dag::new("find things", "a list of things", vec![node]);
    let mut plan = Plan::new(PlanId::from_string("pln-abc"), "find things", dag, None, 1_000);
    plan.status = PlanStatus::Approved;
    plan
}

#[test]
fn format_plan_list_renders_goal_and_status() {
    let plan = sample_plan();
    let mut buf = Vec::new();
    format_plan_list(&mut buf, std::slice::from_ref(&plan));
    let out = String::from_utf8(buf).unwrap();

    assert!(out.contains("pln-abc"));
    assert!(out.contains("approved"));
    assert!(out.contains("find things"));
}

#[test]
fn format_plan_list_empty_renders_nothing() {
    let mut buf = Vec::new();
    format_plan_list(&mut buf, &[]);
    assert_eq!(buf, b"");
}

#[test]
fn format_plan_detail_renders_nodes_table() {
    let plan = sample_plan();
    let mut buf = Vec::new();
    format_plan_detail(&mut buf, &plan);
    let out = String::from_utf8(buf).unwrap();

    assert!(out.contains("Plan:"));
    assert!(out.contains("find things"));
    assert!(out.contains("web_search"));
    assert!(out.contains("low"));
}

#[test]
fn format_plan_detail_shows_parent_when_branched() {
    let mut plan = sample_plan();
    plan.parent = Some(PlanId::from_string("pln-parent"));
    let mut buf = Vec::new();
    format_plan_detail(&mut buf, &plan);
    let out = String::from_utf8(buf).unwrap();

    assert!(out.contains("pln-parent"));
}
