// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dag::{PlanId, Tool};
use crate::event::Event;

#[test]
fn effect_serialization_roundtrip() {
    let plan_id = PlanId::new();
    let effects = vec![
        Effect::Emit { event: Event::PlanFailed { plan_id, reason: None } },
        Effect::RunSandbox {
            plan_id,
            node_id: NodeId::new(1),
            tool: Tool::WebSearch,
            resolved_args: serde_json::Map::new(),
            timeout: Duration::from_secs(120),
        },
        Effect::KillPlanContainers { plan_id },
        Effect::WriteBreadcrumb {
            plan_id,
            node_id: NodeId::new(1),
            tool: Tool::WebSearch,
            task: "search".to_string(),
            output: "results".to_string(),
        },
        Effect::RequestPatch { plan_id, node_id: NodeId::new(1), error: "boom".to_string() },
    ];

    for effect in effects {
        let json = serde_json::to_string(&effect).unwrap();
        let parsed: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, parsed);
    }
}

#[test]
fn effect_names_are_stable() {
    let plan_id = PlanId::new();
    assert_eq!(Effect::Emit { event: Event::PlanFailed { plan_id, reason: None } }.name(), "emit");
    assert_eq!(Effect::KillPlanContainers { plan_id }.name(), "kill_plan_containers");
}

#[test]
fn run_sandbox_fields_include_plan_node_tool() {
    let plan_id = PlanId::new();
    let effect = Effect::RunSandbox {
        plan_id,
        node_id: NodeId::new(3),
        tool: Tool::InterpretCode,
        resolved_args: serde_json::Map::new(),
        timeout: Duration::from_secs(120),
    };
    let fields = effect.fields();
    assert!(fields.contains(&("plan_id", plan_id.to_string())));
    assert!(fields.contains(&("node_id", "3".to_string())));
    assert!(fields.contains(&("tool", "interpret_code".to_string())));
}

#[test]
fn verbosity_suppresses_frequent_effects() {
    let plan_id = PlanId::new();
    assert!(!Effect::Emit { event: Event::PlanFailed { plan_id, reason: None } }.verbose());
    assert!(Effect::KillPlanContainers { plan_id }.verbose());
}

#[test]
fn timeout_serializes_as_millis() {
    let effect = Effect::RunSandbox {
        plan_id: PlanId::new(),
        node_id: NodeId::new(1),
        tool: Tool::WebSearch,
        resolved_args: serde_json::Map::new(),
        timeout: Duration::from_secs(2),
    };
    let json = serde_json::to_value(&effect).unwrap();
    assert_eq!(json["RunSandbox"]["timeout"], 2000);
}
