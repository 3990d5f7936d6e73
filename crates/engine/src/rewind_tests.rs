use super::*;
use tempfile::tempdir;
use tg_core::{FakeClock, Node, NodeId, NodeStatus, RiskLevel, Tool};

fn node(id: u32, tool: Tool, deps: Vec<u32>, status: NodeStatus) -> Node {
    let mut n = Node::new(
        NodeId::new(id),
        format!("task {id}"),
        tool,
        serde_json::Map::new(),
        deps.into_iter().map(NodeId::new).collect(),
        RiskLevel::Low,
    );
    n.status = status;
    if status == NodeStatus::Completed {
        n.result = Some(format!("output {id}"));
    }
    n
}

fn setup() -> (Store, PlanId) {
    let dir = tempdir().expect("tempdir");
    let store = Store::in_memory(dir.path()).expect("open store");
    let dag = tg_core::Dag::new(
        "goal",
        "outcome",
        vec![
            node(1, Tool::WebSearch, vec![], NodeStatus::Completed),
            node(2, Tool::FilesystemWrite, vec![1], NodeStatus::Completed),
            node(3, Tool::ShellExec, vec![2], NodeStatus::Completed),
            node(4, Tool::WebSearch, vec![], NodeStatus::Completed),
        ],
    );
    let plan = store.create_plan(PlanId::new(), "goal", dag, None).expect("create plan");
    (store, plan.id)
}

#[test]
fn rewind_resets_node_and_downstream_closure() {
    let (store, plan_id) = setup();
    let clock = FakeClock::new();

    let outcome = rewind(&store, &clock, plan_id, NodeId::new(2), None, None).expect("rewind");

    let n1 = outcome.branch.dag.get(NodeId::new(1)).expect("n1");
    assert_eq!(n1.status, NodeStatus::Completed, "node outside the closure stays untouched");

    let n2 = outcome.branch.dag.get(NodeId::new(2)).expect("n2");
    assert_eq!(n2.status, NodeStatus::Pending);
    assert!(n2.result.is_none());

    let n3 = outcome.branch.dag.get(NodeId::new(3)).expect("n3");
    assert_eq!(n3.status, NodeStatus::Pending, "downstream node also reset");

    let n4 = outcome.branch.dag.get(NodeId::new(4)).expect("n4");
    assert_eq!(n4.status, NodeStatus::Completed, "unrelated branch of the dag is untouched");

    assert_eq!(outcome.branch.parent, Some(plan_id));
    assert_eq!(outcome.branch.status, tg_core::PlanStatus::Draft);
}

#[test]
fn rewind_warns_about_side_effect_tools_in_closure() {
    let (store, plan_id) = setup();
    let clock = FakeClock::new();

    let outcome = rewind(&store, &clock, plan_id, NodeId::new(1), None, None).expect("rewind");

    assert!(outcome.warnings.iter().any(|w| w.contains("2") && w.contains("filesystem_write")));
    assert!(
        !outcome.warnings.iter().any(|w| w.contains("node 1")),
        "web_search is not a side-effect tool"
    );
}

#[test]
fn rewind_applies_new_args_and_tool_to_target_only() {
    let (store, plan_id) = setup();
    let clock = FakeClock::new();
    let mut new_args = serde_json::Map::new();
    new_args.insert("path".into(), serde_json::json!("/tmp/retry.txt"));

    let outcome =
        rewind(&store, &clock, plan_id, NodeId::new(2), Some(new_args.clone()), Some(Tool::ShellExec))
            .expect("rewind");

    let n2 = outcome.branch.dag.get(NodeId::new(2)).expect("n2");
    assert_eq!(n2.args, new_args);
    assert_eq!(n2.tool, Tool::ShellExec);

    let n3 = outcome.branch.dag.get(NodeId::new(3)).expect("n3");
    assert_eq!(n3.tool, Tool::ShellExec, "downstream node's own tool is untouched by the target override");
}

#[test]
fn rewind_persists_branch_as_a_new_plan() {
    let (store, plan_id) = setup();
    let clock = FakeClock::new();

    let outcome = rewind(&store, &clock, plan_id, NodeId::new(3), None, None).expect("rewind");

    let fetched = store.get_plan(&outcome.branch.id).expect("branch persisted");
    assert_eq!(fetched.parent, Some(plan_id));
    assert_eq!(fetched.dag.get(NodeId::new(3)).unwrap().status, NodeStatus::Pending);

    let original = store.get_plan(&plan_id).expect("original still present");
    assert_eq!(
        original.dag.get(NodeId::new(3)).unwrap().status,
        NodeStatus::Completed,
        "rewind must not mutate the source plan"
    );
}

#[test]
fn rewind_unknown_plan_errors() {
    let dir = tempdir().expect("tempdir");
    let store = Store::in_memory(dir.path()).expect("open store");
    let clock = FakeClock::new();

    let err = rewind(&store, &clock, PlanId::new(), NodeId::new(1), None, None).unwrap_err();
    assert!(matches!(err, RewindError::PlanNotFound(_)));
}

#[test]
fn rewind_unknown_node_errors() {
    let (store, plan_id) = setup();
    let clock = FakeClock::new();

    let err = rewind(&store, &clock, plan_id, NodeId::new(99), None, None).unwrap_err();
    assert!(matches!(err, RewindError::NodeNotFound(_, _)));
}
