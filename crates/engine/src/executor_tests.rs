use super::*;
use tempfile::tempdir;
use tg_adapters::{FakeGatewayAdapter, FakeMemoryAdapter, FakePlannerAdapter, FakeSandboxAdapter};
use tg_core::{Dag, FakeClock, Node, NodeId, RiskLevel};

type TestExecutor = Executor<FakeSandboxAdapter, FakePlannerAdapter, FakeMemoryAdapter, FakeGatewayAdapter, FakeClock>;

fn harness() -> (
    TestExecutor,
    Store,
    FakeSandboxAdapter,
    FakePlannerAdapter,
    FakeMemoryAdapter,
    FakeGatewayAdapter,
) {
    let dir = tempdir().expect("tempdir");
    let store = Store::in_memory(dir.path()).expect("open store");
    let bus = crate::bus::EventBus::new(store.clone());
    let sandbox = FakeSandboxAdapter::new();
    let planner = FakePlannerAdapter::new();
    let memory = FakeMemoryAdapter::new();
    let gateway = FakeGatewayAdapter::new();
    let clock = FakeClock::new();
    let executor =
        Executor::new(store.clone(), bus, sandbox.clone(), planner.clone(), memory.clone(), gateway.clone(), clock);
    (executor, store, sandbox, planner, memory, gateway)
}

fn linear_plan(store: &Store, risk: RiskLevel) -> PlanId {
    let dag = Dag::new(
        "goal",
        "outcome",
        vec![Node::new(
            NodeId::new(1),
            "do the one thing",
            Tool::ShellExec,
            serde_json::Map::new(),
            vec![],
            risk,
        )],
    );
    let plan = store.create_plan(PlanId::new(), "goal", dag, None).expect("create plan");
    store.approve_plan(plan.id).expect("approve");
    plan.id
}

#[tokio::test]
async fn drives_single_low_risk_node_to_completion() {
    let (executor, store, sandbox, memory, _planner, _gateway) = harness();
    let plan_id = linear_plan(&store, RiskLevel::Low);
    sandbox.set_default_success("all done");

    executor.drive_plan(plan_id).await;

    let plan = store.get_plan(&plan_id).expect("plan exists");
    assert_eq!(plan.status, PlanStatus::Completed);
    let node = plan.dag.get(NodeId::new(1)).expect("node");
    assert_eq!(node.status, NodeStatus::Completed);
    assert_eq!(node.result.as_deref(), Some("all done"));
    assert_eq!(memory.breadcrumbs().len(), 1, "successful node writes a breadcrumb");
}

#[tokio::test]
async fn high_risk_node_waits_for_approval_then_runs() {
    let (executor, store, sandbox, _memory, _planner, _gateway) = harness();
    let plan_id = linear_plan(&store, RiskLevel::High);
    sandbox.set_default_success("approved output");

    let drive = tokio::spawn({
        let executor = executor.clone();
        async move { executor.drive_plan(plan_id).await }
    });

    // Wait until the node reaches awaiting_approval, then approve it.
    loop {
        let plan = store.get_plan(&plan_id).expect("plan exists");
        if plan.dag.get(NodeId::new(1)).unwrap().status == NodeStatus::AwaitingApproval {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    store
        .upsert_node(plan_id, NodeId::new(1), tg_storage::NodeFields { status: Some(NodeStatus::Approved), ..Default::default() })
        .expect("approve node");

    drive.await.expect("drive task joined");

    let plan = store.get_plan(&plan_id).expect("plan exists");
    assert_eq!(plan.status, PlanStatus::Completed);
    assert_eq!(plan.dag.get(NodeId::new(1)).unwrap().status, NodeStatus::Completed);
}

#[tokio::test]
async fn skipping_an_awaiting_node_completes_the_plan_without_running_it() {
    let (executor, store, sandbox, _memory, _planner, _gateway) = harness();
    let plan_id = linear_plan(&store, RiskLevel::High);

    let drive = tokio::spawn({
        let executor = executor.clone();
        async move { executor.drive_plan(plan_id).await }
    });
    loop {
        let plan = store.get_plan(&plan_id).expect("plan exists");
        if plan.dag.get(NodeId::new(1)).unwrap().status == NodeStatus::AwaitingApproval {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    store
        .upsert_node(plan_id, NodeId::new(1), tg_storage::NodeFields { status: Some(NodeStatus::Skipped), ..Default::default() })
        .expect("skip node");

    drive.await.expect("drive task joined");

    let plan = store.get_plan(&plan_id).expect("plan exists");
    assert_eq!(plan.dag.get(NodeId::new(1)).unwrap().status, NodeStatus::Skipped);
    assert!(sandbox.calls().is_empty(), "a skipped node must never reach the sandbox");
}

#[tokio::test]
async fn failed_node_requests_and_applies_a_retry_patch() {
    let (executor, store, sandbox, _memory, planner, _gateway) = harness();
    let plan_id = linear_plan(&store, RiskLevel::Low);
    sandbox.fail_node(plan_id, NodeId::new(1), "boom: syntax error");

    let mut retry_args = serde_json::Map::new();
    retry_args.insert("fixed".into(), serde_json::json!(true));
    planner.set_patch(tg_core::Patch {
        patch_nodes: vec![tg_core::PatchAction::Retry { node_id: NodeId::new(1), new_args: Some(retry_args), new_tool: None }],
        new_nodes: vec![],
    });

    // After the patch resets node 1 to pending, let it succeed so the loop
    // terminates instead of retrying forever against the same failure.
    sandbox.set_default_success("fixed");

    executor.drive_plan(plan_id).await;

    assert_eq!(planner.patch_calls().len(), 1);
    let plan = store.get_plan(&plan_id).expect("plan exists");
    assert_eq!(plan.status, PlanStatus::Completed);
    assert_eq!(plan.dag.get(NodeId::new(1)).unwrap().args.get("fixed"), Some(&serde_json::json!(true)));
}

#[tokio::test]
async fn kill_switch_marks_the_plan_killed_and_stops_the_loop() {
    let (executor, store, _sandbox, _memory, _planner, _gateway) = harness();
    let plan_id = linear_plan(&store, RiskLevel::High);

    let drive = tokio::spawn({
        let executor = executor.clone();
        async move { executor.drive_plan(plan_id).await }
    });
    loop {
        let plan = store.get_plan(&plan_id).expect("plan exists");
        if plan.dag.get(NodeId::new(1)).unwrap().status == NodeStatus::AwaitingApproval {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    executor.kill(plan_id).await.expect("kill");
    drive.await.expect("drive task joined");

    let plan = store.get_plan(&plan_id).expect("plan exists");
    assert_eq!(plan.status, PlanStatus::Failed);
}

#[tokio::test]
async fn duplicate_drive_is_a_no_op() {
    let (executor, store, sandbox, _memory, _planner, _gateway) = harness();
    let plan_id = linear_plan(&store, RiskLevel::High);

    let first = tokio::spawn({
        let executor = executor.clone();
        async move { executor.drive_plan(plan_id).await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A second concurrent drive for the same plan must return immediately
    // without touching the sandbox or advancing the node past its gate.
    executor.drive_plan(plan_id).await;
    assert!(sandbox.calls().is_empty());

    store
        .upsert_node(plan_id, NodeId::new(1), tg_storage::NodeFields { status: Some(NodeStatus::Skipped), ..Default::default() })
        .expect("skip node");
    first.await.expect("first drive joined");
}

#[tokio::test]
async fn remote_tool_dispatches_through_the_gateway_not_the_sandbox() {
    let (executor, store, sandbox, _memory, _planner, gateway) = harness();
    gateway.register_server("default", vec![]);
    gateway.script_response("default", "slack_post", Ok("posted".to_string()));

    let dag = Dag::new(
        "goal",
        "outcome",
        vec![Node::new(
            NodeId::new(1),
            "post to slack",
            Tool::from("slack_post"),
            serde_json::Map::new(),
            vec![],
            RiskLevel::Low,
        )],
    );
    let plan = store.create_plan(PlanId::new(), "goal", dag, None).expect("create plan");
    store.approve_plan(plan.id).expect("approve");

    executor.drive_plan(plan.id).await;

    assert!(sandbox.calls().is_empty(), "remote tools never touch the sandbox");
    assert_eq!(gateway.calls().len(), 1);
    let plan = store.get_plan(&plan.id).expect("plan exists");
    assert_eq!(plan.dag.get(NodeId::new(1)).unwrap().result.as_deref(), Some("posted"));
}
