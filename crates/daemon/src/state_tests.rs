use super::*;
use tg_adapters::sandbox::SandboxConfig;
use tg_adapters::{DockerSandboxAdapter, HostedPlannerAdapter};

#[test]
fn app_state_builds_and_clones() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = Store::in_memory(tmp.path()).expect("store");
    let bus = EventBus::new(store.clone());
    let sandbox = DockerSandboxAdapter::new(SandboxConfig::default());
    let planner = PlannerRouter::hosted_only(HostedPlannerAdapter::new("https://api.openai.com/v1", "", "gpt-4o-mini"));
    let memory = JsonFileMemoryAdapter::new(tmp.path().join("memory.json"));
    let gateway = McpGatewayAdapter::new(vec![]);
    let clock = SystemClock;

    let executor = Executor::new(
        store.clone(),
        bus.clone(),
        sandbox,
        planner.clone(),
        memory.clone(),
        gateway.clone(),
        clock.clone(),
    );

    let state = AppState {
        store,
        bus,
        executor,
        memory,
        gateway,
        planner,
        clock,
        default_allowed_tools: vec!["web_search".to_string()],
        auth_token: None,
    };

    let cloned = state.clone();
    assert_eq!(cloned.default_allowed_tools, vec!["web_search".to_string()]);
}
