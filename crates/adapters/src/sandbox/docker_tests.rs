use super::*;
use tg_core::NodeId as CoreNodeId;

fn args(pairs: &[(&str, &str)]) -> serde_json::Map<String, serde_json::Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string()))).collect()
}

#[test]
fn container_name_uses_short_plan_id_and_node_suffix() {
    let plan_id = PlanId::from_string("pln-abcdefghijklmnop1234");
    let name = DockerSandboxAdapter::container_name(plan_id, CoreNodeId::new(3));
    assert_eq!(name, "abcdefgh-node3");
}

#[test]
fn runner_script_embeds_args_and_footer() {
    let script = build_runner_script(&Tool::FilesystemWrite, &args(&[("filename", "out.txt")]), "write a file");
    assert!(script.contains("def run(args):"));
    assert!(script.contains("\"filename\": \"out.txt\""));
    assert!(script.contains("if __name__ == \"__main__\":"));
    assert!(script.contains("json.dumps({\"status\": \"ok\""));
}

#[test]
fn runner_script_strips_newlines_from_task_comment() {
    let script = build_runner_script(&Tool::WebSearch, &args(&[]), "multi\nline\ntask");
    assert!(script.lines().next().unwrap().starts_with("# auto-generated"));
    assert!(!script.lines().nth(1).unwrap().contains('\n'));
    assert!(script.contains("# task: multi line task"));
}

#[test]
fn every_tool_variant_produces_a_runnable_body() {
    let tools = [
        Tool::WebSearch,
        Tool::Scraper,
        Tool::FilesystemRead,
        Tool::FilesystemWrite,
        Tool::FilesystemDelete,
        Tool::InterpretCode,
        Tool::ShellExec,
        Tool::DraftEmail,
        Tool::SendEmail,
        Tool::Remote("custom_tool".to_string()),
    ];
    for tool in tools {
        let body = tool_implementation(&tool);
        assert!(body.contains("def run(args):"), "missing run() for {}", tool.name());
    }
}

#[test]
fn default_config_matches_documented_resource_caps() {
    let config = SandboxConfig::default();
    assert_eq!(config.memory_limit, "512m");
    assert_eq!(config.cpu_limit, "1.0");
    assert_eq!(config.timeout.as_secs(), 120);
    assert_eq!(config.airgap_network, "none");
}
