use super::*;

#[tokio::test]
async fn unregistered_server_is_a_hard_error() {
    let gateway = FakeGatewayAdapter::new();
    let err = gateway.call_tool("ghost", "anything", &serde_json::Map::new()).await.unwrap_err();
    assert!(matches!(err, GatewayError::UnknownServer(name) if name == "ghost"));
}

#[tokio::test]
async fn list_tools_returns_registered_tools() {
    let gateway = FakeGatewayAdapter::new();
    gateway.register_server(
        "github",
        vec![McpTool {
            name: "create_issue".to_string(),
            description: "open an issue".to_string(),
            input_schema: serde_json::Value::Null,
        }],
    );

    let tools = gateway.list_tools("github").await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "create_issue");
}

#[tokio::test]
async fn call_tool_returns_scripted_response_and_records_call() {
    let gateway = FakeGatewayAdapter::new();
    gateway.register_server("github", vec![]);
    gateway.script_response("github", "create_issue", Ok("issue #42 created".to_string()));

    let mut args = serde_json::Map::new();
    args.insert("title".to_string(), serde_json::Value::String("bug".to_string()));
    let result = gateway.call_tool("github", "create_issue", &args).await.unwrap();

    assert_eq!(result, "issue #42 created");
    assert_eq!(gateway.calls(), vec![("github".to_string(), "create_issue".to_string(), args)]);
}

#[tokio::test]
async fn call_tool_surfaces_scripted_remote_error() {
    let gateway = FakeGatewayAdapter::new();
    gateway.register_server("flaky", vec![]);
    gateway.script_response("flaky", "op", Err("rate limited".to_string()));

    let err = gateway.call_tool("flaky", "op", &serde_json::Map::new()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Remote(msg) if msg == "rate limited"));
}

#[test]
fn list_servers_reflects_registrations() {
    let gateway = FakeGatewayAdapter::new();
    gateway.register_server("a", vec![]);
    gateway.register_server("b", vec![]);
    let mut servers = gateway.list_servers();
    servers.sort();
    assert_eq!(servers, vec!["a".to_string(), "b".to_string()]);
}
