use super::*;

#[test]
fn submit_goal_request_defaults_tools_and_permissions_when_absent() {
    let parsed: SubmitGoalRequest = serde_json::from_str(r#"{"goal": "find a venue"}"#).unwrap();
    assert_eq!(parsed.goal, "find a venue");
    assert!(parsed.allowed_tools.is_empty());
    assert!(parsed.permissions.is_empty());
}

#[test]
fn node_approval_request_round_trips_edited_args() {
    let mut args = serde_json::Map::new();
    args.insert("path".into(), serde_json::json!("/tmp/out.txt"));
    let req = NodeApprovalRequest { approved: true, edited_args: Some(args.clone()) };
    let json = serde_json::to_string(&req).unwrap();
    let back: NodeApprovalRequest = serde_json::from_str(&json).unwrap();
    assert!(back.approved);
    assert_eq!(back.edited_args, Some(args));
}

#[test]
fn rewind_request_defaults_to_no_overrides() {
    let parsed: RewindRequest = serde_json::from_str("{}").unwrap();
    assert!(parsed.new_args.is_none());
    assert!(parsed.new_tool.is_none());
}

#[test]
fn remember_request_defaults_category_to_general() {
    let parsed: RememberRequest =
        serde_json::from_str(r#"{"key": "k", "value": "v"}"#).unwrap();
    assert_eq!(parsed.category, "general");
}

#[test]
fn recall_query_defaults_n_to_five() {
    let parsed: RecallQuery = serde_json::from_str(r#"{"query": "venue"}"#).unwrap();
    assert_eq!(parsed.n, 5);
}

#[test]
fn register_server_request_defaults_api_key_to_empty() {
    let parsed: RegisterServerRequest =
        serde_json::from_str(r#"{"name": "svc", "base_url": "http://localhost:9000"}"#).unwrap();
    assert_eq!(parsed.api_key, "");
    assert!(parsed.timeout_secs.is_none());
}
