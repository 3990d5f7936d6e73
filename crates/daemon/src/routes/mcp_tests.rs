use super::*;
use crate::routes::test_support::build_state;
use axum::extract::{Path, State};
use tg_wire::RegisterServerRequest;

#[tokio::test]
async fn register_then_list_servers() {
    let tmp = tempfile::tempdir().unwrap();
    let state = build_state(&tmp, None);

    let (status, _) = register_server(
        State(state.clone()),
        Json(RegisterServerRequest {
            name: "search".to_string(),
            base_url: "http://127.0.0.1:0".to_string(),
            api_key: String::new(),
            timeout_secs: None,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let servers = list_servers(State(state)).await.0;
    assert_eq!(servers, vec!["search".to_string()]);
}

#[tokio::test]
async fn list_tools_for_unknown_server_is_404() {
    let tmp = tempfile::tempdir().unwrap();
    let state = build_state(&tmp, None);
    let err = list_tools(State(state), Path("ghost".to_string())).await.err().expect("unknown server errors");
    assert!(matches!(err, AppError::Gateway(_)));
}
