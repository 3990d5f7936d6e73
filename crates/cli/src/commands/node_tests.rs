// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_args_json_accepts_object() {
    let map = parse_args_json(r#"{"query": "rust async"}"#.to_string()).unwrap();
    assert_eq!(map.get("query").unwrap(), "rust async");
}

#[test]
fn parse_args_json_rejects_non_object() {
    assert!(parse_args_json("[1, 2, 3]".to_string()).is_err());
    assert!(parse_args_json("\"just a string\"".to_string()).is_err());
}

#[test]
fn parse_args_json_rejects_invalid_json() {
    assert!(parse_args_json("{not json".to_string()).is_err());
}
