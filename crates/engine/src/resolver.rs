// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument Resolver (C4): substitutes `$node_<k>_output` placeholders in a
//! node's args with upstream context before dispatch.
//!
//! Plain substitution is literal text replacement — safe for tool args that
//! land as shell arguments or HTTP bodies, where the substituted bytes never
//! get re-interpreted as code. `interpret_code`'s `code` arg is different:
//! the referenced output is arbitrary text that is about to be spliced into
//! a Python script, so splicing it in directly would let a stray quote or
//! newline in an upstream tool's output corrupt (or inject into) the script.
//! Instead the reference is left as a bare identifier and a base64-decode
//! header is prepended, so the value only ever enters the script as a
//! properly quoted string literal.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::Engine as _;
use regex::Regex;
use serde_json::{Map, Value};
use tg_core::Tool;

#[allow(clippy::expect_used)]
static NODE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$node_(\d+)_output").expect("constant regex pattern is valid"));

/// Substitute every `$node_<k>_output` occurrence in `text` with its
/// resolved value from `context`; a reference with no matching context key
/// is left as-is.
fn raw_sub(text: &str, context: &HashMap<String, String>) -> String {
    NODE_REF
        .replace_all(text, |caps: &regex::Captures| {
            let key = format!("node_{}_output", &caps[1]);
            context.get(&key).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}

/// Whether `text` contains any `$node_<k>_output` placeholder at all.
pub(crate) fn contains_node_ref(text: &str) -> bool {
    NODE_REF.is_match(text)
}

/// Ordered, de-duplicated list of node ids referenced by `$node_<k>_output`
/// in `text`, in first-occurrence order.
fn referenced_ids(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in NODE_REF.captures_iter(text) {
        let id = caps[1].to_string();
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Build the base64-decode header + de-referenced body for a Python
/// `interpret_code` script. Returns the code unchanged if it references no
/// upstream node output.
fn resolve_code(code: &str, context: &HashMap<String, String>) -> String {
    let refs = referenced_ids(code);
    if refs.is_empty() {
        return code.to_string();
    }
    let mut header = vec!["import base64 as _b64".to_string()];
    for id in &refs {
        let key = format!("node_{id}_output");
        let value = context.get(&key).cloned().unwrap_or_default();
        let encoded = base64::engine::general_purpose::STANDARD.encode(value.as_bytes());
        header.push(format!("node_{id}_output = _b64.b64decode(\"{encoded}\").decode()"));
    }
    let body = NODE_REF.replace_all(code, "node_$1_output").to_string();
    header.join("\n") + "\n" + &body
}

fn resolve_value(tool: &Tool, key: &str, value: &Value, context: &HashMap<String, String>) -> Value {
    match value {
        Value::String(s) if tool == &Tool::InterpretCode && (key == "code" || key == "script") => {
            Value::String(resolve_code(s, context))
        }
        Value::String(s) => Value::String(raw_sub(s, context)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resolve_value(tool, key, v, context)).collect())
        }
        other => other.clone(),
    }
}

/// Resolve every placeholder in `args` against `context`, returning a fresh
/// map ready to hand to the sandbox. Infallible by design: an unresolved
/// reference is left as literal text rather than failing the node, since the
/// planner itself decides whether a dangling reference is fatal.
pub fn resolve_args(
    tool: &Tool,
    args: &Map<String, Value>,
    context: &HashMap<String, String>,
) -> Map<String, Value> {
    args.iter().map(|(k, v)| (k.clone(), resolve_value(tool, k, v, context))).collect()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
