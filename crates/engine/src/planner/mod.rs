// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Planner sanitiser (C7, pure half): cleans up a freshly-planned [`Dag`]
//! before it's ever shown to an operator or dispatched. The LLM-backed half
//! of the Planner Adapter (the `plan()`/`patch()` HTTP calls) lives in
//! `tg-adapters::planner`; this module never makes a network call, which is
//! what makes it exhaustively unit-testable.
//!
//! Three rewrites, one per failure mode observed from real planner output:
//! a `scraper` node pointed at a placeholder URL gets rewritten to
//! `web_search`, an `interpret_code` node's Python gets normalised and
//! given a safe fallback if it doesn't look like Python at all, and a
//! `filesystem_write` node with a nonsensical filename gets a slug derived
//! from its task description.

mod slug;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};
use tg_core::{Dag, NodeId, Tool};

use crate::resolver::contains_node_ref;

#[allow(clippy::expect_used)]
static FAKE_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"exact[-_]?url",
        r"example\.com",
        r"placeholder",
        r"your[-_]?url",
        r"some[-_]?site",
        r"unknown",
        r"<url>",
        r"\{url\}",
        r"recipe[-_]?url",
        r"news[-_]?url",
        r"data[-_]?url",
        r"api[-_]?url",
        r"site[-_]?url",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("constant regex pattern is valid"))
    .collect()
});

fn is_fake_url(url: &str) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return true;
    }
    if !trimmed.to_lowercase().starts_with("http") {
        return true;
    }
    FAKE_URL_PATTERNS.iter().any(|re| re.is_match(trimmed))
}

/// Clean up every node in `dag` in place. Idempotent: running it twice on
/// an already-sane dag is a no-op.
pub fn sanitize_dag(dag: &mut Dag) {
    for node in &mut dag.nodes {
        match node.tool {
            Tool::Scraper => sanitize_scraper(node),
            Tool::InterpretCode => sanitize_interpret_code(node),
            Tool::FilesystemWrite => sanitize_filesystem_write(node),
            _ => {}
        }
    }
}

fn sanitize_scraper(node: &mut tg_core::Node) {
    let url = node.args.get("url").and_then(Value::as_str).unwrap_or("");
    if is_fake_url(url) {
        node.tool = Tool::WebSearch;
        let mut args = serde_json::Map::new();
        args.insert("query".into(), json!(node.task));
        node.args = args;
    }
}

fn sanitize_filesystem_write(node: &mut tg_core::Node) {
    let filename = node.args.get("filename").and_then(Value::as_str).unwrap_or("");
    if filename.is_empty() || contains_node_ref(filename) {
        let slug = slug::slugify(&node.task, 30);
        let safe_name = if slug.is_empty() { "output.txt".to_string() } else { format!("{slug}.txt") };
        node.args.insert("filename".into(), json!(safe_name));
    }
}

fn sanitize_interpret_code(node: &mut tg_core::Node) {
    let code = node.args.get("code").and_then(Value::as_str).unwrap_or("").to_string();
    let fixed = fix_python_code(&code, &node.task, &node.dependencies);
    node.args.insert("code".into(), json!(fixed));
}

#[allow(clippy::expect_used)]
static DOUBLE_DOLLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$\s*").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static STRAY_DOLLAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?!node_\d+_output)").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static SPLIT_PRINTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\),\s*print\(").expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static PY2_PRINT_DOUBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"print\s+"([^"]*)""#).expect("constant regex pattern is valid"));
#[allow(clippy::expect_used)]
static PY2_PRINT_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"print\s+'([^']*)'").expect("constant regex pattern is valid"));

const PYTHON_MARKERS: &[&str] =
    &["print(", "import ", "def ", " = ", "for ", "if ", "return ", "with ", "open("];

fn py_str_literal(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn fallback_code(task: &str, deps: &[NodeId], truncate_to: usize) -> String {
    let mut lines = vec![format!("print({})", py_str_literal(task))];
    if deps.is_empty() {
        lines.push("print(\"No input nodes\")".to_string());
    } else {
        for d in deps {
            lines.push(format!("print($node_{}_output[:{truncate_to}])", d.0));
        }
    }
    lines.join("\n")
}

/// Strip common leading whitespace from every non-blank line.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    text.lines().map(|l| if l.len() >= indent { &l[indent..] } else { l.trim_start() }).collect::<Vec<_>>().join("\n")
}

fn strip_code_fences(text: &str) -> String {
    let mut t = text.trim();
    for prefix in ["```python\n", "```py\n", "```\n"] {
        if let Some(rest) = t.strip_prefix(prefix) {
            t = rest;
            break;
        }
    }
    t.trim().strip_suffix("```").unwrap_or(t.trim()).trim().to_string()
}

/// Weak stand-in for Python's own `compile()` syntax check: no Python
/// toolchain is available to actually parse the script, so this just
/// verifies brackets/quotes balance. A real syntax error that still
/// balances brackets (e.g. a bad keyword) slips through — a documented,
/// deliberate simplification, not an oversight.
fn looks_syntactically_plausible(code: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for ch in code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_single || in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '(' | '[' | '{' if !in_single && !in_double => stack.push(ch),
            ')' if !in_single && !in_double => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            ']' if !in_single && !in_double => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            '}' if !in_single && !in_double => {
                if stack.pop() != Some('{') {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty() && !in_single && !in_double
}

/// Normalise a planner-emitted Python snippet, replacing it outright with a
/// safe fallback whenever it doesn't look like real Python.
fn fix_python_code(code: &str, task: &str, deps: &[NodeId]) -> String {
    if code.trim().is_empty() {
        return fallback_code(task, deps, 300);
    }

    let mut code = DOUBLE_DOLLAR.replace_all(code, "\n").to_string();
    code = STRAY_DOLLAR.replace_all(&code, "").to_string();
    code = dedent(&code).trim().to_string();
    code = SPLIT_PRINTS.replace_all(&code, ")\nprint(").to_string();
    code = PY2_PRINT_DOUBLE.replace_all(&code, "print(\"$1\")").to_string();
    code = PY2_PRINT_SINGLE.replace_all(&code, "print('$1')").to_string();
    code = strip_code_fences(&code);

    let has_python = PYTHON_MARKERS.iter().any(|kw| code.contains(kw));
    if !has_python {
        return fallback_code(task, deps, 2000);
    }

    if !code.contains("print(") && !code.to_uppercase().contains("OUTPUT") {
        let tail = if let Some(first) = deps.first() {
            format!("print($node_{}_output[:2000])", first.0)
        } else {
            format!("print({})", py_str_literal(task))
        };
        code.push('\n');
        code.push_str(&tail);
    }

    if !looks_syntactically_plausible(&code) {
        return fallback_code(task, deps, 1000);
    }

    code
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
