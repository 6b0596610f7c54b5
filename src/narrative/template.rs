//! Mustache-like template language (spec.md §4.G): `{{var | filter arg}}`,
//! `{{#if cond}}...{{else}}...{{/if}}`, `{{#unless cond}}...{{/unless}}`,
//! `{{#each arr}}...{{this}}...{{@index}}...{{/each}}`.
//!
//! Parsing is a hand-rolled two-pass scan (tag split, then block nesting) —
//! no regex, no external template engine. Context values are plain
//! `serde_json::Value`s so the renderer can walk the same fact/outcome data
//! the rest of the engine already speaks.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::TemplateError;

pub type TemplateResult<T> = Result<T, TemplateError>;

/// A render context: flat or nested JSON object, plus an implicit `this` /
/// `@index` pushed by `{{#each}}` while rendering its body.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(key.into(), value.into());
    }

    fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.vars.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    fn child(&self, key: &str, value: Value) -> Context {
        let mut vars = self.vars.clone();
        vars.insert(key.to_string(), value);
        Context { vars }
    }
}

/// A rendering warning: missing variable, empty `{{#each}}` collection, etc.
/// Unknown filters are rejected at compile time, not warned about here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWarning {
    pub message: String,
}

pub struct RenderOutput {
    pub text: String,
    pub warnings: Vec<RenderWarning>,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Var { path: String, filters: Vec<FilterCall> },
    If { cond: Condition, then_branch: Vec<Node>, else_branch: Vec<Node> },
    Unless { cond: Condition, body: Vec<Node> },
    Each { path: String, body: Vec<Node> },
}

#[derive(Debug, Clone)]
struct FilterCall {
    name: String,
    args: Vec<String>,
}

/// Filters recognized by [`apply_filter`]. Kept as the single source of
/// truth so compile-time validation and render-time dispatch can't drift.
const KNOWN_FILTERS: &[&str] = &["uppercase", "lowercase", "capitalize", "length", "join", "pluralize"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Gt,
    Lt,
    Eq,
    Ne,
}

#[derive(Debug, Clone)]
enum Condition {
    Truthy(String),
    Compare { left: String, op: CompareOp, right: String },
}

/// A compiled template, ready to render repeatedly against different contexts.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    pub fn compile(source: &str) -> TemplateResult<Self> {
        let tags = tokenize(source);
        let mut cursor = 0;
        let nodes = parse_block(&tags, &mut cursor, None)?;
        validate_filters(&nodes)?;
        Ok(Self { nodes })
    }

    /// Static validation without needing a context: surfaces unclosed or
    /// dangling blocks (spec.md §4.G).
    pub fn validate(source: &str) -> TemplateResult<()> {
        Self::compile(source).map(|_| ())
    }

    pub fn render(&self, ctx: &Context) -> RenderOutput {
        let mut out = String::new();
        let mut warnings = Vec::new();
        render_nodes(&self.nodes, ctx, &mut out, &mut warnings);
        RenderOutput { text: out, warnings }
    }
}

// ---------------------------------------------------------------------------
// Tokenizing: split source into a flat stream of raw tags / text runs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum RawTag {
    Text(String),
    Open(String),  // raw content inside {{ ... }}, trimmed
}

fn tokenize(source: &str) -> Vec<RawTag> {
    let mut tags = Vec::new();
    let mut rest = source;
    loop {
        match rest.find("{{") {
            None => {
                if !rest.is_empty() {
                    tags.push(RawTag::Text(rest.to_string()));
                }
                break;
            }
            Some(start) => {
                if start > 0 {
                    tags.push(RawTag::Text(rest[..start].to_string()));
                }
                let after = &rest[start + 2..];
                match after.find("}}") {
                    None => {
                        // Unterminated tag: treat the rest as literal text.
                        tags.push(RawTag::Text(rest[start..].to_string()));
                        break;
                    }
                    Some(end) => {
                        tags.push(RawTag::Open(after[..end].trim().to_string()));
                        rest = &after[end + 2..];
                    }
                }
            }
        }
    }
    tags
}

// ---------------------------------------------------------------------------
// Parsing: turn the flat tag stream into a nested node tree
// ---------------------------------------------------------------------------

fn parse_block(tags: &[RawTag], cursor: &mut usize, expected_close: Option<&str>) -> TemplateResult<Vec<Node>> {
    let mut nodes = Vec::new();
    while *cursor < tags.len() {
        match &tags[*cursor] {
            RawTag::Text(text) => {
                nodes.push(Node::Text(text.clone()));
                *cursor += 1;
            }
            RawTag::Open(raw) => {
                if let Some(tag) = raw.strip_prefix('/') {
                    let tag = tag.trim();
                    return match expected_close {
                        Some(expected) if expected == tag => {
                            *cursor += 1;
                            Ok(nodes)
                        }
                        _ => Err(TemplateError::DanglingClose { tag: tag.to_string() }),
                    };
                } else if let Some(cond_src) = raw.strip_prefix("#if") {
                    *cursor += 1;
                    let cond = parse_condition(cond_src.trim());
                    let (then_branch, else_branch) = parse_if_body(tags, cursor)?;
                    nodes.push(Node::If { cond, then_branch, else_branch });
                } else if let Some(cond_src) = raw.strip_prefix("#unless") {
                    *cursor += 1;
                    let cond = parse_condition(cond_src.trim());
                    let body = parse_block(tags, cursor, Some("unless"))?;
                    nodes.push(Node::Unless { cond, body });
                } else if let Some(path_src) = raw.strip_prefix("#each") {
                    *cursor += 1;
                    let path = path_src.trim().to_string();
                    let body = parse_block(tags, cursor, Some("each"))?;
                    nodes.push(Node::Each { path, body });
                } else if raw == "else" {
                    // Handled by parse_if_body; reaching here means a stray else.
                    return Err(TemplateError::DanglingClose { tag: "else".to_string() });
                } else {
                    *cursor += 1;
                    nodes.push(parse_var(raw));
                }
            }
        }
    }
    match expected_close {
        None => Ok(nodes),
        Some(tag) => Err(TemplateError::UnclosedBlock { tag: tag.to_string() }),
    }
}

/// `{{#if}}` bodies have an optional `{{else}}` splitting then/else branches,
/// terminated by `{{/if}}`.
fn parse_if_body(tags: &[RawTag], cursor: &mut usize) -> TemplateResult<(Vec<Node>, Vec<Node>)> {
    let mut then_branch = Vec::new();
    loop {
        if *cursor >= tags.len() {
            return Err(TemplateError::UnclosedBlock { tag: "if".to_string() });
        }
        if let RawTag::Open(raw) = &tags[*cursor] {
            if raw == "else" {
                *cursor += 1;
                let else_branch = parse_block(tags, cursor, Some("if"))?;
                return Ok((then_branch, else_branch));
            }
            if raw.trim() == "/if" {
                *cursor += 1;
                return Ok((then_branch, Vec::new()));
            }
        }
        let mut sub_cursor = *cursor;
        let consumed = parse_block_until_sibling(tags, &mut sub_cursor)?;
        then_branch.extend(consumed);
        *cursor = sub_cursor;
    }
}

/// Parses exactly one node, stopping before a sibling `{{else}}`/`{{/if}}`
/// at the current nesting depth (those are recognized by `parse_if_body`,
/// not consumed here).
fn parse_block_until_sibling(tags: &[RawTag], cursor: &mut usize) -> TemplateResult<Vec<Node>> {
    match &tags[*cursor] {
        RawTag::Text(text) => {
            let node = Node::Text(text.clone());
            *cursor += 1;
            Ok(vec![node])
        }
        RawTag::Open(raw) => {
            if let Some(tag) = raw.strip_prefix('/') {
                // `parse_if_body` consumes `/if` and `else` itself before
                // calling here; anything else closing at this depth is stray.
                Err(TemplateError::DanglingClose { tag: tag.trim().to_string() })
            } else if raw == "else" {
                Err(TemplateError::DanglingClose { tag: "else".to_string() })
            } else if let Some(cond_src) = raw.strip_prefix("#if") {
                *cursor += 1;
                let cond = parse_condition(cond_src.trim());
                let (then_branch, else_branch) = parse_if_body(tags, cursor)?;
                Ok(vec![Node::If { cond, then_branch, else_branch }])
            } else if let Some(cond_src) = raw.strip_prefix("#unless") {
                *cursor += 1;
                let cond = parse_condition(cond_src.trim());
                let body = parse_block(tags, cursor, Some("unless"))?;
                Ok(vec![Node::Unless { cond, body }])
            } else if let Some(path_src) = raw.strip_prefix("#each") {
                *cursor += 1;
                let path = path_src.trim().to_string();
                let body = parse_block(tags, cursor, Some("each"))?;
                Ok(vec![Node::Each { path, body }])
            } else {
                *cursor += 1;
                Ok(vec![parse_var(raw)])
            }
        }
    }
}

fn parse_var(raw: &str) -> Node {
    let mut parts = raw.split('|');
    let path = parts.next().unwrap_or_default().trim().to_string();
    let filters = parts
        .map(|segment| {
            let mut words = segment.trim().split_whitespace();
            let name = words.next().unwrap_or_default().to_string();
            let args = words.map(|w| w.trim_matches('"').to_string()).collect();
            FilterCall { name, args }
        })
        .collect();
    Node::Var { path, filters }
}

/// Rejects unknown filter names at compile time, unlike a missing variable
/// which only produces a render warning. Recurses into every block body so
/// a filter used inside `{{#if}}`/`{{#unless}}`/`{{#each}}` is caught too.
fn validate_filters(nodes: &[Node]) -> TemplateResult<()> {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Var { filters, .. } => {
                for filter in filters {
                    if !KNOWN_FILTERS.contains(&filter.name.as_str()) {
                        return Err(TemplateError::UnknownFilter { name: filter.name.clone() });
                    }
                }
            }
            Node::If { then_branch, else_branch, .. } => {
                validate_filters(then_branch)?;
                validate_filters(else_branch)?;
            }
            Node::Unless { body, .. } | Node::Each { body, .. } => {
                validate_filters(body)?;
            }
        }
    }
    Ok(())
}

fn parse_condition(src: &str) -> Condition {
    for (token, op) in [(">", CompareOp::Gt), ("<", CompareOp::Lt), ("==", CompareOp::Eq), ("!=", CompareOp::Ne)] {
        if let Some(idx) = src.find(token) {
            let left = src[..idx].trim().to_string();
            let right = src[idx + token.len()..].trim().trim_matches('"').to_string();
            return Condition::Compare { left, op, right };
        }
    }
    Condition::Truthy(src.trim().to_string())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_nodes(nodes: &[Node], ctx: &Context, out: &mut String, warnings: &mut Vec<RenderWarning>) {
    for node in nodes {
        render_node(node, ctx, out, warnings);
    }
}

fn render_node(node: &Node, ctx: &Context, out: &mut String, warnings: &mut Vec<RenderWarning>) {
    match node {
        Node::Text(text) => out.push_str(text),
        Node::Var { path, filters } => {
            let value = ctx.get(path).cloned();
            if value.is_none() {
                warnings.push(RenderWarning { message: format!("missing variable: {path}") });
            }
            let mut rendered = value.as_ref().map(value_to_string).unwrap_or_default();
            for filter in filters {
                rendered = apply_filter(filter, &rendered, value.as_ref());
            }
            out.push_str(&rendered);
        }
        Node::If { cond, then_branch, else_branch } => {
            if eval_condition(cond, ctx) {
                render_nodes(then_branch, ctx, out, warnings);
            } else {
                render_nodes(else_branch, ctx, out, warnings);
            }
        }
        Node::Unless { cond, body } => {
            if !eval_condition(cond, ctx) {
                render_nodes(body, ctx, out, warnings);
            }
        }
        Node::Each { path, body } => {
            let Some(Value::Array(items)) = ctx.get(path).cloned() else {
                warnings.push(RenderWarning { message: format!("missing or non-array variable: {path}") });
                return;
            };
            for (index, item) in items.into_iter().enumerate() {
                let mut inner = ctx.child("this", item);
                inner.vars.insert("@index".to_string(), Value::from(index));
                render_nodes(body, &inner, out, warnings);
            }
        }
    }
}

fn eval_condition(cond: &Condition, ctx: &Context) -> bool {
    match cond {
        Condition::Truthy(path) => ctx.get(path).is_some_and(is_truthy),
        Condition::Compare { left, op, right } => {
            let left_value = ctx.get(left).cloned().unwrap_or(Value::Null);
            let right_value = resolve_operand(right, ctx);
            compare(&left_value, op, &right_value)
        }
    }
}

fn resolve_operand(raw: &str, ctx: &Context) -> Value {
    if let Some(v) = ctx.get(raw) {
        return v.clone();
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Value::from(n);
    }
    Value::String(raw.to_string())
}

fn compare(left: &Value, op: &CompareOp, right: &Value) -> bool {
    match op {
        CompareOp::Eq => left == right,
        CompareOp::Ne => left != right,
        CompareOp::Gt | CompareOp::Lt => {
            let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) else {
                return false;
            };
            if matches!(op, CompareOp::Gt) {
                l > r
            } else {
                l < r
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn apply_filter(filter: &FilterCall, input: &str, raw_value: Option<&Value>) -> String {
    match filter.name.as_str() {
        "uppercase" => input.to_uppercase(),
        "lowercase" => input.to_lowercase(),
        "capitalize" => capitalize(input),
        "length" => match raw_value {
            Some(Value::Array(a)) => a.len().to_string(),
            Some(Value::String(s)) => s.chars().count().to_string(),
            _ => input.chars().count().to_string(),
        },
        "join" => {
            let sep = filter.args.first().map(String::as_str).unwrap_or(", ");
            match raw_value {
                Some(Value::Array(items)) => items.iter().map(value_to_string).collect::<Vec<_>>().join(sep),
                _ => input.to_string(),
            }
        }
        "pluralize" => {
            let count = raw_value.and_then(Value::as_f64).unwrap_or(1.0);
            let singular = filter.args.first().cloned().unwrap_or_else(|| input.to_string());
            let plural = filter.args.get(1).cloned().unwrap_or_else(|| format!("{singular}s"));
            if (count - 1.0).abs() < f64::EPSILON {
                singular
            } else {
                plural
            }
        }
        // Unreachable for any `Template` built via `compile`/`validate`: those
        // reject unknown filter names up front. Kept as a plain passthrough
        // rather than a panic in case a `Node` tree is ever built another way.
        _ => input.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_variable() {
        let t = Template::compile("Hello, {{name}}!").unwrap();
        let ctx = Context::new().set("name", "Morgan");
        let out = t.render(&ctx);
        assert_eq!(out.text, "Hello, Morgan!");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn missing_variable_renders_empty_with_warning() {
        let t = Template::compile("Hello, {{name}}!").unwrap();
        let out = t.render(&Context::new());
        assert_eq!(out.text, "Hello, !");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn applies_filter_chain() {
        let t = Template::compile("{{name | lowercase | capitalize}}").unwrap();
        let ctx = Context::new().set("name", "MORGAN");
        assert_eq!(t.render(&ctx).text, "Morgan");
    }

    #[test]
    fn if_else_branches_on_comparison() {
        let t = Template::compile("{{#if count > 1}}many{{else}}one{{/if}}").unwrap();
        assert_eq!(t.render(&Context::new().set("count", 5)).text, "many");
        assert_eq!(t.render(&Context::new().set("count", 1)).text, "one");
    }

    #[test]
    fn unless_suppresses_when_truthy() {
        let t = Template::compile("{{#unless quiet}}loud{{/unless}}").unwrap();
        assert_eq!(t.render(&Context::new().set("quiet", true)).text, "");
        assert_eq!(t.render(&Context::new().set("quiet", false)).text, "loud");
    }

    #[test]
    fn each_exposes_this_and_index() {
        let t = Template::compile("{{#each items}}{{@index}}:{{this}} {{/each}}").unwrap();
        let ctx = Context::new().set("items", serde_json::json!(["a", "b"]));
        assert_eq!(t.render(&ctx).text, "0:a 1:b ");
    }

    #[test]
    fn join_filter_uses_default_separator() {
        let t = Template::compile("{{tags | join}}").unwrap();
        let ctx = Context::new().set("tags", serde_json::json!(["x", "y", "z"]));
        assert_eq!(t.render(&ctx).text, "x, y, z");
    }

    #[test]
    fn unclosed_block_fails_validation() {
        assert!(Template::validate("{{#if x}}no close").is_err());
    }

    #[test]
    fn dangling_close_fails_validation() {
        assert!(Template::validate("stray {{/if}}").is_err());
    }

    #[test]
    fn unknown_filter_fails_validation_instead_of_rendering() {
        let err = Template::compile("{{name | shout}}").unwrap_err();
        assert!(matches!(err, TemplateError::UnknownFilter { name } if name == "shout"));
        assert!(Template::validate("{{name | shout}}").is_err());
    }

    #[test]
    fn unknown_filter_nested_in_a_block_still_fails_validation() {
        assert!(Template::compile("{{#each items}}{{this | shout}}{{/each}}").is_err());
    }
}
