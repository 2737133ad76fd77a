//! Placeholder substitution for paths, bodies and patterns
//!
//! `{{name}}` reads a binding from the [`ScenarioContext`]; `{{fake.kind}}`
//! draws from [`super::fake`]. A string that is exactly one placeholder is
//! replaced by the value with its JSON type; otherwise values are spliced in
//! as text.

use serde_json::Value;

use crate::common::{Error, Result};

use super::context::ScenarioContext;
use super::fake;

/// A parsed `{{...}}` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Binding(String),
    Fake(String),
}

/// A string split into literal text and placeholders
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Hole(Placeholder),
}

fn parse(input: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            segments.push(Segment::Text(&rest[..start]));
        }
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| {
            Error::Template(format!("Unterminated placeholder in '{}'", input))
        })?;
        let inner = after[..end].trim();
        if inner.is_empty() {
            return Err(Error::Template(format!("Empty placeholder in '{}'", input)));
        }
        let hole = match inner.strip_prefix("fake.") {
            Some(kind) => Placeholder::Fake(kind.to_string()),
            None => Placeholder::Binding(inner.to_string()),
        };
        segments.push(Segment::Hole(hole));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Ok(segments)
}

/// Placeholders used in a string
pub fn placeholders(input: &str) -> Result<Vec<Placeholder>> {
    Ok(parse(input)?
        .into_iter()
        .filter_map(|s| match s {
            Segment::Hole(p) => Some(p),
            Segment::Text(_) => None,
        })
        .collect())
}

/// Placeholders used anywhere in a JSON value (keys excluded)
pub fn placeholders_in_value(value: &Value) -> Result<Vec<Placeholder>> {
    let mut found = Vec::new();
    collect_placeholders(value, &mut found)?;
    Ok(found)
}

fn collect_placeholders(value: &Value, found: &mut Vec<Placeholder>) -> Result<()> {
    match value {
        Value::String(s) => found.extend(placeholders(s)?),
        Value::Array(items) => {
            for item in items {
                collect_placeholders(item, found)?;
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_placeholders(item, found)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Binding names referenced anywhere in a JSON value (keys excluded)
pub fn bindings_in_value(value: &Value) -> Result<Vec<String>> {
    Ok(placeholders_in_value(value)?
        .into_iter()
        .filter_map(|p| match p {
            Placeholder::Binding(name) => Some(name),
            Placeholder::Fake(_) => None,
        })
        .collect())
}

/// Binding names referenced in a string
pub fn bindings_in_str(input: &str) -> Result<Vec<String>> {
    Ok(placeholders(input)?
        .into_iter()
        .filter_map(|p| match p {
            Placeholder::Binding(name) => Some(name),
            Placeholder::Fake(_) => None,
        })
        .collect())
}

fn resolve(placeholder: &Placeholder, ctx: &mut ScenarioContext) -> Result<Value> {
    match placeholder {
        Placeholder::Binding(name) => ctx.get(name).cloned(),
        Placeholder::Fake(kind) => fake::generate(kind, ctx.rng()),
    }
}

/// Render a value as text for splicing into a longer string
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a string, always producing text
pub fn render_str(input: &str, ctx: &mut ScenarioContext) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    for segment in parse(input)? {
        match segment {
            Segment::Text(t) => out.push_str(t),
            Segment::Hole(p) => out.push_str(&as_text(&resolve(&p, ctx)?)),
        }
    }
    Ok(out)
}

/// Render every string leaf of a JSON value
pub fn render_value(value: &Value, ctx: &mut ScenarioContext) -> Result<Value> {
    match value {
        Value::String(s) => {
            let mut segments = parse(s)?;
            if segments.len() == 1 {
                if let Some(Segment::Hole(p)) = segments.pop() {
                    return resolve(&p, ctx);
                }
            }
            render_str(s, ctx).map(Value::String)
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), render_value(item, ctx)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}
