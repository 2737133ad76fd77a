//! Shape matching for response bodies
//!
//! A `json_like` pattern is a JSON value where:
//! - objects match when every pattern key is present and matches (extra keys
//!   in the response are fine)
//! - arrays match when every pattern element matches some response element,
//!   in any order
//! - strings written as `/regex/` match the response value's text; a
//!   leading `//` escapes this, so `"//mercado/"` is the literal `/mercado/`
//! - anything else must be equal, numbers compared by value

use regex::Regex;
use serde_json::Value;

use crate::common::{Error, Result};

/// A compiled `json_like` pattern
#[derive(Debug)]
pub enum Pattern {
    Regex(Regex),
    Object(Vec<(String, Pattern)>),
    Array(Vec<Pattern>),
    Exact(Value),
}

/// Where and why a body did not match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub path: String,
    pub expected: String,
    pub actual: String,
}

impl From<Mismatch> for Error {
    fn from(m: Mismatch) -> Self {
        Error::shape_mismatch(&m.path, m.expected, m.actual)
    }
}

fn regex_source(s: &str) -> Option<&str> {
    if s.starts_with("//") {
        return None;
    }
    if s.len() >= 2 && s.starts_with('/') && s.ends_with('/') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Text a regex is tested against
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(mut text: String) -> String {
    if text.chars().count() > 120 {
        text = text.chars().take(117).collect();
        text.push_str("...");
    }
    text
}

fn values_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => expected == actual,
    }
}

impl Pattern {
    /// Compile a pattern, validating every embedded regex
    pub fn compile(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => match regex_source(s) {
                Some(src) => Regex::new(src)
                    .map(Pattern::Regex)
                    .map_err(|e| Error::ScenarioParse(format!("Invalid regex '{}': {}", s, e))),
                None => match s.strip_prefix("//") {
                    Some(literal) => Ok(Pattern::Exact(Value::String(format!("/{}", literal)))),
                    None => Ok(Pattern::Exact(value.clone())),
                },
            },
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), Pattern::compile(v)?)))
                .collect::<Result<Vec<_>>>()
                .map(Pattern::Object),
            Value::Array(items) => items
                .iter()
                .map(Pattern::compile)
                .collect::<Result<Vec<_>>>()
                .map(Pattern::Array),
            other => Ok(Pattern::Exact(other.clone())),
        }
    }

    /// Short description for mismatch reports
    pub fn describe(&self) -> String {
        match self {
            Pattern::Regex(re) => format!("/{}/", re.as_str()),
            Pattern::Object(fields) => format!(
                "object with {}",
                fields
                    .iter()
                    .map(|(k, _)| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Pattern::Array(items) => format!("array matching {} pattern(s)", items.len()),
            Pattern::Exact(v) => truncate(v.to_string()),
        }
    }

    /// Match a value; `path` is the JSON path of `actual`
    pub fn matches(&self, actual: &Value, path: &str) -> std::result::Result<(), Mismatch> {
        match self {
            Pattern::Regex(re) => {
                let text = as_text(actual);
                if re.is_match(&text) {
                    Ok(())
                } else {
                    Err(self.mismatch(path, actual))
                }
            }
            Pattern::Exact(expected) => {
                if values_equal(expected, actual) {
                    Ok(())
                } else {
                    Err(self.mismatch(path, actual))
                }
            }
            Pattern::Object(fields) => {
                let map = actual.as_object().ok_or_else(|| self.mismatch(path, actual))?;
                for (key, pattern) in fields {
                    let child = format!("{}.{}", path, key);
                    match map.get(key) {
                        Some(value) => pattern.matches(value, &child)?,
                        None => {
                            return Err(Mismatch {
                                path: child,
                                expected: pattern.describe(),
                                actual: "missing field".to_string(),
                            })
                        }
                    }
                }
                Ok(())
            }
            Pattern::Array(patterns) => {
                let items = actual.as_array().ok_or_else(|| self.mismatch(path, actual))?;
                for (i, pattern) in patterns.iter().enumerate() {
                    if items.iter().any(|item| pattern.matches(item, path).is_ok()) {
                        continue;
                    }
                    return Err(match items.first() {
                        None => Mismatch {
                            path: format!("{}[{}]", path, i),
                            expected: pattern.describe(),
                            actual: "empty array".to_string(),
                        },
                        Some(first) => {
                            let first_path = format!("{}[0]", path);
                            let inner = pattern
                                .matches(first, &first_path)
                                .err()
                                .unwrap_or_else(|| pattern.mismatch(&first_path, first));
                            Mismatch {
                                actual: format!(
                                    "{} (none of {} element(s) matched)",
                                    inner.actual,
                                    items.len()
                                ),
                                ..inner
                            }
                        }
                    });
                }
                Ok(())
            }
        }
    }

    fn mismatch(&self, path: &str, actual: &Value) -> Mismatch {
        Mismatch {
            path: path.to_string(),
            expected: self.describe(),
            actual: truncate(actual.to_string()),
        }
    }
}

/// Assert that `actual` is like `pattern`
pub fn check_like(pattern: &Value, actual: &Value) -> Result<()> {
    Pattern::compile(pattern)?.matches(actual, "$")?;
    Ok(())
}

/// Assert that `actual` equals `expected`
pub fn check_exact(expected: &Value, actual: &Value) -> Result<()> {
    if values_equal(expected, actual) {
        Ok(())
    } else {
        Err(Error::shape_mismatch(
            "$",
            truncate(expected.to_string()),
            truncate(actual.to_string()),
        ))
    }
}
