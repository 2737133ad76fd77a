//! Field extraction from response bodies
//!
//! Paths are dot-separated (`novoMercado.id`); numeric segments index
//! arrays (`0.id`). The empty path selects the whole body.

use serde_json::Value;

use crate::common::{Error, Result};

/// Extract a non-null value at `path`
pub fn extract<'a>(body: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = body;
    let mut walked = String::new();

    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };

        current = next.ok_or_else(|| {
            let at = if walked.is_empty() { "body" } else { walked.as_str() };
            Error::extraction(path, format!("'{}' has no field '{}'", at, segment))
        })?;

        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);
    }

    if current.is_null() {
        return Err(Error::extraction(path, "value is null"));
    }
    Ok(current)
}
