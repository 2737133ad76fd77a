//! Built-in scenario groups
//!
//! The YAML files under `scenarios/` are compiled into the binary so the
//! suites run without any files next to it.

use crate::common::{Error, Result};
use crate::scenario::Scenario;

const MARKET: &str = include_str!("../scenarios/market.yaml");
const FRUIT: &str = include_str!("../scenarios/fruit.yaml");

/// Names accepted by [`builtin`], in run order
pub const NAMES: &[&str] = &["market", "fruit"];

/// Raw YAML of a built-in group
pub fn source(name: &str) -> Option<&'static str> {
    match name {
        "market" => Some(MARKET),
        "fruit" => Some(FRUIT),
        _ => None,
    }
}

/// Parse a built-in group by name
pub fn builtin(name: &str) -> Result<Scenario> {
    let yaml = source(name).ok_or_else(|| {
        Error::Config(format!(
            "Unknown suite '{}'. Available: {}",
            name,
            NAMES.join(", ")
        ))
    })?;
    Scenario::from_yaml(yaml)
}

/// Every built-in group, market first
pub fn all() -> Result<Vec<Scenario>> {
    NAMES.iter().map(|name| builtin(name)).collect()
}
