//! Scenario configuration types
//!
//! Defines the data structures for deserializing YAML scenario groups.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::common::{Error, Result};
use crate::http::Method;

/// An ordered group of dependent steps loaded from a YAML file
#[derive(Deserialize, Debug, Clone)]
pub struct Scenario {
    /// Name of the scenario group
    pub name: String,
    /// Optional description of what the group verifies
    pub description: Option<String>,
    /// Steps provisioning fixtures for the group; any failure aborts it
    #[serde(default)]
    pub setup: Vec<Step>,
    /// The sequence of steps to execute
    pub steps: Vec<Step>,
}

/// A single request/assertion step
#[derive(Deserialize, Debug, Clone)]
pub struct Step {
    pub name: String,
    pub request: RequestSpec,
    pub expect: Expectation,
    /// Binding name -> extraction path into the response body
    #[serde(default)]
    pub capture: BTreeMap<String, String>,
    /// Bindings this step needs beyond the placeholders it already uses
    #[serde(default)]
    pub requires: Vec<String>,
}

/// The request a step issues
#[derive(Deserialize, Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Resource path appended to the base URL; may contain placeholders
    pub path: String,
    /// JSON body; string leaves may contain placeholders
    pub body: Option<Value>,
}

/// What a step asserts about the response
#[derive(Deserialize, Debug, Clone)]
pub struct Expectation {
    /// Expected status code (exact match)
    pub status: u16,
    /// Structural pattern; see [`crate::scenario::shape`]
    pub json_like: Option<Value>,
    /// Expected body (exact match)
    pub json: Option<Value>,
}

/// Which part of the scenario a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Step,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Step => f.write_str("step"),
        }
    }
}

impl Scenario {
    /// Load and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content)
            .map_err(|e| Error::ScenarioParse(format!("{}: {}", path.display(), e)))
    }

    /// Parse a scenario from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ScenarioParse(e.to_string()))
    }

    /// Look up a step by phase and position
    pub fn step(&self, phase: Phase, index: usize) -> Option<&Step> {
        match phase {
            Phase::Setup => self.setup.get(index),
            Phase::Step => self.steps.get(index),
        }
    }

    /// Setup steps followed by regular steps, in execution order
    pub fn ordered_steps(&self) -> impl Iterator<Item = (Phase, usize, &Step)> {
        self.setup
            .iter()
            .enumerate()
            .map(|(i, s)| (Phase::Setup, i, s))
            .chain(self.steps.iter().enumerate().map(|(i, s)| (Phase::Step, i, s)))
    }
}
