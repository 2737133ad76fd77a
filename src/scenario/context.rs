//! Scenario-scoped state threaded through every step

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use crate::common::{Error, Result};

/// Values captured by earlier steps of one scenario run
///
/// A fresh context is created for every scenario; nothing is shared
/// between groups.
#[derive(Debug)]
pub struct ScenarioContext {
    bindings: BTreeMap<String, Value>,
    rng: StdRng,
}

impl Default for ScenarioContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Context with deterministic fake data
    pub fn with_seed(seed: u64) -> Self {
        Self {
            bindings: BTreeMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.bindings
            .get(name)
            .ok_or_else(|| Error::MissingBinding(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bind a value, replacing any earlier capture under the same name
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
