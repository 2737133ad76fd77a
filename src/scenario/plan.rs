//! Dependency plan for a scenario
//!
//! Every step declares its inputs (placeholders it uses plus `requires`) and
//! outputs (`capture` keys). A scenario is only runnable when each input is
//! produced by an earlier step, so reordering a step ahead of its producer is
//! rejected before any request goes out.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::common::{Error, Result};

use super::config::{Phase, Scenario, Step};
use super::fake;
use super::shape::Pattern;
use super::template::{self, Placeholder};

/// A binding a step consumes and the step that produces it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub binding: String,
    /// Position of the producing step in [`Plan::steps`]
    pub producer: usize,
}

#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub phase: Phase,
    /// Position within its phase
    pub index: usize,
    pub name: String,
    pub inputs: Vec<Input>,
    pub outputs: Vec<String>,
}

/// Validated execution order of a scenario
#[derive(Debug, Clone)]
pub struct Plan {
    pub steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// All bindings a step reads, in first-use order
pub fn step_inputs(step: &Step) -> Result<Vec<String>> {
    let mut names = Vec::new();
    names.extend(template::bindings_in_str(&step.request.path)?);
    if let Some(body) = &step.request.body {
        names.extend(template::bindings_in_value(body)?);
    }
    if let Some(pattern) = &step.expect.json_like {
        names.extend(template::bindings_in_value(pattern)?);
    }
    if let Some(exact) = &step.expect.json {
        names.extend(template::bindings_in_value(exact)?);
    }
    names.extend(step.requires.iter().cloned());

    let mut seen = HashSet::new();
    names.retain(|n| seen.insert(n.clone()));
    Ok(names)
}

/// Fake kinds a step draws from that no generator provides
pub fn unknown_fakes(step: &Step) -> Result<Vec<String>> {
    let mut found = template::placeholders(&step.request.path)?;
    for value in [&step.request.body, &step.expect.json_like, &step.expect.json]
        .into_iter()
        .flatten()
    {
        found.extend(template::placeholders_in_value(value)?);
    }

    let mut unknown: Vec<String> = found
        .into_iter()
        .filter_map(|p| match p {
            Placeholder::Fake(kind) if !fake::KINDS.contains(&kind.as_str()) => Some(kind),
            _ => None,
        })
        .collect();
    unknown.dedup();
    Ok(unknown)
}

/// Validate ordering and build the plan
pub fn validate(scenario: &Scenario) -> Result<Plan> {
    if scenario.steps.is_empty() {
        return Err(Error::ScenarioParse(format!(
            "Scenario '{}' has no steps",
            scenario.name
        )));
    }

    // Bindings produced anywhere, to tell "later" from "never"
    let mut producers_anywhere: HashMap<&str, &str> = HashMap::new();
    for (_, _, step) in scenario.ordered_steps() {
        for name in step.capture.keys() {
            producers_anywhere.entry(name.as_str()).or_insert(step.name.as_str());
        }
    }

    let mut names = BTreeSet::new();
    let mut latest: HashMap<String, usize> = HashMap::new();
    let mut steps = Vec::with_capacity(scenario.setup.len() + scenario.steps.len());

    for (position, (phase, index, step)) in scenario.ordered_steps().enumerate() {
        if step.name.trim().is_empty() {
            return Err(Error::plan(
                &format!("{} #{}", phase, index + 1),
                "step name must not be empty",
            ));
        }
        if !names.insert(step.name.as_str()) {
            return Err(Error::plan(&step.name, "another step has the same name"));
        }

        // A bad regex fails before any request
        if let Some(pattern) = &step.expect.json_like {
            Pattern::compile(pattern).map_err(|e| Error::plan(&step.name, e.to_string()))?;
        }

        let unknown = unknown_fakes(step).map_err(|e| Error::plan(&step.name, e.to_string()))?;
        if let Some(kind) = unknown.first() {
            return Err(Error::plan(
                &step.name,
                format!("unknown fake kind '{}'. Supported: {}", kind, fake::KINDS.join(", ")),
            ));
        }

        let mut inputs = Vec::new();
        for binding in step_inputs(step).map_err(|e| Error::plan(&step.name, e.to_string()))? {
            match latest.get(&binding) {
                Some(&producer) => inputs.push(Input { binding, producer }),
                None => {
                    let reason = match producers_anywhere.get(binding.as_str()) {
                        Some(later) if *later == step.name => format!(
                            "binding '{}' is captured by this step and cannot be used by it",
                            binding
                        ),
                        Some(later) => format!(
                            "binding '{}' is produced later by step '{}'",
                            binding, later
                        ),
                        None => format!("binding '{}' is never produced", binding),
                    };
                    return Err(Error::plan(&step.name, reason));
                }
            }
        }

        let outputs: Vec<String> = step.capture.keys().cloned().collect();
        for name in &outputs {
            latest.insert(name.clone(), position);
        }

        steps.push(PlannedStep {
            phase,
            index,
            name: step.name.clone(),
            inputs,
            outputs,
        });
    }

    Ok(Plan { steps })
}
