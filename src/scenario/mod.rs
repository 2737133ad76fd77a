//! Scenario runner
//!
//! Reads YAML scenario groups and executes their steps in order against the
//! remote API, threading captured identifiers from step to step through an
//! explicit context. Assertions are made against parsed JSON rather than raw
//! response text.

mod config;
pub mod context;
pub mod extract;
pub mod fake;
pub mod plan;
pub mod report;
mod runner;
pub mod shape;
pub mod template;

pub use config::*;
pub use context::ScenarioContext;
pub use plan::Plan;
pub use report::{
    ConsoleReporter, JsonReporter, MemoryReporter, Reporter, RunSummary, ScenarioSummary,
    StepOutcome, StepReport,
};
pub use runner::{run_all, run_planned, run_scenario, run_step, StepCapture};
