//! mercado-e2e - End-to-end scenario runner for the mercado API
//!
//! This library runs ordered groups of dependent HTTP steps against the
//! remote mercado/hortifruit API, asserting status codes and response shapes
//! and passing captured identifiers between steps.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod scenario;
pub mod suites;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use http::ApiClient;
pub use scenario::{run_all, run_scenario, Scenario, ScenarioContext};
