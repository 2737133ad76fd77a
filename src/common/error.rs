//! Error types for the scenario runner
//!
//! Messages name the step, binding or path involved so a failing run can be
//! diagnosed from the report alone.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    // === Scenario Errors ===
    #[error("Failed to parse scenario: {0}")]
    ScenarioParse(String),

    #[error("Step '{step}' cannot run in this order: {reason}")]
    Plan { step: String, reason: String },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Binding '{0}' has no value in this scenario")]
    MissingBinding(String),

    #[error("Cannot extract '{path}' from response body: {reason}")]
    Extraction { path: String, reason: String },

    // === Assertion Errors ===
    #[error("Expected status {expected}, got {actual}")]
    StatusMismatch {
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("Response body mismatch at {path}: expected {expected}, got {actual}")]
    ShapeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    // === Transport Errors ===
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // === Run Errors ===
    #[error("{failed} step(s) failed, {skipped} skipped")]
    RunFailed { failed: usize, skipped: usize },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a plan error for a step
    pub fn plan(step: &str, reason: impl Into<String>) -> Self {
        Self::Plan {
            step: step.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an extraction error for a path
    pub fn extraction(path: &str, reason: impl Into<String>) -> Self {
        Self::Extraction {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error at a JSON path
    pub fn shape_mismatch(path: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this error is an assertion about the response rather than a
    /// failure to obtain one
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Error::StatusMismatch { .. } | Error::ShapeMismatch { .. } | Error::Extraction { .. }
        )
    }

    /// Whether the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Network { .. })
    }
}
