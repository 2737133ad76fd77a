//! CLI command definitions
//!
//! Defines the clap commands for the scenario runner CLI.

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::common::config::ReportFormat;

#[derive(Subcommand)]
pub enum Commands {
    /// Run built-in scenario groups against the API
    Run {
        /// Which group to run
        #[arg(value_enum, default_value_t = Suite::All)]
        suite: Suite,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Run scenario groups defined in YAML files
    Test {
        /// Paths to YAML scenario files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: RunOptions,
    },

    /// List built-in groups and their steps
    List,

    /// Validate scenario files without sending requests
    Check {
        /// Paths to YAML scenario files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// Built-in scenario groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    /// Market CRUD
    Market,
    /// Fruit CRUD nested under a market
    Fruit,
    /// Market then fruit
    All,
}

impl Suite {
    /// Built-in names covered by this selection
    pub fn names(&self) -> &'static [&'static str] {
        match self {
            Suite::Market => &["market"],
            Suite::Fruit => &["fruit"],
            Suite::All => crate::suites::NAMES,
        }
    }
}

/// Options shared by commands that send requests
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Base URL of the API (overrides the config file)
    #[arg(long, env = "MERCADO_BASE_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (default: 30)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Report format (default: console)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
}
