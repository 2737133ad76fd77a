//! CLI command handling
//!
//! Resolves configuration, builds the client and reporter, and dispatches
//! to the runner.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;

use crate::commands::{Commands, RunOptions, Suite};
use crate::common::config::{Config, ReportFormat};
use crate::common::{Error, Result};
use crate::http::ApiClient;
use crate::scenario::{self, plan, ConsoleReporter, JsonReporter, Reporter, RunSummary, Scenario};
use crate::suites;

/// Settings after merging CLI flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub format: ReportFormat,
}

impl Settings {
    pub fn resolve(config: &Config, options: &RunOptions) -> Self {
        Self {
            base_url: options
                .base_url
                .clone()
                .unwrap_or_else(|| config.api.base_url.clone()),
            timeout: options
                .timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.timeouts.request()),
            format: options.format.unwrap_or(config.report.format),
        }
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, verbose: bool) -> Result<()> {
    match command {
        Commands::Run { suite, options } => {
            let scenarios = builtin_scenarios(suite)?;
            run(&scenarios, &options, verbose).await
        }

        Commands::Test { paths, options } => {
            let scenarios = load_scenarios(&paths)?;
            run(&scenarios, &options, verbose).await
        }

        Commands::List => {
            for name in suites::NAMES {
                let scenario = suites::builtin(name)?;
                println!("{} ({})", name.white().bold(), scenario.name);
                for (phase, index, step) in scenario.ordered_steps() {
                    println!(
                        "  {} {:>2}. {} {}",
                        phase.to_string().dimmed(),
                        index + 1,
                        step.name,
                        format!("[{} {}]", step.request.method, step.request.path).dimmed()
                    );
                }
            }
            Ok(())
        }

        Commands::Check { paths } => {
            for path in &paths {
                let scenario = Scenario::load(path)?;
                let plan = plan::validate(&scenario)?;
                println!(
                    "  {} {} ({} steps)",
                    "✓".green(),
                    path.display(),
                    plan.len()
                );
            }
            Ok(())
        }
    }
}

fn builtin_scenarios(suite: Suite) -> Result<Vec<Scenario>> {
    suite.names().iter().map(|name| suites::builtin(name)).collect()
}

fn load_scenarios(paths: &[PathBuf]) -> Result<Vec<Scenario>> {
    paths.iter().map(|path| Scenario::load(path)).collect()
}

async fn run(scenarios: &[Scenario], options: &RunOptions, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let settings = Settings::resolve(&config, options);
    let client = ApiClient::new(&settings.base_url, settings.timeout)?;

    tracing::debug!(?settings, "resolved settings");

    let mut reporter: Box<dyn Reporter> = match settings.format {
        ReportFormat::Console => Box::new(ConsoleReporter::new(verbose)),
        ReportFormat::Json => Box::new(JsonReporter::stdout()),
    };

    let summary = scenario::run_all(scenarios, &client, reporter.as_mut()).await?;
    outcome(&summary)
}

/// Turn a finished run into the process result
pub fn outcome(summary: &RunSummary) -> Result<()> {
    if summary.success() {
        Ok(())
    } else {
        Err(Error::RunFailed {
            failed: summary.failed(),
            skipped: summary.skipped(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let config = Config::from_toml(
            r#"
[api]
base_url = "http://from-file"

[timeouts]
request_secs = 10
"#,
        )
        .unwrap();

        let settings = Settings::resolve(&config, &RunOptions::default());
        assert_eq!(settings.base_url, "http://from-file");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.format, ReportFormat::Console);

        let options = RunOptions {
            base_url: Some("http://from-flag".into()),
            timeout: Some(2),
            format: Some(ReportFormat::Json),
        };
        let settings = Settings::resolve(&config, &options);
        assert_eq!(settings.base_url, "http://from-flag");
        assert_eq!(settings.timeout, Duration::from_secs(2));
        assert_eq!(settings.format, ReportFormat::Json);
    }

    #[test]
    fn test_suite_selection() {
        assert_eq!(builtin_scenarios(Suite::Market).unwrap().len(), 1);
        let all = builtin_scenarios(Suite::All).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Mercado");
    }

    #[test]
    fn test_empty_run_is_success() {
        assert!(outcome(&RunSummary::default()).is_ok());
    }
}
