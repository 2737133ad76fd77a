//! Reporting of step outcomes
//!
//! The runner never prints directly; it hands every event to a [`Reporter`].

use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::config::{Phase, Scenario};

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    Failed(String),
    Skipped(String),
}

impl StepOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepOutcome::Passed)
    }
}

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub scenario: String,
    pub phase: Phase,
    /// 1-based position within the phase
    pub number: usize,
    pub name: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Status code received, if a response arrived
    pub status: Option<u16>,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
    /// Bindings captured by this step
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub captured: BTreeMap<String, Value>,
}

/// Result of one scenario group
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
    #[serde(skip)]
    pub steps: Vec<StepReport>,
}

impl ScenarioSummary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }

    /// Report for a step by name
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub scenarios: Vec<ScenarioSummary>,
    #[serde(serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.scenarios.iter().map(|s| s.passed).sum()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.iter().map(|s| s.failed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.scenarios.iter().map(|s| s.skipped).sum()
    }

    pub fn success(&self) -> bool {
        self.scenarios.iter().all(ScenarioSummary::success)
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Receives runner events
pub trait Reporter {
    fn scenario_started(&mut self, scenario: &Scenario);
    fn step_finished(&mut self, report: &StepReport);
    fn scenario_finished(&mut self, summary: &ScenarioSummary);
    fn run_finished(&mut self, summary: &RunSummary);
}

/// Colored per-step list on stdout
pub struct ConsoleReporter {
    verbose: bool,
    current_phase: Option<Phase>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            current_phase: None,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn scenario_started(&mut self, scenario: &Scenario) {
        self.current_phase = None;
        println!(
            "\n{} {}",
            "Running Scenario:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
    }

    fn step_finished(&mut self, report: &StepReport) {
        if self.current_phase != Some(report.phase) {
            self.current_phase = Some(report.phase);
            let header = match report.phase {
                Phase::Setup => "Setup:",
                Phase::Step => "Steps:",
            };
            println!("\n{}", header.cyan());
        }

        let timing = format!("({} ms)", report.elapsed.as_millis());
        match &report.outcome {
            StepOutcome::Passed => {
                println!(
                    "  {} Step {}: {} {}",
                    "✓".green(),
                    report.number,
                    report.name,
                    timing.dimmed()
                );
                if self.verbose {
                    for (name, value) in &report.captured {
                        println!("      {} = {}", name.dimmed(), value.to_string().dimmed());
                    }
                }
            }
            StepOutcome::Failed(message) => {
                println!("  {} Step {}: {} {}", "✗".red(), report.number, report.name, timing.dimmed());
                println!("      {}", message.red());
            }
            StepOutcome::Skipped(reason) => {
                println!("  {} Step {}: {}", "-".yellow(), report.number, report.name.dimmed());
                println!("      {}", format!("skipped: {}", reason).yellow());
            }
        }
    }

    fn scenario_finished(&mut self, summary: &ScenarioSummary) {
        let line = format!(
            "{} passed, {} failed, {} skipped",
            summary.passed, summary.failed, summary.skipped
        );
        if summary.success() {
            println!("\n{} {} ({})", "✓".green().bold(), "Scenario Passed".green().bold(), line);
        } else {
            println!("\n{} {} ({})", "✗".red().bold(), "Scenario Failed".red().bold(), line);
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        println!("\n{}", "Summary:".cyan().bold());
        for scenario in &summary.scenarios {
            let mark = if scenario.success() { "✓".green() } else { "✗".red() };
            println!(
                "  {} {} ({}/{} passed)",
                mark,
                scenario.name,
                scenario.passed,
                scenario.total()
            );
        }
        let totals = format!(
            "{} passed, {} failed, {} skipped in {:.2}s",
            summary.passed(),
            summary.failed(),
            summary.skipped(),
            summary.elapsed.as_secs_f64()
        );
        if summary.success() {
            println!("\n{}\n", totals.green().bold());
        } else {
            println!("\n{}\n", totals.red().bold());
        }
    }
}

/// Event envelope written by [`JsonReporter`]
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    ScenarioStarted {
        scenario: &'a str,
        steps: usize,
    },
    Step(&'a StepReport),
    ScenarioFinished(&'a ScenarioSummary),
    RunFinished {
        passed: usize,
        failed: usize,
        skipped: usize,
        success: bool,
        #[serde(serialize_with = "as_millis")]
        elapsed: Duration,
    },
}

/// One JSON object per event, one per line
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: std::io::stdout() }
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &JsonEvent<'_>) {
        match serde_json::to_string(event) {
            Ok(line) => {
                if let Err(e) = writeln!(self.out, "{}", line) {
                    tracing::warn!("failed to write report line: {}", e);
                }
            }
            Err(e) => tracing::warn!("failed to serialize report event: {}", e),
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn scenario_started(&mut self, scenario: &Scenario) {
        self.emit(&JsonEvent::ScenarioStarted {
            scenario: &scenario.name,
            steps: scenario.setup.len() + scenario.steps.len(),
        });
    }

    fn step_finished(&mut self, report: &StepReport) {
        self.emit(&JsonEvent::Step(report));
    }

    fn scenario_finished(&mut self, summary: &ScenarioSummary) {
        self.emit(&JsonEvent::ScenarioFinished(summary));
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        self.emit(&JsonEvent::RunFinished {
            passed: summary.passed(),
            failed: summary.failed(),
            skipped: summary.skipped(),
            success: summary.success(),
            elapsed: summary.elapsed,
        });
        if let Err(e) = self.out.flush() {
            tracing::warn!("failed to flush report: {}", e);
        }
    }
}

/// Keeps every event, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub started: Vec<String>,
    pub steps: Vec<StepReport>,
    pub finished: Vec<ScenarioSummary>,
    pub runs: usize,
}

impl Reporter for MemoryReporter {
    fn scenario_started(&mut self, scenario: &Scenario) {
        self.started.push(scenario.name.clone());
    }

    fn step_finished(&mut self, report: &StepReport) {
        self.steps.push(report.clone());
    }

    fn scenario_finished(&mut self, summary: &ScenarioSummary) {
        self.finished.push(summary.clone());
    }

    fn run_finished(&mut self, _summary: &RunSummary) {
        self.runs += 1;
    }
}
