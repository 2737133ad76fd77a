//! Scenario runner implementation
//!
//! Executes the steps of a scenario strictly in order against the remote
//! API. Each step sees the bindings captured by the steps before it through
//! an explicit [`ScenarioContext`].

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::common::{Error, Result};
use crate::http::ApiClient;

use super::config::{Phase, Scenario, Step};
use super::context::ScenarioContext;
use super::extract::extract;
use super::plan::{self, Plan};
use super::report::{Reporter, RunSummary, ScenarioSummary, StepOutcome, StepReport};
use super::shape;
use super::template;

/// Values a passing step captured
#[derive(Debug, Clone)]
pub struct StepCapture {
    pub status: u16,
    pub elapsed: Duration,
    pub values: BTreeMap<String, Value>,
}

/// Execute one step: a single request plus its assertions
///
/// Captured values are returned, not bound; the caller decides whether they
/// enter the context.
pub async fn run_step(client: &ApiClient, ctx: &mut ScenarioContext, step: &Step) -> Result<StepCapture> {
    let path = template::render_str(&step.request.path, ctx)?;
    let body = step
        .request
        .body
        .as_ref()
        .map(|b| template::render_value(b, ctx))
        .transpose()?;
    let json_like = step
        .expect
        .json_like
        .as_ref()
        .map(|p| template::render_value(p, ctx))
        .transpose()?;
    let json = step
        .expect
        .json
        .as_ref()
        .map(|p| template::render_value(p, ctx))
        .transpose()?;

    let response = client.send(step.request.method, &path, body.as_ref()).await?;

    if response.status != step.expect.status {
        return Err(Error::StatusMismatch {
            expected: step.expect.status,
            actual: response.status,
            body: response.body.to_string(),
        });
    }

    if let Some(pattern) = &json_like {
        shape::check_like(pattern, &response.body)?;
    }
    if let Some(expected) = &json {
        shape::check_exact(expected, &response.body)?;
    }

    let mut values = BTreeMap::new();
    for (name, extraction) in &step.capture {
        let value = extract(&response.body, extraction)?;
        values.insert(name.clone(), value.clone());
    }

    Ok(StepCapture {
        status: response.status,
        elapsed: response.elapsed,
        values,
    })
}

/// Status of a planned step during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Passed,
    Failed,
    Skipped,
}

/// Why a step cannot run, if it cannot
fn blocked_reason(plan: &Plan, states: &[State], position: usize, failed_setup: Option<&str>) -> Option<String> {
    if let Some(setup) = failed_setup {
        return Some(format!("setup step '{}' did not pass", setup));
    }
    plan.steps[position]
        .inputs
        .iter()
        .find(|input| states[input.producer] != State::Passed)
        .map(|input| {
            format!(
                "upstream step '{}' did not produce '{}'",
                plan.steps[input.producer].name, input.binding
            )
        })
}

/// Run a scenario with a fresh context
pub async fn run_scenario(
    scenario: &Scenario,
    client: &ApiClient,
    reporter: &mut dyn Reporter,
) -> Result<ScenarioSummary> {
    let plan = plan::validate(scenario)?;
    run_planned(scenario, &plan, client, ScenarioContext::new(), reporter).await
}

/// Run a scenario whose plan was validated already
pub async fn run_planned(
    scenario: &Scenario,
    plan: &Plan,
    client: &ApiClient,
    mut ctx: ScenarioContext,
    reporter: &mut dyn Reporter,
) -> Result<ScenarioSummary> {
    let started = Instant::now();
    reporter.scenario_started(scenario);
    tracing::info!(scenario = %scenario.name, steps = plan.len(), base_url = client.base_url(), "running scenario");

    let mut states: Vec<State> = Vec::with_capacity(plan.len());
    let mut failed_setup: Option<String> = None;
    let mut reports = Vec::with_capacity(plan.len());

    for (position, planned) in plan.steps.iter().enumerate() {
        let step = scenario.step(planned.phase, planned.index).ok_or_else(|| {
            Error::plan(&planned.name, "plan does not match the scenario")
        })?;

        let mut report = StepReport {
            scenario: scenario.name.clone(),
            phase: planned.phase,
            number: planned.index + 1,
            name: planned.name.clone(),
            outcome: StepOutcome::Passed,
            status: None,
            elapsed: Duration::ZERO,
            captured: BTreeMap::new(),
        };

        let state = match blocked_reason(plan, &states, position, failed_setup.as_deref()) {
            Some(reason) => {
                tracing::debug!(step = %planned.name, %reason, "skipping step");
                report.outcome = StepOutcome::Skipped(reason);
                State::Skipped
            }
            None => {
                let step_started = Instant::now();
                let result = run_step(client, &mut ctx, step).await;
                report.elapsed = step_started.elapsed();
                match result {
                    Ok(capture) => {
                        report.status = Some(capture.status);
                        for (name, value) in &capture.values {
                            ctx.bind(name.clone(), value.clone());
                        }
                        report.captured = capture.values;
                        State::Passed
                    }
                    Err(e) => {
                        if let Error::StatusMismatch { actual, .. } = &e {
                            report.status = Some(*actual);
                        }
                        tracing::warn!(step = %planned.name, error = %e, "step failed");
                        report.outcome = StepOutcome::Failed(e.to_string());
                        State::Failed
                    }
                }
            }
        };

        if planned.phase == Phase::Setup && state != State::Passed && failed_setup.is_none() {
            failed_setup = Some(planned.name.clone());
        }

        states.push(state);
        reporter.step_finished(&report);
        reports.push(report);
    }

    let count = |s: State| states.iter().filter(|x| **x == s).count();
    let summary = ScenarioSummary {
        name: scenario.name.clone(),
        passed: count(State::Passed),
        failed: count(State::Failed),
        skipped: count(State::Skipped),
        elapsed: started.elapsed(),
        steps: reports,
    };

    tracing::info!(
        scenario = %summary.name,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        "scenario finished"
    );
    reporter.scenario_finished(&summary);
    Ok(summary)
}

/// Run scenarios one after another
///
/// Every plan is validated before the first request so an ordering mistake
/// in any scenario fails the run up front.
pub async fn run_all(scenarios: &[Scenario], client: &ApiClient, reporter: &mut dyn Reporter) -> Result<RunSummary> {
    let plans = scenarios.iter().map(plan::validate).collect::<Result<Vec<_>>>()?;

    let started = Instant::now();
    let mut summary = RunSummary::default();
    for (scenario, plan) in scenarios.iter().zip(&plans) {
        let result = run_planned(scenario, plan, client, ScenarioContext::new(), reporter).await?;
        summary.scenarios.push(result);
    }
    summary.elapsed = started.elapsed();

    reporter.run_finished(&summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::plan::{Input, PlannedStep};

    fn plan() -> Plan {
        Plan {
            steps: vec![
                PlannedStep {
                    phase: Phase::Step,
                    index: 0,
                    name: "create market".into(),
                    inputs: vec![],
                    outputs: vec!["market_id".into()],
                },
                PlannedStep {
                    phase: Phase::Step,
                    index: 1,
                    name: "get market".into(),
                    inputs: vec![Input {
                        binding: "market_id".into(),
                        producer: 0,
                    }],
                    outputs: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_blocked_by_failed_producer() {
        let plan = plan();
        let reason = blocked_reason(&plan, &[State::Failed], 1, None).unwrap();
        assert_eq!(reason, "upstream step 'create market' did not produce 'market_id'");
        assert!(blocked_reason(&plan, &[State::Passed], 1, None).is_none());
    }

    #[test]
    fn test_blocked_by_skipped_producer() {
        let plan = plan();
        assert!(blocked_reason(&plan, &[State::Skipped], 1, None).is_some());
    }

    #[test]
    fn test_blocked_by_setup() {
        let plan = plan();
        let reason = blocked_reason(&plan, &[], 0, Some("create market")).unwrap();
        assert_eq!(reason, "setup step 'create market' did not pass");
    }
}
