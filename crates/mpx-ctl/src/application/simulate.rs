//! The `simulate` command: run built-in scenarios on a virtual compositor.

use mpx_sim::scenario::library;
use mpx_sim::{Scenario, ScenarioOutcome, ScenarioRunner};
use serde::Serialize;
use tracing::info;

use crate::error::CtlError;

/// Size of the ASCII snapshot printed with `--render`.
pub const RENDER_COLUMNS: usize = 64;
pub const RENDER_ROWS: usize = 18;

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRender {
    pub scenario: String,
    pub ascii: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub outcomes: Vec<ScenarioOutcome>,
    #[serde(skip)]
    pub report: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub renders: Vec<ScenarioRender>,
}

impl SimulationRun {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }

    /// `Err(ScenariosFailed)` when any scenario failed.
    pub fn check(&self) -> Result<(), CtlError> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(CtlError::ScenariosFailed {
                failed,
                total: self.outcomes.len(),
            }),
        }
    }
}

/// Runs one named scenario, or the whole library when `name` is `None`.
///
/// With `render`, the final state of each scenario is drawn as ASCII.
pub fn run_simulation(name: Option<&str>, render: bool) -> Result<SimulationRun, CtlError> {
    let scenarios = select(name)?;
    let mut runner = ScenarioRunner::new();
    let mut renders = Vec::new();

    for scenario in &scenarios {
        let (_, compositor) = runner.run_keeping_state(scenario);
        if render {
            renders.push(ScenarioRender {
                scenario: scenario.name.clone(),
                ascii: compositor.render_ascii(RENDER_COLUMNS, RENDER_ROWS),
            });
        }
    }

    let run = SimulationRun {
        outcomes: runner.outcomes().to_vec(),
        report: runner.report(),
        renders,
    };
    info!(total = run.outcomes.len(), failed = run.failed(), "simulation finished");
    Ok(run)
}

fn select(name: Option<&str>) -> Result<Vec<Scenario>, CtlError> {
    match name {
        None => Ok(library::all()),
        Some(name) => library::by_name(name)
            .map(|scenario| vec![scenario])
            .ok_or_else(|| CtlError::UnknownScenario {
                name: name.to_string(),
                available: library::all()
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
    }
}
