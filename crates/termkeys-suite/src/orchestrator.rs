use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use termkeys_core::{ExclusionSet, ExclusionTiers};
use tracing::{debug, error, info};

use crate::error::SuiteError;
use crate::lifecycle::{Stage, UnitLifecycle, UnitState};
use crate::probe::AvailabilityProbe;
use crate::registry::TestRegistry;
use crate::spawn::Spawner;
use crate::unit::{Invocation, RunContext, TestUnit, UnitEnvironment};

/// Environment shared by every unit of a suite run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteEnvironment {
    pub home: PathBuf,
    pub fixtures_root: PathBuf,
    pub xrdb_program: String,
}

impl SuiteEnvironment {
    pub fn for_unit(&self, name: &str) -> UnitEnvironment {
        UnitEnvironment {
            home: self.home.clone(),
            fixtures_dir: self.fixtures_root.join(name),
            xrdb_program: self.xrdb_program.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRequest {
    pub output_dir: PathBuf,
    pub test_binary: PathBuf,
    pub exclusions: ExclusionTiers,
    /// Empty selects every registered unit.
    pub selection: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Unavailable,
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub name: String,
    pub output_path: PathBuf,
    pub exclusions: ExclusionSet,
    pub lifecycle: UnitLifecycle,
    pub failures: Vec<StageFailure>,
}

impl UnitReport {
    pub fn outcome(&self) -> UnitOutcome {
        if self.lifecycle.current() == UnitState::Unavailable {
            UnitOutcome::Unavailable
        } else if self.failures.is_empty() {
            UnitOutcome::Passed
        } else {
            UnitOutcome::Failed
        }
    }

    pub fn failure(&self, stage: Stage) -> Option<&StageFailure> {
        self.failures.iter().find(|failure| failure.stage == stage)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    pub units: Vec<UnitReport>,
}

impl SuiteReport {
    pub fn succeeded(&self) -> bool {
        self.units
            .iter()
            .all(|unit| unit.outcome() != UnitOutcome::Failed)
    }

    pub fn count(&self, outcome: UnitOutcome) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.outcome() == outcome)
            .count()
    }

    pub fn unit(&self, name: &str) -> Option<&UnitReport> {
        self.units.iter().find(|unit| unit.name == name)
    }
}

/// Runs selected units one at a time; they share the user's environment, so
/// nothing here is parallel.
pub struct Orchestrator<'a> {
    registry: &'a TestRegistry,
    probe: &'a dyn AvailabilityProbe,
    spawner: &'a dyn Spawner,
    environment: SuiteEnvironment,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        registry: &'a TestRegistry,
        probe: &'a dyn AvailabilityProbe,
        spawner: &'a dyn Spawner,
        environment: SuiteEnvironment,
    ) -> Self {
        Self {
            registry,
            probe,
            spawner,
            environment,
        }
    }

    /// Selection, construction and the output directory are settled before
    /// the first unit touches anything; any error there aborts the run.
    /// After that, per-unit failures are recorded and the batch continues.
    pub fn run(&self, request: &SuiteRequest) -> Result<SuiteReport, SuiteError> {
        let selected = self.registry.select(&request.selection)?;

        let mut units = Vec::with_capacity(selected.len());
        for name in selected {
            let unit = self
                .registry
                .instantiate(&name, &self.environment.for_unit(&name))?;
            units.push((name, unit));
        }

        fs::create_dir_all(&request.output_dir).map_err(|source| SuiteError::OutputDir {
            path: request.output_dir.clone(),
            source,
        })?;

        let mut report = SuiteReport::default();
        for (name, mut unit) in units {
            let invocation = Invocation {
                test_binary: request.test_binary.clone(),
                output_path: request.output_dir.join(format!("{name}.json")),
                exclusions: request.exclusions.effective_for(&unit.exclusions()),
            };
            report.units.push(drive_unit(
                &name,
                unit.as_mut(),
                &invocation,
                self.probe,
                self.spawner,
            ));
        }

        info!(
            passed = report.count(UnitOutcome::Passed),
            failed = report.count(UnitOutcome::Failed),
            unavailable = report.count(UnitOutcome::Unavailable),
            "suite finished"
        );
        Ok(report)
    }
}

/// Takes one unit through probe, pre-run, run and cleanup. Cleanup runs
/// whenever the unit was available, regardless of how the earlier stages
/// ended; errors and panics from any hook are recorded, never propagated.
pub fn drive_unit(
    name: &str,
    unit: &mut dyn TestUnit,
    invocation: &Invocation,
    probe: &dyn AvailabilityProbe,
    spawner: &dyn Spawner,
) -> UnitReport {
    let mut lifecycle = UnitLifecycle::default();
    let mut failures = Vec::new();

    if !unit.available(probe) {
        info!(unit = name, "not available, skipping");
        lifecycle.advance(UnitState::Unavailable);
        return UnitReport {
            name: name.to_string(),
            output_path: invocation.output_path.clone(),
            exclusions: invocation.exclusions.clone(),
            lifecycle,
            failures,
        };
    }
    lifecycle.advance(UnitState::Available);
    info!(
        unit = name,
        output = %invocation.output_path.display(),
        exclusions = invocation.exclusions.len(),
        "starting"
    );

    match guarded(Stage::PreRun, || unit.pre_run()) {
        Ok(()) => {
            lifecycle.advance(UnitState::PreRunOk);
            let ctx = RunContext {
                unit: name,
                invocation,
                spawner,
            };
            match guarded(Stage::Run, || unit.run(&ctx)) {
                Ok(()) => {
                    lifecycle.advance(UnitState::Ran);
                }
                Err(err) => {
                    lifecycle.advance(UnitState::RunFailed);
                    failures.push(record_failure(name, Stage::Run, &err));
                }
            }
        }
        Err(err) => {
            lifecycle.advance(UnitState::PreRunFailed);
            failures.push(record_failure(name, Stage::PreRun, &err));
        }
    }

    if let Err(err) = guarded(Stage::Cleanup, || unit.cleanup()) {
        failures.push(record_failure(name, Stage::Cleanup, &err));
    }
    lifecycle.advance(UnitState::CleanedUp);
    debug!(unit = name, history = ?lifecycle.history(), "unit finished");

    UnitReport {
        name: name.to_string(),
        output_path: invocation.output_path.clone(),
        exclusions: invocation.exclusions.clone(),
        lifecycle,
        failures,
    }
}

fn guarded<F>(stage: Stage, hook: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow!(
            "{stage} panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn record_failure(name: &str, stage: Stage, err: &anyhow::Error) -> StageFailure {
    let message = format!("{err:#}");
    error!(unit = name, stage = %stage, "{message}");
    StageFailure { stage, message }
}
