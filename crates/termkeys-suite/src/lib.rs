//! Test-unit contract and the orchestrator that drives every unit through
//! availability, preparation, invocation and guaranteed cleanup.

mod error;
mod lifecycle;
mod orchestrator;
mod probe;
mod registry;
mod spawn;
mod terminals;
mod unit;

pub use error::SuiteError;
pub use lifecycle::{Stage, UnitLifecycle, UnitState};
pub use orchestrator::{
    drive_unit, Orchestrator, StageFailure, SuiteEnvironment, SuiteReport, SuiteRequest,
    UnitOutcome, UnitReport,
};
pub use probe::{AvailabilityProbe, PathProbe};
pub use registry::{TestRegistry, UnitFactory};
pub use spawn::{run_command, ProcessSpawner, Spawner};
pub use terminals::{register_builtin_units, render_urxvt_resources};
pub use unit::{Invocation, RunContext, TestUnit, UnitEnvironment};
