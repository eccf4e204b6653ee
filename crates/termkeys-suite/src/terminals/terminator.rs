use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::probe::AvailabilityProbe;
use crate::unit::{RunContext, TestUnit, UnitEnvironment};

const PROGRAM: &str = "terminator";

/// Launched with its own config file so the user's keybindings never apply.
pub(crate) struct Terminator {
    config: PathBuf,
}

impl Terminator {
    pub(crate) fn new(env: &UnitEnvironment) -> Self {
        Self {
            config: env.fixture("config.ini"),
        }
    }
}

impl TestUnit for Terminator {
    fn available(&self, probe: &dyn AvailabilityProbe) -> bool {
        probe.is_available(PROGRAM)
    }

    fn pre_run(&mut self) -> Result<()> {
        if !self.config.is_file() {
            bail!("terminator config not found: {}", self.config.display());
        }
        Ok(())
    }

    fn run(&mut self, ctx: &RunContext<'_>) -> Result<()> {
        let config = self.config.display().to_string();
        ctx.launch(&[PROGRAM, "--no-dbus", "-g", config.as_str(), "-x"])
    }
}
