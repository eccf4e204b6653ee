use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Result};
use termkeys_backup::BackupSet;

use super::{restore_backups, save_backups};
use crate::probe::AvailabilityProbe;
use crate::spawn::run_command;
use crate::unit::{RunContext, TestUnit, UnitEnvironment};

const PROGRAM: &str = "st";

/// st built with an empty shortcut table. A binary in the fixtures directory
/// wins over one on `PATH`; its terminfo entry is compiled into
/// `~/.terminfo` for the duration of the run.
pub(crate) struct St {
    bundled: PathBuf,
    terminfo_source: PathBuf,
    terminfo_dir: PathBuf,
    backups: BackupSet,
}

impl St {
    pub(crate) fn new(env: &UnitEnvironment) -> Result<Self> {
        let mut backups = BackupSet::new(&env.home);
        let terminfo_dir = backups.add("~/.terminfo", true)?;
        Ok(Self {
            bundled: env.fixture(PROGRAM),
            terminfo_source: env.fixture("st.info"),
            terminfo_dir,
            backups,
        })
    }

    fn program(&self) -> String {
        if self.bundled.is_file() {
            self.bundled.display().to_string()
        } else {
            PROGRAM.to_string()
        }
    }
}

impl TestUnit for St {
    fn available(&self, probe: &dyn AvailabilityProbe) -> bool {
        self.bundled.is_file() || probe.is_available(PROGRAM)
    }

    fn pre_run(&mut self) -> Result<()> {
        if !self.terminfo_source.is_file() {
            bail!("terminfo source not found: {}", self.terminfo_source.display());
        }
        save_backups(&mut self.backups)?;
        run_command(
            Command::new("tic")
                .arg("-sx")
                .arg(&self.terminfo_source)
                .env("TERMINFO", &self.terminfo_dir),
            "failed to compile st terminfo",
        )
    }

    fn run(&mut self, ctx: &RunContext<'_>) -> Result<()> {
        ctx.launch(&[self.program().as_str(), "-e"])
    }

    fn cleanup(&mut self) -> Result<()> {
        restore_backups(&mut self.backups)
    }
}
