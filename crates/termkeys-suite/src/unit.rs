use std::path::PathBuf;

use anyhow::Result;
use termkeys_core::ExclusionSet;
use tracing::{info, warn};

use crate::probe::AvailabilityProbe;
use crate::spawn::Spawner;

/// What a unit may rely on when it is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitEnvironment {
    /// Absolute home directory `~` expands to.
    pub home: PathBuf,
    /// Attachments for this unit (`<fixtures>/<unit name>`).
    pub fixtures_dir: PathBuf,
    pub xrdb_program: String,
}

impl UnitEnvironment {
    pub fn fixture(&self, name: &str) -> PathBuf {
        self.fixtures_dir.join(name)
    }
}

/// The recorder command every terminal is asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub test_binary: PathBuf,
    pub output_path: PathBuf,
    pub exclusions: ExclusionSet,
}

impl Invocation {
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![
            self.test_binary.display().to_string(),
            "-o".to_string(),
            self.output_path.display().to_string(),
        ];
        for key in &self.exclusions {
            argv.push("-b".to_string());
            argv.push(key.clone());
        }
        argv
    }
}

pub struct RunContext<'a> {
    pub unit: &'a str,
    pub invocation: &'a Invocation,
    pub spawner: &'a dyn Spawner,
}

impl RunContext<'_> {
    /// Spawns `launcher` followed by the recorder argv and waits for it.
    pub fn launch<S: AsRef<str>>(&self, launcher: &[S]) -> Result<()> {
        let mut argv = launcher
            .iter()
            .map(|part| part.as_ref().to_string())
            .collect::<Vec<_>>();
        argv.extend(self.invocation.argv());

        info!(unit = self.unit, argv = ?argv, "launching terminal");
        match self.spawner.spawn(&argv)? {
            Some(0) => {}
            Some(code) => warn!(unit = self.unit, code, "terminal exited with non-zero status"),
            None => warn!(unit = self.unit, "terminal terminated by signal"),
        }
        Ok(())
    }
}

/// One supported terminal emulator.
///
/// `cleanup` must undo whatever `pre_run` managed to change, including when
/// `pre_run` stopped halfway, and is called exactly once for every available
/// unit no matter how the earlier stages ended.
pub trait TestUnit {
    fn available(&self, probe: &dyn AvailabilityProbe) -> bool;

    /// Keys this terminal reserves for itself.
    fn exclusions(&self) -> Vec<String> {
        Vec::new()
    }

    fn pre_run(&mut self) -> Result<()> {
        Ok(())
    }

    fn run(&mut self, ctx: &RunContext<'_>) -> Result<()>;

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}
