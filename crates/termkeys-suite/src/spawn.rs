use std::process::Command;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Launches the program under test and blocks until it exits.
pub trait Spawner {
    /// Returns the exit code, or `None` when the process was killed by a signal.
    fn spawn(&self, argv: &[String]) -> Result<Option<i32>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, argv: &[String]) -> Result<Option<i32>> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| anyhow!("cannot spawn an empty argument vector"))?;

        debug!(program = %program, args = args.len(), "spawning");
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("failed to spawn {program}"))?;
        Ok(status.code())
    }
}

/// Runs a preparation command to completion, failing on a non-zero status.
pub fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    Err(anyhow!(
        "{context_message}: status={} stdout='{}' stderr='{}'",
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}
