use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use termkeys_core::{ExclusionTiers, SuiteConfig};
use termkeys_suite::{
    AvailabilityProbe, Orchestrator, PathProbe, ProcessSpawner, SuiteEnvironment, SuiteRequest,
    TestRegistry,
};
use tracing::debug;

use crate::completion::write_completions_script;
use crate::render::TerminalRenderer;
use crate::{Cli, Commands, RunArgs};

/// Everything a suite run needs once config file and flags are layered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunPlan {
    pub(crate) request: SuiteRequest,
    pub(crate) fixtures_root: PathBuf,
    pub(crate) xrdb_program: String,
}

/// Returns whether every unit that ran came through without a failure.
pub(crate) fn run_cli(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Run(args) => {
            let cwd = current_dir()?;
            let config = SuiteConfig::discover(cli.config.as_deref(), &cwd)?;
            let plan = plan_run(config, args, &cwd);
            let environment = suite_environment(&plan)?;
            debug!(plan = ?plan, "resolved run plan");

            let registry = TestRegistry::builtin();
            let probe = PathProbe::new();
            let spawner = ProcessSpawner;
            let orchestrator = Orchestrator::new(&registry, &probe, &spawner, environment);
            let report = orchestrator.run(&plan.request)?;

            TerminalRenderer::current().print_report(&report);
            Ok(report.succeeded())
        }
        Commands::List => {
            let cwd = current_dir()?;
            let config = SuiteConfig::discover(cli.config.as_deref(), &cwd)?;
            let plan = plan_run(config, RunArgs::default(), &cwd);
            let environment = suite_environment(&plan)?;

            let registry = TestRegistry::builtin();
            let renderer = TerminalRenderer::current();
            for (status, message) in list_entries(&registry, &PathProbe::new(), &environment) {
                renderer.print_status(status, &message);
            }
            Ok(true)
        }
        Commands::Exclusions { unit } => {
            let cwd = current_dir()?;
            let config = SuiteConfig::discover(cli.config.as_deref(), &cwd)?;
            let plan = plan_run(config, RunArgs::default(), &cwd);
            let environment = suite_environment(&plan)?;

            let registry = TestRegistry::builtin();
            let keys = unit_exclusions(&registry, &environment, &plan.request.exclusions, &unit)?;
            for key in keys {
                println!("{key}");
            }
            Ok(true)
        }
        Commands::Completions { shell } => {
            let mut stdout = io::stdout();
            write_completions_script(shell, &mut stdout)?;
            Ok(true)
        }
    }
}

/// Layers flags over the config file. `-o` and `-t` replace their config
/// counterparts, `-b` adds to the configured exclusions. Relative paths are
/// anchored at `cwd`.
pub(crate) fn plan_run(config: SuiteConfig, args: RunArgs, cwd: &Path) -> RunPlan {
    let output_dir = args.output_dir.unwrap_or(config.output_dir);
    let test_binary = args.test_binary.unwrap_or(config.test_binary);
    let fixtures_root = args.fixtures.unwrap_or(config.fixtures_dir);
    let selection = if args.tests.is_empty() {
        config.tests
    } else {
        args.tests
    };
    let exclusions = ExclusionTiers::default()
        .with_user(config.exclude)
        .with_user(args.exclude);

    RunPlan {
        request: SuiteRequest {
            output_dir: anchor(&output_dir, cwd),
            test_binary: anchor(&test_binary, cwd),
            exclusions,
            selection,
        },
        fixtures_root: anchor(&fixtures_root, cwd),
        xrdb_program: config.xrdb_program,
    }
}

/// One `(status, message)` line per registered unit describing whether it
/// can run here.
pub(crate) fn list_entries(
    registry: &TestRegistry,
    probe: &dyn AvailabilityProbe,
    environment: &SuiteEnvironment,
) -> Vec<(&'static str, String)> {
    registry
        .names()
        .into_iter()
        .map(
            |name| match registry.instantiate(&name, &environment.for_unit(&name)) {
                Ok(unit) if unit.available(probe) => ("ok", format!("{name}: available")),
                Ok(_) => ("skip", format!("{name}: not available")),
                Err(err) => ("err", err.to_string()),
            },
        )
        .collect()
}

/// The merged exclusion set `unit` would be launched with.
pub(crate) fn unit_exclusions(
    registry: &TestRegistry,
    environment: &SuiteEnvironment,
    tiers: &ExclusionTiers,
    unit: &str,
) -> Result<Vec<String>> {
    let selected = registry.select(&[unit.to_string()])?;
    let mut keys = Vec::new();
    for name in selected {
        let instance = registry.instantiate(&name, &environment.for_unit(&name))?;
        keys.extend(tiers.effective_for(&instance.exclusions()));
    }
    Ok(keys)
}

fn suite_environment(plan: &RunPlan) -> Result<SuiteEnvironment> {
    let home = home_dir()?;
    debug!(home = %home.display(), "resolved home directory");
    Ok(SuiteEnvironment {
        home,
        fixtures_root: plan.fixtures_root.clone(),
        xrdb_program: plan.xrdb_program.clone(),
    })
}

fn home_dir() -> Result<PathBuf> {
    resolve_home(env::var_os("HOME").map(PathBuf::from))
}

pub(crate) fn resolve_home(raw: Option<PathBuf>) -> Result<PathBuf> {
    match raw {
        Some(home) if home.is_absolute() => Ok(home),
        Some(home) => Err(anyhow!(
            "HOME must be an absolute path (got {})",
            home.display()
        )),
        None => Err(anyhow!("HOME is not set; cannot locate per-user config files")),
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().context("failed to determine working directory")
}

fn anchor(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path.strip_prefix(".").unwrap_or(path))
    }
}
