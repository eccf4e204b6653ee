use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod completion;
mod dispatch;
mod render;

use completion::CliCompletionShell;
use dispatch::run_cli;

#[derive(Parser, Debug)]
#[command(name = "termkeys")]
#[command(
    about = "Run a keystroke recorder inside terminal emulators with their bindings disabled",
    long_about = None
)]
struct Cli {
    /// Config file; defaults to ./termkeys.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the recorder in every selected terminal.
    Run(RunArgs),
    /// Show registered terminals and whether they can be launched here.
    List,
    /// Print the keys that would be excluded for one terminal.
    Exclusions { unit: String },
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
struct RunArgs {
    /// Directory receiving one `<terminal>.json` per run.
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Do not test KEY; may be repeated.
    #[arg(short = 'b', long = "exclude", value_name = "KEY")]
    exclude: Vec<String>,
    /// Only run TEST; may be repeated.
    #[arg(short = 't', long = "test", value_name = "TEST")]
    tests: Vec<String>,
    #[arg(long, value_name = "PATH")]
    test_binary: Option<PathBuf>,
    #[arg(long, value_name = "DIR")]
    fixtures: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run_cli(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    ["termkeys_cli", "termkeys_suite", "termkeys_backup", "termkeys_keymap"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests;
