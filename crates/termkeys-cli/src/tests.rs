use std::path::{Path, PathBuf};

use clap::Parser;
use termkeys_core::SuiteConfig;
use termkeys_suite::{
    AvailabilityProbe, Stage, StageFailure, SuiteEnvironment, SuiteReport, TestRegistry,
    UnitLifecycle, UnitReport, UnitState,
};

use crate::completion::{write_completions_script, CliCompletionShell};
use crate::dispatch::{list_entries, plan_run, resolve_home, unit_exclusions};
use crate::render::{format_report_lines, render_status_line, resolve_output_style, OutputStyle};
use crate::{default_log_filter, Cli, Commands, RunArgs};

struct FixedProbe(&'static [&'static str]);

impl AvailabilityProbe for FixedProbe {
    fn is_available(&self, program: &str) -> bool {
        self.0.contains(&program)
    }
}

fn environment() -> SuiteEnvironment {
    SuiteEnvironment {
        home: PathBuf::from("/home/tester"),
        fixtures_root: PathBuf::from("/srv/termkeys/fixtures"),
        xrdb_program: "xrdb".to_string(),
    }
}

fn lifecycle(states: &[UnitState]) -> UnitLifecycle {
    let mut lifecycle = UnitLifecycle::default();
    for state in states {
        assert!(lifecycle.advance(*state), "fixture transition must be valid");
    }
    lifecycle
}

fn unit_report(name: &str, states: &[UnitState], failures: Vec<StageFailure>) -> UnitReport {
    UnitReport {
        name: name.to_string(),
        output_path: PathBuf::from(format!("/out/{name}.json")),
        exclusions: Default::default(),
        lifecycle: lifecycle(states),
        failures,
    }
}

fn sample_report() -> SuiteReport {
    SuiteReport {
        units: vec![
            unit_report(
                "kitty",
                &[
                    UnitState::Available,
                    UnitState::PreRunOk,
                    UnitState::Ran,
                    UnitState::CleanedUp,
                ],
                Vec::new(),
            ),
            unit_report("eterm", &[UnitState::Unavailable], Vec::new()),
            unit_report(
                "konsole",
                &[
                    UnitState::Available,
                    UnitState::PreRunFailed,
                    UnitState::CleanedUp,
                ],
                vec![
                    StageFailure {
                        stage: Stage::PreRun,
                        message: "descriptor not found".to_string(),
                    },
                    StageFailure {
                        stage: Stage::Cleanup,
                        message: "backup sibling is missing".to_string(),
                    },
                ],
            ),
        ],
    }
}

#[test]
fn cli_parses_run_flags_like_the_classic_runner() {
    let cli = Cli::try_parse_from([
        "termkeys", "run", "-o", "out", "-b", "C-x", "-b", "C-y", "-t", "xterm", "-t", "st",
    ])
    .expect("command must parse");
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.output_dir, Some(PathBuf::from("out")));
            assert_eq!(args.exclude, vec!["C-x", "C-y"]);
            assert_eq!(args.tests, vec!["xterm", "st"]);
            assert_eq!(args.test_binary, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn cli_accepts_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["termkeys", "list", "--config", "suite.toml", "-v"])
        .expect("command must parse");
    assert_eq!(cli.config, Some(PathBuf::from("suite.toml")));
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::List));
}

#[test]
fn cli_requires_unit_for_exclusions() {
    let err = Cli::try_parse_from(["termkeys", "exclusions"])
        .expect_err("missing unit argument must fail");
    assert!(err.to_string().contains("<UNIT>"));
}

#[test]
fn cli_parses_completions_for_each_supported_shell() {
    let cases = vec![
        ("bash", CliCompletionShell::Bash),
        ("zsh", CliCompletionShell::Zsh),
        ("fish", CliCompletionShell::Fish),
        ("powershell", CliCompletionShell::Powershell),
    ];

    for (shell, expected) in cases {
        let cli = Cli::try_parse_from(["termkeys", "completions", shell]).expect("command parses");
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, expected),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

#[test]
fn cli_rejects_unsupported_completion_shell() {
    let err = Cli::try_parse_from(["termkeys", "completions", "elvish"])
        .expect_err("unsupported shell must fail");
    let rendered = err.to_string();
    assert!(rendered.contains("elvish"));
    assert!(rendered.contains("possible values"));
}

#[test]
fn completions_script_mentions_subcommands() {
    let mut output = Vec::new();
    write_completions_script(CliCompletionShell::Bash, &mut output)
        .expect("must write completions");
    let script = String::from_utf8(output).expect("script must be utf-8");
    assert!(script.contains("termkeys"));
    assert!(script.contains("exclusions"));
}

#[test]
fn plan_uses_config_defaults_anchored_at_cwd() {
    let plan = plan_run(
        SuiteConfig::default(),
        RunArgs::default(),
        Path::new("/work"),
    );

    assert_eq!(plan.request.output_dir, PathBuf::from("/work/results"));
    assert_eq!(plan.request.test_binary, PathBuf::from("/work/terminal_test"));
    assert_eq!(plan.fixtures_root, PathBuf::from("/work/fixtures"));
    assert_eq!(plan.xrdb_program, "xrdb");
    assert!(plan.request.selection.is_empty());
    assert!(plan.request.exclusions.user.is_empty());
    assert!(plan.request.exclusions.defaults.contains("S-F10"));
}

#[test]
fn plan_layers_flags_over_config() {
    let config = SuiteConfig {
        output_dir: PathBuf::from("/var/results"),
        exclude: vec!["C-x".to_string()],
        tests: vec!["xterm".to_string()],
        ..SuiteConfig::default()
    };
    let args = RunArgs {
        output_dir: Some(PathBuf::from("fresh")),
        exclude: vec!["C-y".to_string()],
        tests: vec!["st".to_string(), "kitty".to_string()],
        test_binary: Some(PathBuf::from("/opt/recorder")),
        fixtures: None,
    };

    let plan = plan_run(config, args, Path::new("/work"));

    assert_eq!(plan.request.output_dir, PathBuf::from("/work/fresh"));
    assert_eq!(plan.request.test_binary, PathBuf::from("/opt/recorder"));
    assert_eq!(plan.request.selection, vec!["st", "kitty"]);
    let user = plan
        .request
        .exclusions
        .user
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>();
    assert_eq!(user, vec!["C-x", "C-y"]);
}

#[test]
fn plan_keeps_configured_selection_without_test_flags() {
    let config = SuiteConfig {
        tests: vec!["urxvt".to_string()],
        ..SuiteConfig::default()
    };
    let plan = plan_run(config, RunArgs::default(), Path::new("/work"));
    assert_eq!(plan.request.selection, vec!["urxvt"]);
}

#[test]
fn config_file_is_discovered_next_to_cwd() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    std::fs::write(
        dir.path().join("termkeys.toml"),
        "output_dir = \"logs\"\nexclude = [\"C-z\"]\n",
    )
    .expect("must write config");

    let config = SuiteConfig::discover(None, dir.path()).expect("config must load");
    let plan = plan_run(config, RunArgs::default(), dir.path());
    assert_eq!(plan.request.output_dir, dir.path().join("logs"));
    assert!(plan.request.exclusions.user.contains("C-z"));
}

#[test]
fn home_must_be_set_and_absolute() {
    assert_eq!(
        resolve_home(Some(PathBuf::from("/home/tester"))).expect("absolute home is accepted"),
        PathBuf::from("/home/tester")
    );
    assert!(resolve_home(Some(PathBuf::from("relative"))).is_err());
    let err = resolve_home(None).expect_err("missing home must fail");
    assert!(err.to_string().contains("HOME is not set"));
}

#[test]
fn list_reports_availability_per_unit() {
    let registry = TestRegistry::builtin();
    let entries = list_entries(&registry, &FixedProbe(&["kitty", "xterm"]), &environment());

    assert_eq!(entries.len(), registry.names().len());
    assert!(entries.contains(&("ok", "kitty: available".to_string())));
    assert!(entries.contains(&("ok", "xterm: available".to_string())));
    assert!(entries.contains(&("skip", "eterm: not available".to_string())));
}

#[test]
fn unit_exclusions_merge_default_and_user_tiers() {
    let registry = TestRegistry::builtin();
    let tiers = termkeys_core::ExclusionTiers::default().with_user(["C-x"]);

    let urxvt = unit_exclusions(&registry, &environment(), &tiers, "urxvt")
        .expect("urxvt is registered");
    assert!(urxvt.contains(&"C-x".to_string()));
    assert!(urxvt.contains(&"C-M-q".to_string()));
    assert!(!urxvt.contains(&"S-Prior".to_string()));

    let kitty = unit_exclusions(&registry, &environment(), &tiers, "kitty")
        .expect("kitty is registered");
    assert_eq!(kitty, urxvt);

    let err = unit_exclusions(&registry, &environment(), &tiers, "gnome-terminal")
        .expect_err("unknown unit must fail");
    assert!(err.to_string().contains("unknown test 'gnome-terminal'"));
}

#[test]
fn resolve_output_style_follows_stdout_tty() {
    assert_eq!(resolve_output_style(true), OutputStyle::Rich);
    assert_eq!(resolve_output_style(false), OutputStyle::Plain);
}

#[test]
fn render_status_line_plain_is_unadorned() {
    assert_eq!(
        render_status_line(OutputStyle::Plain, "ok", "kitty: available"),
        "kitty: available"
    );
}

#[test]
fn render_status_line_rich_includes_styled_badge() {
    let line = render_status_line(OutputStyle::Rich, "skip", "eterm: not available");
    assert!(line.contains("[SKIP]"));
    assert!(line.contains('\u{1b}'));
    assert!(line.ends_with(" eterm: not available"));
}

#[test]
fn report_lines_plain_list_units_failures_and_summary() {
    let lines = format_report_lines(&sample_report(), OutputStyle::Plain);
    assert_eq!(
        lines,
        vec![
            "kitty: recorded /out/kitty.json",
            "eterm: not available",
            "konsole: failed",
            "konsole: pre-run failed: descriptor not found",
            "konsole: cleanup failed: backup sibling is missing",
            "suite summary: passed=1 failed=1 unavailable=1",
        ]
    );
}

#[test]
fn report_lines_rich_badge_by_outcome() {
    let lines = format_report_lines(&sample_report(), OutputStyle::Rich);
    assert!(lines[0].contains("[OK]"));
    assert!(lines[1].contains("[SKIP]"));
    assert!(lines[2].contains("[ERR]"));
    assert!(lines[3].contains("[ERR]"));
    assert!(lines[4].contains("[WARN]"));
    assert_eq!(lines[5], "suite summary: passed=1 failed=1 unavailable=1");
}

#[test]
fn default_log_filter_raises_level_when_verbose() {
    assert!(default_log_filter(false).contains("termkeys_suite=info"));
    let verbose = default_log_filter(true);
    assert!(verbose.contains("termkeys_backup=debug"));
    assert!(!verbose.contains("=info"));
}
