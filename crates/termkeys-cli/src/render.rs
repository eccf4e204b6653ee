use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use termkeys_suite::{Stage, SuiteReport, UnitOutcome, UnitReport};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalRenderer {
    style: OutputStyle,
}

impl TerminalRenderer {
    pub(crate) fn current() -> Self {
        Self {
            style: current_output_style(),
        }
    }

    pub(crate) fn print_status(self, status: &str, message: &str) {
        println!("{}", render_status_line(self.style, status, message));
    }

    pub(crate) fn print_report(self, report: &SuiteReport) {
        for line in format_report_lines(report, self.style) {
            println!("{line}");
        }
    }
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(std::io::stdout().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

/// Plain output carries only the message; rich output prefixes a coloured
/// ASCII badge.
pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(status_style(status), status_badge(status))
        ),
    }
}

/// One `(status, message)` pair per unit, followed by one per recorded
/// stage failure.
pub(crate) fn report_entries(report: &SuiteReport) -> Vec<(&'static str, String)> {
    let mut entries = Vec::new();
    for unit in &report.units {
        entries.push(unit_entry(unit));
        for failure in &unit.failures {
            let status = if failure.stage == Stage::Cleanup {
                "warn"
            } else {
                "err"
            };
            entries.push((
                status,
                format!("{}: {} failed: {}", unit.name, failure.stage, failure.message),
            ));
        }
    }
    entries
}

pub(crate) fn format_report_lines(report: &SuiteReport, style: OutputStyle) -> Vec<String> {
    report_entries(report)
        .into_iter()
        .map(|(status, message)| render_status_line(style, status, &message))
        .chain(std::iter::once(format_summary_line(report)))
        .collect()
}

pub(crate) fn format_summary_line(report: &SuiteReport) -> String {
    format!(
        "suite summary: passed={} failed={} unavailable={}",
        report.count(UnitOutcome::Passed),
        report.count(UnitOutcome::Failed),
        report.count(UnitOutcome::Unavailable)
    )
}

fn unit_entry(unit: &UnitReport) -> (&'static str, String) {
    match unit.outcome() {
        UnitOutcome::Passed => (
            "ok",
            format!("{}: recorded {}", unit.name, unit.output_path.display()),
        ),
        UnitOutcome::Unavailable => ("skip", format!("{}: not available", unit.name)),
        UnitOutcome::Failed => ("err", format!("{}: failed", unit.name)),
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        "skip" => "[SKIP]",
        _ => "[..]",
    }
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "warn" => AnsiColor::BrightYellow,
        "err" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
