use anyhow::{anyhow, Result};
use termkeys_backup::{BackupAttempt, BackupSet};

use crate::registry::TestRegistry;
use crate::unit::TestUnit;

mod konsole;
mod plain;
mod st;
mod terminator;
mod xresources;

pub use xresources::render_urxvt_resources;

use konsole::Konsole;
use plain::PlainTerminal;
use st::St;
use terminator::Terminator;
use xresources::XresourcesTerminal;

/// Terminals that need nothing but their own command line.
const PLAIN_TERMINALS: &[(&str, &str, &[&str])] = &[
    ("aterm", "aterm", &["-e"]),
    ("eterm", "Eterm", &["-e"]),
    ("kitty", "kitty", &["-o", "clear_all_shortcuts=yes", "-e"]),
    ("literm", "literm", &["-e"]),
    ("rxvt", "rxvt", &["-e"]),
];

pub fn register_builtin_units(registry: &mut TestRegistry) {
    for &(name, program, flags) in PLAIN_TERMINALS {
        registry.register(name, move |_| boxed(PlainTerminal::new(program, flags)));
    }
    registry.register("konsole", |env| boxed(Konsole::new(env)?));
    registry.register("st", |env| boxed(St::new(env)?));
    registry.register("terminator", |env| boxed(Terminator::new(env)));
    registry.register("urxvt", |env| boxed(XresourcesTerminal::urxvt(env)));
    registry.register("xterm", |env| boxed(XresourcesTerminal::xterm(env)));
}

fn boxed<U: TestUnit + 'static>(unit: U) -> Result<Box<dyn TestUnit>> {
    Ok(Box::new(unit))
}

/// Saves every member; fails if any path could not be put aside.
fn save_backups(backups: &mut BackupSet) -> Result<()> {
    let attempts = backups.save_all();
    ensure_all_succeeded(&attempts, "back up")
}

fn restore_backups(backups: &mut BackupSet) -> Result<()> {
    let attempts = backups.restore_all();
    ensure_all_succeeded(&attempts, "restore")
}

/// Folds the results of independent cleanup steps into one, keeping every
/// failure message.
pub(crate) fn join_cleanup_results(results: impl IntoIterator<Item = Result<()>>) -> Result<()> {
    let failed = results
        .into_iter()
        .filter_map(Result::err)
        .map(|err| format!("{err:#}"))
        .collect::<Vec<_>>();
    if failed.is_empty() {
        return Ok(());
    }
    Err(anyhow!(failed.join("; ")))
}

fn ensure_all_succeeded(attempts: &[BackupAttempt], action: &str) -> Result<()> {
    let failed = attempts
        .iter()
        .filter_map(|attempt| attempt.error.as_ref())
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    if failed.is_empty() {
        return Ok(());
    }
    Err(anyhow!(
        "failed to {action} {} path(s): {}",
        failed.len(),
        failed.join("; ")
    ))
}
