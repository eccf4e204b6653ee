use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use termkeys_backup::{BackupSet, PathBackup};
use termkeys_keymap::{rewrite_descriptor, ActionCatalog};
use tracing::debug;

use super::{join_cleanup_results, restore_backups, save_backups};
use crate::probe::AvailabilityProbe;
use crate::unit::{RunContext, TestUnit, UnitEnvironment};

const PROGRAM: &str = "konsole";
const CONFIG_DIR: &str = "~/.local/share/kxmlgui5/konsole";
const CATALOG_FILE: &str = "exported_keymap";
const DESCRIPTORS: [&str; 2] = ["konsoleui.rc", "sessionui.rc"];

struct Descriptor {
    fixture: PathBuf,
    live: PathBuf,
}

/// Konsole with every action unbound through its kxmlgui descriptors.
///
/// The action names come from a keyboard scheme exported via
/// Settings > Configure Keyboard Shortcuts > Manage Schemes > Export Scheme.
pub(crate) struct Konsole {
    catalog_path: PathBuf,
    config_dir: PathBuf,
    descriptors: Vec<Descriptor>,
    backups: BackupSet,
    // Topmost directory of `config_dir` that did not exist before pre-run.
    scaffold: Option<PathBackup>,
}

impl Konsole {
    pub(crate) fn new(env: &UnitEnvironment) -> Result<Self> {
        let mut backups = BackupSet::new(&env.home);
        let mut descriptors = Vec::with_capacity(DESCRIPTORS.len());
        for name in DESCRIPTORS {
            let live = backups.add(format!("{CONFIG_DIR}/{name}"), true)?;
            descriptors.push(Descriptor {
                fixture: env.fixture(name),
                live,
            });
        }

        Ok(Self {
            catalog_path: env.fixture(CATALOG_FILE),
            config_dir: env.home.join(".local/share/kxmlgui5/konsole"),
            descriptors,
            backups,
            scaffold: None,
        })
    }
}

impl TestUnit for Konsole {
    fn available(&self, probe: &dyn AvailabilityProbe) -> bool {
        probe.is_available(PROGRAM)
    }

    fn pre_run(&mut self) -> Result<()> {
        let catalog = ActionCatalog::read(&self.catalog_path)?;
        for descriptor in &self.descriptors {
            if !descriptor.fixture.is_file() {
                bail!("descriptor not found: {}", descriptor.fixture.display());
            }
        }

        save_backups(&mut self.backups)?;

        if let Some(missing) = topmost_missing_ancestor(&self.config_dir) {
            let mut scaffold = PathBackup::new(&missing, None)?;
            scaffold.save()?;
            self.scaffold = Some(scaffold);
        }
        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("failed to create directory: {}", self.config_dir.display())
        })?;

        for descriptor in &self.descriptors {
            rewrite_descriptor(&descriptor.fixture, &descriptor.live, &catalog)?;
        }
        debug!(actions = catalog.len(), "konsole descriptors installed");
        Ok(())
    }

    fn run(&mut self, ctx: &RunContext<'_>) -> Result<()> {
        ctx.launch(&[PROGRAM, "-e"])
    }

    fn cleanup(&mut self) -> Result<()> {
        let restored = restore_backups(&mut self.backups);
        let scaffold = match self.scaffold.take() {
            Some(mut scaffold) => scaffold
                .restore()
                .context("failed to remove konsole config directories"),
            None => Ok(()),
        };
        join_cleanup_results([restored, scaffold])
    }
}

fn topmost_missing_ancestor(dir: &Path) -> Option<PathBuf> {
    let mut topmost = None;
    for ancestor in dir.ancestors() {
        if ancestor.exists() {
            break;
        }
        topmost = Some(ancestor.to_path_buf());
    }
    topmost
}
