use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use termkeys_backup::{ResourceStoreSnapshot, XrdbStore};

use crate::probe::AvailabilityProbe;
use crate::unit::{RunContext, TestUnit, UnitEnvironment};

/// Keys whose every modifier combination urxvt gets rebound to nothing.
const URXVT_NAMED_KEYS: &[&str] = &[
    "Up",
    "Down",
    "Left",
    "Right",
    "Insert",
    "Delete",
    "Home",
    "End",
    "Prior",
    "Next",
    "Tab",
    "Escape",
    "BackSpace",
    "space",
];

enum ResourceSource {
    Fixture(PathBuf),
    Generated(fn() -> String),
}

/// A terminal configured through the X resource database. The database is
/// snapshotted before new resources are merged in and reloaded afterwards.
pub(crate) struct XresourcesTerminal {
    name: &'static str,
    program: &'static str,
    source: ResourceSource,
    snapshot: ResourceStoreSnapshot<XrdbStore>,
    generated: Option<NamedTempFile>,
}

impl XresourcesTerminal {
    pub(crate) fn xterm(env: &UnitEnvironment) -> Self {
        Self::new(
            "xterm",
            ResourceSource::Fixture(env.fixture("Xresources")),
            env,
        )
    }

    pub(crate) fn urxvt(env: &UnitEnvironment) -> Self {
        Self::new("urxvt", ResourceSource::Generated(render_urxvt_resources), env)
    }

    fn new(name: &'static str, source: ResourceSource, env: &UnitEnvironment) -> Self {
        Self {
            name,
            program: name,
            source,
            snapshot: ResourceStoreSnapshot::new(XrdbStore::new(env.xrdb_program.clone())),
            generated: None,
        }
    }

    fn resource_file(&mut self) -> Result<PathBuf> {
        match &self.source {
            ResourceSource::Fixture(path) => Ok(path.clone()),
            ResourceSource::Generated(render) => {
                let mut file = tempfile::Builder::new()
                    .prefix(&format!("{}-", self.name))
                    .suffix(".Xresources")
                    .tempfile()
                    .context("failed to create generated resource file")?;
                file.write_all(render().as_bytes())
                    .and_then(|()| file.flush())
                    .with_context(|| {
                        format!("failed to write resources: {}", file.path().display())
                    })?;
                let path = file.path().to_path_buf();
                self.generated = Some(file);
                Ok(path)
            }
        }
    }
}

impl TestUnit for XresourcesTerminal {
    fn available(&self, probe: &dyn AvailabilityProbe) -> bool {
        probe.is_available(self.program)
    }

    fn pre_run(&mut self) -> Result<()> {
        let prefix = format!("{}-", self.name);
        self.snapshot
            .save(Some(prefix.as_str()))
            .context("failed to snapshot X resources")?;
        let resources = self.resource_file()?;
        self.snapshot
            .load(&resources)
            .with_context(|| format!("failed to merge {}", resources.display()))
    }

    fn run(&mut self, ctx: &RunContext<'_>) -> Result<()> {
        ctx.launch(&[self.program, "-e"])
    }

    fn cleanup(&mut self) -> Result<()> {
        self.generated = None;
        self.snapshot
            .restore()
            .context("failed to restore X resources")
    }
}

/// Resources that make urxvt forward every key instead of acting on it.
pub fn render_urxvt_resources() -> String {
    let mut out = String::new();
    out.push_str("! Disable ISO14755 mode popup when pressing Shift+Ctrl\n");
    out.push_str("URxvt.iso14755: false\n");
    out.push_str("! Unbind all terminal defaults bindings\n");
    let keys = urxvt_keys();
    for prefix in modifier_prefixes() {
        for key in &keys {
            out.push_str(&format!("URxvt.keysym.{prefix}{key}:\tbuiltin-string:\n"));
        }
    }
    out
}

fn urxvt_keys() -> Vec<String> {
    URXVT_NAMED_KEYS
        .iter()
        .map(|key| key.to_string())
        .chain((1..=12).map(|n| format!("F{n}")))
        .chain(('a'..='z').map(String::from))
        .collect()
}

// Every combination of Meta, Ctrl and Shift except all three at once.
fn modifier_prefixes() -> impl Iterator<Item = String> {
    (0..7u8).map(|mask| {
        let mut prefix = String::new();
        if mask & 1 != 0 {
            prefix.push_str("Meta-");
        }
        if mask & 2 != 0 {
            prefix.push_str("Ctrl-");
        }
        if mask & 4 != 0 {
            prefix.push_str("Shift-");
        }
        prefix
    })
}
