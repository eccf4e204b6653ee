use std::fs::File;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;

/// An external key/value database driven through two command-style
/// operations. Content is treated as an opaque dump.
pub trait ResourceStore {
    fn program(&self) -> &str;

    /// Writes the complete current state into `sink`.
    fn query_into(&self, sink: &mut File) -> Result<(), StoreError>;

    /// Replaces the complete live state with the content of `source`.
    fn load_from(&self, source: &Path) -> Result<(), StoreError>;
}

/// X server resource database accessed through `xrdb(1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrdbStore {
    program: String,
}

impl Default for XrdbStore {
    fn default() -> Self {
        Self::new("xrdb")
    }
}

impl XrdbStore {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ResourceStore for XrdbStore {
    fn program(&self) -> &str {
        &self.program
    }

    fn query_into(&self, sink: &mut File) -> Result<(), StoreError> {
        let stdout = sink.try_clone().map_err(StoreError::HoldingArea)?;
        let mut command = Command::new(&self.program);
        command.arg("-query").stdout(Stdio::from(stdout));

        run_store_command(&mut command).map_err(|detail| StoreError::Query {
            program: self.program.clone(),
            detail,
        })
    }

    fn load_from(&self, source: &Path) -> Result<(), StoreError> {
        let mut command = Command::new(&self.program);
        command.arg("-load").arg(source);

        run_store_command(&mut command).map_err(|detail| StoreError::Load {
            program: self.program.clone(),
            source_path: source.to_path_buf(),
            detail,
        })
    }
}

fn run_store_command(command: &mut Command) -> Result<(), String> {
    let output: Output = command
        .output()
        .map_err(|err| format!("command failed to start: {err}"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(format!("status={} stderr='{}'", output.status, stderr.trim()))
}

/// Holds one dump of a [`ResourceStore`] between a test's preparation and
/// its cleanup.
#[derive(Debug)]
pub struct ResourceStoreSnapshot<S> {
    store: S,
    held: Option<NamedTempFile>,
}

impl<S: ResourceStore> ResourceStoreSnapshot<S> {
    pub fn new(store: S) -> Self {
        Self { store, held: None }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Captures the current store content into a temporary file named with
    /// `prefix`. On failure nothing is held and `restore` stays inert.
    pub fn save(&mut self, prefix: Option<&str>) -> Result<(), StoreError> {
        self.held = None;

        let mut builder = tempfile::Builder::new();
        if let Some(prefix) = prefix {
            builder.prefix(prefix);
        }
        let mut file = builder.tempfile().map_err(StoreError::HoldingArea)?;
        self.store.query_into(file.as_file_mut())?;

        debug!(
            program = self.store.program(),
            snapshot = %file.path().display(),
            "captured resource store"
        );
        self.held = Some(file);
        Ok(())
    }

    pub fn load(&self, source: &Path) -> Result<(), StoreError> {
        debug!(
            program = self.store.program(),
            source = %source.display(),
            "loading resource store"
        );
        self.store.load_from(source)
    }

    pub fn restore(&self) -> Result<(), StoreError> {
        match &self.held {
            Some(file) => self.load(file.path()),
            None => Ok(()),
        }
    }
}
