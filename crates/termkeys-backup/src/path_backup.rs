use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::BackupError;
use crate::fs_utils::{remove_path_if_exists, resolve_target_path};

pub const BACKUP_SUFFIX: &str = ".backup";

/// Snapshot of a single path taken by moving it aside to `<path>.backup`.
///
/// `restore` only acts after a successful `save`. A path that existed is moved
/// back over whatever the test left behind; a path that did not exist is
/// removed again, recursively if the test created a directory there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBackup {
    path: PathBuf,
    backup_path: PathBuf,
    saved: bool,
    existed: bool,
}

impl PathBackup {
    /// `home` enables `~` expansion against the given directory.
    pub fn new(raw: impl AsRef<Path>, home: Option<&Path>) -> Result<Self, BackupError> {
        let raw = raw.as_ref();
        let path = resolve_target_path(raw, home).map_err(|source| BackupError::Resolve {
            path: raw.to_path_buf(),
            source,
        })?;
        let backup_path = backup_sibling(&path);
        Ok(Self {
            path,
            backup_path,
            saved: false,
            existed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn existed_at_save(&self) -> bool {
        self.saved && self.existed
    }

    pub fn save(&mut self) -> Result<(), BackupError> {
        if self.saved {
            return Ok(());
        }

        self.existed = path_is_present(&self.path);
        if self.existed {
            // A leftover sibling holds data from an earlier interrupted run.
            if path_is_present(&self.backup_path) {
                return Err(self.save_error(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "backup sibling already exists",
                )));
            }
            fs::rename(&self.path, &self.backup_path).map_err(|source| self.save_error(source))?;
        }

        self.saved = true;
        debug!(
            path = %self.path.display(),
            existed = self.existed,
            "saved path"
        );
        Ok(())
    }

    pub fn restore(&mut self) -> Result<(), BackupError> {
        if !self.saved {
            return Ok(());
        }

        if self.existed && !path_is_present(&self.backup_path) {
            return Err(self.restore_error(io::Error::new(
                io::ErrorKind::NotFound,
                format!("backup sibling {} is missing", self.backup_path.display()),
            )));
        }

        remove_path_if_exists(&self.path).map_err(|source| self.restore_error(source))?;
        if self.existed {
            fs::rename(&self.backup_path, &self.path)
                .map_err(|source| self.restore_error(source))?;
        }

        self.saved = false;
        debug!(
            path = %self.path.display(),
            existed = self.existed,
            "restored path"
        );
        Ok(())
    }

    fn save_error(&self, source: io::Error) -> BackupError {
        BackupError::Save {
            path: self.path.clone(),
            backup: self.backup_path.clone(),
            source,
        }
    }

    fn restore_error(&self, source: io::Error) -> BackupError {
        BackupError::Restore {
            path: self.path.clone(),
            source,
        }
    }
}

fn backup_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

// Dangling symlinks count as present so they are preserved too.
fn path_is_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
