use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::BackupError;
use crate::path_backup::PathBackup;

/// Outcome of one member during a batch save or restore.
#[derive(Debug)]
pub struct BackupAttempt {
    pub path: PathBuf,
    pub error: Option<BackupError>,
}

impl BackupAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Ordered batch of path backups with independent, best-effort semantics:
/// one member failing never stops the others from being attempted.
#[derive(Debug, Clone)]
pub struct BackupSet {
    home: PathBuf,
    members: Vec<PathBackup>,
}

impl BackupSet {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            members: Vec::new(),
        }
    }

    /// Registers `raw` without saving it. Returns the resolved target path.
    pub fn add(&mut self, raw: impl AsRef<Path>, expand_home: bool) -> Result<PathBuf, BackupError> {
        let home = expand_home.then_some(self.home.as_path());
        let backup = PathBackup::new(raw, home)?;
        let path = backup.path().to_path_buf();
        self.members.push(backup);
        Ok(path)
    }

    pub fn save_all(&mut self) -> Vec<BackupAttempt> {
        self.members
            .iter_mut()
            .map(|member| attempt(member, "save", PathBackup::save))
            .collect()
    }

    pub fn restore_all(&mut self) -> Vec<BackupAttempt> {
        self.members
            .iter_mut()
            .map(|member| attempt(member, "restore", PathBackup::restore))
            .collect()
    }
}

fn attempt<F>(member: &mut PathBackup, action: &str, run: F) -> BackupAttempt
where
    F: FnOnce(&mut PathBackup) -> Result<(), BackupError>,
{
    let error = run(member).err();
    if let Some(err) = &error {
        warn!(path = %member.path().display(), action, "backup step skipped: {err}");
    }
    BackupAttempt {
        path: member.path().to_path_buf(),
        error,
    }
}
