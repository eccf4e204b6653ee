use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to resolve backup target {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to save {} to {}: {source}", path.display(), backup.display())]
    Save {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to restore {}: {source}", path.display())]
    Restore {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resource store query failed ({program}): {detail}")]
    Query { program: String, detail: String },
    #[error("resource store load from {} failed ({program}): {detail}", source_path.display())]
    Load {
        program: String,
        source_path: PathBuf,
        detail: String,
    },
    #[error("failed to create snapshot holding file: {0}")]
    HoldingArea(#[source] io::Error),
}
