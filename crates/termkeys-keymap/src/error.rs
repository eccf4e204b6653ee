use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read action catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read keybinding descriptor {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed keybinding descriptor {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },
    #[error("failed to write keybinding descriptor {}: {detail}", path.display())]
    Write { path: PathBuf, detail: String },
}
