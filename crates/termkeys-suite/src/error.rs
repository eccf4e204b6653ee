use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("unknown test '{name}' (available: {})", available.join(", "))]
    UnknownTest { name: String, available: Vec<String> },
    #[error("failed to set up test '{name}': {detail}")]
    Instantiate { name: String, detail: String },
    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
