use std::path::PathBuf;

/// Answers whether a program can be launched in the current environment.
pub trait AvailabilityProbe {
    fn is_available(&self, program: &str) -> bool;
}

/// Searches `PATH`, or an explicit list of directories when given.
#[derive(Debug, Clone, Default)]
pub struct PathProbe {
    search_paths: Option<Vec<PathBuf>>,
}

impl PathProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths: Some(paths),
        }
    }
}

impl AvailabilityProbe for PathProbe {
    fn is_available(&self, program: &str) -> bool {
        match &self.search_paths {
            None => which::which(program).is_ok(),
            Some(paths) => match std::env::join_paths(paths) {
                Ok(joined) => {
                    let cwd = std::env::current_dir().unwrap_or_default();
                    which::which_in(program, Some(joined), cwd).is_ok()
                }
                Err(_) => false,
            },
        }
    }
}
