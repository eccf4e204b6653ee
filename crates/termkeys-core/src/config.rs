use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "termkeys.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_test_binary")]
    pub test_binary: PathBuf,
    #[serde(default = "default_fixtures_dir")]
    pub fixtures_dir: PathBuf,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default = "default_xrdb_program")]
    pub xrdb_program: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            test_binary: default_test_binary(),
            fixtures_dir: default_fixtures_dir(),
            exclude: Vec::new(),
            tests: Vec::new(),
            xrdb_program: default_xrdb_program(),
        }
    }
}

impl SuiteConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse termkeys config")?;
        if config.xrdb_program.trim().is_empty() {
            return Err(anyhow!("xrdb_program must not be empty"));
        }
        if let Some(key) = config.exclude.iter().find(|key| key.trim().is_empty()) {
            return Err(anyhow!("exclude entries must not be empty (got {key:?})"));
        }
        if let Some(name) = config.tests.iter().find(|name| name.trim().is_empty()) {
            return Err(anyhow!("tests entries must not be empty (got {name:?})"));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to load config: {}", path.display()))
    }

    /// Loads `explicit` when given, otherwise the default file if it exists
    /// under `dir`, otherwise built-in defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_test_binary() -> PathBuf {
    PathBuf::from("./terminal_test")
}

fn default_fixtures_dir() -> PathBuf {
    PathBuf::from("fixtures")
}

fn default_xrdb_program() -> String {
    "xrdb".to_string()
}
