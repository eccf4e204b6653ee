use std::fs;
use std::path::Path;

use crate::error::CatalogError;

/// Action identifiers exported from a terminal's shortcut scheme, one
/// `name=shortcut` entry per line. Order and duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionCatalog {
    names: Vec<String>,
}

impl ActionCatalog {
    pub fn parse(raw: &str) -> Self {
        let names = raw
            .lines()
            .filter_map(|line| line.split_once('=').map(|(name, _)| name.to_string()))
            .collect();
        Self { names }
    }

    pub fn read(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&raw))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
