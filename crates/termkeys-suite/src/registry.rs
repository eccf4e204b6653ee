use std::collections::{BTreeMap, HashSet};
use std::fmt;

use anyhow::Result;

use crate::error::SuiteError;
use crate::terminals::register_builtin_units;
use crate::unit::{TestUnit, UnitEnvironment};

pub type UnitFactory = Box<dyn Fn(&UnitEnvironment) -> Result<Box<dyn TestUnit>>>;

/// Name to constructor table. Units are built fresh for every suite run.
#[derive(Default)]
pub struct TestRegistry {
    factories: BTreeMap<String, UnitFactory>,
}

impl fmt::Debug for TestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every terminal shipped with termkeys.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        register_builtin_units(&mut registry);
        registry
    }

    /// Adds or replaces the factory registered under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&UnitEnvironment) -> Result<Box<dyn TestUnit>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Resolves the run order: `requested` as given (first occurrence wins),
    /// or every registered name when nothing was requested.
    pub fn select(&self, requested: &[String]) -> Result<Vec<String>, SuiteError> {
        if requested.is_empty() {
            return Ok(self.names());
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::with_capacity(requested.len());
        for name in requested {
            if !self.contains(name) {
                return Err(SuiteError::UnknownTest {
                    name: name.clone(),
                    available: self.names(),
                });
            }
            if seen.insert(name.as_str()) {
                selected.push(name.clone());
            }
        }
        Ok(selected)
    }

    pub fn instantiate(
        &self,
        name: &str,
        environment: &UnitEnvironment,
    ) -> Result<Box<dyn TestUnit>, SuiteError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SuiteError::UnknownTest {
                name: name.to_string(),
                available: self.names(),
            })?;
        factory(environment).map_err(|err| SuiteError::Instantiate {
            name: name.to_string(),
            detail: format!("{err:#}"),
        })
    }
}
