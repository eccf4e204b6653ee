mod config;
mod exclusion;

pub use config::{SuiteConfig, DEFAULT_CONFIG_FILE};
pub use exclusion::{merge_exclusions, ExclusionSet, ExclusionTiers, DEFAULT_EXCLUSIONS};
