use std::collections::BTreeSet;

/// Key combinations no terminal is asked to exercise.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    // opens the X11 context menu
    "S-F10",
    // pastes the X11 clipboard
    "S-Insert",
    "A-S-Insert",
    // kills text to the beginning of the line
    "C-u",
    "C-S-u",
    "C-A-u",
    "C-S-A-u",
    // backspace
    "C-h",
    "C-M-h",
    // return
    "C-m",
    "C-M-m",
    // XON
    "C-q",
    "C-M-q",
];

pub type ExclusionSet = BTreeSet<String>;

/// The two exclusion tiers owned by the suite. The third tier belongs to each
/// test unit and is supplied at merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionTiers {
    pub defaults: ExclusionSet,
    pub user: ExclusionSet,
}

impl Default for ExclusionTiers {
    fn default() -> Self {
        Self {
            defaults: DEFAULT_EXCLUSIONS
                .iter()
                .map(|key| key.to_string())
                .collect(),
            user: ExclusionSet::new(),
        }
    }
}

impl ExclusionTiers {
    pub fn with_user<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_user(keys);
        self
    }

    pub fn add_user<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            let key: String = key.into();
            if !key.trim().is_empty() {
                self.user.insert(key);
            }
        }
    }

    pub fn effective_for(&self, unit_declared: &[String]) -> ExclusionSet {
        merge_exclusions(&self.defaults, &self.user, unit_declared)
    }
}

/// Union of every tier. No tier can remove an identifier another tier added.
pub fn merge_exclusions<'a, D, U, T>(defaults: D, user: U, unit_declared: T) -> ExclusionSet
where
    D: IntoIterator<Item = &'a String>,
    U: IntoIterator<Item = &'a String>,
    T: IntoIterator<Item = &'a String>,
{
    defaults
        .into_iter()
        .chain(user)
        .chain(unit_declared)
        .cloned()
        .collect()
}
