use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    Created,
    Unavailable,
    Available,
    PreRunOk,
    PreRunFailed,
    Ran,
    RunFailed,
    CleanedUp,
}

impl UnitState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Unavailable => "unavailable",
            Self::Available => "available",
            Self::PreRunOk => "pre-run-ok",
            Self::PreRunFailed => "pre-run-failed",
            Self::Ran => "ran",
            Self::RunFailed => "run-failed",
            Self::CleanedUp => "cleaned-up",
        }
    }

    pub fn can_advance_to(self, next: UnitState) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Unavailable | Self::Available)
                | (Self::Available, Self::PreRunOk | Self::PreRunFailed)
                | (Self::PreRunOk, Self::Ran | Self::RunFailed)
                | (
                    Self::PreRunOk | Self::PreRunFailed | Self::Ran | Self::RunFailed,
                    Self::CleanedUp
                )
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Unavailable | Self::CleanedUp)
    }

    /// States after which cleanup is owed.
    pub fn requires_cleanup(self) -> bool {
        matches!(
            self,
            Self::PreRunOk | Self::PreRunFailed | Self::Ran | Self::RunFailed
        )
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PreRun,
    Run,
    Cleanup,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreRun => "pre-run",
            Self::Run => "run",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path a unit took through its states, starting at `Created`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitLifecycle {
    history: Vec<UnitState>,
}

impl Default for UnitLifecycle {
    fn default() -> Self {
        Self {
            history: vec![UnitState::Created],
        }
    }
}

impl UnitLifecycle {
    pub fn current(&self) -> UnitState {
        self.history
            .last()
            .copied()
            .unwrap_or(UnitState::Created)
    }

    pub fn history(&self) -> &[UnitState] {
        &self.history
    }

    /// Records `next`. Transitions outside the state machine are refused and
    /// leave the lifecycle unchanged.
    pub fn advance(&mut self, next: UnitState) -> bool {
        if !self.current().can_advance_to(next) {
            return false;
        }
        self.history.push(next);
        true
    }
}
