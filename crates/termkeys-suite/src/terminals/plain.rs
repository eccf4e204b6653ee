use anyhow::Result;

use crate::probe::AvailabilityProbe;
use crate::unit::{RunContext, TestUnit};

pub(crate) struct PlainTerminal {
    program: &'static str,
    flags: &'static [&'static str],
}

impl PlainTerminal {
    pub(crate) fn new(program: &'static str, flags: &'static [&'static str]) -> Self {
        Self { program, flags }
    }
}

impl TestUnit for PlainTerminal {
    fn available(&self, probe: &dyn AvailabilityProbe) -> bool {
        probe.is_available(self.program)
    }

    fn run(&mut self, ctx: &RunContext<'_>) -> Result<()> {
        let mut launcher = vec![self.program];
        launcher.extend_from_slice(self.flags);
        ctx.launch(&launcher)
    }
}
