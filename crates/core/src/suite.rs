// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! The suite implementor interface.
//!
//! A suite owns its fixtures and dispatches case bodies by name: the runnable
//! unit is `run_case(&mut self, case, ctx)`, a function of the suite state and
//! the case id, rather than a closure stored per case.

use crate::error::Result;
use crate::profiler::{ProfileResult, Profiler};
use crate::sink::{qualified_name, ResultSink};
use tracing::info;

/// A named collection of cases sharing setup and teardown.
pub trait TestSuite {
    /// Stable, human-readable suite name.
    fn name(&self) -> &str;

    /// Case names in registration order. Names must be unique.
    fn case_names(&self) -> Vec<String>;

    /// Build suite-scoped fixtures. Called once before the first case.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release suite-scoped fixtures. Called once after the last case.
    fn deinitialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called before each case.
    fn setup_case(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called after each case.
    fn teardown_case(&mut self) -> Result<()> {
        Ok(())
    }

    /// Run the body of `case`.
    ///
    /// The driver only calls this with names returned by [`case_names`]
    /// that survived skip resolution.
    ///
    /// [`case_names`]: TestSuite::case_names
    fn run_case(&mut self, case: &str, ctx: &mut CaseContext<'_>) -> Result<()>;
}

/// Handle given to a case body for measuring and reporting.
pub struct CaseContext<'a> {
    suite: &'a str,
    case: &'a str,
    profiler: &'a Profiler,
    sink: &'a mut dyn ResultSink,
    reported: usize,
}

impl<'a> CaseContext<'a> {
    /// Create a context for `suite::case`.
    pub fn new(
        suite: &'a str,
        case: &'a str,
        profiler: &'a Profiler,
        sink: &'a mut dyn ResultSink,
    ) -> Self {
        Self {
            suite,
            case,
            profiler,
            sink,
            reported: 0,
        }
    }

    /// Owning suite name.
    pub fn suite(&self) -> &str {
        self.suite
    }

    /// Case name.
    pub fn case(&self) -> &str {
        self.case
    }

    /// `<suite>::<case>`.
    pub fn qualified_name(&self) -> String {
        qualified_name(self.suite, self.case)
    }

    /// Number of results reported so far.
    pub fn reported(&self) -> usize {
        self.reported
    }

    /// Profile `workload` for `iterations` runs without reporting it.
    pub fn profile<F>(&self, iterations: u32, workload: F) -> Result<ProfileResult>
    where
        F: FnMut(),
    {
        self.profiler
            .profile(&self.qualified_name(), iterations, workload)
    }

    /// Present `result` and append it to the run's result sink.
    pub fn report(&mut self, result: &ProfileResult) -> Result<()> {
        info!(
            suite = self.suite,
            case = self.case,
            iterations = result.iterations,
            total_ms = result.total_ms(),
            avg_ms = result.average_ms(),
            min_ms = result.min_ms(),
            max_ms = result.max_ms(),
            "{}",
            self.qualified_name()
        );
        self.sink.record(self.suite, self.case, result)?;
        self.reported += 1;
        Ok(())
    }

    /// Profile `workload` and report the result.
    pub fn profile_and_report<F>(&mut self, iterations: u32, workload: F) -> Result<ProfileResult>
    where
        F: FnMut(),
    {
        let result = self.profile(iterations, workload)?;
        self.report(&result)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::RecordedResult;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_report_tags_results_with_suite_and_case() {
        let clock = Rc::new(ManualClock::new());
        let profiler = Profiler::with_clock(Rc::clone(&clock));
        let mut sink: Vec<RecordedResult> = Vec::new();

        {
            let mut ctx = CaseContext::new("Suite", "case", &profiler, &mut sink);
            assert_eq!(ctx.qualified_name(), "Suite::case");
            ctx.profile_and_report(2, || clock.advance(Duration::from_micros(50)))
                .unwrap();
            let unreported = ctx.profile(1, || {}).unwrap();
            assert_eq!(unreported.iterations, 1);
            assert_eq!(ctx.reported(), 1);
        }

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].qualified_name(), "Suite::case");
        assert_eq!(sink[0].result.total_micros, 100);
    }
}
