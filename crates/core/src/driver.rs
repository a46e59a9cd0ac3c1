// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Suite lifecycle driver.
//!
//! The driver walks a pruned [`SuiteRegistry`] strictly sequentially:
//!
//! ```text
//! Idle -> AwaitingStart -> SuiteInit -> (CaseSetup -> CaseRunning -> CaseTeardown)* -> SuiteDeinit -> ... -> Done
//! ```
//!
//! Any error stops the run where it occurred. No later hook is called.

use crate::config::RuntimeSettings;
use crate::error::{Error, Result};
use crate::profiler::Profiler;
use crate::registry::SuiteRegistry;
use crate::sink::ResultSink;
use crate::suite::CaseContext;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Lifecycle position of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Nothing has happened yet.
    Idle,
    /// Waiting on the operator gate.
    AwaitingStart,
    /// Inside `initialize`.
    SuiteInit,
    /// Inside `setup_case`.
    CaseSetup,
    /// Inside `run_case`.
    CaseRunning,
    /// Inside `teardown_case`.
    CaseTeardown,
    /// Inside `deinitialize`.
    SuiteDeinit,
    /// Every selected case ran.
    Done,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingStart => "awaiting-start",
            Self::SuiteInit => "suite-init",
            Self::CaseSetup => "case-setup",
            Self::CaseRunning => "case-running",
            Self::CaseTeardown => "case-teardown",
            Self::SuiteDeinit => "suite-deinit",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a run is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutorunMode {
    /// Start without confirmation.
    Immediate,
    /// Start on its own unless the operator intervenes first.
    Countdown,
    /// Never start without explicit operator input.
    Disabled,
}

impl AutorunMode {
    /// Derive the mode from the run settings. `disable_autorun` wins.
    pub fn from_settings(settings: &RuntimeSettings) -> Self {
        if settings.disable_autorun {
            Self::Disabled
        } else if settings.autorun_immediately {
            Self::Immediate
        } else {
            Self::Countdown
        }
    }
}

/// Operator answer to a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDecision {
    /// Run the tests.
    Start,
    /// Do not run anything.
    Decline,
}

/// External collaborator deciding whether a run may start.
pub trait OperatorGate {
    /// Block until the run may start or the operator declines.
    fn await_start(&mut self, mode: AutorunMode) -> Result<StartDecision>;
}

/// Gate that always starts at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateStart;

impl OperatorGate for ImmediateStart {
    fn await_start(&mut self, _mode: AutorunMode) -> Result<StartDecision> {
        Ok(StartDecision::Start)
    }
}

/// Whether a single-case run calls the suite-wide hooks around the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// Call `initialize` before and `deinitialize` after.
    WithSuiteLifecycle,
    /// Call only the per-case hooks.
    CaseOnly,
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Suites whose lifecycle completed.
    pub suites_run: usize,
    /// Cases whose body completed.
    pub cases_run: usize,
    /// Results appended to the sink.
    pub results_reported: usize,
}

impl RunSummary {
    fn absorb(&mut self, other: RunSummary) {
        self.suites_run += other.suites_run;
        self.cases_run += other.cases_run;
        self.results_reported += other.results_reported;
    }
}

/// Drives suite and case lifecycles over a borrowed registry and sink.
pub struct TestDriver<'a> {
    registry: &'a mut SuiteRegistry,
    sink: &'a mut dyn ResultSink,
    profiler: Profiler,
    autorun: AutorunMode,
    state: DriverState,
}

impl<'a> TestDriver<'a> {
    /// Create a driver using the system clock and immediate autorun.
    pub fn new(registry: &'a mut SuiteRegistry, sink: &'a mut dyn ResultSink) -> Self {
        Self {
            registry,
            sink,
            profiler: Profiler::new(),
            autorun: AutorunMode::Immediate,
            state: DriverState::Idle,
        }
    }

    /// Use `profiler` for every case.
    pub fn with_profiler(mut self, profiler: Profiler) -> Self {
        self.profiler = profiler;
        self
    }

    /// Set the autorun mode passed to the operator gate.
    pub fn with_autorun(mut self, autorun: AutorunMode) -> Self {
        self.autorun = autorun;
        self
    }

    /// Current lifecycle position.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Autorun mode in effect.
    pub fn autorun(&self) -> AutorunMode {
        self.autorun
    }

    /// Ask `gate` for permission, then run every enabled case.
    ///
    /// # Errors
    ///
    /// [`Error::StartDeclined`] if the operator declines; nothing runs.
    pub fn run(&mut self, gate: &mut dyn OperatorGate) -> Result<RunSummary> {
        self.transition(DriverState::AwaitingStart);
        info!(mode = ?self.autorun, "Waiting for start");
        match gate.await_start(self.autorun)? {
            StartDecision::Start => self.run_all(),
            StartDecision::Decline => {
                self.transition(DriverState::Idle);
                Err(Error::StartDeclined)
            }
        }
    }

    /// Run every enabled case of every suite in registration order.
    pub fn run_all(&mut self) -> Result<RunSummary> {
        info!(
            suites = self.registry.len(),
            cases = self.registry.case_count(),
            "Starting tests"
        );
        let names: Vec<String> = self
            .registry
            .suite_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut summary = RunSummary::default();
        for name in &names {
            summary.absorb(self.run_suite_inner(name)?);
        }

        self.transition(DriverState::Done);
        info!(
            suites = summary.suites_run,
            cases = summary.cases_run,
            "Testing completed"
        );
        Ok(summary)
    }

    /// Run every enabled case of one suite.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownSuite`] if the suite is not in the registry.
    pub fn run_suite(&mut self, suite: &str) -> Result<RunSummary> {
        let summary = self.run_suite_inner(suite)?;
        self.transition(DriverState::Done);
        Ok(summary)
    }

    /// Run one enabled case.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownSuite`] or [`Error::UnknownCase`] when the name is not
    /// registered or was pruned.
    pub fn run_case(&mut self, suite: &str, case: &str, bracket: Bracket) -> Result<RunSummary> {
        let registered = self
            .registry
            .get(suite)
            .ok_or_else(|| Error::UnknownSuite(suite.to_string()))?;
        if !registered.contains_case(case) {
            return Err(Error::unknown_case(suite, case));
        }

        let mut summary = RunSummary::default();
        if bracket == Bracket::WithSuiteLifecycle {
            self.initialize(suite)?;
        }
        summary.results_reported += self.run_one(suite, case)?;
        summary.cases_run += 1;
        if bracket == Bracket::WithSuiteLifecycle {
            self.deinitialize(suite)?;
            summary.suites_run += 1;
        }

        self.transition(DriverState::Done);
        Ok(summary)
    }

    fn run_suite_inner(&mut self, suite: &str) -> Result<RunSummary> {
        let cases: Vec<String> = self
            .registry
            .get(suite)
            .ok_or_else(|| Error::UnknownSuite(suite.to_string()))?
            .case_names()
            .to_vec();

        let mut summary = RunSummary::default();
        self.initialize(suite)?;
        for case in &cases {
            summary.results_reported += self.run_one(suite, case)?;
            summary.cases_run += 1;
        }
        self.deinitialize(suite)?;
        summary.suites_run += 1;
        Ok(summary)
    }

    fn initialize(&mut self, suite: &str) -> Result<()> {
        self.transition(DriverState::SuiteInit);
        info!(suite, "Initializing suite");
        self.suite(suite)?.suite_mut().initialize()
    }

    fn deinitialize(&mut self, suite: &str) -> Result<()> {
        self.transition(DriverState::SuiteDeinit);
        self.suite(suite)?.suite_mut().deinitialize()
    }

    fn run_one(&mut self, suite: &str, case: &str) -> Result<usize> {
        self.transition(DriverState::CaseSetup);
        self.suite(suite)?.suite_mut().setup_case()?;

        self.transition(DriverState::CaseRunning);
        debug!(suite, case, "Running case");
        let reported = {
            let Self {
                registry,
                sink,
                profiler,
                ..
            } = self;
            let registered = registry
                .get_mut(suite)
                .ok_or_else(|| Error::UnknownSuite(suite.to_string()))?;
            let mut ctx = CaseContext::new(suite, case, profiler, &mut **sink);
            registered.suite_mut().run_case(case, &mut ctx)?;
            ctx.reported()
        };

        self.transition(DriverState::CaseTeardown);
        self.suite(suite)?.suite_mut().teardown_case()?;
        Ok(reported)
    }

    fn suite(&mut self, suite: &str) -> Result<&mut crate::registry::RegisteredSuite> {
        self.registry
            .get_mut(suite)
            .ok_or_else(|| Error::UnknownSuite(suite.to_string()))
    }

    fn transition(&mut self, next: DriverState) {
        debug!(from = %self.state, to = %next, "Driver state");
        self.state = next;
    }
}
