// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Orchestration and measurement core for perfsuite.
//!
//! Data flows leaf-first through the modules:
//!
//! ```text
//! config bytes -> RuntimeConfig -> resolver::SkipDecisions -> pruned SuiteRegistry
//!              -> TestDriver -> CaseContext -> Profiler -> ResultSink
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use perfsuite_core::{
//!     resolve_and_prune, CaseContext, ImmediateStart, RecordedResult, Result, RuntimeConfig,
//!     SuiteRegistry, TestDriver, TestSuite,
//! };
//!
//! struct Spin;
//!
//! impl TestSuite for Spin {
//!     fn name(&self) -> &str {
//!         "Spin"
//!     }
//!
//!     fn case_names(&self) -> Vec<String> {
//!         vec!["loop".to_string()]
//!     }
//!
//!     fn run_case(&mut self, _case: &str, ctx: &mut CaseContext<'_>) -> Result<()> {
//!         ctx.profile_and_report(10, || {
//!             std::hint::black_box((0..1000).sum::<u64>());
//!         })?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let load = RuntimeConfig::load_file("perfsuite_config.json");
//! let mut registry = SuiteRegistry::new();
//! registry.register(Spin)?;
//! let mut registry = resolve_and_prune(&load.config, registry);
//!
//! let mut results: Vec<RecordedResult> = Vec::new();
//! TestDriver::new(&mut registry, &mut results).run(&mut ImmediateStart)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Configuration document and loader
//! - [`resolver`] - Skip resolution
//! - [`registry`] - Registered suites
//! - [`profiler`] - Timed repeated execution
//! - [`driver`] - Suite lifecycle state machine
//! - [`completion`] - Post-run shutdown or reboot

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod clock;
pub mod completion;
pub mod config;
pub mod driver;
pub mod error;
pub mod profiler;
pub mod registry;
pub mod resolver;
pub mod sink;
pub mod suite;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use completion::{CompletionAction, PlatformControl};
pub use config::{
    ConfigIssue, ConfigLoad, IssueSeverity, RuntimeConfig, RuntimeSettings, SkipConfiguration,
    SuiteOverrides,
};
pub use driver::{
    AutorunMode, Bracket, DriverState, ImmediateStart, OperatorGate, RunSummary, StartDecision,
    TestDriver,
};
pub use error::{Error, Result};
pub use profiler::{micros_to_ms, ProfileResult, Profiler};
pub use registry::{RegisteredSuite, SuiteRegistry};
pub use resolver::{resolve, resolve_and_prune, unmatched_overrides, SkipDecisions};
pub use sink::{qualified_name, RecordedResult, ResultSink};
pub use suite::{CaseContext, TestSuite};
