// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the orchestration core.
//!
//! Every variant here halts the run it occurs in. Configuration problems are
//! not represented here: they are collected as [`crate::config::ConfigIssue`]
//! values so that a load can fail softly and fall back to defaults.

use std::time::Duration;
use thiserror::Error;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum Error {
    /// A suite name was requested that is not in the registry.
    #[error("Unknown test suite: {0}")]
    UnknownSuite(String),

    /// A case name was requested that the suite does not (or no longer) contain.
    #[error("Invalid test name: {suite}::{case}")]
    UnknownCase {
        /// Suite name.
        suite: String,
        /// Case name.
        case: String,
    },

    /// Two suites were registered under the same name.
    #[error("Duplicate test suite name: {0}")]
    DuplicateSuite(String),

    /// A suite listed the same case name twice.
    #[error("Duplicate test case name in suite {suite}: {case}")]
    DuplicateCase {
        /// Suite name.
        suite: String,
        /// Repeated case name.
        case: String,
    },

    /// Profiling was requested with zero iterations.
    #[error("Profiling {0} requires at least one iteration")]
    InvalidIterations(String),

    /// The monotonic clock went backwards between two readings.
    #[error("Clock fault while profiling {name}: clock moved backwards by {regression:?}")]
    ClockFault {
        /// Qualified name of the workload being profiled.
        name: String,
        /// How far the clock went back.
        regression: Duration,
    },

    /// The output directory or result log could not be prepared.
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Appending to the result sink failed.
    #[error("Result sink error: {0}")]
    ResultSink(String),

    /// A workload provider reported a failure.
    #[error("Workload {name} failed: {message}")]
    Workload {
        /// Qualified name of the workload.
        name: String,
        /// Provider message.
        message: String,
    },

    /// The operator declined to start the run.
    #[error("Run start declined by operator")]
    StartDeclined,
}

impl Error {
    /// Build an [`Error::UnknownCase`].
    pub fn unknown_case(suite: impl Into<String>, case: impl Into<String>) -> Self {
        Self::UnknownCase {
            suite: suite.into(),
            case: case.into(),
        }
    }

    /// Build an [`Error::Workload`].
    pub fn workload(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Workload {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Build an [`Error::ResourceUnavailable`].
    pub fn resource_unavailable(message: impl Into<String>) -> Self {
        Self::ResourceUnavailable(message.into())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
