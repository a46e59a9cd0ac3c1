// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Destination for completed case results.

use crate::error::Result;
use crate::profiler::ProfileResult;

/// Receives one result per completed profile, tagged with suite and case.
///
/// The driver holds a single sink for the whole run and records into it on
/// its own thread only.
pub trait ResultSink {
    /// Record a result after any previously recorded ones.
    fn record(&mut self, suite: &str, case: &str, result: &ProfileResult) -> Result<()>;
}

/// `<suite>::<case>`.
pub fn qualified_name(suite: &str, case: &str) -> String {
    format!("{}::{}", suite, case)
}

/// A result captured by an in-memory sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResult {
    /// Owning suite.
    pub suite: String,
    /// Case within the suite.
    pub case: String,
    /// Measured statistics.
    pub result: ProfileResult,
}

impl RecordedResult {
    /// `<suite>::<case>`.
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.suite, &self.case)
    }
}

impl ResultSink for Vec<RecordedResult> {
    fn record(&mut self, suite: &str, case: &str, result: &ProfileResult) -> Result<()> {
        self.push(RecordedResult {
            suite: suite.to_string(),
            case: case.to_string(),
            result: result.clone(),
        });
        Ok(())
    }
}
