// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Registered suites and their enabled cases.

use crate::error::{Error, Result};
use crate::resolver::SkipDecisions;
use crate::suite::TestSuite;
use std::collections::BTreeSet;
use tracing::debug;

/// A suite together with the ordered list of its enabled cases.
pub struct RegisteredSuite {
    suite: Box<dyn TestSuite>,
    cases: Vec<String>,
}

impl std::fmt::Debug for RegisteredSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredSuite")
            .field("name", &self.name())
            .field("cases", &self.cases)
            .finish()
    }
}

impl RegisteredSuite {
    fn new(suite: Box<dyn TestSuite>) -> Result<Self> {
        let cases = suite.case_names();
        let mut seen = BTreeSet::new();
        for case in &cases {
            if !seen.insert(case.as_str()) {
                return Err(Error::DuplicateCase {
                    suite: suite.name().to_string(),
                    case: case.clone(),
                });
            }
        }
        Ok(Self { suite, cases })
    }

    /// Suite name.
    pub fn name(&self) -> &str {
        self.suite.name()
    }

    /// Enabled case names in registration order.
    pub fn case_names(&self) -> &[String] {
        &self.cases
    }

    /// Whether `case` is still enabled.
    pub fn contains_case(&self, case: &str) -> bool {
        self.cases.iter().any(|c| c == case)
    }

    /// Remove every case named in `disabled`, keeping the order of the rest.
    pub fn disable_cases(&mut self, disabled: &BTreeSet<String>) {
        self.cases.retain(|case| !disabled.contains(case));
    }

    /// Whether at least one case is still enabled.
    pub fn has_enabled_cases(&self) -> bool {
        !self.cases.is_empty()
    }

    /// The suite implementation.
    pub fn suite_mut(&mut self) -> &mut dyn TestSuite {
        self.suite.as_mut()
    }
}

/// Exclusive owner of the suites taking part in a run.
#[derive(Debug, Default)]
pub struct SuiteRegistry {
    suites: Vec<RegisteredSuite>,
}

impl SuiteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a suite after all previously registered ones.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateSuite`] if the name is taken and
    /// [`Error::DuplicateCase`] if the suite lists a case twice.
    pub fn register<S>(&mut self, suite: S) -> Result<()>
    where
        S: TestSuite + 'static,
    {
        self.register_boxed(Box::new(suite))
    }

    /// Register an already boxed suite.
    pub fn register_boxed(&mut self, suite: Box<dyn TestSuite>) -> Result<()> {
        if self.get(suite.name()).is_some() {
            return Err(Error::DuplicateSuite(suite.name().to_string()));
        }
        let registered = RegisteredSuite::new(suite)?;
        debug!(
            suite = registered.name(),
            cases = registered.cases.len(),
            "Registered suite"
        );
        self.suites.push(registered);
        Ok(())
    }

    /// Number of suites.
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    /// Whether no suites are registered.
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Suites in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredSuite> {
        self.suites.iter()
    }

    /// Suite names in registration order.
    pub fn suite_names(&self) -> Vec<&str> {
        self.suites.iter().map(RegisteredSuite::name).collect()
    }

    /// Total number of enabled cases across all suites.
    pub fn case_count(&self) -> usize {
        self.suites.iter().map(|s| s.cases.len()).sum()
    }

    /// Look up a suite by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredSuite> {
        self.suites.iter().find(|s| s.name() == name)
    }

    /// Look up a suite by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut RegisteredSuite> {
        self.suites.iter_mut().find(|s| s.name() == name)
    }

    /// Apply a decision table, producing the pruned registry.
    ///
    /// Skipped cases are removed and suites left without cases are dropped.
    /// Suites absent from the table are kept untouched.
    pub fn apply(self, decisions: &SkipDecisions) -> SuiteRegistry {
        let mut pruned = Vec::with_capacity(self.suites.len());
        for mut registered in self.suites {
            if let Some(resolution) = decisions.suite(registered.name()) {
                registered.disable_cases(&resolution.skipped_cases());
            }
            if registered.has_enabled_cases() {
                pruned.push(registered);
            } else {
                debug!(suite = registered.name(), "Removing suite with no enabled cases");
            }
        }
        SuiteRegistry { suites: pruned }
    }
}
