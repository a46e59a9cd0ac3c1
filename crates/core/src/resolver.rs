// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Skip resolution.
//!
//! Precedence is case override, then suite override, then the global
//! `skip_tests_by_default` setting. Resolution is pure: it produces an
//! immutable [`SkipDecisions`] table which is then applied to a registry in a
//! single pass.

use crate::config::{RuntimeConfig, RuntimeSettings, SkipConfiguration, SuiteOverrides};
use crate::registry::SuiteRegistry;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Whether a case takes part in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseDecision {
    /// The case runs.
    Run,
    /// The case is removed from the registry.
    Skip,
}

impl CaseDecision {
    fn from_skip(skip: bool) -> Self {
        if skip {
            Self::Skip
        } else {
            Self::Run
        }
    }
}

impl fmt::Display for CaseDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run => f.write_str("run"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// Which level of configuration produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// `skip_tests_by_default`.
    GlobalDefault,
    /// The suite-level `skipped` key.
    SuiteOverride,
    /// The case-level `skipped` key.
    CaseOverride,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalDefault => f.write_str("global default"),
            Self::SuiteOverride => f.write_str("suite override"),
            Self::CaseOverride => f.write_str("case override"),
        }
    }
}

/// Resolution of a single case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResolution {
    /// Case name.
    pub case: String,
    /// Outcome.
    pub decision: CaseDecision,
    /// Level that decided it.
    pub source: DecisionSource,
}

/// Resolution of every case in one suite, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteResolution {
    /// Suite name.
    pub suite: String,
    /// Per-case outcomes.
    pub cases: Vec<CaseResolution>,
}

impl SuiteResolution {
    /// Names of cases resolved to [`CaseDecision::Skip`].
    pub fn skipped_cases(&self) -> BTreeSet<String> {
        self.cases
            .iter()
            .filter(|c| c.decision == CaseDecision::Skip)
            .map(|c| c.case.clone())
            .collect()
    }

    /// Whether any case survives.
    pub fn runs_any(&self) -> bool {
        self.cases.iter().any(|c| c.decision == CaseDecision::Run)
    }
}

/// Immutable decision table covering a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipDecisions {
    suites: Vec<SuiteResolution>,
}

impl SkipDecisions {
    /// Resolution for `suite`, if it was part of the resolved registry.
    pub fn suite(&self, suite: &str) -> Option<&SuiteResolution> {
        self.suites.iter().find(|s| s.suite == suite)
    }

    /// Suite resolutions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SuiteResolution> {
        self.suites.iter()
    }

    /// Number of cases that will run.
    pub fn run_count(&self) -> usize {
        self.suites
            .iter()
            .flat_map(|s| &s.cases)
            .filter(|c| c.decision == CaseDecision::Run)
            .count()
    }
}

/// Resolve one case given the global default and both override levels.
pub fn resolve_case(
    skip_by_default: bool,
    suite: SkipConfiguration,
    case: SkipConfiguration,
) -> (CaseDecision, DecisionSource) {
    if let Some(skip) = case.forced_skip() {
        return (CaseDecision::from_skip(skip), DecisionSource::CaseOverride);
    }
    if let Some(skip) = suite.forced_skip() {
        return (CaseDecision::from_skip(skip), DecisionSource::SuiteOverride);
    }
    (
        CaseDecision::from_skip(skip_by_default),
        DecisionSource::GlobalDefault,
    )
}

/// Decide every case currently enabled in `registry`.
pub fn resolve(
    settings: &RuntimeSettings,
    overrides: &SuiteOverrides,
    registry: &SuiteRegistry,
) -> SkipDecisions {
    let suites = registry
        .iter()
        .map(|registered| {
            let suite_name = registered.name();
            let suite_config = overrides.suite(suite_name);
            let cases = registered
                .case_names()
                .iter()
                .map(|case| {
                    let (decision, source) = resolve_case(
                        settings.skip_tests_by_default,
                        suite_config,
                        overrides.case(suite_name, case),
                    );
                    CaseResolution {
                        case: case.clone(),
                        decision,
                        source,
                    }
                })
                .collect();
            SuiteResolution {
                suite: suite_name.to_string(),
                cases,
            }
        })
        .collect();

    SkipDecisions { suites }
}

/// Resolve `registry` against `config` and return the pruned registry.
pub fn resolve_and_prune(config: &RuntimeConfig, registry: SuiteRegistry) -> SuiteRegistry {
    let decisions = resolve(&config.settings, &config.overrides, &registry);
    registry.apply(&decisions)
}

/// Describe overrides that name suites or cases absent from `registry`.
pub fn unmatched_overrides(overrides: &SuiteOverrides, registry: &SuiteRegistry) -> Vec<String> {
    let mut unmatched = Vec::new();
    for suite in overrides.suite_names() {
        match registry.get(suite) {
            None => unmatched.push(format!("Override for unknown test suite '{}'", suite)),
            Some(registered) => {
                for case in overrides.case_names(suite) {
                    if !registered.contains_case(case) {
                        unmatched.push(format!(
                            "Override for unknown test case '{}::{}'",
                            suite, case
                        ));
                    }
                }
            }
        }
    }
    unmatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SkipConfiguration::{Default as Inherit, Skipped, Unskipped};
    use crate::testing::FakeSuite;

    fn registry(suites: &[(&str, &[&str])]) -> SuiteRegistry {
        let mut registry = SuiteRegistry::new();
        for (name, cases) in suites {
            registry.register(FakeSuite::new(name, cases)).unwrap();
        }
        registry
    }

    fn settings(skip_by_default: bool) -> RuntimeSettings {
        RuntimeSettings {
            skip_tests_by_default: skip_by_default,
            ..RuntimeSettings::default()
        }
    }

    fn enabled(registry: &SuiteRegistry) -> Vec<(String, Vec<String>)> {
        registry
            .iter()
            .map(|s| (s.name().to_string(), s.case_names().to_vec()))
            .collect()
    }

    #[test]
    fn test_case_override_beats_suite_and_global() {
        for global in [false, true] {
            for suite in [Inherit, Skipped, Unskipped] {
                assert_eq!(
                    resolve_case(global, suite, Skipped),
                    (CaseDecision::Skip, DecisionSource::CaseOverride)
                );
                assert_eq!(
                    resolve_case(global, suite, Unskipped),
                    (CaseDecision::Run, DecisionSource::CaseOverride)
                );
            }
        }
    }

    #[test]
    fn test_suite_override_beats_global() {
        for global in [false, true] {
            assert_eq!(
                resolve_case(global, Skipped, Inherit),
                (CaseDecision::Skip, DecisionSource::SuiteOverride)
            );
            assert_eq!(
                resolve_case(global, Unskipped, Inherit),
                (CaseDecision::Run, DecisionSource::SuiteOverride)
            );
        }
        assert_eq!(
            resolve_case(true, Inherit, Inherit),
            (CaseDecision::Skip, DecisionSource::GlobalDefault)
        );
    }

    #[test]
    fn test_suite_override_applies_to_every_case() {
        let registry = registry(&[("Foo", &["a", "b", "c"])]);
        let mut overrides = SuiteOverrides::new();
        overrides.set_suite("Foo", Unskipped);

        let decisions = resolve(&settings(true), &overrides, &registry);
        let foo = decisions.suite("Foo").unwrap();
        assert!(foo
            .cases
            .iter()
            .all(|c| c.decision == CaseDecision::Run && c.source == DecisionSource::SuiteOverride));
    }

    #[test]
    fn test_scenario_unskipped_suite_with_skipped_case() {
        let config = RuntimeConfig::parse_str(
            r#"{"settings":{"skip_tests_by_default":true},
                "test_suites":{"Foo":{"skipped":false,"bar":{"skipped":true}}}}"#,
        );
        assert!(config.ok(), "{:?}", config.issues);

        let pruned = resolve_and_prune(
            &config.config,
            registry(&[("Foo", &["bar", "baz"]), ("Other", &["x"])]),
        );

        assert_eq!(
            enabled(&pruned),
            vec![("Foo".to_string(), vec!["baz".to_string()])]
        );
    }

    #[test]
    fn test_scenario_empty_test_suites_uses_global_default() {
        let suites: &[(&str, &[&str])] = &[("A", &["1", "2"]), ("B", &["3"])];

        let kept = RuntimeConfig::parse_str(r#"{"settings":{},"test_suites":{}}"#);
        let pruned = resolve_and_prune(&kept.config, registry(suites));
        assert_eq!(pruned.case_count(), 3);

        let skipped =
            RuntimeConfig::parse_str(r#"{"settings":{"skip_tests_by_default":true},"test_suites":{}}"#);
        let pruned = resolve_and_prune(&skipped.config, registry(suites));
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_pruning_keeps_registration_order() {
        let mut overrides = SuiteOverrides::new();
        overrides.set_suite("B", Skipped);
        overrides.set_case("C", "c2", Skipped);
        let config = RuntimeConfig {
            settings: settings(false),
            overrides,
        };

        let pruned = resolve_and_prune(
            &config,
            registry(&[("C", &["c1", "c2", "c3"]), ("B", &["b1"]), ("A", &["a1"])]),
        );

        assert_eq!(
            enabled(&pruned),
            vec![
                ("C".to_string(), vec!["c1".to_string(), "c3".to_string()]),
                ("A".to_string(), vec!["a1".to_string()]),
            ]
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut overrides = SuiteOverrides::new();
        overrides.set_suite("A", Skipped);
        overrides.set_case("A", "a2", Unskipped);
        let config = RuntimeConfig {
            settings: settings(false),
            overrides,
        };

        let once = resolve_and_prune(&config, registry(&[("A", &["a1", "a2"]), ("B", &["b1"])]));
        let once_view = enabled(&once);
        let twice = resolve_and_prune(&config, once);

        assert_eq!(enabled(&twice), once_view);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut overrides = SuiteOverrides::new();
        overrides.set_case("A", "a1", Skipped);
        let reg = registry(&[("A", &["a1", "a2"])]);

        let first = resolve(&settings(false), &overrides, &reg);
        let second = resolve(&settings(false), &overrides, &reg);
        assert_eq!(first, second);
        assert_eq!(first.run_count(), 1);
    }

    #[test]
    fn test_unmatched_overrides_are_reported() {
        let mut overrides = SuiteOverrides::new();
        overrides.set_suite("Missing", Skipped);
        overrides.set_case("Foo", "nope", Skipped);
        overrides.set_case("Foo", "bar", Skipped);

        let unmatched = unmatched_overrides(&overrides, &registry(&[("Foo", &["bar"])]));
        assert_eq!(
            unmatched,
            vec![
                "Override for unknown test case 'Foo::nope'".to_string(),
                "Override for unknown test suite 'Missing'".to_string(),
            ]
        );
    }
}
