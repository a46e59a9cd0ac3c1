// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Runtime configuration document.
//!
//! The configuration file is a JSON object with a required `settings` object
//! and an optional `test_suites` object:
//!
//! ```text
//! {
//!   "settings": {
//!     "disable_autorun": false,
//!     "enable_autorun_immediately": true,
//!     "enable_shutdown_on_completion": false,
//!     "skip_tests_by_default": false,
//!     "output_directory_path": "results/perf",
//!     "reboot_or_shutdown_delay": 10000
//!   },
//!   "test_suites": {
//!     "High vertex count": {
//!       "skipped": true,
//!       "HighVtxCount-arrays": { "skipped": false }
//!     }
//!   }
//! }
//! ```
//!
//! Loading never panics and never partially commits: [`RuntimeConfig::parse`]
//! returns a [`ConfigLoad`] holding either the fully parsed configuration or
//! the defaults, together with every warning and error encountered.
//!
//! Inside a suite object the key `skipped` is always the suite-level directive.
//! A case literally named `skipped` therefore cannot be configured.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Largest config file that will be read.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Output directory used when the config does not name one.
pub const DEFAULT_OUTPUT_DIRECTORY_PATH: &str = "perfsuite_results";

/// Delay before the completion action when the config does not set one.
pub const DEFAULT_REBOOT_OR_SHUTDOWN_DELAY_MS: u32 = 10_000;

/// Reserved key carrying a skip directive at suite and case level.
pub const SKIPPED_KEY: &str = "skipped";

/// Explicit skip state declared for a suite or a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipConfiguration {
    /// No explicit override; inherit from the enclosing level.
    #[default]
    Default,
    /// Explicitly skipped.
    Skipped,
    /// Explicitly enabled.
    Unskipped,
}

impl SkipConfiguration {
    /// Map a `"skipped": <bool>` value onto a configuration.
    pub fn from_skipped(skipped: bool) -> Self {
        if skipped {
            Self::Skipped
        } else {
            Self::Unskipped
        }
    }

    /// The skip decision this configuration forces, if any.
    pub fn forced_skip(self) -> Option<bool> {
        match self {
            Self::Default => None,
            Self::Skipped => Some(true),
            Self::Unskipped => Some(false),
        }
    }
}

/// Recognized keys of the `settings` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsKey {
    /// Never start the run without operator input.
    DisableAutorun,
    /// Start the run without waiting for confirmation.
    EnableAutorunImmediately,
    /// Shut down instead of rebooting once the run completes.
    EnableShutdownOnCompletion,
    /// Global default skip state for every case.
    SkipTestsByDefault,
    /// Directory receiving the result log.
    OutputDirectoryPath,
    /// Delay in milliseconds before the completion action.
    RebootOrShutdownDelay,
}

impl SettingsKey {
    /// Every recognized key.
    pub const ALL: [SettingsKey; 6] = [
        SettingsKey::DisableAutorun,
        SettingsKey::EnableAutorunImmediately,
        SettingsKey::EnableShutdownOnCompletion,
        SettingsKey::SkipTestsByDefault,
        SettingsKey::OutputDirectoryPath,
        SettingsKey::RebootOrShutdownDelay,
    ];

    /// The JSON key name.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DisableAutorun => "disable_autorun",
            Self::EnableAutorunImmediately => "enable_autorun_immediately",
            Self::EnableShutdownOnCompletion => "enable_shutdown_on_completion",
            Self::SkipTestsByDefault => "skip_tests_by_default",
            Self::OutputDirectoryPath => "output_directory_path",
            Self::RebootOrShutdownDelay => "reboot_or_shutdown_delay",
        }
    }

    /// Look a key up by its JSON name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

/// Flat run settings. Populated once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Never start the run without operator input.
    pub disable_autorun: bool,
    /// Start the run without waiting for confirmation.
    pub autorun_immediately: bool,
    /// Shut down instead of rebooting once the run completes.
    pub shutdown_on_completion: bool,
    /// Global default skip state for every case.
    pub skip_tests_by_default: bool,
    /// Directory receiving the result log, separators normalized.
    pub output_directory_path: String,
    /// Delay in milliseconds before the completion action.
    pub reboot_or_shutdown_delay_ms: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            disable_autorun: false,
            autorun_immediately: false,
            shutdown_on_completion: false,
            skip_tests_by_default: false,
            output_directory_path: sanitize_path(DEFAULT_OUTPUT_DIRECTORY_PATH),
            reboot_or_shutdown_delay_ms: DEFAULT_REBOOT_OR_SHUTDOWN_DELAY_MS,
        }
    }
}

/// Sparse suite- and case-level skip overrides.
///
/// Only non-[`SkipConfiguration::Default`] entries are stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteOverrides {
    suites: BTreeMap<String, SkipConfiguration>,
    cases: BTreeMap<String, BTreeMap<String, SkipConfiguration>>,
}

impl SuiteOverrides {
    /// Create an empty override set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the suite-level configuration. `Default` clears any override.
    pub fn set_suite(&mut self, suite: impl Into<String>, config: SkipConfiguration) {
        let suite = suite.into();
        if config == SkipConfiguration::Default {
            self.suites.remove(&suite);
        } else {
            self.suites.insert(suite, config);
        }
    }

    /// Set a case-level configuration. `Default` clears any override.
    pub fn set_case(
        &mut self,
        suite: impl Into<String>,
        case: impl Into<String>,
        config: SkipConfiguration,
    ) {
        let suite = suite.into();
        let case = case.into();
        if config == SkipConfiguration::Default {
            if let Some(cases) = self.cases.get_mut(&suite) {
                cases.remove(&case);
                if cases.is_empty() {
                    self.cases.remove(&suite);
                }
            }
        } else {
            self.cases.entry(suite).or_default().insert(case, config);
        }
    }

    /// Suite-level configuration for `suite`.
    pub fn suite(&self, suite: &str) -> SkipConfiguration {
        self.suites.get(suite).copied().unwrap_or_default()
    }

    /// Case-level configuration for `suite::case`.
    pub fn case(&self, suite: &str, case: &str) -> SkipConfiguration {
        self.cases
            .get(suite)
            .and_then(|cases| cases.get(case))
            .copied()
            .unwrap_or_default()
    }

    /// Whether no override of any kind is stored.
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty() && self.cases.is_empty()
    }

    /// Every suite name mentioned at suite or case level, sorted.
    pub fn suite_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .suites
            .keys()
            .chain(self.cases.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Case names with an override in `suite`, sorted.
    pub fn case_names(&self, suite: &str) -> Vec<&str> {
        self.cases
            .get(suite)
            .map(|cases| cases.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Reported but the load still succeeds.
    Warning,
    /// The load is rejected and defaults stay in place.
    Error,
}

/// A single message produced while loading a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigIssue {
    /// Whether the issue rejects the load.
    pub severity: IssueSeverity,
    /// Human-readable, field-specific message.
    pub message: String,
}

impl ConfigIssue {
    /// A non-fatal issue.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            message: message.into(),
        }
    }

    /// A fatal issue.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            message: message.into(),
        }
    }

    /// Whether this issue rejects the load.
    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Parsed settings plus skip overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Flat run settings.
    pub settings: RuntimeSettings,
    /// Suite- and case-level skip overrides.
    pub overrides: SuiteOverrides,
}

/// Outcome of loading a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLoad {
    /// The loaded configuration, or the defaults when the load was rejected.
    pub config: RuntimeConfig,
    /// Every warning and error, in the order encountered.
    pub issues: Vec<ConfigIssue>,
}

impl ConfigLoad {
    fn rejected(issues: Vec<ConfigIssue>) -> Self {
        Self {
            config: RuntimeConfig::default(),
            issues,
        }
    }

    /// Whether the configuration was accepted.
    pub fn ok(&self) -> bool {
        !self.issues.iter().any(ConfigIssue::is_error)
    }

    /// Messages of fatal issues.
    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    /// Messages of non-fatal issues.
    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }
}

impl RuntimeConfig {
    /// Load the configuration file at `path`.
    pub fn load_file(path: impl AsRef<Path>) -> ConfigLoad {
        let path = path.as_ref();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => {
                return ConfigLoad::rejected(vec![ConfigIssue::error(format!(
                    "Missing config file at {}",
                    path.display()
                ))])
            }
        };

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return ConfigLoad::rejected(vec![ConfigIssue::error(format!(
                "Config file at {} is too large.",
                path.display()
            ))]);
        }

        match fs::read(path) {
            Ok(bytes) => Self::parse(&bytes),
            Err(e) => ConfigLoad::rejected(vec![ConfigIssue::error(format!(
                "Failed to read config file at {}: {}",
                path.display(),
                e
            ))]),
        }
    }

    /// Parse a configuration from a string.
    pub fn parse_str(content: &str) -> ConfigLoad {
        Self::parse(content.as_bytes())
    }

    /// Parse a configuration from raw bytes.
    pub fn parse(bytes: &[u8]) -> ConfigLoad {
        let mut issues = Vec::new();
        match parse_document(bytes, &mut issues) {
            Ok(config) => ConfigLoad { config, issues },
            Err(message) => {
                issues.push(ConfigIssue::error(message));
                ConfigLoad::rejected(issues)
            }
        }
    }
}

/// Replace every `/` with the platform path separator.
pub fn sanitize_path(path: &str) -> String {
    path.replace('/', std::path::MAIN_SEPARATOR_STR)
}

type ParseResult<T> = std::result::Result<T, String>;

fn parse_document(bytes: &[u8], issues: &mut Vec<ConfigIssue>) -> ParseResult<RuntimeConfig> {
    let root: Value = serde_json::from_slice(bytes)
        .map_err(|e| format!("Failed to parse config file: {}", e))?;
    let root = root
        .as_object()
        .ok_or_else(|| "Config root must be an object".to_string())?;

    for key in root.keys() {
        if key != "settings" && key != "test_suites" {
            issues.push(ConfigIssue::warning(format!("'{}' unsupported. Ignoring", key)));
        }
    }

    let settings = parse_settings(root.get("settings"), issues)?;
    let overrides = parse_test_suites(root.get("test_suites"), issues)?;

    Ok(RuntimeConfig {
        settings,
        overrides,
    })
}

fn parse_settings(
    value: Option<&Value>,
    issues: &mut Vec<ConfigIssue>,
) -> ParseResult<RuntimeSettings> {
    let settings = value.ok_or_else(|| "'settings' not found".to_string())?;
    let settings = settings
        .as_object()
        .ok_or_else(|| "'settings' not an object".to_string())?;

    for key in settings.keys() {
        if SettingsKey::from_key(key).is_none() {
            issues.push(ConfigIssue::warning(format!(
                "settings[{}] unsupported. Ignoring",
                key
            )));
        }
    }

    let mut out = RuntimeSettings::default();
    if let Some(value) = read_bool(settings, SettingsKey::DisableAutorun)? {
        out.disable_autorun = value;
    }
    if let Some(value) = read_bool(settings, SettingsKey::EnableAutorunImmediately)? {
        out.autorun_immediately = value;
    }
    if let Some(value) = read_bool(settings, SettingsKey::EnableShutdownOnCompletion)? {
        out.shutdown_on_completion = value;
    }
    if let Some(value) = read_bool(settings, SettingsKey::SkipTestsByDefault)? {
        out.skip_tests_by_default = value;
    }
    if let Some(value) = read_string(settings, SettingsKey::OutputDirectoryPath)? {
        out.output_directory_path = sanitize_path(&value);
    }
    if let Some(value) = read_u32(settings, SettingsKey::RebootOrShutdownDelay)? {
        out.reboot_or_shutdown_delay_ms = value;
    }

    Ok(out)
}

fn read_bool(object: &Map<String, Value>, key: SettingsKey) -> ParseResult<Option<bool>> {
    match object.get(key.key()) {
        None => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(format!("settings[{}] must be a boolean", key.key())),
    }
}

fn read_string(object: &Map<String, Value>, key: SettingsKey) -> ParseResult<Option<String>> {
    match object.get(key.key()) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(format!("settings[{}] must be a string", key.key())),
    }
}

fn read_u32(object: &Map<String, Value>, key: SettingsKey) -> ParseResult<Option<u32>> {
    match object.get(key.key()) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| format!("settings[{}] must be a non-negative integer", key.key())),
    }
}

fn parse_test_suites(
    value: Option<&Value>,
    issues: &mut Vec<ConfigIssue>,
) -> ParseResult<SuiteOverrides> {
    let mut overrides = SuiteOverrides::new();
    let Some(value) = value else {
        return Ok(overrides);
    };
    let suites = value
        .as_object()
        .ok_or_else(|| "'test_suites' not an object".to_string())?;

    for (suite_name, entry) in suites {
        let prefix = format!("test_suites[{}]", suite_name);
        let Some(entry) = entry.as_object() else {
            issues.push(ConfigIssue::warning(format!(
                "{} must be an object. Ignoring",
                prefix
            )));
            continue;
        };
        parse_suite(suite_name, entry, &prefix, &mut overrides, issues)?;
    }

    Ok(overrides)
}

fn parse_suite(
    suite_name: &str,
    entry: &Map<String, Value>,
    prefix: &str,
    overrides: &mut SuiteOverrides,
    issues: &mut Vec<ConfigIssue>,
) -> ParseResult<()> {
    for (name, value) in entry {
        if name == SKIPPED_KEY {
            match value {
                Value::Bool(skipped) => {
                    overrides.set_suite(suite_name, SkipConfiguration::from_skipped(*skipped));
                }
                _ => return Err(format!("{}[{}] must be a boolean.", prefix, SKIPPED_KEY)),
            }
            continue;
        }

        let case_prefix = format!("{}[{}]", prefix, name);
        let Some(case) = value.as_object() else {
            issues.push(ConfigIssue::warning(format!(
                "{} must be an object. Ignoring",
                case_prefix
            )));
            continue;
        };
        let config = parse_case(case, &case_prefix, issues)?;
        overrides.set_case(suite_name, name, config);
    }
    Ok(())
}

fn parse_case(
    case: &Map<String, Value>,
    prefix: &str,
    issues: &mut Vec<ConfigIssue>,
) -> ParseResult<SkipConfiguration> {
    let mut config = SkipConfiguration::Default;
    for (key, value) in case {
        if key != SKIPPED_KEY {
            issues.push(ConfigIssue::warning(format!(
                "{}[{}] unsupported. Ignoring",
                prefix, key
            )));
            continue;
        }
        match value {
            Value::Bool(skipped) => config = SkipConfiguration::from_skipped(*skipped),
            _ => return Err(format!("{}[{}] must be a boolean", prefix, SKIPPED_KEY)),
        }
    }
    Ok(config)
}
