//! Subcommand implementations.

use crate::operator::ConsoleGate;
use crate::platform::HostControl;
use crate::ConfigArgs;
use anyhow::{bail, Context};
use colored::Colorize;
use perfsuite_core::resolver::CaseDecision;
use perfsuite_core::{
    resolve, resolve_and_prune, unmatched_overrides, AutorunMode, Bracket, CompletionAction,
    ConfigLoad, Error, OperatorGate, PlatformControl, RuntimeConfig, StartDecision, SuiteRegistry,
    TestDriver,
};
use perfsuite_report::{io, markdown, CaseRecord, ResultLog};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Options of the `run` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Configuration lookup.
    pub config: ConfigArgs,
    /// Output directory override.
    pub output: Option<PathBuf>,
    /// Restrict the run to one suite.
    pub suite: Option<String>,
    /// Restrict the run to one case of `suite`.
    pub case: Option<String>,
    /// Wait before an automatic start.
    pub countdown: Duration,
    /// Skip the completion delay.
    pub no_delay: bool,
}

/// Load the first candidate that parses cleanly.
///
/// Candidates that fail are logged and the next one is tried. When every
/// candidate fails the defaults are returned together with every issue seen.
pub fn load_config(candidates: &[PathBuf]) -> (Option<PathBuf>, ConfigLoad) {
    let mut rejected = Vec::new();
    for path in candidates {
        let load = RuntimeConfig::load_file(path);
        if load.ok() {
            debug!(path = %path.display(), "Loaded config");
            return (Some(path.clone()), load);
        }
        warn!(path = %path.display(), "Failed to load config");
        rejected.extend(load.issues);
    }
    (
        None,
        ConfigLoad {
            config: RuntimeConfig::default(),
            issues: rejected,
        },
    )
}

fn log_issues(load: &ConfigLoad) {
    for issue in load.warnings() {
        warn!("{}", issue);
    }
    for issue in load.errors() {
        error!("{}", issue);
    }
}

fn builtin_registry() -> anyhow::Result<SuiteRegistry> {
    let mut registry = SuiteRegistry::new();
    perfsuite_suites::register_all(&mut registry)?;
    Ok(registry)
}

/// `perfsuite run`.
pub fn run(options: RunOptions) -> anyhow::Result<()> {
    let (source, load) = load_config(&options.config.candidates());
    log_issues(&load);
    match &source {
        Some(path) => info!(path = %path.display(), "Using config"),
        None => warn!("Using default configuration"),
    }

    let mut config = load.config;
    if let Some(output) = &options.output {
        config.settings.output_directory_path = output.display().to_string();
    }

    let registry = builtin_registry()?;
    for unmatched in unmatched_overrides(&config.overrides, &registry) {
        warn!("{}", unmatched);
    }
    let mut registry = resolve_and_prune(&config, registry);

    if let Some(suite) = &options.suite {
        let registered = registry
            .get(suite)
            .ok_or_else(|| Error::UnknownSuite(suite.clone()))?;
        if let Some(case) = &options.case {
            if !registered.contains_case(case) {
                return Err(Error::unknown_case(suite, case).into());
            }
        }
    }
    if registry.is_empty() {
        warn!("No test cases are enabled");
    }

    let output_dir = PathBuf::from(&config.settings.output_directory_path);
    let mut log = ResultLog::open(&output_dir)
        .map_err(|e| Error::resource_unavailable(e.to_string()))?;

    let autorun = AutorunMode::from_settings(&config.settings);
    let mut gate = ConsoleGate::new(options.countdown);
    let outcome = {
        let mut driver = TestDriver::new(&mut registry, &mut log).with_autorun(autorun);
        match (&options.suite, &options.case) {
            (None, _) => driver.run(&mut gate),
            (Some(suite), case) => match gate.await_start(autorun)? {
                StartDecision::Decline => Err(Error::StartDeclined),
                StartDecision::Start => match case {
                    Some(case) => driver.run_case(suite, case, Bracket::WithSuiteLifecycle),
                    None => driver.run_suite(suite),
                },
            },
        }
    };

    let summary = match outcome {
        Ok(summary) => summary,
        Err(Error::StartDeclined) => {
            log.close()?;
            println!("{}", "Run cancelled by operator".yellow());
            return Ok(());
        }
        Err(e) => {
            let path = log.path().display().to_string();
            return Err(anyhow::Error::new(e)
                .context(format!("Test run aborted, {} is incomplete", path)));
        }
    };

    let log_path = log.close()?;
    let records = io::read_log(&log_path)
        .with_context(|| format!("Failed to read back {}", log_path.display()))?;
    let summary_path = io::write_summary(&records, &output_dir)?;

    print_records(&records);
    println!(
        "{} {} case(s) in {} suite(s)",
        "Completed".green().bold(),
        summary.cases_run,
        summary.suites_run
    );
    println!("Results written to {}", log_path.display());
    println!("Summary written to {}", summary_path.display());

    let mut action = CompletionAction::from_settings(&config.settings);
    if options.no_delay {
        action = action.with_delay(Duration::ZERO);
    }
    println!(
        "{} in {} seconds...",
        capitalize(&action.to_string()),
        action.delay().as_secs()
    );
    HostControl::new().execute(action)?;
    Ok(())
}

/// `perfsuite check`.
pub fn check(args: &ConfigArgs) -> anyhow::Result<()> {
    let (source, load) = load_config(&args.candidates());

    for issue in load.warnings() {
        println!("{} {}", "warning:".yellow().bold(), issue);
    }
    for issue in load.errors() {
        println!("{} {}", "error:".red().bold(), issue);
    }

    let Some(path) = source else {
        bail!("No usable configuration found");
    };

    let registry = builtin_registry()?;
    for unmatched in unmatched_overrides(&load.config.overrides, &registry) {
        println!("{} {}", "warning:".yellow().bold(), unmatched);
    }

    let settings = &load.config.settings;
    println!("{} {}", "Valid:".green().bold(), path.display());
    println!("  autorun: {:?}", AutorunMode::from_settings(settings));
    println!(
        "  skip tests by default: {}",
        settings.skip_tests_by_default
    );
    println!("  output directory: {}", settings.output_directory_path);
    println!(
        "  on completion: {} after {} ms",
        CompletionAction::from_settings(settings),
        settings.reboot_or_shutdown_delay_ms
    );
    Ok(())
}

/// `perfsuite list`.
pub fn list(args: &ConfigArgs, json: bool) -> anyhow::Result<()> {
    let (_, load) = load_config(&args.candidates());
    log_issues(&load);

    let registry = builtin_registry()?;
    let decisions = resolve(&load.config.settings, &load.config.overrides, &registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&decisions)?);
        return Ok(());
    }

    for suite in decisions.iter() {
        println!("{}", suite.suite.bold().cyan());
        for case in &suite.cases {
            let decision = match case.decision {
                CaseDecision::Run => "run ".green(),
                CaseDecision::Skip => "skip".yellow(),
            };
            println!("  {} {} ({})", decision, case.case, case.source);
        }
    }
    println!();
    println!("{} case(s) will run", decisions.run_count());
    Ok(())
}

/// `perfsuite report`.
pub fn report(log: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let records =
        io::read_log(log).with_context(|| format!("Failed to read result log {}", log.display()))?;

    match output {
        Some(dir) => {
            let path = io::write_summary(&records, dir)?;
            println!("Summary written to {}", path.display());
        }
        None => print!("{}", markdown::generate_summary(&records)),
    }
    Ok(())
}

fn print_records(records: &[CaseRecord]) {
    for record in records {
        println!("{}", record.name.bold());
        println!("  {} iterations", record.iterations);
        println!("  Total: {:.3} ms", record.total_ms());
        println!("  Avg: {:.3} ms", record.average_ms());
        println!("  Min: {:.3} ms", record.min_ms());
        println!("  Max: {:.3} ms", record.max_ms());
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_first_loadable_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        let good = dir.path().join("good.json");
        fs::write(&broken, "{ not json").unwrap();
        fs::write(&good, r#"{"settings":{"disable_autorun":true}}"#).unwrap();

        let (source, load) = load_config(&[dir.path().join("missing.json"), broken, good.clone()]);

        assert_eq!(source, Some(good));
        assert!(load.ok());
        assert!(load.config.settings.disable_autorun);
    }

    #[test]
    fn test_no_loadable_candidate_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (source, load) = load_config(&[dir.path().join("a.json"), dir.path().join("b.json")]);

        assert!(source.is_none());
        assert!(!load.ok());
        assert_eq!(load.errors().count(), 2);
        assert_eq!(load.config, RuntimeConfig::default());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("reboot"), "Reboot");
        assert_eq!(capitalize(""), "");
    }
}
