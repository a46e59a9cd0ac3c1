use perfsuite_cli::commands::{self, RunOptions};
use perfsuite_cli::ConfigArgs;
use perfsuite_report::io;
use std::fs;
use std::path::Path;
use std::time::Duration;

fn write_config(dir: &Path, body: &str) -> ConfigArgs {
    let path = dir.join("perfsuite_config.json");
    fs::write(&path, body).unwrap();
    ConfigArgs { config: vec![path] }
}

#[test]
fn test_run_writes_log_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results");
    let config = write_config(
        dir.path(),
        r#"{
            "settings": {
                "enable_autorun_immediately": true,
                "skip_tests_by_default": true,
                "reboot_or_shutdown_delay": 60000
            },
            "test_suites": {
                "Vertex buffer allocation": {
                    "MixedVtxAlloc-inlineelements": { "skipped": false }
                }
            }
        }"#,
    );

    commands::run(RunOptions {
        config,
        output: Some(output.clone()),
        countdown: Duration::ZERO,
        no_delay: true,
        ..RunOptions::default()
    })
    .unwrap();

    let records = io::read_log(output.join(io::LOG_FILE_NAME)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].case, "MixedVtxAlloc-inlineelements");
    assert!(output.join(io::SUMMARY_FILE_NAME).is_file());
}

#[test]
fn test_run_rejects_pruned_case() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"{"settings":{"enable_autorun_immediately":true,"skip_tests_by_default":true}}"#,
    );

    let err = commands::run(RunOptions {
        config,
        output: Some(dir.path().join("results")),
        suite: Some("High vertex count".to_string()),
        case: Some("HighVtxCount-arrays".to_string()),
        no_delay: true,
        ..RunOptions::default()
    })
    .unwrap_err();

    assert!(err.to_string().contains("High vertex count"));
    assert!(!dir.path().join("results").exists());
}

#[test]
fn test_check_accepts_valid_and_rejects_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let valid = write_config(dir.path(), r#"{"settings":{"skip_tests_by_default":false}}"#);
    assert!(commands::check(&valid).is_ok());

    let invalid = write_config(dir.path(), r#"{"settings":{"disable_autorun":"yes"}}"#);
    assert!(commands::check(&invalid).is_err());
}

#[test]
fn test_list_prints_plan() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), r#"{"settings":{}}"#);
    assert!(commands::list(&config, false).is_ok());
    assert!(commands::list(&config, true).is_ok());
}

#[test]
fn test_report_renders_existing_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = perfsuite_report::ResultLog::open(dir.path()).unwrap();
    log.append(&perfsuite_report::CaseRecord::new(
        "Suite",
        "case",
        &perfsuite_core::ProfileResult::from_samples(1, 10, vec![10]).unwrap(),
    ))
    .unwrap();
    let path = log.close().unwrap();

    let out = dir.path().join("rendered");
    commands::report(&path, Some(&out)).unwrap();
    let summary = fs::read_to_string(out.join(io::SUMMARY_FILE_NAME)).unwrap();
    assert!(summary.contains("Suite::case"));

    assert!(commands::report(&dir.path().join("missing.json"), None).is_err());
}
