//! Result log and report files.
//!
//! The log is a single JSON array written incrementally: `[` when opened, one
//! object per completed case, `]` when closed. Every record is flushed as soon
//! as it is written, so an aborted run leaves a valid prefix on disk, but the
//! array is only terminated by an explicit [`ResultLog::close`].

use crate::error::{ReportError, Result};
use crate::markdown;
use crate::result::CaseRecord;
use perfsuite_core::{ProfileResult, ResultSink};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result log file name inside the output directory.
pub const LOG_FILE_NAME: &str = "results.json";

/// Markdown summary file name inside the output directory.
pub const SUMMARY_FILE_NAME: &str = "summary.md";

/// Create `path` and any missing parents.
pub fn ensure_directory_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|e| ReportError::io(path, e))
}

/// Append-only structured log of case results for one run.
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    records: usize,
}

impl ResultLog {
    /// Open the log in `output_dir`, replacing any previous run's log.
    pub fn open(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref();
        ensure_directory_exists(output_dir)?;
        Self::create(output_dir.join(LOG_FILE_NAME))
    }

    /// Open a log at an explicit file path, truncating it.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            fs::remove_file(&path).map_err(|e| ReportError::io(&path, e))?;
        }
        let file = File::create(&path).map_err(|e| ReportError::io(&path, e))?;

        let mut log = Self {
            path,
            writer: Some(BufWriter::new(file)),
            records: 0,
        };
        log.write_raw("[\n")?;
        info!(path = %log.path.display(), "Opened result log");
        Ok(log)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written.
    pub fn len(&self) -> usize {
        self.records
    }

    /// Whether no record has been written.
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Append one record and flush it to disk.
    pub fn append(&mut self, record: &CaseRecord) -> Result<()> {
        let encoded = serde_json::to_string(record)?;
        let separator = if self.records == 0 { "" } else { ",\n" };
        self.write_raw(&format!("{}  {}", separator, encoded))?;
        self.records += 1;
        debug!(name = %record.name, records = self.records, "Appended result");
        Ok(())
    }

    /// Terminate the array and close the file. Returns the log path.
    pub fn close(&mut self) -> Result<PathBuf> {
        let tail = if self.records == 0 { "]\n" } else { "\n]\n" };
        self.write_raw(tail)?;
        self.writer = None;
        info!(path = %self.path.display(), records = self.records, "Closed result log");
        Ok(self.path.clone())
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ReportError::AlreadyClosed(self.path.clone()))?;
        writer
            .write_all(text.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| ReportError::io(&self.path, e))
    }
}

impl ResultSink for ResultLog {
    fn record(
        &mut self,
        suite: &str,
        case: &str,
        result: &ProfileResult,
    ) -> perfsuite_core::Result<()> {
        ResultLog::append(self, &CaseRecord::new(suite, case, result))
            .map_err(|e| perfsuite_core::Error::ResultSink(e.to_string()))
    }
}

/// Read every record from a closed log.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<CaseRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the markdown summary of `records` into `output_dir`.
pub fn write_summary(records: &[CaseRecord], output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    ensure_directory_exists(output_dir)?;
    let path = output_dir.join(SUMMARY_FILE_NAME);
    fs::write(&path, markdown::generate_summary(records)).map_err(|e| ReportError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(suite: &str, case: &str, total: u32) -> CaseRecord {
        let result = ProfileResult::from_samples(2, total, vec![total / 2; 2]).unwrap();
        CaseRecord::new(suite, case, &result)
    }

    #[test]
    fn test_empty_log_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ResultLog::open(dir.path()).unwrap();
        let path = log.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[\n]\n");
        assert!(read_log(&path).unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let log = ResultLog::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(log.path(), nested.join(LOG_FILE_NAME));
    }

    #[test]
    fn test_records_round_trip_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ResultLog::open(dir.path()).unwrap();
        log.append(&record("A", "first", 100)).unwrap();
        log.append(&record("B", "second", 200)).unwrap();
        assert_eq!(log.len(), 2);
        let path = log.close().unwrap();

        let records = read_log(&path).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A::first", "B::second"]);
        assert_eq!(records[1].total_us, 200);
    }

    #[test]
    fn test_open_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = ResultLog::open(dir.path()).unwrap();
        first.append(&record("Old", "run", 1)).unwrap();
        first.close().unwrap();

        let mut second = ResultLog::open(dir.path()).unwrap();
        let path = second.close().unwrap();
        assert!(read_log(path).unwrap().is_empty());
    }

    #[test]
    fn test_unclosed_log_is_flushed_but_unterminated() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ResultLog::open(dir.path()).unwrap();
        log.append(&record("A", "only", 10)).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("[\n  {"));
        assert!(!content.trim_end().ends_with(']'));
        assert!(read_log(log.path()).is_err());
    }

    #[test]
    fn test_closed_log_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ResultLog::open(dir.path()).unwrap();
        log.close().unwrap();

        assert!(log.is_closed());
        let err = log.append(&record("A", "late", 1)).unwrap_err();
        assert!(matches!(err, ReportError::AlreadyClosed(_)));
        assert!(matches!(log.close(), Err(ReportError::AlreadyClosed(_))));
    }

    #[test]
    fn test_log_as_result_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ResultLog::open(dir.path()).unwrap();
        {
            let sink: &mut dyn ResultSink = &mut log;
            let result = ProfileResult::from_samples(1, 5, vec![5]).unwrap();
            sink.record("Suite", "case", &result).unwrap();
        }
        let path = log.close().unwrap();
        assert_eq!(read_log(path).unwrap()[0].name, "Suite::case");
    }

    #[test]
    fn test_open_fails_when_directory_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = ResultLog::open(&blocker).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn test_write_summary_creates_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_summary(&[record("A", "x", 1500)], dir.path()).unwrap();
        let summary = fs::read_to_string(path).unwrap();
        assert!(summary.contains("| A::x |"));
    }
}
