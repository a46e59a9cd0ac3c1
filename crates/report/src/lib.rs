//! Result reporting for perfsuite.
//!
//! This crate turns profiled cases into durable output:
//!
//! ```no_run
//! use perfsuite_report::{io, ResultLog};
//!
//! # fn main() -> perfsuite_report::Result<()> {
//! let mut log = ResultLog::open("perfsuite_results")?;
//! // ... hand `&mut log` to the driver as its result sink ...
//! let path = log.close()?;
//!
//! let records = io::read_log(&path)?;
//! io::write_summary(&records, "perfsuite_results")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`result`] - The `CaseRecord` written per case
//! - [`io`] - The result log and report files
//! - [`markdown`] - Markdown summary generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod io;
pub mod markdown;
pub mod result;

pub use error::{ReportError, Result};
pub use io::ResultLog;
pub use result::CaseRecord;
