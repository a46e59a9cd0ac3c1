// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Built-in workload suites.
//!
//! Both suites time CPU-side vertex submission: generating a quad grid and
//! encoding it into a command stream through one of four [`DrawMode`]s.
//!
//! # Modules
//!
//! - [`geometry`] - Quad grid generation
//! - [`draw`] - Submission paths and the command stream
//! - [`high_vertex_count`] - One maximal draw per path
//! - [`vertex_buffer_allocation`] - Mixed-size buffer churn per path

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod draw;
pub mod error;
pub mod geometry;
pub mod high_vertex_count;
pub mod vertex_buffer_allocation;

pub use draw::{CommandStream, DrawMode};
pub use error::SuiteError;
pub use high_vertex_count::HighVertexCountSuite;
pub use vertex_buffer_allocation::VertexBufferAllocationSuite;

use perfsuite_core::{SuiteRegistry, TestSuite};

/// Every built-in suite, in registration order.
pub fn all_suites() -> Vec<Box<dyn TestSuite>> {
    vec![
        Box::new(HighVertexCountSuite::new()),
        Box::new(VertexBufferAllocationSuite::new()),
    ]
}

/// Register every built-in suite into `registry`.
pub fn register_all(registry: &mut SuiteRegistry) -> perfsuite_core::Result<()> {
    for suite in all_suites() {
        registry.register_boxed(suite)?;
    }
    Ok(())
}
