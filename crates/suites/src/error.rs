// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised by the built-in suites.

use thiserror::Error;

/// Errors that can occur while preparing or submitting geometry.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// The requested array entry budget does not fit a single quad.
    #[error("{target_array_entries} array entries cannot hold a single quad")]
    EmptyGeometry {
        /// Requested number of array entries.
        target_array_entries: u32,
    },

    /// A case ran before `initialize` built the shared geometry.
    #[error("Geometry for {0} has not been initialized")]
    Uninitialized(String),

    /// The draw does not fit the addressing range of its submission path.
    #[error("{mode} cannot address {vertices} vertices")]
    IndexOverflow {
        /// Submission path.
        mode: String,
        /// Vertices in the draw.
        vertices: usize,
    },
}

impl SuiteError {
    /// Convert into a core error attributed to `name`.
    pub fn into_workload(self, name: impl Into<String>) -> perfsuite_core::Error {
        perfsuite_core::Error::workload(name, self.to_string())
    }
}

/// Result type for suite operations.
pub type Result<T> = std::result::Result<T, SuiteError>;
