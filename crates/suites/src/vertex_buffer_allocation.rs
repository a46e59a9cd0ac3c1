// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Repeated allocation and submission of differently sized vertex buffers.

use crate::draw::{CommandStream, DrawMode};
use crate::geometry::{Geometry, GridLayout};
use perfsuite_core::{CaseContext, Error, Result, TestSuite};
use std::hint::black_box;

/// Suite name.
pub const SUITE_NAME: &str = "Vertex buffer allocation";

/// Prefix shared by every case name.
pub const CASE_PREFIX: &str = "MixedVtxAlloc";

/// Array entry budgets allocated, in order, by every iteration.
pub const MIXED_ARRAY_ENTRY_COUNTS: [u32; 16] = [
    0x2a12, 0x17cdc, 0xcb43, 0x91f5, 0x15225, 0x14a0f, 0x12921, 0x12327, 0x3c, 0x1bde6, 0x1b31e,
    0x1a2e3, 0x1d001, 0x1FFE0, 0x12a7a, 0x9ef7,
];

const QUAD_SIZE: f32 = 16.0;
const ITERATIONS: u32 = 10;

/// Times geometry rebuilds across a fixed table of buffer sizes.
#[derive(Debug, Clone)]
pub struct VertexBufferAllocationSuite {
    layout: GridLayout,
    sizes: Vec<u32>,
    iterations: u32,
}

impl Default for VertexBufferAllocationSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexBufferAllocationSuite {
    /// Create the suite with the standard size table.
    pub fn new() -> Self {
        Self::with_sizes(MIXED_ARRAY_ENTRY_COUNTS.to_vec(), ITERATIONS)
    }

    /// Create the suite with a custom size table and iteration count.
    pub fn with_sizes(sizes: Vec<u32>, iterations: u32) -> Self {
        Self {
            layout: GridLayout::with_quad_size(QUAD_SIZE),
            sizes,
            iterations,
        }
    }
}

impl TestSuite for VertexBufferAllocationSuite {
    fn name(&self) -> &str {
        SUITE_NAME
    }

    fn case_names(&self) -> Vec<String> {
        DrawMode::ALL
            .iter()
            .map(|mode| mode.case_name(CASE_PREFIX))
            .collect()
    }

    fn run_case(&mut self, case: &str, ctx: &mut CaseContext<'_>) -> Result<()> {
        let mode = DrawMode::from_case_name(CASE_PREFIX, case)
            .ok_or_else(|| Error::unknown_case(SUITE_NAME, case))?;
        let layout = &self.layout;
        let sizes = &self.sizes;

        let mut failure = None;
        let result = ctx.profile(self.iterations, || {
            for &entries in sizes {
                // A fresh buffer per size, released before the next one.
                let mut stream = CommandStream::new();
                let submitted = Geometry::create(layout, entries)
                    .and_then(|geometry| mode.submit(black_box(&geometry), &mut stream));
                match submitted {
                    Ok(words) => {
                        black_box(words);
                    }
                    Err(e) => {
                        failure.get_or_insert(e);
                    }
                }
            }
        })?;
        if let Some(e) = failure {
            return Err(e.into_workload(ctx.qualified_name()));
        }

        ctx.report(&result)
    }
}
