// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Submission of a single very large draw through each path.
//!
//! The suite builds one grid of small quads filling [`MAX_VERTEX_COUNT`]
//! array entries when it is initialized, then times how long each
//! [`DrawMode`] takes to encode it.

use crate::draw::{CommandStream, DrawMode};
use crate::error::SuiteError;
use crate::geometry::{Geometry, GridLayout, MAX_VERTEX_COUNT};
use perfsuite_core::{CaseContext, Error, Result, TestSuite};
use std::hint::black_box;
use tracing::debug;

/// Suite name.
pub const SUITE_NAME: &str = "High vertex count";

/// Prefix shared by every case name.
pub const CASE_PREFIX: &str = "HighVtxCount";

const QUAD_SIZE: f32 = 6.0;

/// Times one maximal draw per submission path.
#[derive(Debug)]
pub struct HighVertexCountSuite {
    layout: GridLayout,
    target_array_entries: u32,
    geometry: Option<Geometry>,
    stream: CommandStream,
}

impl Default for HighVertexCountSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl HighVertexCountSuite {
    /// Create the suite with its full-size workload.
    pub fn new() -> Self {
        Self::with_array_entries(MAX_VERTEX_COUNT)
    }

    /// Create the suite with a custom array entry budget.
    pub fn with_array_entries(target_array_entries: u32) -> Self {
        Self {
            layout: GridLayout::with_quad_size(QUAD_SIZE),
            target_array_entries,
            geometry: None,
            stream: CommandStream::new(),
        }
    }

    /// Iterations profiled for `mode`.
    pub fn iterations(mode: DrawMode) -> u32 {
        match mode {
            DrawMode::Arrays => 100,
            DrawMode::InlineBuffers => 5,
            DrawMode::InlineArrays => 10,
            DrawMode::InlineElements => 50,
        }
    }

    /// Shared geometry, once initialized.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }
}

impl TestSuite for HighVertexCountSuite {
    fn name(&self) -> &str {
        SUITE_NAME
    }

    fn case_names(&self) -> Vec<String> {
        DrawMode::ALL
            .iter()
            .map(|mode| mode.case_name(CASE_PREFIX))
            .collect()
    }

    fn initialize(&mut self) -> Result<()> {
        let geometry = Geometry::create(&self.layout, self.target_array_entries)
            .map_err(|e| e.into_workload(SUITE_NAME))?;
        debug!(
            quads = geometry.quad_count(),
            vertices = geometry.vertices.len(),
            "Created geometry"
        );
        self.geometry = Some(geometry);
        Ok(())
    }

    fn deinitialize(&mut self) -> Result<()> {
        self.geometry = None;
        self.stream = CommandStream::new();
        Ok(())
    }

    fn setup_case(&mut self) -> Result<()> {
        self.stream.clear();
        Ok(())
    }

    fn run_case(&mut self, case: &str, ctx: &mut CaseContext<'_>) -> Result<()> {
        let mode = DrawMode::from_case_name(CASE_PREFIX, case)
            .ok_or_else(|| Error::unknown_case(SUITE_NAME, case))?;
        let geometry = self
            .geometry
            .as_ref()
            .ok_or_else(|| SuiteError::Uninitialized(SUITE_NAME.to_string()).into_workload(case))?;
        let stream = &mut self.stream;

        let mut failure = None;
        let result = ctx.profile(Self::iterations(mode), || {
            stream.clear();
            if let Err(e) = mode.submit(black_box(geometry), stream) {
                failure.get_or_insert(e);
            }
            black_box(stream.words());
        })?;
        if let Some(e) = failure {
            return Err(e.into_workload(ctx.qualified_name()));
        }

        ctx.report(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfsuite_core::{Bracket, RecordedResult, SuiteRegistry, TestDriver};

    #[test]
    fn test_case_names_follow_draw_modes() {
        let suite = HighVertexCountSuite::new();
        assert_eq!(
            suite.case_names(),
            vec![
                "HighVtxCount-arrays",
                "HighVtxCount-inlinebuffers",
                "HighVtxCount-inlinearrays",
                "HighVtxCount-inlineelements",
            ]
        );
    }

    #[test]
    fn test_iteration_counts() {
        let counts: Vec<_> = DrawMode::ALL
            .iter()
            .map(|m| HighVertexCountSuite::iterations(*m))
            .collect();
        assert_eq!(counts, vec![100, 5, 10, 50]);
    }

    #[test]
    fn test_geometry_lives_between_initialize_and_deinitialize() {
        let mut suite = HighVertexCountSuite::with_array_entries(60 * 8);
        assert!(suite.geometry().is_none());
        suite.initialize().unwrap();
        assert_eq!(suite.geometry().unwrap().quad_count(), 8);
        suite.deinitialize().unwrap();
        assert!(suite.geometry().is_none());
    }

    #[test]
    fn test_each_case_reports_its_iterations() {
        let mut registry = SuiteRegistry::new();
        registry
            .register(HighVertexCountSuite::with_array_entries(60 * 16))
            .unwrap();
        let mut sink: Vec<RecordedResult> = Vec::new();

        let summary = TestDriver::new(&mut registry, &mut sink).run_all().unwrap();

        assert_eq!(summary.cases_run, 4);
        let iterations: Vec<_> = sink.iter().map(|r| r.result.iterations).collect();
        assert_eq!(iterations, vec![100, 5, 10, 50]);
        assert!(sink.iter().all(|r| r.suite == SUITE_NAME));
    }

    #[test]
    fn test_case_without_initialize_fails() {
        let mut registry = SuiteRegistry::new();
        registry
            .register(HighVertexCountSuite::with_array_entries(60))
            .unwrap();
        let mut sink: Vec<RecordedResult> = Vec::new();

        let err = TestDriver::new(&mut registry, &mut sink)
            .run_case(SUITE_NAME, "HighVtxCount-arrays", Bracket::CaseOnly)
            .unwrap_err();
        assert!(matches!(err, Error::Workload { .. }));
        assert!(sink.is_empty());
    }
}
