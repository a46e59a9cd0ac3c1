// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Vertex submission paths.
//!
//! Each [`DrawMode`] encodes the same quad geometry into a [`CommandStream`]
//! the way a push-buffer driver would: either by referencing an uploaded
//! vertex array or by inlining vertex data into the command words.

use crate::error::{Result, SuiteError};
use crate::geometry::Geometry;
use std::fmt;

/// Largest argument count a single method header can carry.
pub const MAX_METHOD_ARGS: usize = 0x7FF;

/// Largest number of vertices one draw-arrays word can cover.
const MAX_ARRAYS_BATCH: usize = 0x100;

const PRIMITIVE_QUADS: u32 = 8;
const PRIMITIVE_END: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
enum Method {
    BeginEnd = 0x17FC,
    DrawArrays = 0x1810,
    InlineArray = 0x1818,
    ArrayElement16 = 0x1800,
    ArrayElement32 = 0x1808,
    Position = 0x1518,
    Weight = 0x169C,
    Diffuse = 0x1A60,
    Specular = 0x1A70,
    TexCoord0 = 0x1590,
}

/// Way a draw hands vertices to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Upload a vertex array and reference it by contiguous ranges.
    Arrays,
    /// Send every attribute of every vertex as its own method.
    InlineBuffers,
    /// Send every vertex as one block of array entries.
    InlineArrays,
    /// Upload a vertex array and reference it by packed indices.
    InlineElements,
}

impl DrawMode {
    /// Every mode, in registration order.
    pub const ALL: [DrawMode; 4] = [
        DrawMode::Arrays,
        DrawMode::InlineBuffers,
        DrawMode::InlineArrays,
        DrawMode::InlineElements,
    ];

    /// Case name suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Arrays => "-arrays",
            Self::InlineBuffers => "-inlinebuffers",
            Self::InlineArrays => "-inlinearrays",
            Self::InlineElements => "-inlineelements",
        }
    }

    /// `<prefix><suffix>`.
    pub fn case_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.suffix())
    }

    /// Recover the mode from a case name built by [`case_name`](Self::case_name).
    pub fn from_case_name(prefix: &str, case: &str) -> Option<Self> {
        let suffix = case.strip_prefix(prefix)?;
        Self::ALL.into_iter().find(|mode| mode.suffix() == suffix)
    }

    /// Encode `geometry` as quads into `stream`. Returns the words appended.
    pub fn submit(&self, geometry: &Geometry, stream: &mut CommandStream) -> Result<usize> {
        let before = stream.len();
        stream.push(Method::BeginEnd, &[PRIMITIVE_QUADS]);
        match self {
            Self::Arrays => {
                stream.upload(geometry);
                for start in (0..geometry.vertices.len()).step_by(MAX_ARRAYS_BATCH) {
                    let count = MAX_ARRAYS_BATCH.min(geometry.vertices.len() - start);
                    // (count - 1) in the top byte, start vertex below.
                    let word = (((count - 1) as u32) << 24) | start as u32;
                    stream.push(Method::DrawArrays, &[word]);
                }
            }
            Self::InlineBuffers => {
                for vertex in &geometry.vertices {
                    stream.push_floats(Method::Diffuse, &vertex.diffuse);
                    stream.push_floats(Method::Specular, &vertex.specular);
                    stream.push_floats(Method::Weight, &[vertex.weight]);
                    stream.push_floats(Method::TexCoord0, &vertex.texcoord0);
                    // Position last: it triggers the vertex.
                    stream.push_floats(Method::Position, &vertex.position);
                }
            }
            Self::InlineArrays => {
                let entries: Vec<u32> = geometry
                    .vertices
                    .iter()
                    .flat_map(|v| v.array_entries())
                    .map(f32::to_bits)
                    .collect();
                stream.push_chunked(Method::InlineArray, &entries);
            }
            Self::InlineElements => {
                if geometry.vertices.len() > usize::from(u16::MAX) + 1 {
                    return Err(SuiteError::IndexOverflow {
                        mode: self.to_string(),
                        vertices: geometry.vertices.len(),
                    });
                }
                stream.upload(geometry);
                let pairs = geometry.indices.chunks_exact(2);
                let odd = pairs.remainder().first().copied();
                let packed: Vec<u32> = pairs.map(|pair| (pair[1] << 16) | (pair[0] & 0xFFFF)).collect();
                stream.push_chunked(Method::ArrayElement16, &packed);
                if let Some(last) = odd {
                    stream.push(Method::ArrayElement32, &[last]);
                }
            }
        }
        stream.push(Method::BeginEnd, &[PRIMITIVE_END]);
        Ok(stream.len() - before)
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix()[1..])
    }
}

/// Command words plus the vertex memory they reference.
#[derive(Debug, Clone, Default)]
pub struct CommandStream {
    words: Vec<u32>,
    vertex_memory: Vec<f32>,
}

impl CommandStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every command and uploaded vertex.
    pub fn clear(&mut self) {
        self.words.clear();
        self.vertex_memory.clear();
    }

    /// Number of command words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether no command has been pushed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Command words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Uploaded vertex array entries.
    pub fn vertex_memory(&self) -> &[f32] {
        &self.vertex_memory
    }

    fn upload(&mut self, geometry: &Geometry) {
        self.vertex_memory.clear();
        self.vertex_memory.reserve(geometry.array_entry_count());
        for vertex in &geometry.vertices {
            self.vertex_memory.extend_from_slice(&vertex.array_entries());
        }
    }

    fn push(&mut self, method: Method, args: &[u32]) {
        debug_assert!(args.len() <= MAX_METHOD_ARGS);
        self.words.push(((args.len() as u32) << 18) | method as u32);
        self.words.extend_from_slice(args);
    }

    fn push_floats(&mut self, method: Method, values: &[f32]) {
        self.words
            .push(((values.len() as u32) << 18) | method as u32);
        self.words.extend(values.iter().map(|v| v.to_bits()));
    }

    fn push_chunked(&mut self, method: Method, args: &[u32]) {
        for chunk in args.chunks(MAX_METHOD_ARGS) {
            self.push(method, chunk);
        }
    }
}
