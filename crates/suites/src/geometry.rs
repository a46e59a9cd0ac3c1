// Copyright 2025 Perfsuite Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quad grid generation.
//!
//! Geometry is a grid of screen-space quads laid out row by row across a
//! virtual framebuffer. Every vertex carries position (with `w`), weight,
//! diffuse, specular and one texture coordinate: 15 array entries in total.
//! When the grid reaches the bottom of the framebuffer it wraps back to the
//! top row and later quads are drawn more transparent.

use crate::error::{Result, SuiteError};

/// Array entries per vertex: 4 position, 1 weight, 4 diffuse, 4 specular, 2 texcoord.
pub const ARRAY_ENTRIES_PER_VERTEX: u32 = 15;

/// Vertices per quad primitive.
pub const VERTICES_PER_QUAD: u32 = 4;

/// Array entry budget of the high vertex count workload.
pub const MAX_VERTEX_COUNT: u32 = 0x07_FFFF;

const COLOR_STEP: [f32; 3] = [0.03, 0.05, 0.01];
const INITIAL_COLOR: [f32; 3] = [0.0, 0.5, 0.75];
const WRAPPED_COLOR: [f32; 3] = [1.0, 0.0, 1.0];
const ALPHA_FALLOFF: f32 = 0.75;

/// One vertex with every attribute the workloads submit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// `x, y, z, w`.
    pub position: [f32; 4],
    /// Blend weight.
    pub weight: f32,
    /// Diffuse RGBA.
    pub diffuse: [f32; 4],
    /// Specular RGBA.
    pub specular: [f32; 4],
    /// Texture coordinate 0.
    pub texcoord0: [f32; 2],
}

impl Vertex {
    /// The vertex as its 15 array entries, in attribute order.
    pub fn array_entries(&self) -> [f32; ARRAY_ENTRIES_PER_VERTEX as usize] {
        let [x, y, z, w] = self.position;
        let [dr, dg, db, da] = self.diffuse;
        let [sr, sg, sb, sa] = self.specular;
        let [u, v] = self.texcoord0;
        [
            x, y, z, w, self.weight, dr, dg, db, da, sr, sg, sb, sa, u, v,
        ]
    }
}

/// Placement of the quad grid on the virtual framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Framebuffer width in pixels.
    pub framebuffer_width: f32,
    /// Framebuffer height in pixels.
    pub framebuffer_height: f32,
    /// Left and right margin.
    pub inset: f32,
    /// Y coordinate of the first row.
    pub top: f32,
    /// Edge length of each quad.
    pub quad_size: f32,
}

impl GridLayout {
    /// A 640x480 framebuffer with quads of `quad_size` pixels.
    pub fn with_quad_size(quad_size: f32) -> Self {
        Self {
            framebuffer_width: 640.0,
            framebuffer_height: 480.0,
            inset: 2.0,
            top: 48.0,
            quad_size,
        }
    }

    /// Number of whole quads per row.
    pub fn quads_per_row(&self) -> usize {
        let usable = self.framebuffer_width - self.inset * 2.0;
        (usable / self.quad_size).max(1.0) as usize
    }

    fn bottom_row_y(&self) -> f32 {
        self.framebuffer_height - self.quad_size
    }
}

/// Generated vertices plus one index per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Vertices, four per quad.
    pub vertices: Vec<Vertex>,
    /// Sequential indices into `vertices`.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Number of quads that fit `target_array_entries`.
    pub fn quads_for(target_array_entries: u32) -> u32 {
        target_array_entries / (VERTICES_PER_QUAD * ARRAY_ENTRIES_PER_VERTEX)
    }

    /// Build as many quads as fit in `target_array_entries`.
    ///
    /// # Errors
    ///
    /// [`SuiteError::EmptyGeometry`] when not even one quad fits.
    pub fn create(layout: &GridLayout, target_array_entries: u32) -> Result<Self> {
        let target_quads = Self::quads_for(target_array_entries);
        if target_quads == 0 {
            return Err(SuiteError::EmptyGeometry {
                target_array_entries,
            });
        }

        let vertex_count = (target_quads * VERTICES_PER_QUAD) as usize;
        let mut builder = GridBuilder {
            layout,
            color: INITIAL_COLOR,
            vertices: Vec::with_capacity(vertex_count),
        };

        let quads_per_row = layout.quads_per_row();
        let mut quad_count = 0;
        let mut top = layout.top;
        let mut alpha = 1.0;
        while quad_count < target_quads {
            let mut left = layout.inset;
            for _ in 0..quads_per_row {
                if quad_count == target_quads {
                    break;
                }
                builder.add_quad(left, top, alpha);
                quad_count += 1;
                left += layout.quad_size;
            }

            top += layout.quad_size;
            if top > layout.bottom_row_y() {
                top = layout.top;
                builder.color = WRAPPED_COLOR;
                alpha *= ALPHA_FALLOFF;
            }
        }

        let indices = (0..vertex_count as u32).collect();
        Ok(Self {
            vertices: builder.vertices,
            indices,
        })
    }

    /// Number of quads.
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD as usize
    }

    /// Total array entries across every vertex.
    pub fn array_entry_count(&self) -> usize {
        self.vertices.len() * ARRAY_ENTRIES_PER_VERTEX as usize
    }
}

struct GridBuilder<'a> {
    layout: &'a GridLayout,
    color: [f32; 3],
    vertices: Vec<Vertex>,
}

impl GridBuilder<'_> {
    fn add_quad(&mut self, left: f32, top: f32, alpha: f32) {
        let size = self.layout.quad_size;
        let corners = [
            (left, top, 0.0, [0.0, 0.0]),
            (left + size, top, 1.0, [1.0, 0.0]),
            (left + size, top + size, 2.0, [1.0, 1.0]),
            (left, top + size, 3.0, [0.0, 1.0]),
        ];
        for (x, y, weight, texcoord0) in corners {
            let diffuse = self.next_color(alpha);
            let specular = self.next_color(alpha);
            self.vertices.push(Vertex {
                position: [x, y, 0.0, 1.0],
                weight,
                diffuse,
                specular,
                texcoord0,
            });
        }
    }

    /// Current color with `alpha`, then step the color, wrapping each channel at 1.
    fn next_color(&mut self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.color;
        for (channel, step) in self.color.iter_mut().zip(COLOR_STEP) {
            *channel += step;
            if *channel > 1.0 {
                *channel -= 1.0;
            }
        }
        [r, g, b, alpha]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_vertex_count_budget() {
        let layout = GridLayout::with_quad_size(6.0);
        let geometry = Geometry::create(&layout, MAX_VERTEX_COUNT).unwrap();

        assert_eq!(geometry.quad_count(), (MAX_VERTEX_COUNT / 60) as usize);
        assert_eq!(geometry.vertices.len(), geometry.indices.len());
        assert!(geometry.array_entry_count() <= MAX_VERTEX_COUNT as usize);
        assert_eq!(geometry.indices[..4], [0, 1, 2, 3]);
    }

    #[test]
    fn test_single_quad_layout() {
        let layout = GridLayout::with_quad_size(16.0);
        let geometry = Geometry::create(&layout, 0x3c).unwrap();

        assert_eq!(geometry.quad_count(), 1);
        let corners: Vec<_> = geometry.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            corners,
            vec![
                [2.0, 48.0, 0.0, 1.0],
                [18.0, 48.0, 0.0, 1.0],
                [18.0, 64.0, 0.0, 1.0],
                [2.0, 64.0, 0.0, 1.0],
            ]
        );
        let weights: Vec<_> = geometry.vertices.iter().map(|v| v.weight).collect();
        assert_eq!(weights, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(geometry.vertices[0].diffuse, [0.0, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_too_small_budget_is_rejected() {
        let layout = GridLayout::with_quad_size(16.0);
        let err = Geometry::create(&layout, 59).unwrap_err();
        assert!(matches!(
            err,
            SuiteError::EmptyGeometry {
                target_array_entries: 59
            }
        ));
    }

    #[test]
    fn test_rows_wrap_and_fade() {
        let layout = GridLayout::with_quad_size(16.0);
        let per_row = layout.quads_per_row();
        assert_eq!(per_row, 39);

        // 27 rows fit between y=48 and y=464 before wrapping.
        let quads = (per_row * 28) as u32;
        let geometry = Geometry::create(&layout, quads * 60).unwrap();

        let first_of_wrapped_row = &geometry.vertices[per_row * 27 * 4];
        assert_eq!(first_of_wrapped_row.position[1], 48.0);
        assert_eq!(first_of_wrapped_row.diffuse[3], 0.75);
    }

    #[test]
    fn test_colors_stay_in_unit_range() {
        let layout = GridLayout::with_quad_size(6.0);
        let geometry = Geometry::create(&layout, 60 * 500).unwrap();
        assert!(geometry
            .vertices
            .iter()
            .flat_map(|v| v.diffuse.iter().chain(v.specular.iter()))
            .all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_array_entries_order() {
        let vertex = Vertex {
            position: [1.0, 2.0, 3.0, 4.0],
            weight: 5.0,
            diffuse: [6.0, 7.0, 8.0, 9.0],
            specular: [10.0, 11.0, 12.0, 13.0],
            texcoord0: [14.0, 15.0],
        };
        let entries = vertex.array_entries();
        assert_eq!(entries.len(), ARRAY_ENTRIES_PER_VERTEX as usize);
        assert_eq!(entries[4], 5.0);
        assert_eq!(entries[14], 15.0);
    }
}
