// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat-buffer mesh exchanged with callers
//!
//! `TriMesh` is the public surface of the kernel: three coordinates per
//! vertex and three indices per triangle. Everything crossing into the
//! kernel is validated here, so the rest of the crate can rely on finite
//! coordinates and in-range, non-degenerate triangles.

use crate::error::{BooleanError, BooleanResult};
use crate::geometry::{Mesh, Triangle};
use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Triangle mesh as two flat buffers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriMesh {
    /// `x, y, z` per vertex
    pub vertices: Vec<f64>,
    /// Three vertex indices per triangle, counter-clockwise from outside
    pub triangles: Vec<u32>,
}

impl TriMesh {
    pub fn new(vertices: Vec<f64>, triangles: Vec<u32>) -> Self {
        Self { vertices, triangles }
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn n_triangles(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Validate the buffers and build an indexed mesh.
    ///
    /// With `weld`, bit-identical vertices are merged before the zero-area
    /// check, so a triangle that collapses after welding is rejected too.
    pub fn to_mesh(&self, weld: bool) -> BooleanResult<Mesh> {
        if self.vertices.len() % 3 != 0 {
            return Err(BooleanError::MalformedBuffer {
                buffer: "vertex",
                len: self.vertices.len(),
            });
        }
        if self.triangles.len() % 3 != 0 {
            return Err(BooleanError::MalformedBuffer {
                buffer: "triangle",
                len: self.triangles.len(),
            });
        }

        let mut mesh = Mesh::with_capacity(self.n_vertices(), self.n_triangles());
        for (vertex, xyz) in self.vertices.chunks_exact(3).enumerate() {
            if !xyz.iter().all(|c| c.is_finite()) {
                return Err(BooleanError::NonFiniteCoordinate { vertex });
            }
            mesh.add_vertex(Point3::new(xyz[0], xyz[1], xyz[2]));
        }

        let vertex_count = mesh.vertex_count();
        for (triangle, corners) in self.triangles.chunks_exact(3).enumerate() {
            let mut indices = [0usize; 3];
            for (slot, &index) in indices.iter_mut().zip(corners) {
                let index = index as usize;
                if index >= vertex_count {
                    return Err(BooleanError::IndexOutOfRange {
                        triangle,
                        index,
                        vertex_count,
                    });
                }
                *slot = index;
            }
            let face = Triangle::new(indices);
            if face.has_repeated_index() {
                return Err(BooleanError::DegenerateTriangle { triangle });
            }
            mesh.add_triangle(face);
        }

        if weld {
            let merged = mesh.weld_vertices();
            if merged > 0 {
                debug!("Welded {merged} duplicate vertices");
            }
        }

        if let Some(triangle) = mesh.find_degenerate_triangle() {
            return Err(BooleanError::DegenerateTriangle { triangle });
        }
        Ok(mesh)
    }
}

impl From<&Mesh> for TriMesh {
    fn from(mesh: &Mesh) -> Self {
        Self {
            vertices: mesh
                .vertices
                .iter()
                .flat_map(|p| [p.x, p.y, p.z])
                .collect(),
            triangles: mesh
                .triangles
                .iter()
                .flat_map(|t| t.indices.map(|i| i as u32))
                .collect(),
        }
    }
}

impl From<Mesh> for TriMesh {
    fn from(mesh: Mesh) -> Self {
        Self::from(&mesh)
    }
}
