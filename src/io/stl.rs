// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and binary STL export

use crate::exchange::TriMesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Read an ASCII or binary STL file; identical corners share one vertex
pub fn read_stl(path: &Path) -> Result<TriMesh> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open STL file: {}", path.display()))?;
    let stl = stl_io::read_stl(&mut file)
        .with_context(|| format!("Failed to read STL file: {}", path.display()))?;

    let vertices = stl
        .vertices
        .iter()
        .flat_map(|v| [f64::from(v[0]), f64::from(v[1]), f64::from(v[2])])
        .collect();
    let triangles = stl
        .faces
        .iter()
        .flat_map(|face| face.vertices.map(|i| i as u32))
        .collect();

    Ok(TriMesh::new(vertices, triangles))
}

/// Write a binary STL file. Coordinates are narrowed to `f32`, so OFF is
/// the lossless choice for Boolean results.
pub fn write_stl(path: &Path, mesh: &TriMesh) -> Result<()> {
    let corner = |index: u32| -> [f32; 3] {
        let base = index as usize * 3;
        [
            mesh.vertices[base] as f32,
            mesh.vertices[base + 1] as f32,
            mesh.vertices[base + 2] as f32,
        ]
    };

    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [corner(tri[0]), corner(tri[1]), corner(tri[2])];
            StlTriangle {
                normal: Normal::new(face_normal(a, b, c)),
                vertices: [StlVertex::new(a), StlVertex::new(b), StlVertex::new(c)],
            }
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter())
        .with_context(|| format!("Failed to write STL file: {}", path.display()))
}

fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let length = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if length > 0.0 {
        [n[0] / length, n[1] / length, n[2] / length]
    } else {
        [0.0, 0.0, 0.0]
    }
}
