// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object File Format (OFF)

use crate::exchange::TriMesh;
use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Read an OFF file
pub fn read_off(path: &Path) -> Result<TriMesh> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read OFF file: {}", path.display()))?;
    parse_off(&source).with_context(|| format!("Failed to parse OFF file: {}", path.display()))
}

/// Write `mesh` as an OFF file with full-precision coordinates
pub fn write_off(path: &Path, mesh: &TriMesh) -> Result<()> {
    fs::write(path, format_off(mesh))
        .with_context(|| format!("Failed to write OFF file: {}", path.display()))
}

/// Parse OFF source. Polygons with more than three corners are split into
/// a fan around their first corner.
pub fn parse_off(source: &str) -> Result<TriMesh> {
    let mut tokens = source
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace);

    let header = tokens.next().context("Empty OFF file")?;
    if header != "OFF" {
        bail!("Missing OFF header, found '{}'", header);
    }

    let n_vertices: usize = next_token(&mut tokens, "vertex count")?
        .parse()
        .context("Invalid vertex count")?;
    let n_faces: usize = next_token(&mut tokens, "face count")?
        .parse()
        .context("Invalid face count")?;
    let _n_edges: usize = next_token(&mut tokens, "edge count")?
        .parse()
        .context("Invalid edge count")?;

    // Header counts are untrusted; every value needs at least one byte
    let mut vertices = Vec::with_capacity(n_vertices.saturating_mul(3).min(source.len()));
    for vertex in 0..n_vertices {
        for _ in 0..3 {
            let value: f64 = next_token(&mut tokens, "vertex coordinates")?
                .parse()
                .with_context(|| format!("Invalid coordinate for vertex {}", vertex))?;
            vertices.push(value);
        }
    }

    let mut triangles = Vec::with_capacity(n_faces.saturating_mul(3).min(source.len()));
    for face in 0..n_faces {
        let corners: usize = next_token(&mut tokens, "face size")?
            .parse()
            .with_context(|| format!("Invalid corner count for face {}", face))?;
        if corners < 3 {
            bail!("Face {} has only {} corners", face, corners);
        }

        let mut polygon = Vec::with_capacity(corners.min(source.len()));
        for _ in 0..corners {
            let index: u32 = next_token(&mut tokens, "face indices")?
                .parse()
                .with_context(|| format!("Invalid vertex index in face {}", face))?;
            polygon.push(index);
        }
        for k in 1..corners - 1 {
            triangles.extend([polygon[0], polygon[k], polygon[k + 1]]);
        }
    }

    Ok(TriMesh::new(vertices, triangles))
}

fn next_token<'a>(tokens: &mut impl Iterator<Item = &'a str>, what: &str) -> Result<&'a str> {
    tokens
        .next()
        .with_context(|| format!("Unexpected end of file while reading {}", what))
}

/// Render `mesh` as OFF text
pub fn format_off(mesh: &TriMesh) -> String {
    let mut out = String::with_capacity(32 * (mesh.n_vertices() + mesh.n_triangles()));
    out.push_str("OFF\n");
    let _ = writeln!(out, "{} {} 0", mesh.n_vertices(), mesh.n_triangles());
    for xyz in mesh.vertices.chunks_exact(3) {
        let _ = writeln!(out, "{} {} {}", xyz[0], xyz[1], xyz[2]);
    }
    for tri in mesh.triangles.chunks_exact(3) {
        let _ = writeln!(out, "3 {} {} {}", tri[0], tri[1], tri[2]);
    }
    out
}
