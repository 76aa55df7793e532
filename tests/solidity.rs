// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solidity checks on meshes built through the public buffer interface

use anyhow::Result;
use polyframe_boolean::io::parse_off;
use polyframe_boolean::{compute_union, is_solid, BooleanError, Primitive, TriMesh};

const TETRAHEDRON: &str = "\
OFF
4 4 0
0 0 0
1 0 0
0 1 0
0 0 1
3 0 2 1
3 0 1 3
3 0 3 2
3 1 2 3
";

#[test]
fn test_clean_tetrahedron() -> Result<()> {
    let mesh = parse_off(TETRAHEDRON)?;
    assert!(is_solid(&mesh)?);
    Ok(())
}

#[test]
fn test_flipped_face() -> Result<()> {
    let mut mesh = parse_off(TETRAHEDRON)?;
    mesh.triangles.swap(1, 2);
    assert!(!is_solid(&mesh)?);
    Ok(())
}

#[test]
fn test_missing_face() -> Result<()> {
    let mut mesh = parse_off(TETRAHEDRON)?;
    mesh.triangles.truncate(9);
    assert!(!is_solid(&mesh)?);
    Ok(())
}

#[test]
fn test_internal_face() -> Result<()> {
    // Square pyramid split by a two-sided wall through its apex
    let mesh = parse_off(
        "OFF
5 8 0
0 0 0
2 0 0
2 2 0
0 2 0
1 1 2
3 0 2 1
3 0 3 2
3 0 1 4
3 1 2 4
3 2 3 4
3 3 0 4
3 0 4 2
3 0 2 4
",
    )?;
    assert!(!is_solid(&mesh)?);
    Ok(())
}

#[test]
fn test_fold() -> Result<()> {
    // The apex of the second tetrahedron pokes through the first one's base
    let mesh = parse_off(
        "OFF
8 8 0
0 0 0
4 0 0
0 4 0
0 0 4
1 1 -1
3 1 -1
1 3 -1
1 1 1
3 0 2 1
3 0 1 3
3 0 3 2
3 1 2 3
3 4 6 5
3 4 5 7
3 4 7 6
3 5 6 7
",
    )?;
    assert!(!is_solid(&mesh)?);
    Ok(())
}

#[test]
fn test_welding_merges_duplicate_corners() -> Result<()> {
    // Every face carries its own copy of each corner
    let source = parse_off(TETRAHEDRON)?;
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for (face, corners) in source.triangles.chunks_exact(3).enumerate() {
        for (k, &corner) in corners.iter().enumerate() {
            let base = corner as usize * 3;
            vertices.extend_from_slice(&source.vertices[base..base + 3]);
            triangles.push((face * 3 + k) as u32);
        }
    }
    let soup = TriMesh::new(vertices, triangles);
    assert!(is_solid(&soup)?);
    Ok(())
}

#[test]
fn test_degenerate_triangle_is_not_solid() -> Result<()> {
    let flat = TriMesh::new(
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0],
        vec![0, 1, 2],
    );
    assert!(!is_solid(&flat)?);

    // Boolean operands still reject it outright
    let mut with_flat = TriMesh::from(Primitive::tetrahedron(1.0).to_mesh());
    let offset = with_flat.n_vertices() as u32;
    with_flat.vertices.extend_from_slice(&flat.vertices);
    with_flat.triangles.extend([offset, offset + 1, offset + 2]);
    let tetra = TriMesh::from(Primitive::tetrahedron(1.0).to_mesh());
    assert!(matches!(
        compute_union(&tetra, &with_flat),
        Err(BooleanError::DegenerateTriangle { .. })
    ));
    Ok(())
}
