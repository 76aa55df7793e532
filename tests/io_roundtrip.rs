// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! File round-trip tests

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::Vector3;
use polyframe_boolean::{compute_union, is_solid, read_mesh, write_mesh, Primitive, TriMesh};
use tempfile::tempdir;

#[test]
fn test_off_roundtrip_is_lossless() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("cylinder.off");
    let original = TriMesh::from(Primitive::cylinder(1.0, 0.3, 24).to_mesh());

    write_mesh(&path, &original)?;
    let loaded = read_mesh(&path)?;

    assert_eq!(loaded, original);
    Ok(())
}

#[test]
fn test_stl_roundtrip_keeps_topology() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("cube.stl");
    let original = TriMesh::from(Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh());

    write_mesh(&path, &original)?;
    let loaded = read_mesh(&path)?;

    assert_eq!(loaded.n_triangles(), 12);
    assert_eq!(loaded.n_vertices(), 8);
    assert!(is_solid(&loaded)?);
    assert_relative_eq!(loaded.to_mesh(true)?.signed_volume(), 8.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_boolean_result_survives_off() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("union.off");

    let a = TriMesh::from(Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh());
    let mut shifted = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
    shifted.translate(&Vector3::new(0.5, 0.25, 0.125));
    let union = compute_union(&a, &TriMesh::from(shifted))?;

    write_mesh(&path, &union)?;
    let loaded = read_mesh(&path)?;

    assert_eq!(loaded, union);
    assert!(is_solid(&loaded)?);
    Ok(())
}

#[test]
fn test_errors_name_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.off");
    let err = read_mesh(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.off"));

    let err = read_mesh(dir.path().join("mesh.ply")).unwrap_err();
    assert!(err.to_string().contains("Unsupported mesh format"));
}
