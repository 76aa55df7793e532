// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Resolved operands meet only on shared vertices and edges

use anyhow::Result;
use nalgebra::{Point3, Rotation3, Vector3};
use polyframe_boolean::geometry::Mesh;
use polyframe_boolean::resolve::{triangle_contact, MeshId, Resolution, Resolver};
use polyframe_boolean::{Predicates, Primitive, TriMesh};

fn unit_cube() -> Mesh {
    Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh()
}

fn moved(mesh: Mesh, rotation: Rotation3<f64>, offset: Vector3<f64>) -> Result<Mesh> {
    let mut buffers = TriMesh::from(mesh);
    for xyz in buffers.vertices.chunks_exact_mut(3) {
        let p = rotation * Point3::new(xyz[0], xyz[1], xyz[2]) + offset;
        xyz.copy_from_slice(&[p.x, p.y, p.z]);
    }
    Ok(buffers.to_mesh(true)?)
}

fn bounds(resolution: &Resolution, face: usize) -> (Point3<f64>, Point3<f64>) {
    let points = resolution.faces[face]
        .vertices
        .map(|v| resolution.arena.point(v).to_point());
    let mut lo = points[0];
    let mut hi = points[0];
    for p in &points[1..] {
        for k in 0..3 {
            lo[k] = lo[k].min(p[k]);
            hi[k] = hi[k].max(p[k]);
        }
    }
    (lo, hi)
}

fn may_touch(a: &(Point3<f64>, Point3<f64>), b: &(Point3<f64>, Point3<f64>)) -> bool {
    const MARGIN: f64 = 1e-9;
    (0..3).all(|k| a.0[k] <= b.1[k] + MARGIN && b.0[k] <= a.1[k] + MARGIN)
}

/// Every contact between a resolved A face and a resolved B face lies in
/// vertices both faces share
fn assert_crossing_free(resolution: &Resolution) -> usize {
    let a_faces: Vec<usize> = resolution.faces_of(MeshId::A).map(|(i, _)| i).collect();
    let b_faces: Vec<usize> = resolution.faces_of(MeshId::B).map(|(i, _)| i).collect();
    let b_bounds: Vec<_> = b_faces.iter().map(|&f| bounds(resolution, f)).collect();

    let mut checked = 0;
    for &fa in &a_faces {
        let a_bounds = bounds(resolution, fa);
        let a_vertices = resolution.faces[fa].vertices;
        for (&fb, b_box) in b_faces.iter().zip(&b_bounds) {
            if !may_touch(&a_bounds, b_box) {
                continue;
            }
            checked += 1;

            let b_vertices = resolution.faces[fb].vertices;
            let contact = triangle_contact(
                a_vertices.map(|v| resolution.arena.point(v)),
                b_vertices.map(|v| resolution.arena.point(v)),
            );
            let shared: Vec<_> = a_vertices
                .iter()
                .filter(|v| b_vertices.contains(v))
                .map(|&v| resolution.arena.point(v))
                .collect();
            for point in contact.points() {
                assert!(
                    shared.contains(&point),
                    "faces {} and {} cross: {:?}",
                    fa,
                    fb,
                    contact
                );
            }
        }
    }
    checked
}

fn resolve(a: &Mesh, b: &Mesh) -> Result<Resolution> {
    let predicates = Predicates::new();
    Ok(Resolver::new(&predicates).resolve(a, b)?)
}

#[test]
fn test_offset_cubes_are_crossing_free() -> Result<()> {
    let a = unit_cube();
    let b = moved(unit_cube(), Rotation3::identity(), Vector3::new(0.5, 0.25, 0.125))?;
    let resolution = resolve(&a, &b)?;

    let checked = assert_crossing_free(&resolution);
    println!("Checked {} resolved face pairs", checked);
    assert!(checked > 0);
    assert!(resolution.curves.iter().all(|curve| curve.closed));
    Ok(())
}

#[test]
fn test_rotated_cubes_are_crossing_free() -> Result<()> {
    let a = unit_cube();
    for (roll, pitch, yaw) in [(0.3, 0.2, 0.1), (0.1, 0.7, 0.4)] {
        let rotation = Rotation3::from_euler_angles(roll, pitch, yaw);
        let b = moved(unit_cube(), rotation, Vector3::new(0.3, 0.2, 0.1))?;
        let resolution = resolve(&a, &b)?;

        assert!(assert_crossing_free(&resolution) > 0);
        assert!(!resolution.curves.is_empty());
        assert!(resolution.curves.iter().all(|curve| curve.closed));
    }
    Ok(())
}

#[test]
fn test_cylinder_through_cube_is_crossing_free() -> Result<()> {
    let a = unit_cube();
    let b = moved(
        Primitive::cylinder(2.0, 0.3, 10).to_mesh(),
        Rotation3::from_euler_angles(0.05, 0.0, 0.0),
        Vector3::new(0.45, 0.55, -0.5),
    )?;
    let resolution = resolve(&a, &b)?;

    assert!(assert_crossing_free(&resolution) > 0);
    // The cylinder passes all the way through: one loop on each side
    assert_eq!(resolution.curves.len(), 2);
    Ok(())
}
