// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solidity test: closed and free of self-intersections

use crate::geometry::overlap::self_overlapping_pairs;
use crate::geometry::Mesh;
use crate::predicates::{Predicates, SegmentTriangle, Verdict};
use crate::resolve::{triangle_contact, Contact};
use log::{debug, trace};

/// Whether `mesh` bounds a solid.
///
/// The mesh must be closed, and any two faces may touch only in the
/// vertices or the edge they share.
pub fn is_solid(mesh: &Mesh, predicates: &Predicates) -> bool {
    if !mesh.is_closed() {
        debug!("Mesh is not closed");
        return false;
    }

    for (i, j) in self_overlapping_pairs(mesh) {
        if !pair_is_clean(mesh, predicates, i, j) {
            debug!("Faces {i} and {j} intersect");
            return false;
        }
    }
    true
}

fn pair_is_clean(mesh: &Mesh, predicates: &Predicates, i: usize, j: usize) -> bool {
    let first = &mesh.triangles[i];
    let second = &mesh.triangles[j];
    let shared = first.shared_vertices(second);

    match shared.as_slice() {
        [] => disjoint(mesh, predicates, i, j),
        [vertex] => {
            let expected = mesh.vertices[*vertex];
            match exact_contact(mesh, i, j) {
                Contact::Point(p) => p.to_point() == expected,
                other => {
                    trace!("Faces {i} and {j} share vertex {vertex} but meet in {other:?}");
                    false
                }
            }
        }
        [u, v] => {
            let (pu, pv) = (mesh.vertices[*u], mesh.vertices[*v]);
            match exact_contact(mesh, i, j) {
                Contact::Segment(p, q) => {
                    let (p, q) = (p.to_point(), q.to_point());
                    (p == pu && q == pv) || (p == pv && q == pu)
                }
                _ => false,
            }
        }
        // Same three corners: a doubled face
        _ => false,
    }
}

/// Faces with no shared vertex must not touch at all
fn disjoint(mesh: &Mesh, predicates: &Predicates, i: usize, j: usize) -> bool {
    let tri_i = mesh.triangle_points(i);
    let tri_j = mesh.triangle_points(j);

    let mut degenerate = false;
    for (edges_of, against) in [(tri_i, tri_j), (tri_j, tri_i)] {
        for k in 0..3 {
            let query = SegmentTriangle::new([edges_of[k], edges_of[(k + 1) % 3]], against);
            match predicates.classify_segment_triangle(&query) {
                Verdict::NonEmpty => return false,
                Verdict::Degenerate => degenerate = true,
                Verdict::Empty | Verdict::Uncertain => {}
            }
        }
    }

    // A boundary touch only shows up as a degenerate query
    !degenerate || exact_contact(mesh, i, j).is_empty()
}

fn exact_contact(mesh: &Mesh, i: usize, j: usize) -> Contact {
    let a = mesh.exact_triangle(i);
    let b = mesh.exact_triangle(j);
    triangle_contact(a.each_ref(), b.each_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Primitive, Triangle};
    use nalgebra::{Point3, Vector3};

    fn check(mesh: &Mesh) -> bool {
        is_solid(mesh, &Predicates::new())
    }

    #[test]
    fn test_primitives_are_solid() {
        assert!(check(&Primitive::tetrahedron(1.0).to_mesh()));
        assert!(check(
            &Primitive::cube(Vector3::new(2.0, 3.0, 4.0), true).to_mesh()
        ));
        assert!(check(&Primitive::cylinder(2.0, 1.0, 16).to_mesh()));
    }

    #[test]
    fn test_flipped_face_is_not_solid() {
        let mut mesh = Primitive::tetrahedron(1.0).to_mesh();
        mesh.triangles[0] = mesh.triangles[0].flipped();
        assert!(!check(&mesh));
    }

    #[test]
    fn test_internal_face_is_not_solid() {
        let mut mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        // Two-sided diagonal wall through the cube
        mesh.add_triangle(Triangle::new([0, 2, 6]));
        mesh.add_triangle(Triangle::new([0, 6, 2]));
        assert!(!check(&mesh));
    }

    #[test]
    fn test_interpenetrating_shells_are_not_solid() {
        let mut mesh = Primitive::tetrahedron(1.0).to_mesh();
        let offset = mesh.vertex_count();
        mesh.vertices.extend([
            Point3::new(0.2, 0.2, 0.2),
            Point3::new(-0.5, 0.3, 0.3),
            Point3::new(0.3, -0.5, 0.3),
            Point3::new(0.3, 0.3, -0.5),
        ]);
        for [a, b, c] in [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]] {
            mesh.add_triangle(Triangle::new([a + offset, b + offset, c + offset]));
        }
        assert!(mesh.is_closed());
        assert!(!check(&mesh));
    }

    #[test]
    fn test_fold_is_not_solid() {
        // A triangle folded back onto itself: closed, zero volume
        let mut mesh = Mesh::new();
        mesh.vertices.extend([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        mesh.add_triangle(Triangle::new([0, 1, 2]));
        mesh.add_triangle(Triangle::new([0, 2, 1]));
        assert!(mesh.is_closed());
        assert!(!check(&mesh));
    }

    #[test]
    fn test_touching_separate_shells() {
        // Two cubes sharing a corner point only
        let mut mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let mut other = mesh.clone();
        other.translate(&Vector3::new(1.0, 1.0, 1.0));
        mesh.merge(&other);
        assert!(mesh.is_closed());
        assert!(!check(&mesh));
    }
}
