// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::exact::{is_zero_vector, triangle_normal, ExactPoint};
use super::BoundingBox;
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Triangle defined by three vertex indices, counter-clockwise seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// Same triangle with the opposite orientation
    pub fn flipped(&self) -> Self {
        Self::new([self.indices[0], self.indices[2], self.indices[1]])
    }

    /// Directed edges in traversal order
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }

    /// Vertex indices this triangle has in common with `other`
    pub fn shared_vertices(&self, other: &Triangle) -> Vec<usize> {
        self.indices
            .iter()
            .copied()
            .filter(|idx| other.indices.contains(idx))
            .collect()
    }

    /// True when a corner index repeats
    pub fn has_repeated_index(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || c == a
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Corner positions of triangle `index`
    pub fn triangle_points(&self, index: usize) -> [Point3<f64>; 3] {
        self.triangles[index].indices.map(|v| self.vertices[v])
    }

    pub fn triangle_bbox(&self, index: usize) -> BoundingBox {
        BoundingBox::from_points(&self.triangle_points(index))
    }

    /// Corner positions of triangle `index` as exact points
    pub fn exact_triangle(&self, index: usize) -> [ExactPoint; 3] {
        self.triangles[index]
            .indices
            .map(|v| ExactPoint::from_point(&self.vertices[v]))
    }

    /// Append another mesh without any intersection handling
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| Triangle::new(t.indices.map(|i| i + offset))),
        );
    }

    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for vertex in &mut self.vertices {
            *vertex += *offset;
        }
    }

    /// Reverse the orientation of every triangle
    pub fn flip_orientation(&mut self) {
        for triangle in &mut self.triangles {
            *triangle = triangle.flipped();
        }
    }

    /// Merge vertices with bit-identical positions (treating -0.0 as 0.0).
    /// Returns the number of vertices removed.
    pub fn weld_vertices(&mut self) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        let mut first_seen: AHashMap<[u64; 3], usize> = AHashMap::with_capacity(original_count);
        let mut new_vertices = Vec::with_capacity(original_count);
        let mut remap = Vec::with_capacity(original_count);

        for vertex in &self.vertices {
            let index = *first_seen.entry(position_key(vertex)).or_insert_with(|| {
                new_vertices.push(*vertex);
                new_vertices.len() - 1
            });
            remap.push(index);
        }

        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| remap[i]);
        }

        self.vertices = new_vertices;
        original_count - self.vertices.len()
    }

    /// Remove vertices not referenced by any triangle.
    /// Returns the number of vertices removed.
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &idx in &triangle.indices {
                used[idx] = true;
            }
        }

        let mut remap = vec![usize::MAX; self.vertices.len()];
        let mut new_vertices = Vec::new();
        for (old_idx, &is_used) in used.iter().enumerate() {
            if is_used {
                remap[old_idx] = new_vertices.len();
                new_vertices.push(self.vertices[old_idx]);
            }
        }

        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| remap[i]);
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }

    /// First triangle with a repeated corner or exactly zero area
    pub fn find_degenerate_triangle(&self) -> Option<usize> {
        (0..self.triangles.len()).find(|&idx| {
            if self.triangles[idx].has_repeated_index() {
                return true;
            }
            let [a, b, c] = self.exact_triangle(idx);
            is_zero_vector(&triangle_normal(&a, &b, &c))
        })
    }

    /// Closed 2-manifold check: every edge is traversed exactly once in each
    /// direction, so every undirected edge borders exactly two consistently
    /// oriented faces.
    pub fn is_closed(&self) -> bool {
        let directed = self.directed_edge_counts();
        directed
            .iter()
            .all(|(&(a, b), &count)| a != b && count == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Weaker closure used for Boolean outputs: each directed edge is matched
    /// by as many reverse traversals, which allows edges where two solids touch.
    pub fn has_balanced_edges(&self) -> bool {
        let directed = self.directed_edge_counts();
        directed
            .iter()
            .all(|(&(a, b), &count)| a != b && directed.get(&(b, a)) == Some(&count))
    }

    fn directed_edge_counts(&self) -> AHashMap<(usize, usize), usize> {
        let mut counts = AHashMap::with_capacity(self.triangles.len() * 3);
        for triangle in &self.triangles {
            for edge in triangle.edges() {
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Signed enclosed volume; positive for outward-facing closed meshes
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [v0, v1, v2] = t.indices.map(|i| self.vertices[i].coords);
                v0.dot(&v1.cross(&v2)) / 6.0
            })
            .sum()
    }

    pub fn surface_area(&self) -> f64 {
        (0..self.triangles.len())
            .map(|idx| {
                let [v0, v1, v2] = self.triangle_points(idx);
                (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
            })
            .sum()
    }
}

fn position_key(point: &Point3<f64>) -> [u64; 3] {
    // -0.0 and 0.0 are the same position
    let bits = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
    [bits(point.x), bits(point.y), bits(point.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_is_closed() {
        let mesh = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh();
        assert!(mesh.is_closed());
        assert!(mesh.has_balanced_edges());
        assert_relative_eq!(mesh.signed_volume(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.surface_area(), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn test_flipped_face_breaks_closure() {
        let mut mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        mesh.triangles[3] = mesh.triangles[3].flipped();
        assert!(!mesh.is_closed());
        assert!(!mesh.has_balanced_edges());
    }

    #[test]
    fn test_weld_vertices() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex(Point3::new(-0.0, 0.0, 0.0));
        let e = mesh.add_vertex(Point3::new(1.0 + f64::EPSILON, 0.0, 0.0));
        mesh.add_triangle(Triangle::new([a, b, c]));
        mesh.add_triangle(Triangle::new([d, c, e]));

        assert_eq!(mesh.weld_vertices(), 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangles[1].indices, [0, 2, 3]);
    }

    #[test]
    fn test_remove_orphaned_vertices() {
        let mut mesh = Primitive::tetrahedron(1.0).to_mesh();
        mesh.add_vertex(Point3::new(9.0, 9.0, 9.0));
        assert_eq!(mesh.remove_orphaned_vertices(), 1);
        assert!(mesh.is_closed());
    }

    #[test]
    fn test_find_degenerate_triangle() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 1.0, 1.0));
        let c = mesh.add_vertex(Point3::new(2.0, 2.0, 2.0));
        let d = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(Triangle::new([a, b, d]));
        assert_eq!(mesh.find_degenerate_triangle(), None);
        mesh.add_triangle(Triangle::new([a, b, c]));
        assert_eq!(mesh.find_degenerate_triangle(), Some(1));
    }
}
