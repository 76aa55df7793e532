// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed primitive meshes used by tests, benchmarks and the CLI

use super::{Mesh, Triangle};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives; every generated mesh is closed with outward faces
pub enum Primitive {
    Cuboid { min: Point3<f64>, max: Point3<f64> },
    Tetrahedron { size: f64 },
    Cylinder { h: f64, r: f64, segments: u32 },
}

impl Primitive {
    /// Box of the given size, either centered on the origin or with its
    /// minimum corner there
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        let min = if center {
            Point3::from(-size / 2.0)
        } else {
            Point3::origin()
        };
        Self::Cuboid {
            min,
            max: min + size,
        }
    }

    pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self::Cuboid { min, max }
    }

    /// Right-corner tetrahedron spanning the three positive axes
    pub fn tetrahedron(size: f64) -> Self {
        Self::Tetrahedron { size }
    }

    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        Self::Cylinder {
            h,
            r,
            segments: segments.max(3),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cuboid { min, max } => generate_cuboid_mesh(min, max),
            Self::Tetrahedron { size } => generate_tetrahedron_mesh(*size),
            Self::Cylinder { h, r, segments } => generate_cylinder_mesh(*h, *r, *segments),
        }
    }
}

fn generate_cuboid_mesh(min: &Point3<f64>, max: &Point3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 12);

    // 8 shared corners
    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    for position in positions {
        mesh.add_vertex(position);
    }

    let faces = [
        // Front (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Back (z-)
        [1, 0, 3],
        [1, 3, 2],
        // Right (x+)
        [5, 1, 2],
        [5, 2, 6],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Top (y+)
        [7, 6, 2],
        [7, 2, 3],
        // Bottom (y-)
        [0, 1, 5],
        [0, 5, 4],
    ];
    for indices in faces {
        mesh.add_triangle(Triangle::new(indices));
    }

    mesh
}

fn generate_tetrahedron_mesh(size: f64) -> Mesh {
    let mut mesh = Mesh::with_capacity(4, 4);
    mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    mesh.add_vertex(Point3::new(size, 0.0, 0.0));
    mesh.add_vertex(Point3::new(0.0, size, 0.0));
    mesh.add_vertex(Point3::new(0.0, 0.0, size));

    for indices in [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]] {
        mesh.add_triangle(Triangle::new(indices));
    }

    mesh
}

fn generate_cylinder_mesh(height: f64, radius: f64, segments: u32) -> Mesh {
    let segments = segments as usize;
    let mut mesh = Mesh::with_capacity(2 * segments + 2, 4 * segments);

    // Runs from z = 0 to z = height
    let bottom_center = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let top_center = mesh.add_vertex(Point3::new(0.0, 0.0, height));

    let mut bottom = Vec::with_capacity(segments);
    let mut top = Vec::with_capacity(segments);
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        bottom.push(mesh.add_vertex(Point3::new(radius * cos, radius * sin, 0.0)));
        top.push(mesh.add_vertex(Point3::new(radius * cos, radius * sin, height)));
    }

    for i in 0..segments {
        let next = (i + 1) % segments;

        // Caps
        mesh.add_triangle(Triangle::new([bottom_center, bottom[next], bottom[i]]));
        mesh.add_triangle(Triangle::new([top_center, top[i], top[next]]));

        // Side quad, reusing rim vertices so the mesh stays closed
        mesh.add_triangle(Triangle::new([bottom[i], bottom[next], top[i]]));
        mesh.add_triangle(Triangle::new([top[i], bottom[next], top[next]]));
    }

    mesh
}
