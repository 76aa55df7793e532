// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::Mesh;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Signed enclosed volume in cubic units
    pub volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Mean vertex position [x, y, z]
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every edge borders exactly two consistently oriented faces
    pub is_closed: bool,
    /// Closed and free of self-intersections, when computed
    pub is_solid: Option<bool>,
}

impl GeometryStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            vertex_count: 0,
            triangle_count: 0,
            is_closed: true,
            is_solid: None,
        }
    }

    /// Pretty print statistics
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              MESH ANALYTICS                              ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Volume:          {:>14.6}                          ║", self.volume);
        println!("║ Surface Area:    {:>14.6}                          ║", self.surface_area);
        println!(
            "║ Centroid:        ({:>8.3}, {:>8.3}, {:>8.3})          ║",
            self.centroid[0], self.centroid[1], self.centroid[2]
        );
        println!("║                                                          ║");
        println!(
            "║   Min: ({:>8.3}, {:>8.3}, {:>8.3})                   ║",
            self.bbox[0], self.bbox[1], self.bbox[2]
        );
        println!(
            "║   Max: ({:>8.3}, {:>8.3}, {:>8.3})                   ║",
            self.bbox[3], self.bbox[4], self.bbox[5]
        );
        println!("║                                                          ║");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Triangles:       {:>10}                              ║", self.triangle_count);
        println!(
            "║ Closed:          {:>10}                              ║",
            if self.is_closed { "Yes" } else { "No" }
        );
        if let Some(solid) = self.is_solid {
            println!(
                "║ Solid:           {:>10}                              ║",
                if solid { "Yes" } else { "No" }
            );
        }
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

/// Analyze mesh geometry; solidity is left unset
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    if mesh.vertices.is_empty() || mesh.triangles.is_empty() {
        return GeometryStats::empty();
    }

    let bbox = mesh.bounding_box();
    let count = mesh.vertices.len() as f64;
    let sum = mesh
        .vertices
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, v| acc + v.coords);

    GeometryStats {
        volume: mesh.signed_volume(),
        surface_area: mesh.surface_area(),
        bbox: [
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
        ],
        centroid: [sum.x / count, sum.y / count, sum.z / count],
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        is_closed: mesh.is_closed(),
        is_solid: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_analyze_cube() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
        let stats = analyze(&mesh);

        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(stats.surface_area, 600.0, epsilon = 1e-9);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.triangle_count, 12);
        assert!(stats.is_closed);
        assert!(stats.centroid.iter().all(|c| c.abs() < 1e-12));
    }

    #[test]
    fn test_analyze_empty() {
        let stats = analyze(&Mesh::new());
        assert_eq!(stats, GeometryStats::empty());
    }

    #[test]
    fn test_open_mesh_is_not_closed() {
        let mut mesh = Primitive::tetrahedron(1.0).to_mesh();
        mesh.triangles.pop();
        assert!(!analyze(&mesh).is_closed);
    }
}
