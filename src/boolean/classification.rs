// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Inside/outside classification of resolved face patches
//!
//! Curve edges split each resolved mesh into patches that lie entirely
//! inside, outside or on the boundary of the other operand. One exact test
//! per patch decides its label; every face of the patch inherits it.

use crate::error::{BooleanError, BooleanResult};
use crate::geometry::exact::{
    cross, dot, is_zero_vector, locate_coplanar, orient3d, rational, triangle_normal, Projection,
    TriangleLocation,
};
use crate::geometry::overlap::OverlapFinder;
use crate::geometry::{BoundingBox, ExactPoint, Mesh, Rational, Sign};
use crate::predicates::exact::segment_triangle_verdict;
use crate::predicates::Verdict;
use crate::resolve::{MeshId, Resolution};
use log::{debug, warn};
use num_bigint::BigInt;
use num_traits::Signed;
use serde::{Deserialize, Serialize};

/// Position of a resolved face relative to the other operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Inside,
    Outside,
    /// On the other surface with matching orientation
    SameBoundary,
    /// On the other surface with opposite orientation
    OppositeBoundary,
}

/// Integer ray directions tried in order
const RAY_DIRECTIONS: [[i64; 3]; 8] = [
    [3, 5, 7],
    [-5, 3, 11],
    [7, -11, 2],
    [2, 9, -13],
    [-3, -7, 5],
    [11, 4, -3],
    [-13, -2, -9],
    [5, -6, -17],
];

fn ray_direction(attempt: usize) -> [Rational; 3] {
    let base = RAY_DIRECTIONS[attempt % RAY_DIRECTIONS.len()];
    let round = (attempt / RAY_DIRECTIONS.len()) as i64;
    [base[0] + round, base[1] - 2 * round, base[2] + 3 * round]
        .map(|c| Rational::from_integer(BigInt::from(c)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub patches: usize,
    pub boundary_patches: usize,
    pub ray_casts: usize,
    /// Rays abandoned because they touched an edge or vertex exactly
    pub degenerate_rays: usize,
}

/// Labels the faces of a resolution against the two input meshes
pub struct Classifier<'m> {
    inputs: [&'m Mesh; 2],
    finders: [OverlapFinder; 2],
    max_ray_attempts: usize,
}

impl<'m> Classifier<'m> {
    pub fn new(a: &'m Mesh, b: &'m Mesh, max_ray_attempts: usize) -> Self {
        Self {
            inputs: [a, b],
            finders: [OverlapFinder::new(a), OverlapFinder::new(b)],
            max_ray_attempts: max_ray_attempts.max(1),
        }
    }

    /// Label every face of `resolution`
    pub fn classify(&self, resolution: &mut Resolution) -> BooleanResult<ClassificationStats> {
        let mut stats = ClassificationStats::default();

        for mesh in [MeshId::A, MeshId::B] {
            for patch in patches(resolution, mesh) {
                let seed = patch[0];
                let label = self.seed_label(resolution, seed, &mut stats)?;
                stats.patches += 1;
                if matches!(
                    label,
                    Classification::SameBoundary | Classification::OppositeBoundary
                ) {
                    stats.boundary_patches += 1;
                }
                for face in patch {
                    resolution.faces[face].label = Some(label);
                }
            }
        }

        debug!(
            "Classified {} patches ({} on the boundary) with {} ray casts, {} degenerate",
            stats.patches, stats.boundary_patches, stats.ray_casts, stats.degenerate_rays
        );
        Ok(stats)
    }

    fn seed_label(
        &self,
        resolution: &Resolution,
        face: usize,
        stats: &mut ClassificationStats,
    ) -> BooleanResult<Classification> {
        let arena_face = &resolution.faces[face];
        let [a, b, c] = arena_face.vertices.map(|v| resolution.arena.point(v));
        let centroid = ExactPoint::centroid(a, b, c);
        let normal = triangle_normal(a, b, c);
        let other = arena_face.origin.other();

        if let Some(label) = self.boundary_label(other, &centroid, &normal) {
            return Ok(label);
        }

        for attempt in 0..self.max_ray_attempts {
            stats.ray_casts += 1;
            match self.winding_number(other, &centroid, attempt) {
                Some(winding) if winding != 0 => return Ok(Classification::Inside),
                Some(_) => return Ok(Classification::Outside),
                None => {
                    stats.degenerate_rays += 1;
                    warn!("Ray {attempt} from face {face} is degenerate, retrying");
                }
            }
        }

        warn!(
            "All {} rays from face {face} touched the other surface's boundary",
            self.max_ray_attempts
        );
        Err(BooleanError::topology(format!(
            "could not classify face {face}: every ray was degenerate"
        )))
    }

    /// Label for a point lying on a coplanar face of the other input
    fn boundary_label(
        &self,
        other: MeshId,
        point: &ExactPoint,
        normal: &[Rational; 3],
    ) -> Option<Classification> {
        let mesh = self.inputs[other.index()];
        let window = BoundingBox::from_points(&[point.to_point()]).padded_for_rounding();

        for g in self.finders[other.index()].candidates(&window) {
            let tri = mesh.exact_triangle(g);
            if orient3d(&tri[0], &tri[1], &tri[2], point) != Sign::Zero {
                continue;
            }
            let other_normal = triangle_normal(&tri[0], &tri[1], &tri[2]);
            if !is_zero_vector(&cross(normal, &other_normal)) {
                continue;
            }
            let projection = Projection::for_normal(&other_normal)?;
            if locate_coplanar(tri.each_ref(), projection, point) == TriangleLocation::Outside {
                continue;
            }
            return Some(if dot(normal, &other_normal).is_positive() {
                Classification::SameBoundary
            } else {
                Classification::OppositeBoundary
            });
        }
        None
    }

    /// Winding number of the other mesh around `origin`, or `None` when the
    /// ray touches an edge, a vertex or a face plane exactly
    fn winding_number(&self, other: MeshId, origin: &ExactPoint, attempt: usize) -> Option<i64> {
        let mesh = self.inputs[other.index()];
        let bounds = mesh.bounding_box();
        let rounded = origin.to_point();
        let extent = [bounds.min, bounds.max, rounded]
            .iter()
            .flat_map(|p| [p.x.abs(), p.y.abs(), p.z.abs()])
            .fold(0.0_f64, f64::max);
        let length = rational(2.0 * extent + 1.0);

        let far = origin.offset(&ray_direction(attempt), &length);
        let ray_box = BoundingBox::from_points(&[rounded, far.to_point()]).padded_for_rounding();

        let mut winding = 0;
        for g in self.finders[other.index()].candidates(&ray_box) {
            let tri = mesh.exact_triangle(g);
            match segment_triangle_verdict([origin, &far], tri.each_ref()) {
                Verdict::NonEmpty => {
                    if orient3d(&tri[0], &tri[1], &tri[2], origin) == Sign::Negative {
                        winding += 1;
                    } else {
                        winding -= 1;
                    }
                }
                Verdict::Degenerate => {
                    // A ray starting on the face plane but away from the face
                    // is decided as empty; anything else is a real touch
                    return None;
                }
                Verdict::Empty | Verdict::Uncertain => {}
            }
        }
        Some(winding)
    }
}

/// Flood fill the faces of `mesh` across non-curve edges.
///
/// Patches come out ordered by their lowest face index, which is always the
/// first entry of each patch.
pub fn patches(resolution: &Resolution, mesh: MeshId) -> Vec<Vec<usize>> {
    let mut patch_of: Vec<Option<usize>> = vec![None; resolution.faces.len()];
    let mut patches = Vec::new();

    for (root, _) in resolution.faces_of(mesh) {
        if patch_of[root].is_some() {
            continue;
        }
        let id = patches.len();
        patch_of[root] = Some(id);
        let mut members = vec![root];
        let mut cursor = 0;

        while cursor < members.len() {
            let face = members[cursor];
            cursor += 1;
            for (u, v) in resolution.faces[face].edge_keys() {
                if resolution.is_curve_edge(u, v) {
                    continue;
                }
                for &neighbor in &resolution.arena.get(u).faces {
                    if patch_of[neighbor].is_some()
                        || resolution.faces[neighbor].origin != mesh
                        || !resolution.faces[neighbor].vertices.contains(&v)
                    {
                        continue;
                    }
                    patch_of[neighbor] = Some(id);
                    members.push(neighbor);
                }
            }
        }

        patches.push(members);
    }

    patches
}
