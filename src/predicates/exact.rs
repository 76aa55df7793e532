// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact rational stage
//!
//! Always correct and never `Uncertain`. Besides the sign-only evaluator it
//! constructs the exact crossing points that the resolver stores in its
//! vertex arena.

use super::query::{SegmentTriangle, TriangleTriple};
use super::{decide_segment_triangle, decide_triangle_triple, Evaluator, Verdict};
use crate::geometry::exact::{cross, dot, orient3d, orient3d_value, triangle_normal};
use crate::geometry::{ExactPoint, Rational, Sign};
use num_traits::Zero;

/// Verdict for an exact segment against an exact triangle
pub fn segment_triangle_verdict(segment: [&ExactPoint; 2], triangle: [&ExactPoint; 3]) -> Verdict {
    segment_triangle_solve(segment, triangle).0
}

/// Exact crossing point when the open segment crosses the open triangle
pub fn segment_triangle_point(
    segment: [&ExactPoint; 2],
    triangle: [&ExactPoint; 3],
) -> Option<ExactPoint> {
    segment_triangle_solve(segment, triangle).1
}

fn segment_triangle_solve(
    [e0, e1]: [&ExactPoint; 2],
    [t0, t1, t2]: [&ExactPoint; 3],
) -> (Verdict, Option<ExactPoint>) {
    let s0 = orient3d_value(t0, t1, t2, e0);
    let s1 = orient3d_value(t0, t1, t2, e1);
    let plane = [Some(Sign::of(&s0)), Some(Sign::of(&s1))];
    let sides = [
        Some(orient3d(e0, e1, t0, t1)),
        Some(orient3d(e0, e1, t1, t2)),
        Some(orient3d(e0, e1, t2, t0)),
    ];

    let verdict = decide_segment_triangle(plane, sides);
    if verdict != Verdict::NonEmpty {
        return (verdict, None);
    }

    // Signs of s0 and s1 are strictly opposite here, so the divisor is nonzero
    let t = &s0 / (&s0 - &s1);
    (verdict, Some(e0.lerp(e1, &t)))
}

/// Verdict for three exact triangles
pub fn triangle_triple_verdict(triangles: [[&ExactPoint; 3]; 3]) -> Verdict {
    triangle_triple_solve(triangles).0
}

/// Exact common point when the three planes meet inside all three triangles
pub fn triangle_triple_point(triangles: [[&ExactPoint; 3]; 3]) -> Option<ExactPoint> {
    triangle_triple_solve(triangles).1
}

fn triangle_triple_solve(triangles: [[&ExactPoint; 3]; 3]) -> (Verdict, Option<ExactPoint>) {
    let normals = triangles.map(|[a, b, c]| triangle_normal(a, b, c));
    let offsets: [Rational; 3] =
        [0usize, 1, 2].map(|i| dot(&normals[i], &triangles[i][0].coords));

    let n12 = cross(&normals[1], &normals[2]);
    let n20 = cross(&normals[2], &normals[0]);
    let n01 = cross(&normals[0], &normals[1]);
    let det = dot(&normals[0], &n12);
    if det.is_zero() {
        return (Verdict::Degenerate, None);
    }

    let coord = |k: usize| {
        (&offsets[0] * &n12[k] + &offsets[1] * &n20[k] + &offsets[2] * &n01[k]) / &det
    };
    let point = ExactPoint::new(coord(0), coord(1), coord(2));

    let mut inside = [[None; 3]; 3];
    for (i, tri) in triangles.iter().enumerate() {
        for j in 0..3 {
            let from = tri[j];
            let to = tri[(j + 1) % 3];
            let value = dot(
                &cross(&from.vector_to(to), &from.vector_to(&point)),
                &normals[i],
            );
            inside[i][j] = Some(Sign::of(&value));
        }
    }

    let verdict = decide_triangle_triple(Some(Sign::of(&det)), &inside);
    if verdict == Verdict::NonEmpty {
        (verdict, Some(point))
    } else {
        (verdict, None)
    }
}

/// Exact evaluation of `f64` queries
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactEvaluator;

impl ExactEvaluator {
    pub fn segment_triangle_point(&self, query: &SegmentTriangle) -> Option<ExactPoint> {
        let (segment, triangle) = query.exact();
        segment_triangle_point(
            [&segment[0], &segment[1]],
            [&triangle[0], &triangle[1], &triangle[2]],
        )
    }

    pub fn triangle_triple_point(&self, query: &TriangleTriple) -> Option<ExactPoint> {
        let tris = query.exact();
        triangle_triple_point(tris.each_ref().map(|tri| tri.each_ref()))
    }
}

impl Evaluator for ExactEvaluator {
    fn segment_triangle(&self, query: &SegmentTriangle) -> Verdict {
        let (segment, triangle) = query.exact();
        segment_triangle_verdict(
            [&segment[0], &segment[1]],
            [&triangle[0], &triangle[1], &triangle[2]],
        )
    }

    fn triangle_triple(&self, query: &TriangleTriple) -> Verdict {
        let tris = query.exact();
        triangle_triple_verdict(tris.each_ref().map(|tri| tri.each_ref()))
    }
}
