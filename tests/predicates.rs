// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Predicate engine soundness, determinism and consistency tests

use nalgebra::{Point3, Vector3};
use polyframe_boolean::predicates::{Evaluator, ExactEvaluator, FilteredEvaluator};
use polyframe_boolean::{Predicates, SegmentTriangle, TriangleTriple, Verdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_point(rng: &mut StdRng, scale: f64) -> Point3<f64> {
    Point3::new(
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
    )
}

fn integer_point(rng: &mut StdRng) -> Point3<f64> {
    Point3::new(
        rng.gen_range(-4..=4) as f64,
        rng.gen_range(-4..=4) as f64,
        rng.gen_range(-4..=4) as f64,
    )
}

/// Dyadic barycentric combination, exact in `f64` for small integer corners
fn on_triangle(rng: &mut StdRng, tri: &[Point3<f64>; 3]) -> Point3<f64> {
    let a = rng.gen_range(0..=4) as f64 / 8.0;
    let b = rng.gen_range(0..=4) as f64 / 8.0;
    let c = 1.0 - a - b;
    Point3::from(tri[0].coords * a + tri[1].coords * b + tri[2].coords * c)
}

fn segment_fixture(rng: &mut StdRng, kind: usize) -> SegmentTriangle {
    match kind % 4 {
        // General position
        0 => SegmentTriangle::new(
            [random_point(rng, 10.0), random_point(rng, 10.0)],
            [
                random_point(rng, 10.0),
                random_point(rng, 10.0),
                random_point(rng, 10.0),
            ],
        ),
        // Endpoint snapped onto the triangle's plane
        1 => {
            let tri = [integer_point(rng), integer_point(rng), integer_point(rng)];
            SegmentTriangle::new([on_triangle(rng, &tri), integer_point(rng)], tri)
        }
        // Segment lying in the plane
        2 => {
            let tri = [integer_point(rng), integer_point(rng), integer_point(rng)];
            SegmentTriangle::new([on_triangle(rng, &tri), on_triangle(rng, &tri)], tri)
        }
        // Segment through a corner
        _ => {
            let tri = [integer_point(rng), integer_point(rng), integer_point(rng)];
            let start = integer_point(rng);
            let end = Point3::from(tri[0].coords * 2.0 - start.coords);
            SegmentTriangle::new([start, end], tri)
        }
    }
}

fn axis_triangle(axis: usize, offset: f64, rng: &mut StdRng) -> [Point3<f64>; 3] {
    let mut corners = [
        [-5.0, -5.0],
        [5.0 + rng.gen_range(0.0..1.0), -5.0],
        [-5.0, 5.0 + rng.gen_range(0.0..1.0)],
    ]
    .map(|[u, v]| {
        let mut p = [0.0; 3];
        p[axis] = offset;
        p[(axis + 1) % 3] = u;
        p[(axis + 2) % 3] = v;
        Point3::new(p[0], p[1], p[2])
    });
    if rng.gen_bool(0.5) {
        corners.swap(1, 2);
    }
    corners
}

#[test]
fn test_filter_agrees_with_exact_on_segment_queries() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut decided = 0;
    let mut uncertain = 0;

    for i in 0..2000 {
        let query = segment_fixture(&mut rng, i);
        let exact = ExactEvaluator.segment_triangle(&query);
        assert_ne!(exact, Verdict::Uncertain);

        match FilteredEvaluator.segment_triangle(&query) {
            Verdict::Uncertain => uncertain += 1,
            filtered => {
                decided += 1;
                assert_eq!(filtered, exact, "fixture {} disagrees: {:?}", i, query);
            }
        }
    }

    println!("Segment queries: {} decided by the filter, {} escalated", decided, uncertain);
    assert!(decided > 0);
    assert!(uncertain > 0);
}

#[test]
fn test_filter_agrees_with_exact_on_triple_queries() {
    let mut rng = StdRng::seed_from_u64(42);

    for i in 0..500 {
        let query = if i % 2 == 0 {
            TriangleTriple::new(
                axis_triangle(0, rng.gen_range(-1.0..1.0), &mut rng),
                axis_triangle(1, rng.gen_range(-1.0..1.0), &mut rng),
                axis_triangle(2, rng.gen_range(-1.0..1.0), &mut rng),
            )
        } else {
            // Two parallel planes: never a single common point
            let offset = rng.gen_range(-1.0..1.0);
            TriangleTriple::new(
                axis_triangle(0, offset, &mut rng),
                axis_triangle(0, offset + 0.5, &mut rng),
                axis_triangle(2, 0.0, &mut rng),
            )
        };

        let exact = ExactEvaluator.triangle_triple(&query);
        let filtered = FilteredEvaluator.triangle_triple(&query);
        if filtered != Verdict::Uncertain {
            assert_eq!(filtered, exact, "triple {} disagrees", i);
        }
        if i % 2 == 1 {
            assert!(exact.is_empty());
        }
    }
}

#[test]
fn test_repeated_evaluation_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let predicates = Predicates::new();

    for i in 0..200 {
        let query = segment_fixture(&mut rng, i);
        let first = predicates.classify_segment_triangle(&query);
        let coords = predicates.segment_triangle_coords_exact(&query);
        for _ in 0..3 {
            assert_eq!(predicates.classify_segment_triangle(&query), first);
            assert_eq!(predicates.segment_triangle_coords_exact(&query), coords);
        }
    }
}

#[test]
fn test_crossing_and_triple_point_coincide() {
    let mut rng = StdRng::seed_from_u64(2024);
    let predicates = Predicates::new();

    // Line c + t d lies in the open interior of both carrier triangles for
    // t in (-1, 3)
    let c = Point3::new(1.0, -2.0, 3.0);
    let d = Vector3::new(2.0, 1.0, -1.0);
    let carrier = |w: Vector3<f64>| [c - d + w, c - d - w, c + d * 3.0];
    let second = carrier(Vector3::new(0.0, 3.0, 3.0));
    let third = carrier(Vector3::new(4.0, -5.0, 3.0));
    let segment = [c, c + d * 2.0];

    let mut matches = 0;
    for _ in 0..300 {
        let centre = c + d;
        let first = [
            centre + random_point(&mut rng, 3.0).coords,
            centre + random_point(&mut rng, 3.0).coords,
            centre + random_point(&mut rng, 3.0).coords,
        ];

        let crossing = SegmentTriangle::new(segment, first);
        if predicates.classify_segment_triangle(&crossing) != Verdict::NonEmpty {
            continue;
        }

        let triple = TriangleTriple::new(first, second, third);
        assert_eq!(predicates.classify_triangle_triple(&triple), Verdict::NonEmpty);

        let from_segment = predicates.segment_triangle_coords_exact(&crossing);
        let from_triple = predicates.triangle_triple_coords_exact(&triple);
        assert!(from_segment.is_some());
        assert_eq!(from_segment, from_triple);
        assert_eq!(
            predicates.segment_triangle_coords(&crossing),
            predicates.triangle_triple_coords(&triple)
        );
        matches += 1;
    }

    println!("{} crossings checked against triple points", matches);
    assert!(matches > 10);
}

#[test]
fn test_open_interior_rule() {
    let predicates = Predicates::new();
    let triangle = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
    ];

    // Through an edge midpoint: boundaries touch, interiors do not
    let through_edge = SegmentTriangle::new(
        [Point3::new(1.0, 0.0, -1.0), Point3::new(1.0, 0.0, 1.0)],
        triangle,
    );
    assert_eq!(predicates.classify_segment_triangle(&through_edge), Verdict::Degenerate);
    assert!(predicates.is_empty_segment_triangle(&through_edge));

    // In-plane segment crossing the triangle
    let coplanar = SegmentTriangle::new(
        [Point3::new(-1.0, 0.5, 0.0), Point3::new(3.0, 0.5, 0.0)],
        triangle,
    );
    assert!(predicates.is_empty_segment_triangle(&coplanar));

    let proper = SegmentTriangle::new(
        [Point3::new(0.5, 0.5, -1.0), Point3::new(0.5, 0.5, 1.0)],
        triangle,
    );
    assert_eq!(predicates.classify_segment_triangle(&proper), Verdict::NonEmpty);
}
