// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::{Point3, Vector3};
use polyframe_boolean::geometry::Primitive;
use polyframe_boolean::{BooleanKernel, BooleanOp, Predicates, SegmentTriangle, TriMesh};

fn bench_predicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicates");
    let predicates = Predicates::new();

    let triangle = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let crossing = SegmentTriangle::new(
        [Point3::new(0.2, 0.2, -1.0), Point3::new(0.3, 0.1, 1.0)],
        triangle,
    );
    // Passes exactly through a corner, so the filter cannot decide
    let through_corner = SegmentTriangle::new(
        [Point3::new(0.0, 0.0, -1.0), Point3::new(0.0, 0.0, 1.0)],
        triangle,
    );

    group.bench_function("segment_triangle_filtered", |b| {
        b.iter(|| predicates.classify_segment_triangle(black_box(&crossing)))
    });
    group.bench_function("segment_triangle_exact", |b| {
        b.iter(|| predicates.classify_segment_triangle(black_box(&through_corner)))
    });

    group.finish();
}

fn cylinder_pair(segments: u32) -> (TriMesh, TriMesh) {
    let a = Primitive::cylinder(2.0, 1.0, segments).to_mesh();
    let mut b = Primitive::cylinder(2.0, 1.0, segments).to_mesh();
    b.translate(&Vector3::new(0.7, 0.3, 0.5));
    (TriMesh::from(a), TriMesh::from(b))
}

fn bench_boolean_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("boolean_ops");
    group.sample_size(20);
    let kernel = BooleanKernel::default();

    let cube1 = TriMesh::from(Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false).to_mesh());
    let mut shifted = Primitive::cube(Vector3::new(8.0, 8.0, 8.0), false).to_mesh();
    shifted.translate(&Vector3::new(5.0, 3.0, 1.5));
    let cube2 = TriMesh::from(shifted);

    for op in [BooleanOp::Union, BooleanOp::Difference, BooleanOp::Intersection] {
        group.bench_with_input(BenchmarkId::new("cubes", op), &op, |b, &op| {
            b.iter(|| kernel.boolean(op, black_box(&cube1), black_box(&cube2)).unwrap())
        });
    }

    for segments in [16, 64] {
        let (a, b_mesh) = cylinder_pair(segments);
        group.bench_with_input(
            BenchmarkId::new("cylinders_union", segments),
            &segments,
            |b, _| b.iter(|| kernel.union(black_box(&a), black_box(&b_mesh)).unwrap()),
        );
    }

    group.finish();
}

fn bench_solidity(c: &mut Criterion) {
    let mut group = c.benchmark_group("solidity");
    let kernel = BooleanKernel::default();

    for segments in [32, 128] {
        let mesh = TriMesh::from(Primitive::cylinder(2.0, 1.0, segments).to_mesh());
        group.bench_with_input(BenchmarkId::new("cylinder", segments), &mesh, |b, mesh| {
            b.iter(|| kernel.is_solid(black_box(mesh)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_predicates, bench_boolean_ops, bench_solidity);
criterion_main!(benches);
