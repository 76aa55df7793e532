// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Boolean Kernel
//!
//! Robust Boolean operations on closed triangle meshes. Intersections are
//! found with filtered floating-point predicates that fall back to exact
//! rational arithmetic, both meshes are cut along their intersection curves,
//! and the pieces are classified and reassembled into the result.

pub mod boolean;
pub mod cli;
pub mod config;
pub mod error;
pub mod exchange;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod predicates;
pub mod resolve;

pub use boolean::{BooleanOp, Classification};
pub use config::BooleanConfig;
pub use error::{BooleanError, BooleanResult};
pub use exchange::TriMesh;
pub use geometry::{Mesh, Primitive};
pub use io::{read_mesh, write_mesh};
pub use kernel::{BooleanKernel, CancelToken, OperationReport};
pub use predicates::{PredicateStats, Predicates, SegmentTriangle, TriangleTriple, Verdict};

/// Whether `mesh` is closed and free of self-intersections
pub fn is_solid(mesh: &TriMesh) -> BooleanResult<bool> {
    BooleanKernel::default().is_solid(mesh)
}

pub fn compute_union(a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
    BooleanKernel::default().union(a, b)
}

/// `a` minus `b`
pub fn compute_difference(a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
    BooleanKernel::default().difference(a, b)
}

pub fn compute_intersection(a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
    BooleanKernel::default().intersection(a, b)
}

pub fn compute_symmetric_difference(a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
    BooleanKernel::default().symmetric_difference(a, b)
}

/// Both meshes cut along their intersection curves, merged into one mesh
pub fn resolve_intersections(a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
    BooleanKernel::default().resolve(a, b)
}
