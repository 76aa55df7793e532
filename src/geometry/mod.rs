// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, exact arithmetic and spatial search

pub mod analytics;
mod bbox;
mod bvh;
pub mod exact;
mod mesh;
pub mod overlap;
mod primitives;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use bvh::BVH;
pub use exact::{ExactPoint, Rational, Sign};
pub use mesh::{Mesh, Triangle};
pub use primitives::Primitive;
