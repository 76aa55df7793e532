// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Composite query shapes

use crate::geometry::ExactPoint;
use nalgebra::Point3;

/// Does the open segment cross the open triangle, and where?
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentTriangle {
    pub segment: [Point3<f64>; 2],
    pub triangle: [Point3<f64>; 3],
}

impl SegmentTriangle {
    pub fn new(segment: [Point3<f64>; 2], triangle: [Point3<f64>; 3]) -> Self {
        Self { segment, triangle }
    }

    pub(crate) fn exact(&self) -> ([ExactPoint; 2], [ExactPoint; 3]) {
        (
            self.segment.map(|p| ExactPoint::from_point(&p)),
            self.triangle.map(|p| ExactPoint::from_point(&p)),
        )
    }
}

/// Do three supporting planes meet in one point strictly inside all three
/// triangles, and where?
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleTriple {
    pub triangles: [[Point3<f64>; 3]; 3],
}

impl TriangleTriple {
    pub fn new(first: [Point3<f64>; 3], second: [Point3<f64>; 3], third: [Point3<f64>; 3]) -> Self {
        Self {
            triangles: [first, second, third],
        }
    }

    pub(crate) fn exact(&self) -> [[ExactPoint; 3]; 3] {
        self.triangles
            .map(|tri| tri.map(|p| ExactPoint::from_point(&p)))
    }
}
