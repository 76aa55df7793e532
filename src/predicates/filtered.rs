// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Floating-point filter stage
//!
//! Signs are computed in `f64` together with a bound on the rounding error.
//! A sign is reported only when the bound proves it; otherwise the query is
//! `Uncertain` and must be escalated. The filter never reports an exact zero.

use super::query::{SegmentTriangle, TriangleTriple};
use super::{decide_segment_triangle, decide_triangle_triple, Evaluator, Verdict};
use crate::geometry::Sign;
use nalgebra::Point3;
use std::ops::{Add, Mul, Sub};

/// Half an ulp of 1.0
const EPSILON: f64 = f64::EPSILON * 0.5;

/// Static error bound coefficient for the 3x3 orientation determinant
const ORIENT3D_BOUND: f64 = (7.0 + 56.0 * EPSILON) * EPSILON;

/// Sign of `((b - a) x (c - a)) . (d - a)` if the filter can certify it
pub fn orient3d(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> Option<Sign> {
    let (adx, ady, adz) = (a.x - d.x, a.y - d.y, a.z - d.z);
    let (bdx, bdy, bdz) = (b.x - d.x, b.y - d.y, b.z - d.z);
    let (cdx, cdy, cdz) = (c.x - d.x, c.y - d.y, c.z - d.z);

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;

    // This determinant is positive when d lies below abc, the opposite of
    // the convention used everywhere else
    let det = adz * (bdxcdy - cdxbdy) + bdz * (cdxady - adxcdy) + cdz * (adxbdy - bdxady);

    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * adz.abs()
        + (cdxady.abs() + adxcdy.abs()) * bdz.abs()
        + (adxbdy.abs() + bdxady.abs()) * cdz.abs();
    let bound = ORIENT3D_BOUND * permanent;

    if det > bound {
        Some(Sign::Negative)
    } else if -det > bound {
        Some(Sign::Positive)
    } else {
        None
    }
}

/// Closed interval with outward-rounded endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    const UNBOUNDED: Interval = Interval {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    pub(crate) fn point(value: f64) -> Self {
        Self { lo: value, hi: value }
    }

    fn widened(lo: f64, hi: f64) -> Self {
        if lo.is_nan() || hi.is_nan() {
            return Self::UNBOUNDED;
        }
        Self {
            lo: next_down(lo),
            hi: next_up(hi),
        }
    }

    pub(crate) fn sign(&self) -> Option<Sign> {
        if self.lo > 0.0 {
            Some(Sign::Positive)
        } else if self.hi < 0.0 {
            Some(Sign::Negative)
        } else {
            None
        }
    }

    /// `None` when the divisor may be zero
    pub(crate) fn checked_div(self, divisor: Interval) -> Option<Interval> {
        if divisor.lo <= 0.0 && divisor.hi >= 0.0 {
            return None;
        }
        Some(Self::hull([
            self.lo / divisor.lo,
            self.lo / divisor.hi,
            self.hi / divisor.lo,
            self.hi / divisor.hi,
        ]))
    }

    fn hull(values: [f64; 4]) -> Self {
        if values.iter().any(|v| v.is_nan()) {
            return Self::UNBOUNDED;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::widened(lo, hi)
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Interval) -> Interval {
        Interval::widened(self.lo + rhs.lo, self.hi + rhs.hi)
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Interval) -> Interval {
        Interval::widened(self.lo - rhs.hi, self.hi - rhs.lo)
    }
}

impl Mul for Interval {
    type Output = Interval;

    fn mul(self, rhs: Interval) -> Interval {
        Interval::hull([
            self.lo * rhs.lo,
            self.lo * rhs.hi,
            self.hi * rhs.lo,
            self.hi * rhs.hi,
        ])
    }
}

fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

type IVector = [Interval; 3];

fn ivector(p: &Point3<f64>) -> IVector {
    [Interval::point(p.x), Interval::point(p.y), Interval::point(p.z)]
}

fn isub(u: &IVector, v: &IVector) -> IVector {
    [u[0] - v[0], u[1] - v[1], u[2] - v[2]]
}

fn icross(u: &IVector, v: &IVector) -> IVector {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

fn idot(u: &IVector, v: &IVector) -> Interval {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

fn iscale(u: &IVector, s: Interval) -> IVector {
    [u[0] * s, u[1] * s, u[2] * s]
}

fn iadd(u: &IVector, v: &IVector) -> IVector {
    [u[0] + v[0], u[1] + v[1], u[2] + v[2]]
}

/// Sign-only triple test in interval arithmetic
fn triangle_triple_verdict(query: &TriangleTriple) -> Verdict {
    let tris: [[IVector; 3]; 3] = query.triangles.map(|tri| tri.map(|p| ivector(&p)));
    let normals: [IVector; 3] =
        tris.map(|[a, b, c]| icross(&isub(&b, &a), &isub(&c, &a)));
    let offsets: [Interval; 3] = [0usize, 1, 2].map(|i| idot(&normals[i], &tris[i][0]));

    let n12 = icross(&normals[1], &normals[2]);
    let n20 = icross(&normals[2], &normals[0]);
    let n01 = icross(&normals[0], &normals[1]);
    let det = idot(&normals[0], &n12);
    let Some(det_sign) = det.sign() else {
        return Verdict::Uncertain;
    };

    let numerator = iadd(
        &iadd(&iscale(&n12, offsets[0]), &iscale(&n20, offsets[1])),
        &iscale(&n01, offsets[2]),
    );
    let point = match (
        numerator[0].checked_div(det),
        numerator[1].checked_div(det),
        numerator[2].checked_div(det),
    ) {
        (Some(x), Some(y), Some(z)) => [x, y, z],
        _ => return Verdict::Uncertain,
    };

    let mut inside = [[None; 3]; 3];
    for (i, tri) in tris.iter().enumerate() {
        for j in 0..3 {
            let from = &tri[j];
            let to = &tri[(j + 1) % 3];
            let value = idot(&icross(&isub(to, from), &isub(&point, from)), &normals[i]);
            inside[i][j] = value.sign();
        }
    }

    decide_triangle_triple(Some(det_sign), &inside)
}

/// Floating-point stage with certified error bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct FilteredEvaluator;

impl Evaluator for FilteredEvaluator {
    fn segment_triangle(&self, query: &SegmentTriangle) -> Verdict {
        let [e0, e1] = &query.segment;
        let [t0, t1, t2] = &query.triangle;
        let plane = [orient3d(t0, t1, t2, e0), orient3d(t0, t1, t2, e1)];
        let sides = [
            orient3d(e0, e1, t0, t1),
            orient3d(e0, e1, t1, t2),
            orient3d(e0, e1, t2, t0),
        ];
        decide_segment_triangle(plane, sides)
    }

    fn triangle_triple(&self, query: &TriangleTriple) -> Verdict {
        triangle_triple_verdict(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orient3d_clear_cases() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        assert_eq!(orient3d(&a, &b, &c, &Point3::new(0.1, 0.1, 1.0)), Some(Sign::Positive));
        assert_eq!(orient3d(&a, &b, &c, &Point3::new(0.1, 0.1, -1.0)), Some(Sign::Negative));
    }

    #[test]
    fn test_orient3d_never_claims_zero() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        assert_eq!(orient3d(&a, &b, &c, &Point3::new(0.3, 0.3, 0.0)), None);
    }

    #[test]
    fn test_interval_encloses_result() {
        let third = Interval::point(1.0).checked_div(Interval::point(3.0)).unwrap();
        assert!(third.lo <= 1.0 / 3.0 && 1.0 / 3.0 <= third.hi);
        assert_eq!(third.sign(), Some(Sign::Positive));

        let straddle = Interval::point(0.1) - Interval::point(0.1);
        assert_eq!(straddle.sign(), None);
        assert!(Interval::point(1.0).checked_div(straddle).is_none());
    }

    #[test]
    fn test_next_up_and_down() {
        assert!(next_up(1.0) > 1.0);
        assert!(next_down(1.0) < 1.0);
        assert!(next_up(0.0) > 0.0);
        assert!(next_down(0.0) < 0.0);
        assert!(next_up(-1.0) > -1.0);
    }
}
