// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact rational geometry
//!
//! Every finite `f64` is a dyadic rational, so input coordinates convert
//! without loss. All constructions here (plane crossings, Cramer solutions,
//! centroids) stay exact, which lets the resolver identify points by value.

use nalgebra::Point3;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// Arbitrary-precision rational number
pub type Rational = BigRational;

/// Free vector with exact components
pub type ExactVector = [Rational; 3];

/// Convert a finite `f64` to the rational it represents exactly.
///
/// Non-finite input is a precondition violation; it maps to zero.
pub fn rational(value: f64) -> Rational {
    BigRational::from_float(value).unwrap_or_else(Rational::zero)
}

/// Round a rational to the nearest `f64`
pub fn to_f64(value: &Rational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Sign of an exactly evaluated expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    pub fn of(value: &Rational) -> Self {
        if value.is_positive() {
            Sign::Positive
        } else if value.is_negative() {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }

    pub fn is_zero(self) -> bool {
        self == Sign::Zero
    }

    pub fn opposite(self) -> Self {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }
}

/// Point with exact rational coordinates
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExactPoint {
    pub coords: [Rational; 3],
}

impl ExactPoint {
    pub fn new(x: Rational, y: Rational, z: Rational) -> Self {
        Self { coords: [x, y, z] }
    }

    pub fn from_point(point: &Point3<f64>) -> Self {
        Self::new(rational(point.x), rational(point.y), rational(point.z))
    }

    /// Nearest `f64` point; equal exact points always round identically
    pub fn to_point(&self) -> Point3<f64> {
        Point3::new(
            to_f64(&self.coords[0]),
            to_f64(&self.coords[1]),
            to_f64(&self.coords[2]),
        )
    }

    /// Vector from `self` to `other`
    pub fn vector_to(&self, other: &ExactPoint) -> ExactVector {
        [
            &other.coords[0] - &self.coords[0],
            &other.coords[1] - &self.coords[1],
            &other.coords[2] - &self.coords[2],
        ]
    }

    /// `self + t * direction`
    pub fn offset(&self, direction: &ExactVector, t: &Rational) -> ExactPoint {
        ExactPoint::new(
            &self.coords[0] + t * &direction[0],
            &self.coords[1] + t * &direction[1],
            &self.coords[2] + t * &direction[2],
        )
    }

    /// Point at parameter `t` along the segment from `self` to `other`
    pub fn lerp(&self, other: &ExactPoint, t: &Rational) -> ExactPoint {
        self.offset(&self.vector_to(other), t)
    }

    pub fn centroid(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint) -> ExactPoint {
        let three = Rational::from_integer(3.into());
        ExactPoint::new(
            (&a.coords[0] + &b.coords[0] + &c.coords[0]) / &three,
            (&a.coords[1] + &b.coords[1] + &c.coords[1]) / &three,
            (&a.coords[2] + &b.coords[2] + &c.coords[2]) / &three,
        )
    }
}

pub fn cross(u: &ExactVector, v: &ExactVector) -> ExactVector {
    [
        &u[1] * &v[2] - &u[2] * &v[1],
        &u[2] * &v[0] - &u[0] * &v[2],
        &u[0] * &v[1] - &u[1] * &v[0],
    ]
}

pub fn dot(u: &ExactVector, v: &ExactVector) -> Rational {
    &u[0] * &v[0] + &u[1] * &v[1] + &u[2] * &v[2]
}

pub fn is_zero_vector(v: &ExactVector) -> bool {
    v.iter().all(Zero::is_zero)
}

/// Unnormalized normal `(b - a) x (c - a)`
pub fn triangle_normal(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint) -> ExactVector {
    cross(&a.vector_to(b), &a.vector_to(c))
}

/// `((b - a) x (c - a)) . (d - a)`: positive when `d` lies on the side the
/// normal of the counter-clockwise triangle `abc` points to
pub fn orient3d_value(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint, d: &ExactPoint) -> Rational {
    dot(&triangle_normal(a, b, c), &a.vector_to(d))
}

pub fn orient3d(a: &ExactPoint, b: &ExactPoint, c: &ExactPoint, d: &ExactPoint) -> Sign {
    Sign::of(&orient3d_value(a, b, c, d))
}

/// Twice the signed area of the planar triangle `abc`
pub fn orient2d_value(a: &[Rational; 2], b: &[Rational; 2], c: &[Rational; 2]) -> Rational {
    (&b[0] - &a[0]) * (&c[1] - &a[1]) - (&b[1] - &a[1]) * (&c[0] - &a[0])
}

pub fn orient2d(a: &[Rational; 2], b: &[Rational; 2], c: &[Rational; 2]) -> Sign {
    Sign::of(&orient2d_value(a, b, c))
}

/// Axis-dropping projection onto a coordinate plane.
///
/// The kept axes are ordered so a triangle that is counter-clockwise about
/// the normal it was built from stays counter-clockwise in 2-D.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub u: usize,
    pub v: usize,
}

impl Projection {
    /// Projection along the dominant axis of `normal`; `None` for a zero normal
    pub fn for_normal(normal: &ExactVector) -> Option<Self> {
        if is_zero_vector(normal) {
            return None;
        }

        let mut axis = 0;
        for candidate in 1..3 {
            if normal[candidate].abs() > normal[axis].abs() {
                axis = candidate;
            }
        }

        let (u, v) = match axis {
            0 => (1, 2),
            1 => (2, 0),
            _ => (0, 1),
        };

        if normal[axis].is_positive() {
            Some(Self { u, v })
        } else {
            Some(Self { u: v, v: u })
        }
    }

    pub fn apply(&self, point: &ExactPoint) -> [Rational; 2] {
        [point.coords[self.u].clone(), point.coords[self.v].clone()]
    }
}

/// Where a coplanar point sits relative to a triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleLocation {
    Outside,
    /// Coincides with corner `i`
    Vertex(usize),
    /// Open interior of edge `i`, running from corner `i` to corner `i + 1`
    Edge(usize),
    Interior,
}

/// Locate `point`, which must lie in the plane of `triangle`.
///
/// `projection` must come from the triangle's own normal.
pub fn locate_coplanar(
    triangle: [&ExactPoint; 3],
    projection: Projection,
    point: &ExactPoint,
) -> TriangleLocation {
    let corners = triangle.map(|p| projection.apply(p));
    let q = projection.apply(point);

    let signs = [
        orient2d(&corners[0], &corners[1], &q),
        orient2d(&corners[1], &corners[2], &q),
        orient2d(&corners[2], &corners[0], &q),
    ];

    if signs.contains(&Sign::Negative) {
        return TriangleLocation::Outside;
    }

    let zeros: Vec<usize> = (0..3).filter(|&i| signs[i].is_zero()).collect();
    match zeros.as_slice() {
        [] => TriangleLocation::Interior,
        [edge] => TriangleLocation::Edge(*edge),
        _ => {
            // Two vanishing edge tests meet in the corner they share
            if !signs[1].is_zero() {
                TriangleLocation::Vertex(0)
            } else if !signs[2].is_zero() {
                TriangleLocation::Vertex(1)
            } else {
                TriangleLocation::Vertex(2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> ExactPoint {
        ExactPoint::from_point(&Point3::new(x, y, z))
    }

    #[test]
    fn test_rational_roundtrip_is_exact() {
        for value in [0.1, -3.75, 1e-30, 123456789.123] {
            assert_eq!(to_f64(&rational(value)), value);
        }
    }

    #[test]
    fn test_orient3d_sign_convention() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 0.0, 0.0);
        let c = p(0.0, 1.0, 0.0);

        assert_eq!(orient3d(&a, &b, &c, &p(0.2, 0.2, 1.0)), Sign::Positive);
        assert_eq!(orient3d(&a, &b, &c, &p(0.2, 0.2, -1.0)), Sign::Negative);
        assert_eq!(orient3d(&a, &b, &c, &p(5.0, -7.0, 0.0)), Sign::Zero);
    }

    #[test]
    fn test_near_coplanar_is_not_zero() {
        // 0.1 + 0.2 != 0.3 in binary; exact arithmetic must see the offset
        let a = p(0.0, 0.0, 0.3);
        let b = p(1.0, 0.0, 0.3);
        let c = p(0.0, 1.0, 0.3);
        let d = p(0.5, 0.5, 0.1 + 0.2);
        assert_eq!(orient3d(&a, &b, &c, &d), Sign::Positive);
    }

    #[test]
    fn test_projection_preserves_orientation() {
        let tri = [p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(0.0, 1.0, 0.0)];
        let normal = triangle_normal(&tri[0], &tri[1], &tri[2]);
        let projection = Projection::for_normal(&normal).unwrap();
        let corners = tri.each_ref().map(|q| projection.apply(q));
        assert_eq!(orient2d(&corners[0], &corners[1], &corners[2]), Sign::Positive);
    }

    #[test]
    fn test_locate_coplanar() {
        let tri = [p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0)];
        let normal = triangle_normal(&tri[0], &tri[1], &tri[2]);
        let projection = Projection::for_normal(&normal).unwrap();
        let corners = [&tri[0], &tri[1], &tri[2]];

        assert_eq!(
            locate_coplanar(corners, projection, &p(0.5, 0.5, 0.0)),
            TriangleLocation::Interior
        );
        assert_eq!(
            locate_coplanar(corners, projection, &p(1.0, 0.0, 0.0)),
            TriangleLocation::Edge(0)
        );
        assert_eq!(
            locate_coplanar(corners, projection, &p(1.0, 1.0, 0.0)),
            TriangleLocation::Edge(1)
        );
        assert_eq!(
            locate_coplanar(corners, projection, &p(0.0, 2.0, 0.0)),
            TriangleLocation::Vertex(2)
        );
        assert_eq!(
            locate_coplanar(corners, projection, &p(3.0, 3.0, 0.0)),
            TriangleLocation::Outside
        );
    }

    #[test]
    fn test_centroid_is_exact() {
        let c = ExactPoint::centroid(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0));
        let third = Rational::new(1.into(), 3.into());
        assert_eq!(c.coords[0], third);
        assert_eq!(c.coords[1], third);
        assert!(c.coords[2].is_zero());
    }
}
