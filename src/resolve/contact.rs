// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact closed-set contact between two triangles
//!
//! Used wherever a composite query came back degenerate: the open-interior
//! answer says "empty", but the resolver still needs the shared boundary
//! geometry to keep both meshes consistent.

use crate::geometry::exact::{
    cross, is_zero_vector, orient2d, orient2d_value, orient3d_value, triangle_normal, Projection,
};
use crate::geometry::{ExactPoint, Rational, Sign};
use num_traits::{Signed, Zero};

/// Shape of the closed intersection of two triangles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contact {
    Empty,
    Point(ExactPoint),
    Segment(ExactPoint, ExactPoint),
    /// Convex polygon of coplanar overlap, counter-clockwise about the first
    /// triangle's normal
    Polygon(Vec<ExactPoint>),
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        matches!(self, Contact::Empty)
    }

    pub fn points(&self) -> Vec<&ExactPoint> {
        match self {
            Contact::Empty => Vec::new(),
            Contact::Point(p) => vec![p],
            Contact::Segment(p, q) => vec![p, q],
            Contact::Polygon(points) => points.iter().collect(),
        }
    }

    /// Boundary segments that must appear as edges in both triangles
    pub fn segments(&self) -> Vec<(&ExactPoint, &ExactPoint)> {
        match self {
            Contact::Empty | Contact::Point(_) => Vec::new(),
            Contact::Segment(p, q) => vec![(p, q)],
            Contact::Polygon(points) => (0..points.len())
                .map(|i| (&points[i], &points[(i + 1) % points.len()]))
                .collect(),
        }
    }
}

/// Closed intersection of triangles `a` and `b`; both must be non-degenerate
pub fn triangle_contact(a: [&ExactPoint; 3], b: [&ExactPoint; 3]) -> Contact {
    let a_values = a.map(|p| orient3d_value(b[0], b[1], b[2], p));
    if same_strict_side(&a_values) {
        return Contact::Empty;
    }
    let b_values = b.map(|p| orient3d_value(a[0], a[1], a[2], p));
    if same_strict_side(&b_values) {
        return Contact::Empty;
    }

    if a_values.iter().all(Zero::is_zero) {
        return coplanar_contact(a, b);
    }

    let a_section = plane_section(a, &a_values);
    let b_section = plane_section(b, &b_values);
    let direction = cross(
        &triangle_normal(a[0], a[1], a[2]),
        &triangle_normal(b[0], b[1], b[2]),
    );
    overlap_on_line(&a_section, &b_section, &direction)
}

fn same_strict_side(values: &[Rational; 3]) -> bool {
    values.iter().all(Signed::is_positive) || values.iter().all(Signed::is_negative)
}

/// Part of a triangle lying in the other triangle's plane: one or two points
fn plane_section(tri: [&ExactPoint; 3], values: &[Rational; 3]) -> Vec<ExactPoint> {
    let mut section = Vec::with_capacity(2);
    for i in 0..3 {
        let j = (i + 1) % 3;
        if values[i].is_zero() {
            section.push(tri[i].clone());
        }
        let (si, sj) = (Sign::of(&values[i]), Sign::of(&values[j]));
        if !si.is_zero() && sj == si.opposite() {
            let t = &values[i] / (&values[i] - &values[j]);
            section.push(tri[i].lerp(tri[j], &t));
        }
    }
    section
}

/// Intersect two collinear point sets along the line with `direction`
fn overlap_on_line(a: &[ExactPoint], b: &[ExactPoint], direction: &[Rational; 3]) -> Contact {
    if a.is_empty() || b.is_empty() || is_zero_vector(direction) {
        return Contact::Empty;
    }

    let mut axis = 0;
    for candidate in 1..3 {
        if direction[candidate].abs() > direction[axis].abs() {
            axis = candidate;
        }
    }

    let key = |p: &&ExactPoint| p.coords[axis].clone();
    let (Some(a_lo), Some(a_hi)) = (a.iter().min_by_key(key), a.iter().max_by_key(key)) else {
        return Contact::Empty;
    };
    let (Some(b_lo), Some(b_hi)) = (b.iter().min_by_key(key), b.iter().max_by_key(key)) else {
        return Contact::Empty;
    };

    let lo = if a_lo.coords[axis] >= b_lo.coords[axis] { a_lo } else { b_lo };
    let hi = if a_hi.coords[axis] <= b_hi.coords[axis] { a_hi } else { b_hi };

    match lo.coords[axis].cmp(&hi.coords[axis]) {
        std::cmp::Ordering::Greater => Contact::Empty,
        std::cmp::Ordering::Equal => Contact::Point(lo.clone()),
        std::cmp::Ordering::Less => Contact::Segment(lo.clone(), hi.clone()),
    }
}

/// Sutherland-Hodgman clip of `b` against `a` in `a`'s projection
fn coplanar_contact(a: [&ExactPoint; 3], b: [&ExactPoint; 3]) -> Contact {
    let Some(projection) = Projection::for_normal(&triangle_normal(a[0], a[1], a[2])) else {
        return Contact::Empty;
    };
    let a2 = a.map(|p| projection.apply(p));

    let mut polygon: Vec<ExactPoint> = b.iter().map(|p| (*p).clone()).collect();
    let b2 = b.map(|p| projection.apply(p));
    if orient2d(&b2[0], &b2[1], &b2[2]) == Sign::Negative {
        polygon.reverse();
    }

    for i in 0..3 {
        let (from, to) = (&a2[i], &a2[(i + 1) % 3]);
        let values: Vec<Rational> = polygon
            .iter()
            .map(|p| orient2d_value(from, to, &projection.apply(p)))
            .collect();

        let mut clipped = Vec::with_capacity(polygon.len() + 1);
        for k in 0..polygon.len() {
            let prev = (k + polygon.len() - 1) % polygon.len();
            let (s, e) = (&polygon[prev], &polygon[k]);
            let (vs, ve) = (&values[prev], &values[k]);
            let s_inside = !vs.is_negative();
            let e_inside = !ve.is_negative();

            if e_inside {
                if !s_inside {
                    clipped.push(s.lerp(e, &(vs / (vs - ve))));
                }
                clipped.push(e.clone());
            } else if s_inside && vs.is_positive() {
                clipped.push(s.lerp(e, &(vs / (vs - ve))));
            }
        }
        polygon = clipped;
        if polygon.is_empty() {
            return Contact::Empty;
        }
    }

    let mut distinct: Vec<ExactPoint> = Vec::with_capacity(polygon.len());
    for point in polygon {
        if !distinct.contains(&point) {
            distinct.push(point);
        }
    }

    match distinct.len() {
        0 => Contact::Empty,
        1 => Contact::Point(distinct.remove(0)),
        _ => {
            let projected: Vec<[Rational; 2]> =
                distinct.iter().map(|p| projection.apply(p)).collect();
            let collinear = (2..projected.len())
                .all(|k| orient2d(&projected[0], &projected[1], &projected[k]).is_zero());
            if collinear {
                let order = |k: &usize| projected[*k].clone();
                let lo = (0..distinct.len()).min_by_key(order);
                let hi = (0..distinct.len()).max_by_key(order);
                match (lo, hi) {
                    (Some(lo), Some(hi)) => {
                        Contact::Segment(distinct[lo].clone(), distinct[hi].clone())
                    }
                    _ => Contact::Empty,
                }
            } else {
                Contact::Polygon(distinct)
            }
        }
    }
}
