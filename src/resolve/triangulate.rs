// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact constrained retriangulation of one input face
//!
//! The face is projected along its dominant normal axis with orientation
//! kept, so every triangle stays counter-clockwise in 2-D and the output
//! inherits the input winding. Points go in first, then constraint segments.

use super::arena::{edge_key, VertexArena};
use crate::error::{BooleanError, BooleanResult};
use crate::geometry::exact::{locate_coplanar, orient2d, Projection, TriangleLocation};
use crate::geometry::{Rational, Sign};
use ahash::{AHashMap, AHashSet};
use num_traits::Signed;

pub struct FaceTriangulation<'a> {
    arena: &'a VertexArena,
    projection: Projection,
    triangles: Vec<[usize; 3]>,
    constrained: AHashSet<(usize, usize)>,
}

impl<'a> FaceTriangulation<'a> {
    /// Start from the single triangle `corners`
    pub fn new(arena: &'a VertexArena, corners: [usize; 3], projection: Projection) -> Self {
        Self {
            arena,
            projection,
            triangles: vec![corners],
            constrained: AHashSet::new(),
        }
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<[usize; 3]> {
        self.triangles
    }

    pub fn is_constrained(&self, a: usize, b: usize) -> bool {
        self.constrained.contains(&edge_key(a, b))
    }

    fn has_vertex(&self, id: usize) -> bool {
        self.triangles.iter().any(|t| t.contains(&id))
    }

    fn project(&self, id: usize) -> [Rational; 2] {
        self.projection.apply(self.arena.point(id))
    }

    fn locate(&self, triangle: &[usize; 3], id: usize) -> TriangleLocation {
        locate_coplanar(
            triangle.map(|v| self.arena.point(v)),
            self.projection,
            self.arena.point(id),
        )
    }

    /// Triangle holding the directed edge `a -> b`
    fn find_directed(&self, a: usize, b: usize) -> Option<usize> {
        self.triangles.iter().position(|t| {
            (0..3).any(|i| t[i] == a && t[(i + 1) % 3] == b)
        })
    }

    /// Insert a point lying in the closed face
    pub fn insert_point(&mut self, id: usize) -> BooleanResult<()> {
        if self.has_vertex(id) {
            return Ok(());
        }

        for index in 0..self.triangles.len() {
            let triangle = self.triangles[index];
            match self.locate(&triangle, id) {
                TriangleLocation::Outside => continue,
                TriangleLocation::Vertex(_) => return Ok(()),
                TriangleLocation::Interior => {
                    let [a, b, c] = triangle;
                    self.triangles[index] = [a, b, id];
                    self.triangles.push([b, c, id]);
                    self.triangles.push([c, a, id]);
                    return Ok(());
                }
                TriangleLocation::Edge(i) => {
                    let (u, v, w) = (triangle[i], triangle[(i + 1) % 3], triangle[(i + 2) % 3]);
                    self.triangles[index] = [u, id, w];
                    self.triangles.push([id, v, w]);

                    if let Some(neighbor) = self.find_directed(v, u) {
                        let x = self.opposite(neighbor, v, u);
                        self.triangles[neighbor] = [v, id, x];
                        self.triangles.push([id, u, x]);
                    }

                    if self.constrained.remove(&edge_key(u, v)) {
                        self.constrained.insert(edge_key(u, id));
                        self.constrained.insert(edge_key(id, v));
                    }
                    return Ok(());
                }
            }
        }

        Err(BooleanError::topology(format!(
            "vertex {id} does not lie on the face being retriangulated"
        )))
    }

    /// Corner of triangle `index` that is neither `a` nor `b`
    fn opposite(&self, index: usize, a: usize, b: usize) -> usize {
        let t = self.triangles[index];
        t.into_iter()
            .find(|&v| v != a && v != b)
            .unwrap_or(t[0])
    }

    /// Force the segment `u -> v` into the triangulation.
    ///
    /// Both endpoints must already be vertices. Returns the sub-edges the
    /// segment was split into.
    pub fn insert_segment(&mut self, u: usize, v: usize) -> BooleanResult<Vec<(usize, usize)>> {
        if u == v {
            return Ok(Vec::new());
        }
        if !self.has_vertex(u) || !self.has_vertex(v) {
            return Err(BooleanError::topology(format!(
                "constraint {u}-{v} has an endpoint missing from the face"
            )));
        }

        if self.find_directed(u, v).is_some() || self.find_directed(v, u).is_some() {
            self.constrained.insert(edge_key(u, v));
            return Ok(vec![(u, v)]);
        }

        if let Some(w) = self.nearest_vertex_between(u, v) {
            let mut edges = self.insert_segment(u, w)?;
            edges.extend(self.insert_segment(w, v)?);
            return Ok(edges);
        }

        self.carve_segment(u, v)?;
        self.constrained.insert(edge_key(u, v));
        Ok(vec![(u, v)])
    }

    /// Vertex strictly inside segment `u v` closest to `u`
    fn nearest_vertex_between(&self, u: usize, v: usize) -> Option<usize> {
        let pu = self.project(u);
        let pv = self.project(v);
        let direction = [&pv[0] - &pu[0], &pv[1] - &pu[1]];
        let length = &direction[0] * &direction[0] + &direction[1] * &direction[1];

        let mut vertices: Vec<usize> = self.triangles.iter().flatten().copied().collect();
        vertices.sort_unstable();
        vertices.dedup();

        vertices
            .into_iter()
            .filter(|&w| w != u && w != v)
            .filter_map(|w| {
                let pw = self.project(w);
                if !orient2d(&pu, &pv, &pw).is_zero() {
                    return None;
                }
                let along = (&pw[0] - &pu[0]) * &direction[0] + (&pw[1] - &pu[1]) * &direction[1];
                (along.is_positive() && along < length).then_some((along, w))
            })
            .min()
            .map(|(_, w)| w)
    }

    /// Does the open segment `u v` meet the open interior of `triangle`?
    fn crosses(&self, triangle: &[usize; 3], pu: &[Rational; 2], pv: &[Rational; 2]) -> bool {
        let corners = triangle.map(|c| self.project(c));

        let sides: Vec<Sign> = corners.iter().map(|c| orient2d(pu, pv, c)).collect();
        if !(sides.contains(&Sign::Positive) && sides.contains(&Sign::Negative)) {
            return false;
        }

        (0..3).all(|i| {
            let (a, b) = (&corners[i], &corners[(i + 1) % 3]);
            orient2d(a, b, pu) == Sign::Positive || orient2d(a, b, pv) == Sign::Positive
        })
    }

    /// Remove every triangle crossed by `u v` and fill the two sides by ear
    /// clipping so that `u v` becomes an edge
    fn carve_segment(&mut self, u: usize, v: usize) -> BooleanResult<()> {
        let pu = self.project(u);
        let pv = self.project(v);

        let (removed, kept): (Vec<[usize; 3]>, Vec<[usize; 3]>) = self
            .triangles
            .iter()
            .partition(|t| self.crosses(t, &pu, &pv));
        if removed.is_empty() {
            return Err(BooleanError::topology(format!(
                "constraint {u}-{v} crosses no triangle of its face"
            )));
        }

        let directed: AHashSet<(usize, usize)> = removed
            .iter()
            .flat_map(|t| (0..3).map(move |i| (t[i], t[(i + 1) % 3])))
            .collect();

        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for &(a, b) in &directed {
            if directed.contains(&(b, a)) {
                if self.constrained.contains(&edge_key(a, b)) {
                    return Err(BooleanError::topology(format!(
                        "constraint {u}-{v} crosses constraint {a}-{b}"
                    )));
                }
            } else {
                boundary.push((a, b));
            }
        }
        boundary.sort_unstable();

        let mut next = AHashMap::with_capacity(boundary.len());
        for &(a, b) in &boundary {
            if next.insert(a, b).is_some() {
                return Err(BooleanError::topology(format!(
                    "cavity around constraint {u}-{v} is pinched at vertex {a}"
                )));
            }
        }

        let mut upper = vec![u];
        let mut lower = vec![v];
        let mut current = u;
        let mut reached_v = false;
        for _ in 0..boundary.len() {
            let Some(&following) = next.get(&current) else {
                break;
            };
            if following == u {
                break;
            }
            if following == v {
                reached_v = true;
            }
            if reached_v {
                lower.push(following);
            } else {
                upper.push(following);
            }
            current = following;
        }
        if !reached_v || current == u {
            return Err(BooleanError::topology(format!(
                "cavity around constraint {u}-{v} is not a simple cycle"
            )));
        }
        upper.push(v);
        lower.dedup();
        lower.push(u);

        let mut triangles = kept;
        triangles.extend(self.ear_clip(upper)?);
        triangles.extend(self.ear_clip(lower)?);
        self.triangles = triangles;
        Ok(())
    }

    /// Strict ear clipping of a counter-clockwise simple polygon
    fn ear_clip(&self, mut polygon: Vec<usize>) -> BooleanResult<Vec<[usize; 3]>> {
        let mut triangles = Vec::with_capacity(polygon.len().saturating_sub(2));
        while polygon.len() > 3 {
            let n = polygon.len();
            let ear = (0..n).find(|&i| {
                let (a, b, c) = (polygon[(i + n - 1) % n], polygon[i], polygon[(i + 1) % n]);
                self.is_ear(a, b, c, &polygon)
            });
            let Some(i) = ear else {
                return Err(BooleanError::topology("ear clipping found no valid ear"));
            };
            triangles.push([polygon[(i + n - 1) % n], polygon[i], polygon[(i + 1) % n]]);
            polygon.remove(i);
        }

        if polygon.len() == 3 {
            let [a, b, c] = [polygon[0], polygon[1], polygon[2]];
            if orient2d(&self.project(a), &self.project(b), &self.project(c)) != Sign::Positive {
                return Err(BooleanError::topology("ear clipping left a flat triangle"));
            }
            triangles.push([a, b, c]);
        }
        Ok(triangles)
    }

    fn is_ear(&self, a: usize, b: usize, c: usize, polygon: &[usize]) -> bool {
        let (pa, pb, pc) = (self.project(a), self.project(b), self.project(c));
        if orient2d(&pa, &pb, &pc) != Sign::Positive {
            return false;
        }
        polygon
            .iter()
            .filter(|&&w| w != a && w != b && w != c)
            .all(|&w| {
                let pw = self.project(w);
                orient2d(&pa, &pb, &pw) == Sign::Negative
                    || orient2d(&pb, &pc, &pw) == Sign::Negative
                    || orient2d(&pc, &pa, &pw) == Sign::Negative
            })
    }
}
