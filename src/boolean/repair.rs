// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Repair of output faces folded over by rounding to `f64`
//!
//! An inserted vertex that lies very close to an edge of its own face can
//! round onto the far side of that edge. When the face and its neighbour
//! across the edge are exactly coplanar, flipping the shared edge covers the
//! same region with two faces that keep their orientation after rounding.

use crate::geometry::exact::{dot, orient3d, triangle_normal, ExactVector};
use crate::geometry::ExactPoint;
use crate::resolve::VertexArena;
use ahash::AHashMap;
use log::{debug, warn};
use num_traits::Signed;

const MAX_PASSES: usize = 8;

/// Output faces over arena vertices plus the exact value of each rounded
/// vertex
struct RoundedFaces<'a> {
    arena: &'a VertexArena,
    faces: &'a mut [[usize; 3]],
    /// Rounded positions of vertices that moved when rounded
    moved: AHashMap<usize, ExactPoint>,
    /// Directed edge to the face holding it
    edges: AHashMap<(usize, usize), usize>,
}

impl<'a> RoundedFaces<'a> {
    fn new(arena: &'a VertexArena, faces: &'a mut [[usize; 3]]) -> Self {
        let mut moved = AHashMap::new();
        let mut edges = AHashMap::with_capacity(faces.len() * 3);
        for (index, face) in faces.iter().enumerate() {
            for k in 0..3 {
                edges.insert((face[k], face[(k + 1) % 3]), index);
                let v = face[k];
                if moved.contains_key(&v) {
                    continue;
                }
                let exact = arena.point(v);
                let rounded = ExactPoint::from_point(&exact.to_point());
                if &rounded != exact {
                    moved.insert(v, rounded);
                }
            }
        }
        Self {
            arena,
            faces,
            moved,
            edges,
        }
    }

    fn rounded(&self, v: usize) -> &ExactPoint {
        self.moved.get(&v).unwrap_or_else(|| self.arena.point(v))
    }

    fn exact_normal(&self, face: [usize; 3]) -> ExactVector {
        let [a, b, c] = face.map(|v| self.arena.point(v));
        triangle_normal(a, b, c)
    }

    /// Does `face` still face along `normal` once rounded?
    fn rounded_agrees(&self, face: [usize; 3], normal: &ExactVector) -> bool {
        if face.iter().all(|v| !self.moved.contains_key(v)) {
            return dot(&self.exact_normal(face), normal).is_positive();
        }
        let [a, b, c] = face.map(|v| self.rounded(v));
        dot(&triangle_normal(a, b, c), normal).is_positive()
    }

    fn is_folded(&self, index: usize) -> bool {
        let face = self.faces[index];
        if face.iter().all(|v| !self.moved.contains_key(v)) {
            return false;
        }
        !self.rounded_agrees(face, &self.exact_normal(face))
    }

    /// Flip one edge of the folded face `index`; false when no edge works
    fn unfold(&mut self, index: usize) -> bool {
        let face = self.faces[index];
        let plane = self.exact_normal(face);

        for k in 0..3 {
            let (p, q, v) = (face[k], face[(k + 1) % 3], face[(k + 2) % 3]);
            let Some(&other) = self.edges.get(&(q, p)) else {
                continue;
            };
            let neighbour = self.faces[other];
            let Some(&w) = neighbour.iter().find(|&&c| c != p && c != q) else {
                continue;
            };
            if w == v || self.edges.contains_key(&(v, w)) || self.edges.contains_key(&(w, v)) {
                continue;
            }

            let [ep, eq, ev, ew] = [p, q, v, w].map(|id| self.arena.point(id));
            if !orient3d(ep, eq, ev, ew).is_zero() {
                continue;
            }

            let replacement = [[w, q, v], [v, p, w]];
            let valid = replacement.iter().all(|&t| {
                dot(&self.exact_normal(t), &plane).is_positive() && self.rounded_agrees(t, &plane)
            });
            if !valid {
                continue;
            }

            for old in [face, neighbour] {
                for j in 0..3 {
                    self.edges.remove(&(old[j], old[(j + 1) % 3]));
                }
            }
            self.faces[index] = replacement[0];
            self.faces[other] = replacement[1];
            for (slot, t) in [(index, replacement[0]), (other, replacement[1])] {
                for j in 0..3 {
                    self.edges.insert((t[j], t[(j + 1) % 3]), slot);
                }
            }
            return true;
        }
        false
    }
}

/// Flip edges until no face of `faces` is folded by rounding its vertices
/// to `f64`. Returns the number of flips.
pub fn unfold_rounded_faces(arena: &VertexArena, faces: &mut [[usize; 3]]) -> usize {
    let mut state = RoundedFaces::new(arena, faces);
    if state.moved.is_empty() {
        return 0;
    }

    let mut flips = 0;
    for _ in 0..MAX_PASSES {
        let folded: Vec<usize> = (0..state.faces.len()).filter(|&f| state.is_folded(f)).collect();
        if folded.is_empty() {
            break;
        }

        let mut progress = false;
        for index in folded {
            if state.is_folded(index) && state.unfold(index) {
                flips += 1;
                progress = true;
            }
        }
        if !progress {
            break;
        }
    }

    let remaining = (0..state.faces.len()).filter(|&f| state.is_folded(f)).count();
    if remaining > 0 {
        warn!("{remaining} faces stay folded after rounding");
    } else if flips > 0 {
        debug!("Flipped {flips} edges folded by rounding");
    }
    flips
}
