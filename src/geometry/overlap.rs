// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Candidate search for face pairs and triples with overlapping boxes
//!
//! Boxes are built from the exact `f64` corner coordinates and compared with
//! closed inequalities, so no geometrically touching candidate is dropped.
//! False positives are left for the predicate engine to reject.

use super::{BoundingBox, Mesh, BVH};

/// Face boxes of one mesh plus a BVH over them
pub struct OverlapFinder {
    boxes: Vec<BoundingBox>,
    bvh: BVH,
}

impl OverlapFinder {
    pub fn new(mesh: &Mesh) -> Self {
        let boxes: Vec<BoundingBox> = (0..mesh.triangle_count())
            .map(|idx| mesh.triangle_bbox(idx))
            .collect();
        let bvh = BVH::build(boxes.iter().copied().enumerate().collect());
        Self { boxes, bvh }
    }

    /// Box of face `face`
    pub fn face_box(&self, face: usize) -> &BoundingBox {
        &self.boxes[face]
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Faces whose boxes touch `bbox`, ascending
    pub fn candidates(&self, bbox: &BoundingBox) -> Vec<usize> {
        self.bvh.query(bbox)
    }
}

/// All `(face_a, face_b)` pairs with overlapping boxes, in lexicographic order
pub fn overlapping_pairs(a: &Mesh, b: &Mesh) -> Vec<(usize, usize)> {
    let finder = OverlapFinder::new(b);
    let mut pairs = Vec::new();
    for face_a in 0..a.triangle_count() {
        let bbox = a.triangle_bbox(face_a);
        pairs.extend(finder.candidates(&bbox).into_iter().map(|face_b| (face_a, face_b)));
    }
    pairs
}

/// All `(i, j)` pairs with `i < j` whose boxes overlap within one mesh
pub fn self_overlapping_pairs(mesh: &Mesh) -> Vec<(usize, usize)> {
    let finder = OverlapFinder::new(mesh);
    let mut pairs = Vec::new();
    for i in 0..mesh.triangle_count() {
        pairs.extend(
            finder
                .candidates(finder.face_box(i))
                .into_iter()
                .filter(|&j| j > i)
                .map(|j| (i, j)),
        );
    }
    pairs
}

/// Pairs `(g, h)`, `g < h`, drawn from `partners` whose boxes overlap.
///
/// `partners` are faces already known to touch one anchor face, so every
/// triple of anchor, `g` and `h` has pairwise-overlapping boxes.
pub fn chained_triples(partners: &[usize], boxes: &[BoundingBox]) -> Vec<(usize, usize)> {
    let mut sorted = partners.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut triples = Vec::new();
    for (i, &g) in sorted.iter().enumerate() {
        for &h in &sorted[i + 1..] {
            if boxes[g].intersects(&boxes[h]) {
                triples.push((g, h));
            }
        }
    }
    triples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn test_pairs_match_brute_force() {
        let a = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let b = Primitive::cuboid(Point3::new(0.5, 0.25, 0.25), Point3::new(1.5, 0.75, 0.75)).to_mesh();

        let pairs = overlapping_pairs(&a, &b);
        let mut brute = Vec::new();
        for i in 0..a.triangle_count() {
            for j in 0..b.triangle_count() {
                if a.triangle_bbox(i).intersects(&b.triangle_bbox(j)) {
                    brute.push((i, j));
                }
            }
        }
        assert_eq!(pairs, brute);
    }

    #[test]
    fn test_disjoint_meshes_have_no_pairs() {
        let a = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        let mut b = a.clone();
        b.translate(&Vector3::new(3.0, 0.0, 0.0));
        assert!(overlapping_pairs(&a, &b).is_empty());
    }

    #[test]
    fn test_self_pairs_are_ordered() {
        let mesh = Primitive::tetrahedron(1.0).to_mesh();
        let pairs = self_overlapping_pairs(&mesh);
        // Every face of a tetrahedron touches every other face
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_chained_triples() {
        let boxes = vec![
            BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)),
            BoundingBox::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0)),
            BoundingBox::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0)),
        ];
        assert_eq!(chained_triples(&[2, 1, 0, 1], &boxes), vec![(0, 1)]);
    }
}
