// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounding Volume Hierarchy (BVH) for spatial acceleration
//! Used to find face pairs whose bounding boxes overlap

use super::BoundingBox;

/// BVH node
#[derive(Debug, Clone)]
pub struct BVHNode {
    /// Bounding box of this node
    pub bbox: BoundingBox,
    /// Left child (None for leaf)
    pub left: Option<Box<BVHNode>>,
    /// Right child (None for leaf)
    pub right: Option<Box<BVHNode>>,
    /// Faces with their own boxes (only for leaf nodes)
    pub faces: Vec<(usize, BoundingBox)>,
}

impl BVHNode {
    fn leaf(bbox: BoundingBox, faces: Vec<(usize, BoundingBox)>) -> Self {
        Self {
            bbox,
            left: None,
            right: None,
            faces,
        }
    }

    fn internal(bbox: BoundingBox, left: Box<BVHNode>, right: Box<BVHNode>) -> Self {
        Self {
            bbox,
            left: Some(left),
            right: Some(right),
            faces: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Bounding Volume Hierarchy over mesh faces
#[derive(Debug, Clone)]
pub struct BVH {
    root: BVHNode,
}

impl BVH {
    const MAX_DEPTH: usize = 32;
    const MAX_LEAF_FACES: usize = 4;

    /// Build from `(face_index, bbox)` pairs
    pub fn build(faces: Vec<(usize, BoundingBox)>) -> Self {
        if faces.is_empty() {
            return Self {
                root: BVHNode::leaf(BoundingBox::empty(), Vec::new()),
            };
        }

        Self {
            root: Self::build_recursive(faces, 0),
        }
    }

    fn build_recursive(mut faces: Vec<(usize, BoundingBox)>, depth: usize) -> BVHNode {
        let bbox = faces
            .iter()
            .fold(BoundingBox::empty(), |acc, (_, b)| acc.union(b));

        if faces.len() <= Self::MAX_LEAF_FACES || depth >= Self::MAX_DEPTH {
            return BVHNode::leaf(bbox, faces);
        }

        // Split along the longest axis; ties on the center keep face order
        let size = bbox.size();
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };

        faces.sort_by(|(ia, a), (ib, b)| {
            a.center()[axis]
                .total_cmp(&b.center()[axis])
                .then(ia.cmp(ib))
        });

        let right_faces = faces.split_off(faces.len() / 2);
        let left = Box::new(Self::build_recursive(faces, depth + 1));
        let right = Box::new(Self::build_recursive(right_faces, depth + 1));

        BVHNode::internal(bbox, left, right)
    }

    /// Faces whose boxes intersect `bbox`, in ascending index order
    pub fn query(&self, bbox: &BoundingBox) -> Vec<usize> {
        let mut result = Vec::new();
        Self::query_recursive(&self.root, bbox, &mut result);
        result.sort_unstable();
        result
    }

    fn query_recursive(node: &BVHNode, bbox: &BoundingBox, result: &mut Vec<usize>) {
        if !node.bbox.intersects(bbox) {
            return;
        }

        if node.is_leaf() {
            result.extend(
                node.faces
                    .iter()
                    .filter(|(_, face_box)| face_box.intersects(bbox))
                    .map(|(idx, _)| *idx),
            );
            return;
        }

        if let Some(ref left) = node.left {
            Self::query_recursive(left, bbox, result);
        }
        if let Some(ref right) = node.right {
            Self::query_recursive(right, bbox, result);
        }
    }

    #[cfg(test)]
    pub fn root(&self) -> &BVHNode {
        &self.root
    }
}
