// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean classification and assembly
//!
//! Takes a resolution whose faces have been labeled and keeps, drops or
//! flips each face according to the requested operation.

pub mod classification;
mod repair;
pub mod solid;

pub use classification::{patches, Classification, ClassificationStats, Classifier};
pub use repair::unfold_rounded_faces;
pub use solid::is_solid;

use crate::error::{BooleanError, BooleanResult};
use crate::geometry::{Mesh, Triangle};
use crate::resolve::{MeshId, Resolution};
use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Boolean operations on two solids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Intersection,
    /// A minus B
    Difference,
    SymmetricDifference,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BooleanOp::Union => "union",
            BooleanOp::Intersection => "intersection",
            BooleanOp::Difference => "difference",
            BooleanOp::SymmetricDifference => "symmetric difference",
        };
        f.write_str(name)
    }
}

/// What happens to one resolved face in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceAction {
    Drop,
    Keep,
    /// Keep with reversed orientation
    Flip,
}

impl BooleanOp {
    /// Fate of a face from `origin` carrying `label`
    pub fn action(self, origin: MeshId, label: Classification) -> FaceAction {
        use Classification::*;
        use FaceAction::*;

        match (self, origin, label) {
            (BooleanOp::Union, _, Outside) => Keep,
            (BooleanOp::Union, MeshId::A, SameBoundary) => Keep,

            (BooleanOp::Intersection, _, Inside) => Keep,
            (BooleanOp::Intersection, MeshId::A, SameBoundary) => Keep,

            (BooleanOp::Difference, MeshId::A, Outside | OppositeBoundary) => Keep,
            (BooleanOp::Difference, MeshId::B, Inside) => Flip,

            (BooleanOp::SymmetricDifference, _, Outside) => Keep,
            (BooleanOp::SymmetricDifference, _, Inside) => Flip,

            _ => Drop,
        }
    }
}

/// Build the output of `op` from a fully labeled resolution.
///
/// Vertices are renumbered in order of first use and rounded to `f64`;
/// faces folded over by that rounding are repaired with edge flips.
/// With `verify`, every directed edge of the output must be matched by its
/// reverse.
pub fn assemble(resolution: &Resolution, op: BooleanOp, verify: bool) -> BooleanResult<Mesh> {
    let mut kept: Vec<[usize; 3]> = Vec::new();
    let mut flipped = 0;

    for (index, face) in resolution.faces.iter().enumerate() {
        let label = face
            .label
            .ok_or_else(|| BooleanError::topology(format!("face {index} has no label")))?;

        let corners = match op.action(face.origin, label) {
            FaceAction::Drop => continue,
            FaceAction::Keep => face.vertices,
            FaceAction::Flip => {
                flipped += 1;
                let [a, b, c] = face.vertices;
                [a, c, b]
            }
        };

        kept.push(corners);
    }

    let unfolded = unfold_rounded_faces(&resolution.arena, &mut kept);

    let mut output = Mesh::with_capacity(kept.len(), kept.len());
    let mut remap: AHashMap<usize, usize> = AHashMap::new();
    for corners in kept {
        let indices = corners.map(|v| {
            *remap
                .entry(v)
                .or_insert_with(|| output.add_vertex(resolution.arena.point(v).to_point()))
        });
        output.add_triangle(Triangle::new(indices));
    }

    debug!(
        "Assembled {op}: {} faces ({flipped} flipped, {unfolded} edges unfolded) over {} vertices",
        output.triangle_count(),
        output.vertex_count()
    );

    if verify && !output.has_balanced_edges() {
        return Err(BooleanError::topology(format!(
            "{op} output has unmatched edges"
        )));
    }
    Ok(output)
}
