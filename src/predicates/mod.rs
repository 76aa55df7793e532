// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact geometric predicates for composite queries
//!
//! Two queries drive the whole pipeline: does a segment cross a triangle, and
//! do three triangles share one interior point. Each is first evaluated in
//! floating point with certified error bounds and escalated to exact
//! rational arithmetic only when the filter cannot decide. Both stages share
//! one decision function, so they can never disagree on a definite answer.
//!
//! Boundary contact (a crossing that lands exactly on an edge, a vertex or
//! a plane) counts as empty under open-interior semantics. It is reported as
//! [`Verdict::Degenerate`] so callers can route it to exact contact handling.

pub mod exact;
pub mod filtered;
mod query;
mod stats;

pub use exact::ExactEvaluator;
pub use filtered::FilteredEvaluator;
pub use query::{SegmentTriangle, TriangleTriple};
pub use stats::{PredicateStats, StatsSnapshot};

use crate::geometry::{ExactPoint, Sign};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a composite query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Open interiors do not meet
    Empty,
    /// Open interiors meet in exactly one point
    NonEmpty,
    /// Only boundaries meet, or the configuration is not in general position;
    /// empty for the open-interior question
    Degenerate,
    /// Floating-point stage could not decide
    Uncertain,
}

impl Verdict {
    pub fn is_empty(self) -> bool {
        self != Verdict::NonEmpty
    }
}

/// One evaluation stage of the predicate engine
pub trait Evaluator {
    fn segment_triangle(&self, query: &SegmentTriangle) -> Verdict;
    fn triangle_triple(&self, query: &TriangleTriple) -> Verdict;
}

/// Decide a segment/triangle query from its orientation signs.
///
/// `plane` holds the side of each segment endpoint relative to the triangle,
/// `sides` the orientation of each triangle edge about the segment line.
/// `None` marks a sign the caller could not certify.
pub(crate) fn decide_segment_triangle(plane: [Option<Sign>; 2], sides: [Option<Sign>; 3]) -> Verdict {
    if let [Some(s0), Some(s1)] = plane {
        if s0 == s1 && !s0.is_zero() {
            return Verdict::Empty;
        }
    }

    let has_positive = sides.contains(&Some(Sign::Positive));
    let has_negative = sides.contains(&Some(Sign::Negative));
    if has_positive && has_negative {
        return Verdict::Empty;
    }

    let signs = plane.iter().chain(sides.iter());
    if signs.clone().any(Option::is_none) {
        Verdict::Uncertain
    } else if signs.flatten().any(|sign| sign.is_zero()) {
        Verdict::Degenerate
    } else {
        Verdict::NonEmpty
    }
}

/// Decide a triple query from the sign of the plane determinant and, per
/// triangle, the sign of the candidate point against each edge
pub(crate) fn decide_triangle_triple(det: Option<Sign>, inside: &[[Option<Sign>; 3]; 3]) -> Verdict {
    match det {
        None => return Verdict::Uncertain,
        Some(Sign::Zero) => return Verdict::Degenerate,
        Some(_) => {}
    }

    let signs = inside.iter().flatten();
    if signs.clone().any(|sign| *sign == Some(Sign::Negative)) {
        Verdict::Empty
    } else if signs.clone().any(Option::is_none) {
        Verdict::Uncertain
    } else if signs.flatten().any(|sign| sign.is_zero()) {
        Verdict::Degenerate
    } else {
        Verdict::NonEmpty
    }
}

/// Predicate front door: filter first, exact on demand, optional counters
#[derive(Debug, Clone, Default)]
pub struct Predicates {
    stats: Option<Arc<PredicateStats>>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record call, escalation and degeneracy counts into `stats`
    pub fn with_stats(stats: Arc<PredicateStats>) -> Self {
        Self { stats: Some(stats) }
    }

    pub fn stats(&self) -> Option<&PredicateStats> {
        self.stats.as_deref()
    }

    fn escalate(&self, filtered: Verdict, exact: impl FnOnce() -> Verdict) -> Verdict {
        if let Some(stats) = &self.stats {
            stats.record_call();
        }

        let verdict = match filtered {
            Verdict::Uncertain => {
                if let Some(stats) = &self.stats {
                    stats.record_exact();
                }
                exact()
            }
            definite => definite,
        };

        if verdict == Verdict::Degenerate {
            if let Some(stats) = &self.stats {
                stats.record_degeneracy();
            }
        }
        verdict
    }

    /// Definite verdict for a segment/triangle query; never `Uncertain`
    pub fn classify_segment_triangle(&self, query: &SegmentTriangle) -> Verdict {
        self.escalate(FilteredEvaluator.segment_triangle(query), || {
            ExactEvaluator.segment_triangle(query)
        })
    }

    /// Definite verdict for a triple query; never `Uncertain`
    pub fn classify_triangle_triple(&self, query: &TriangleTriple) -> Verdict {
        self.escalate(FilteredEvaluator.triangle_triple(query), || {
            ExactEvaluator.triangle_triple(query)
        })
    }

    pub fn is_empty_segment_triangle(&self, query: &SegmentTriangle) -> bool {
        self.classify_segment_triangle(query).is_empty()
    }

    pub fn is_empty_triangle_triple(&self, query: &TriangleTriple) -> bool {
        self.classify_triangle_triple(query).is_empty()
    }

    /// Crossing point, rounded from the exact value
    pub fn segment_triangle_coords(&self, query: &SegmentTriangle) -> Option<Point3<f64>> {
        match FilteredEvaluator.segment_triangle(query) {
            Verdict::Empty | Verdict::Degenerate => None,
            _ => self.segment_triangle_coords_exact(query).map(|p| p.to_point()),
        }
    }

    /// Exact crossing point
    pub fn segment_triangle_coords_exact(&self, query: &SegmentTriangle) -> Option<ExactPoint> {
        ExactEvaluator.segment_triangle_point(query)
    }

    /// Common interior point of three triangles, rounded from the exact value
    pub fn triangle_triple_coords(&self, query: &TriangleTriple) -> Option<Point3<f64>> {
        match FilteredEvaluator.triangle_triple(query) {
            Verdict::Empty | Verdict::Degenerate => None,
            _ => self.triangle_triple_coords_exact(query).map(|p| p.to_point()),
        }
    }

    /// Exact common interior point of three triangles
    pub fn triangle_triple_coords_exact(&self, query: &TriangleTriple) -> Option<ExactPoint> {
        ExactEvaluator.triangle_triple_point(query)
    }
}
