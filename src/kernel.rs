// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API for Boolean operations

use crate::boolean::{assemble, BooleanOp, ClassificationStats, Classifier};
use crate::config::BooleanConfig;
use crate::error::{BooleanError, BooleanResult};
use crate::exchange::TriMesh;
use crate::geometry::Mesh;
use crate::predicates::{PredicateStats, Predicates, StatsSnapshot};
use crate::resolve::{MeshId, ResolveStats, Resolver};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag checked between phases of a long operation
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters collected while running one operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationReport {
    pub resolve: ResolveStats,
    pub classification: ClassificationStats,
    /// Predicate counters, when the kernel carries shared stats
    pub predicates: Option<StatsSnapshot>,
    pub duration: Duration,
}

/// Result mesh of an operation plus its report
#[derive(Debug, Clone)]
pub struct OperationOutput {
    pub mesh: TriMesh,
    pub report: OperationReport,
}

/// Main kernel for Boolean operations
#[derive(Debug, Clone, Default)]
pub struct BooleanKernel {
    config: BooleanConfig,
    predicates: Predicates,
    cancel: Option<CancelToken>,
}

impl BooleanKernel {
    pub fn new(config: BooleanConfig) -> Self {
        Self {
            config,
            predicates: Predicates::new(),
            cancel: None,
        }
    }

    /// Record predicate counters into `stats`
    pub fn with_stats(mut self, stats: Arc<PredicateStats>) -> Self {
        self.predicates = Predicates::with_stats(stats);
        self
    }

    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &BooleanConfig {
        &self.config
    }

    pub fn predicates(&self) -> &Predicates {
        &self.predicates
    }

    /// Whether `mesh` is closed and free of self-intersections
    ///
    /// A zero-area triangle makes the mesh not solid; malformed buffers are
    /// still errors.
    pub fn is_solid(&self, mesh: &TriMesh) -> BooleanResult<bool> {
        match mesh.to_mesh(self.config.weld_vertices) {
            Ok(mesh) => Ok(crate::boolean::is_solid(&mesh, &self.predicates)),
            Err(BooleanError::DegenerateTriangle { triangle }) => {
                debug!("Triangle {triangle} has zero area");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    pub fn union(&self, a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
        self.boolean(BooleanOp::Union, a, b)
    }

    /// `a` minus `b`
    pub fn difference(&self, a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
        self.boolean(BooleanOp::Difference, a, b)
    }

    pub fn intersection(&self, a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
        self.boolean(BooleanOp::Intersection, a, b)
    }

    pub fn symmetric_difference(&self, a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
        self.boolean(BooleanOp::SymmetricDifference, a, b)
    }

    pub fn boolean(&self, op: BooleanOp, a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
        self.run(op, a, b).map(|output| output.mesh)
    }

    /// Run `op` and report what it took
    pub fn run(&self, op: BooleanOp, a: &TriMesh, b: &TriMesh) -> BooleanResult<OperationOutput> {
        let start = Instant::now();
        let (a, b) = self.prepare(a, b)?;

        let mut resolution = self.resolver().resolve(&a, &b)?;
        self.check_cancelled()?;

        let classification = Classifier::new(&a, &b, self.config.max_ray_attempts)
            .classify(&mut resolution)?;
        self.check_cancelled()?;

        let output = assemble(&resolution, op, self.config.verify)?;
        let report = OperationReport {
            resolve: resolution.stats,
            classification,
            predicates: self.predicates.stats().map(|s| s.snapshot()),
            duration: start.elapsed(),
        };
        self.log_report(&op.to_string(), &report);

        Ok(OperationOutput {
            mesh: TriMesh::from(&output),
            report,
        })
    }

    /// Both inputs cut along their intersection, without classification
    pub fn resolve(&self, a: &TriMesh, b: &TriMesh) -> BooleanResult<TriMesh> {
        self.run_resolve(a, b).map(|output| output.mesh)
    }

    pub fn run_resolve(&self, a: &TriMesh, b: &TriMesh) -> BooleanResult<OperationOutput> {
        let start = Instant::now();
        let (a, b) = self.prepare(a, b)?;
        let resolution = self.resolver().resolve(&a, &b)?;

        let report = OperationReport {
            predicates: self.predicates.stats().map(|s| s.snapshot()),
            duration: start.elapsed(),
            resolve: resolution.stats.clone(),
            ..OperationReport::default()
        };
        self.log_report("resolve", &report);

        Ok(OperationOutput {
            mesh: TriMesh::from(&resolution.combined()),
            report,
        })
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.predicates)
            .with_verification(self.config.verify)
            .with_cancellation(self.cancel.as_ref())
    }

    fn prepare(&self, a: &TriMesh, b: &TriMesh) -> BooleanResult<(Mesh, Mesh)> {
        self.check_cancelled()?;
        let a = self.operand(a, MeshId::A)?;
        let b = self.operand(b, MeshId::B)?;
        debug!(
            "Operands: A has {} faces, B has {} faces",
            a.triangle_count(),
            b.triangle_count()
        );
        Ok((a, b))
    }

    fn operand(&self, mesh: &TriMesh, id: MeshId) -> BooleanResult<Mesh> {
        let mesh = mesh.to_mesh(self.config.weld_vertices)?;
        if self.config.require_closed_inputs && !mesh.is_closed() {
            return Err(BooleanError::NotClosed(id));
        }
        Ok(mesh)
    }

    fn check_cancelled(&self) -> BooleanResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(BooleanError::Cancelled),
            _ => Ok(()),
        }
    }

    fn log_report(&self, what: &str, report: &OperationReport) {
        debug!("{what} finished in {:?}", report.duration);
        if !self.config.log_stats {
            return;
        }
        if let Some(stats) = &report.predicates {
            info!(
                "{what}: {} predicate calls, {} exact ({:.1}% filtered), {} degenerate",
                stats.calls,
                stats.exact_calls,
                100.0 * stats.filter_hit_rate(),
                stats.degeneracies
            );
        }
    }
}
