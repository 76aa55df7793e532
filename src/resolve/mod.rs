// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Intersection resolution
//!
//! Makes two closed meshes intersect only along shared edges: every face
//! pair that touches is cut along the contact so the resulting pieces meet
//! exactly on common vertices and edges. All new vertices are exact
//! rationals interned in one arena, so the same geometric point created
//! from different face pairs is the same vertex.

pub mod arena;
pub mod contact;
pub mod curve;
pub mod triangulate;

pub use arena::{edge_key, ArenaFace, ArenaVertex, MeshId, Provenance, VertexArena};
pub use contact::{triangle_contact, Contact};
pub use curve::{group_curves, IntersectionCurve};
pub use triangulate::FaceTriangulation;

use crate::error::{BooleanError, BooleanResult};
use crate::geometry::exact::{cross, dot, is_zero_vector, locate_coplanar, triangle_normal};
use crate::geometry::exact::{Projection, TriangleLocation};
use crate::geometry::overlap::{chained_triples, overlapping_pairs};
use crate::geometry::{BoundingBox, ExactPoint, Mesh};
use crate::kernel::CancelToken;
use crate::predicates::{Predicates, SegmentTriangle, TriangleTriple, Verdict};
use ahash::AHashSet;
use log::{debug, trace};
use nalgebra::Point3;
use num_traits::Signed;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Counters describing one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveStats {
    /// Face pairs whose boxes overlap
    pub candidate_pairs: usize,
    /// Pairs that actually touch
    pub contacts: usize,
    /// Contacts that needed the exact closed-set routine
    pub degenerate_contacts: usize,
    /// Points where three faces meet
    pub triple_points: usize,
    pub inserted_vertices: usize,
    pub retriangulated_faces: usize,
}

/// Both meshes cut along their intersection
#[derive(Debug, Clone)]
pub struct Resolution {
    pub arena: VertexArena,
    /// Faces of A followed by faces of B
    pub faces: Vec<ArenaFace>,
    /// Undirected curve edges, sorted
    pub curve_edges: Vec<(usize, usize)>,
    pub curves: Vec<IntersectionCurve>,
    pub stats: ResolveStats,
}

impl Resolution {
    pub fn faces_of(&self, mesh: MeshId) -> impl Iterator<Item = (usize, &ArenaFace)> {
        self.faces
            .iter()
            .enumerate()
            .filter(move |(_, face)| face.origin == mesh)
    }

    /// Resolved faces of one operand over the full arena vertex list
    pub fn mesh(&self, mesh: MeshId) -> Mesh {
        self.arena.mesh_from(self.faces_of(mesh).map(|(_, face)| face))
    }

    /// Both resolved operands in one mesh with unused vertices dropped
    pub fn combined(&self) -> Mesh {
        let mut mesh = self.arena.mesh_from(&self.faces);
        mesh.remove_orphaned_vertices();
        mesh
    }

    pub fn is_curve_edge(&self, a: usize, b: usize) -> bool {
        self.curve_edges.binary_search(&edge_key(a, b)).is_ok()
    }
}

/// Input face being cut
struct InputFace {
    origin: MeshId,
    parent: usize,
    corners: [usize; 3],
    projection: Projection,
    /// Inserted points in the open interior
    interior: BTreeSet<usize>,
    /// Faces of the other operand this face touches
    partners: BTreeSet<usize>,
}

/// Mutable state of one resolution run
struct Workspace<'m> {
    meshes: [&'m Mesh; 2],
    arena: VertexArena,
    faces: Vec<InputFace>,
    /// Points on the open interior of input edges, keyed by arena edge
    edge_points: BTreeMap<(usize, usize), BTreeSet<usize>>,
    /// Constraint segments and the faces that must contain them
    segments: BTreeMap<(usize, usize), BTreeSet<usize>>,
    stats: ResolveStats,
}

impl<'m> Workspace<'m> {
    fn new(a: &'m Mesh, b: &'m Mesh) -> BooleanResult<Self> {
        let mut arena = VertexArena::new();
        let mut faces = Vec::with_capacity(a.triangle_count() + b.triangle_count());

        for (origin, mesh) in [(MeshId::A, a), (MeshId::B, b)] {
            let ids: Vec<usize> = mesh
                .vertices
                .iter()
                .map(|p| arena.intern(ExactPoint::from_point(p), Provenance::Original))
                .collect();

            for (parent, triangle) in mesh.triangles.iter().enumerate() {
                let corners = triangle.indices.map(|v| ids[v]);
                let normal = triangle_normal(
                    arena.point(corners[0]),
                    arena.point(corners[1]),
                    arena.point(corners[2]),
                );
                let projection = Projection::for_normal(&normal)
                    .ok_or(BooleanError::DegenerateTriangle { triangle: parent })?;
                faces.push(InputFace {
                    origin,
                    parent,
                    corners,
                    projection,
                    interior: BTreeSet::new(),
                    partners: BTreeSet::new(),
                });
            }
        }

        Ok(Self {
            meshes: [a, b],
            arena,
            faces,
            edge_points: BTreeMap::new(),
            segments: BTreeMap::new(),
            stats: ResolveStats::default(),
        })
    }

    /// Workspace index of a parent face
    fn face_index(&self, origin: MeshId, parent: usize) -> usize {
        match origin {
            MeshId::A => parent,
            MeshId::B => self.meshes[0].triangle_count() + parent,
        }
    }

    fn input_triangle(&self, face: usize) -> [Point3<f64>; 3] {
        let f = &self.faces[face];
        self.meshes[f.origin.index()].triangle_points(f.parent)
    }

    fn exact_corners(&self, face: usize) -> [&ExactPoint; 3] {
        self.faces[face].corners.map(|c| self.arena.point(c))
    }

    /// Record that point `id` must appear in `face`; true when it is new
    fn register(&mut self, face: usize, id: usize) -> BooleanResult<bool> {
        let f = &self.faces[face];
        let location = locate_coplanar(self.exact_corners(face), f.projection, self.arena.point(id));
        match location {
            TriangleLocation::Vertex(_) => Ok(false),
            TriangleLocation::Edge(i) => {
                let key = edge_key(f.corners[i], f.corners[(i + 1) % 3]);
                Ok(self.edge_points.entry(key).or_default().insert(id))
            }
            TriangleLocation::Interior => Ok(self.faces[face].interior.insert(id)),
            TriangleLocation::Outside => Err(BooleanError::topology(format!(
                "contact point {id} lies outside {:?} face {}",
                f.origin, f.parent
            ))),
        }
    }

    /// Every inserted point of `face`, on its edges or inside
    fn points_of(&self, face: usize) -> BTreeSet<usize> {
        let f = &self.faces[face];
        let mut points = f.interior.clone();
        for i in 0..3 {
            let key = edge_key(f.corners[i], f.corners[(i + 1) % 3]);
            if let Some(on_edge) = self.edge_points.get(&key) {
                points.extend(on_edge.iter().copied());
            }
        }
        points
    }

    fn add_contact(&mut self, fa: usize, fb: usize, contact: &Contact) -> BooleanResult<()> {
        let ids: Vec<usize> = contact
            .points()
            .into_iter()
            .map(|p| self.arena.intern(p.clone(), Provenance::Inserted))
            .collect();
        for &id in &ids {
            self.register(fa, id)?;
            self.register(fb, id)?;
        }

        for (p, q) in contact.segments() {
            let (Some(u), Some(v)) = (self.arena.find(p), self.arena.find(q)) else {
                continue;
            };
            if u != v {
                self.segments.entry(edge_key(u, v)).or_default().extend([fa, fb]);
            }
        }

        self.faces[fa].partners.insert(fb);
        self.faces[fb].partners.insert(fa);
        Ok(())
    }
}

/// Drives the resolution of one pair of meshes
pub struct Resolver<'a> {
    predicates: &'a Predicates,
    verify: bool,
    cancel: Option<&'a CancelToken>,
}

impl<'a> Resolver<'a> {
    pub fn new(predicates: &'a Predicates) -> Self {
        Self {
            predicates,
            verify: true,
            cancel: None,
        }
    }

    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_cancellation(mut self, cancel: Option<&'a CancelToken>) -> Self {
        self.cancel = cancel;
        self
    }

    fn check_cancelled(&self) -> BooleanResult<()> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(BooleanError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Cut `a` and `b` along their intersection.
    ///
    /// Both meshes must be welded and free of zero-area triangles.
    pub fn resolve(&self, a: &Mesh, b: &Mesh) -> BooleanResult<Resolution> {
        let mut work = Workspace::new(a, b)?;

        self.discover(&mut work)?;
        self.find_triple_points(&mut work)?;
        self.close_segments(&mut work)?;
        self.check_cancelled()?;

        let (faces, curve_edges) = self.retriangulate(&mut work)?;
        let Workspace {
            mut arena,
            mut stats,
            ..
        } = work;
        arena.link_faces(&faces);
        stats.inserted_vertices = arena.inserted_count();

        let curves = group_curves(&curve_edges);
        let resolution = Resolution {
            arena,
            faces,
            curve_edges,
            curves,
            stats,
        };

        if self.verify {
            verify_resolution(&resolution, [a.is_closed(), b.is_closed()])?;
        }

        debug!(
            "Resolved {} candidate pairs: {} contacts ({} degenerate), {} triple points, {} inserted vertices, {} curves",
            resolution.stats.candidate_pairs,
            resolution.stats.contacts,
            resolution.stats.degenerate_contacts,
            resolution.stats.triple_points,
            resolution.stats.inserted_vertices,
            resolution.curves.len()
        );
        Ok(resolution)
    }

    fn discover(&self, work: &mut Workspace) -> BooleanResult<()> {
        let pairs = overlapping_pairs(work.meshes[0], work.meshes[1]);
        work.stats.candidate_pairs = pairs.len();

        for (pa, pb) in pairs {
            let fa = work.face_index(MeshId::A, pa);
            let fb = work.face_index(MeshId::B, pb);
            let contact = self.pair_contact(work, fa, fb)?;
            if contact.is_empty() {
                continue;
            }
            trace!("A face {pa} touches B face {pb}: {contact:?}");
            work.stats.contacts += 1;
            work.add_contact(fa, fb, &contact)?;
        }
        Ok(())
    }

    /// Contact of one candidate pair, through the six crossing queries when
    /// the pair is in general position and the exact routine otherwise
    fn pair_contact(&self, work: &mut Workspace, fa: usize, fb: usize) -> BooleanResult<Contact> {
        let ta = work.input_triangle(fa);
        let tb = work.input_triangle(fb);

        let mut queries = Vec::with_capacity(6);
        for (edges_of, against) in [(&ta, &tb), (&tb, &ta)] {
            for i in 0..3 {
                queries.push(SegmentTriangle::new([edges_of[i], edges_of[(i + 1) % 3]], *against));
            }
        }

        let mut crossings = Vec::with_capacity(2);
        let mut degenerate = false;
        for query in &queries {
            match self.predicates.classify_segment_triangle(query) {
                Verdict::NonEmpty => crossings.push(query),
                Verdict::Degenerate => degenerate = true,
                Verdict::Empty | Verdict::Uncertain => {}
            }
        }

        if degenerate {
            work.stats.degenerate_contacts += 1;
            return Ok(triangle_contact(work.exact_corners(fa), work.exact_corners(fb)));
        }

        match crossings.as_slice() {
            [] => Ok(Contact::Empty),
            [first, second] => {
                let p = self.predicates.segment_triangle_coords_exact(first);
                let q = self.predicates.segment_triangle_coords_exact(second);
                match (p, q) {
                    (Some(p), Some(q)) => Ok(Contact::Segment(p, q)),
                    _ => Err(BooleanError::topology("crossing without an exact point")),
                }
            }
            other => Err(BooleanError::topology(format!(
                "face pair in general position has {} edge crossings",
                other.len()
            ))),
        }
    }

    fn find_triple_points(&self, work: &mut Workspace) -> BooleanResult<()> {
        let boxes: [Vec<BoundingBox>; 2] = work.meshes.map(|mesh| {
            (0..mesh.triangle_count())
                .map(|face| mesh.triangle_bbox(face))
                .collect()
        });

        for anchor in 0..work.faces.len() {
            if work.faces[anchor].partners.len() < 2 {
                continue;
            }
            let other = work.faces[anchor].origin.other();
            let partners: Vec<usize> = work.faces[anchor]
                .partners
                .iter()
                .map(|&f| work.faces[f].parent)
                .collect();

            for (g, h) in chained_triples(&partners, &boxes[other.index()]) {
                let fg = work.face_index(other, g);
                let fh = work.face_index(other, h);
                let shares_vertex = work.faces[fg]
                    .corners
                    .iter()
                    .any(|c| work.faces[fh].corners.contains(c));
                if shares_vertex {
                    continue;
                }

                let query = TriangleTriple::new(
                    work.input_triangle(anchor),
                    work.input_triangle(fg),
                    work.input_triangle(fh),
                );
                if self.predicates.classify_triangle_triple(&query) != Verdict::NonEmpty {
                    continue;
                }
                let Some(point) = self.predicates.triangle_triple_coords_exact(&query) else {
                    continue;
                };

                let id = work.arena.intern(point, Provenance::Inserted);
                for face in [anchor, fg, fh] {
                    work.register(face, id)?;
                }
                work.stats.triple_points += 1;
            }
        }
        Ok(())
    }

    /// Share every point lying on a constraint segment with all faces
    /// carrying that segment, until nothing changes
    fn close_segments(&self, work: &mut Workspace) -> BooleanResult<()> {
        loop {
            let mut changed = false;
            let snapshot: Vec<((usize, usize), Vec<usize>)> = work
                .segments
                .iter()
                .map(|(&key, carriers)| (key, carriers.iter().copied().collect()))
                .collect();

            for ((u, v), carriers) in snapshot {
                let mut candidates = BTreeSet::new();
                for &face in &carriers {
                    candidates.extend(work.points_of(face));
                }
                for p in candidates {
                    if p == u || p == v || !strictly_between(&work.arena, u, v, p) {
                        continue;
                    }
                    for &face in &carriers {
                        changed |= work.register(face, p)?;
                    }
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }

    fn retriangulate(&self, work: &mut Workspace) -> BooleanResult<(Vec<ArenaFace>, Vec<(usize, usize)>)> {
        let mut face_segments: Vec<Vec<(usize, usize)>> = vec![Vec::new(); work.faces.len()];
        for (&(u, v), carriers) in &work.segments {
            for &face in carriers {
                face_segments[face].push((u, v));
            }
        }

        let mut faces = Vec::with_capacity(work.faces.len());
        let mut curve_edges: BTreeSet<(usize, usize)> = BTreeSet::new();

        for (index, segments) in face_segments.iter().enumerate() {
            let points = work.points_of(index);
            let input = &work.faces[index];
            if points.is_empty() && segments.is_empty() {
                faces.push(ArenaFace::new(input.corners, input.origin, input.parent));
                continue;
            }

            let mut triangulation = FaceTriangulation::new(&work.arena, input.corners, input.projection);
            for &point in &points {
                triangulation.insert_point(point)?;
            }
            for &(u, v) in segments {
                for (s, t) in triangulation.insert_segment(u, v)? {
                    curve_edges.insert(edge_key(s, t));
                }
            }

            work.stats.retriangulated_faces += 1;
            faces.extend(
                triangulation
                    .into_triangles()
                    .into_iter()
                    .map(|t| ArenaFace::new(t, input.origin, input.parent)),
            );
        }

        Ok((faces, curve_edges.into_iter().collect()))
    }
}

/// Is `p` strictly inside the segment `u v`?
fn strictly_between(arena: &VertexArena, u: usize, v: usize, p: usize) -> bool {
    let (pu, pv, pp) = (arena.point(u), arena.point(v), arena.point(p));
    let direction = pu.vector_to(pv);
    let offset = pu.vector_to(pp);
    if !is_zero_vector(&cross(&direction, &offset)) {
        return false;
    }
    let along = dot(&offset, &direction);
    along.is_positive() && along < dot(&direction, &direction)
}

/// Closure of resolved operands and shared curve edges
fn verify_resolution(resolution: &Resolution, inputs_closed: [bool; 2]) -> BooleanResult<()> {
    let mut edge_sets: [AHashSet<(usize, usize)>; 2] = [AHashSet::new(), AHashSet::new()];

    for mesh in [MeshId::A, MeshId::B] {
        if inputs_closed[mesh.index()] && !resolution.mesh(mesh).is_closed() {
            return Err(BooleanError::topology(format!(
                "resolved mesh {mesh:?} is not closed"
            )));
        }
        for (_, face) in resolution.faces_of(mesh) {
            edge_sets[mesh.index()].extend(face.edge_keys());
        }
    }

    for edge in &resolution.curve_edges {
        if !edge_sets[0].contains(edge) || !edge_sets[1].contains(edge) {
            return Err(BooleanError::topology(format!(
                "curve edge {}-{} is not shared by both resolved meshes",
                edge.0, edge.1
            )));
        }
    }

    // Touching contacts may end curves legitimately; transversal ones may not
    if inputs_closed == [true, true] && resolution.stats.degenerate_contacts == 0 {
        if let Some(curve) = resolution.curves.iter().find(|curve| !curve.closed) {
            return Err(BooleanError::topology(format!(
                "intersection curve with {} edges does not close",
                curve.edges.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn unit_cube() -> Mesh {
        Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh()
    }

    fn shifted(mesh: &Mesh, x: f64, y: f64, z: f64) -> Mesh {
        let mut moved = mesh.clone();
        moved.translate(&Vector3::new(x, y, z));
        moved
    }

    #[test]
    fn test_disjoint_meshes_are_untouched() {
        let a = unit_cube();
        let b = shifted(&a, 5.0, 0.0, 0.0);
        let predicates = Predicates::new();
        let resolution = Resolver::new(&predicates).resolve(&a, &b).unwrap();

        assert_eq!(resolution.faces.len(), 24);
        assert!(resolution.curve_edges.is_empty());
        assert!(resolution.curves.is_empty());
        assert_eq!(resolution.stats.contacts, 0);
    }

    #[test]
    fn test_general_position_cut() {
        let a = unit_cube();
        let b = shifted(&a, 0.5, 0.25, 0.125);
        let predicates = Predicates::new();
        let resolution = Resolver::new(&predicates).resolve(&a, &b).unwrap();

        assert!(resolution.mesh(MeshId::A).is_closed());
        assert!(resolution.mesh(MeshId::B).is_closed());
        assert!(!resolution.curve_edges.is_empty());
        assert!(resolution.curves.iter().all(|c| c.closed));

        // Cutting never changes what the surfaces enclose
        assert_relative_eq!(resolution.mesh(MeshId::A).signed_volume(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(resolution.mesh(MeshId::B).signed_volume(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_curve_vertices_are_shared() {
        let a = unit_cube();
        let b = shifted(&a, 0.5, 0.25, 0.125);
        let predicates = Predicates::new();
        let resolution = Resolver::new(&predicates).resolve(&a, &b).unwrap();

        for &(u, v) in &resolution.curve_edges {
            for vertex in [u, v] {
                let origins: BTreeSet<MeshId> = resolution
                    .arena
                    .get(vertex)
                    .faces
                    .iter()
                    .map(|&f| resolution.faces[f].origin)
                    .collect();
                assert_eq!(origins.len(), 2);
            }
        }
    }

    #[test]
    fn test_verification_rejects_open_curve() {
        let a = unit_cube();
        let b = shifted(&a, 0.5, 0.25, 0.125);
        let predicates = Predicates::new();
        let mut resolution = Resolver::new(&predicates).resolve(&a, &b).unwrap();
        assert!(verify_resolution(&resolution, [true, true]).is_ok());

        // Lose one edge of the first loop
        let mut edges = resolution.curves[0].edges.clone();
        edges.pop();
        resolution.curves = group_curves(&edges);
        let err = verify_resolution(&resolution, [true, true]).unwrap_err();
        assert!(err.to_string().contains("does not close"));

        // Open inputs may leave curves open
        assert!(verify_resolution(&resolution, [true, false]).is_ok());
    }

    #[test]
    fn test_coplanar_overlap_resolves() {
        let a = unit_cube();
        let b = shifted(&a, 0.5, 0.0, 0.0);
        let predicates = Predicates::new();
        let resolution = Resolver::new(&predicates).resolve(&a, &b).unwrap();

        assert!(resolution.stats.degenerate_contacts > 0);
        assert!(resolution.mesh(MeshId::A).is_closed());
        assert!(resolution.mesh(MeshId::B).is_closed());
    }

    #[test]
    fn test_cancelled_resolution() {
        let a = unit_cube();
        let b = shifted(&a, 0.5, 0.25, 0.125);
        let predicates = Predicates::new();
        let token = CancelToken::new();
        token.cancel();
        let result = Resolver::new(&predicates)
            .with_cancellation(Some(&token))
            .resolve(&a, &b);
        assert!(matches!(result, Err(BooleanError::Cancelled)));
    }

    #[test]
    fn test_strictly_between() {
        let mut arena = VertexArena::new();
        let ids: Vec<usize> = [(0.0, 0.0, 0.0), (2.0, 2.0, 2.0), (1.0, 1.0, 1.0), (3.0, 3.0, 3.0), (1.0, 0.0, 1.0)]
            .into_iter()
            .map(|(x, y, z)| arena.intern(ExactPoint::from_point(&Point3::new(x, y, z)), Provenance::Original))
            .collect();
        assert!(strictly_between(&arena, ids[0], ids[1], ids[2]));
        assert!(!strictly_between(&arena, ids[0], ids[1], ids[3]));
        assert!(!strictly_between(&arena, ids[0], ids[1], ids[4]));
    }
}
