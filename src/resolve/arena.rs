// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex and face arena for resolved meshes
//!
//! Vertices are interned by exact coordinate: asking for the same rational
//! point twice returns the same id, whichever mesh or construction produced
//! it. Faces are addressed by index and reach their neighbors through the
//! per-vertex back-references.

use crate::boolean::Classification;
use crate::geometry::{ExactPoint, Mesh, Triangle};
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Which Boolean operand a face came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeshId {
    A,
    B,
}

impl MeshId {
    pub fn other(self) -> Self {
        match self {
            MeshId::A => MeshId::B,
            MeshId::B => MeshId::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            MeshId::A => 0,
            MeshId::B => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Vertex of an input mesh
    Original,
    /// Crossing or contact point created during resolution
    Inserted,
}

#[derive(Debug, Clone)]
pub struct ArenaVertex {
    pub point: ExactPoint,
    pub provenance: Provenance,
    /// Resolved faces using this vertex
    pub faces: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaFace {
    pub vertices: [usize; 3],
    pub origin: MeshId,
    /// Index of the input face this piece was cut from
    pub parent: usize,
    pub label: Option<Classification>,
}

impl ArenaFace {
    pub fn new(vertices: [usize; 3], origin: MeshId, parent: usize) -> Self {
        Self {
            vertices,
            origin,
            parent,
            label: None,
        }
    }

    /// Undirected edges as sorted vertex pairs
    pub fn edge_keys(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [edge_key(a, b), edge_key(b, c), edge_key(c, a)]
    }
}

/// Undirected edge key
pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Interning store for exact vertices
#[derive(Debug, Clone, Default)]
pub struct VertexArena {
    vertices: Vec<ArenaVertex>,
    lookup: AHashMap<ExactPoint, usize>,
}

impl VertexArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `point`, adding it when unseen. An existing vertex keeps its
    /// original provenance.
    pub fn intern(&mut self, point: ExactPoint, provenance: Provenance) -> usize {
        if let Some(&id) = self.lookup.get(&point) {
            return id;
        }
        let id = self.vertices.len();
        self.lookup.insert(point.clone(), id);
        self.vertices.push(ArenaVertex {
            point,
            provenance,
            faces: Vec::new(),
        });
        id
    }

    pub fn find(&self, point: &ExactPoint) -> Option<usize> {
        self.lookup.get(point).copied()
    }

    pub fn get(&self, id: usize) -> &ArenaVertex {
        &self.vertices[id]
    }

    pub fn point(&self, id: usize) -> &ExactPoint {
        &self.vertices[id].point
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArenaVertex> {
        self.vertices.iter()
    }

    pub fn inserted_count(&self) -> usize {
        self.vertices
            .iter()
            .filter(|v| v.provenance == Provenance::Inserted)
            .count()
    }

    /// Rebuild every back-reference list from `faces`
    pub fn link_faces(&mut self, faces: &[ArenaFace]) {
        for vertex in &mut self.vertices {
            vertex.faces.clear();
        }
        for (face_id, face) in faces.iter().enumerate() {
            for &v in &face.vertices {
                self.vertices[v].faces.push(face_id);
            }
        }
    }

    /// Rounded positions of every arena vertex
    pub fn rounded_points(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.point.to_point()).collect()
    }

    /// Mesh over the whole arena using the given faces; unused vertices stay
    pub fn mesh_from<'a>(&self, faces: impl IntoIterator<Item = &'a ArenaFace>) -> Mesh {
        Mesh {
            vertices: self.rounded_points(),
            triangles: faces
                .into_iter()
                .map(|face| Triangle::new(face.vertices))
                .collect(),
        }
    }
}
