// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh Boolean operations

use crate::resolve::MeshId;
use thiserror::Error;

/// Errors reported by the Boolean kernel
#[derive(Debug, Error)]
pub enum BooleanError {
    /// Flat buffer whose length is not a multiple of three
    #[error("malformed {buffer} buffer: length {len} is not a multiple of 3")]
    MalformedBuffer { buffer: &'static str, len: usize },

    /// Vertex coordinate that is NaN or infinite
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate { vertex: usize },

    /// Triangle referencing a vertex past the end of the vertex list
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },

    /// Triangle with a repeated corner or zero area
    #[error("triangle {triangle} is degenerate")]
    DegenerateTriangle { triangle: usize },

    /// Boolean operand that is not combinatorially closed
    #[error("mesh {0:?} is not closed")]
    NotClosed(MeshId),

    /// Resolution or classification could not establish a valid topology
    #[error("topology inconsistency: {0}")]
    Topology(String),

    /// Operation stopped by a cancellation token
    #[error("operation cancelled")]
    Cancelled,
}

impl BooleanError {
    pub(crate) fn topology(message: impl Into<String>) -> Self {
        Self::Topology(message.into())
    }
}

/// Result alias used throughout the kernel
pub type BooleanResult<T> = std::result::Result<T, BooleanError>;
