// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh file input and output
//!
//! OFF and STL files are read into a [`TriMesh`]; validation is left to
//! the kernel so a file with bad geometry still loads and reports a
//! precise error when used.

mod off;
mod stl;

pub use off::{format_off, parse_off, read_off, write_off};
pub use stl::{read_stl, write_stl};

use crate::exchange::TriMesh;
use anyhow::{bail, Result};
use std::path::Path;

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Off,
    Stl,
}

impl MeshFormat {
    /// Format named by the extension of `path`, case-insensitive
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("off") => Ok(MeshFormat::Off),
            Some("stl") => Ok(MeshFormat::Stl),
            Some(other) => bail!("Unsupported mesh format '.{}': {}", other, path.display()),
            None => bail!("Cannot infer mesh format without an extension: {}", path.display()),
        }
    }
}

/// Read a mesh, choosing the format from the file extension
pub fn read_mesh(path: impl AsRef<Path>) -> Result<TriMesh> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Off => read_off(path),
        MeshFormat::Stl => read_stl(path),
    }
}

/// Write a mesh, choosing the format from the file extension
pub fn write_mesh(path: impl AsRef<Path>, mesh: &TriMesh) -> Result<()> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Off => write_off(path, mesh),
        MeshFormat::Stl => write_stl(path, mesh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path(Path::new("a/b.OFF")).unwrap(), MeshFormat::Off);
        assert_eq!(MeshFormat::from_path(Path::new("part.stl")).unwrap(), MeshFormat::Stl);
        assert!(MeshFormat::from_path(Path::new("model.obj")).is_err());
        assert!(MeshFormat::from_path(Path::new("noext")).is_err());
    }
}
