//! Readers for KiCad-native artifact formats
//!
//! Each reader resolves a file the project manifest names, parses it into
//! records for its kind, and reports `MissingArtifact` or
//! `MalformedArtifact` on failure. Readers never write anything.

pub mod board;
pub mod gerber;
pub mod netlist;
pub mod placement;
pub mod sexpr;

use std::fmt;
use std::path::Path;

use crate::core::error::PipelineError;

/// The artifact families the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Manifest,
    Schematic,
    Netlist,
    Board,
    Placement,
    Gerber,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manifest => "project manifest",
            Self::Schematic => "schematic",
            Self::Netlist => "netlist",
            Self::Board => "board",
            Self::Placement => "placement",
            Self::Gerber => "gerber export",
        };
        f.write_str(name)
    }
}

/// Read an artifact file, mapping absence to `MissingArtifact`.
pub fn read_to_string(kind: ArtifactKind, path: &Path) -> Result<String, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::MissingArtifact {
            kind,
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

pub(crate) fn malformed(kind: ArtifactKind, path: &Path, detail: impl Into<String>) -> PipelineError {
    PipelineError::MalformedArtifact {
        kind,
        path: path.to_path_buf(),
        detail: detail.into(),
    }
}
