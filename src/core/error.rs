//! Pipeline error taxonomy with distinct exit codes

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::artifact::ArtifactKind;

/// Errors surfaced by any pipeline stage.
///
/// Every variant is terminal for the current invocation. Failures are
/// attributed to missing or malformed user-provided inputs, never to
/// transient conditions, so nothing here is retried.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("missing {kind} artifact: {}", path.display())]
    #[diagnostic(
        code(kf::artifact::missing),
        help("export the {kind} from KiCad into the project directory, then re-run")
    )]
    MissingArtifact { kind: ArtifactKind, path: PathBuf },

    #[error("malformed {kind} artifact {}: {detail}", path.display())]
    #[diagnostic(code(kf::artifact::malformed))]
    MalformedArtifact {
        kind: ArtifactKind,
        path: PathBuf,
        detail: String,
    },

    #[error("failed to render {document}: {detail}")]
    #[diagnostic(code(kf::render::template))]
    TemplateRender { document: String, detail: String },

    #[error("incomplete package; missing: {}", missing.join(", "))]
    #[diagnostic(
        code(kf::package::incomplete),
        help("run `kf bom`, `kf mfr`, and `kf assembly` before packaging")
    )]
    IncompletePackage { missing: Vec<String> },

    #[error("`kf {command}` requires `kf {required}` to have run first")]
    #[diagnostic(code(kf::cli::sequence))]
    InvalidCommandSequence { command: String, required: String },

    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(kf::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for scripting use. Zero is reserved for success.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingArtifact { .. } => 2,
            Self::MalformedArtifact { .. } => 3,
            Self::TemplateRender { .. } => 4,
            Self::IncompletePackage { .. } => 5,
            Self::InvalidCommandSequence { .. } => 6,
            Self::Io { .. } => 1,
        }
    }
}
