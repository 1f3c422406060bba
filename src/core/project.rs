//! Project manifest and on-disk layout
//!
//! Every project carries a `kf.json` manifest enumerating its expected
//! artifact paths and output directories. Later stages resolve files
//! through the manifest instead of globbing for them, so a misnamed
//! export is reported up front as a missing artifact.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactKind;
use crate::core::config::Config;
use crate::core::error::PipelineError;

/// Serialized as `kf.json` in the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub title: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub license: String,
    pub created: String,
    pub updated: String,
    pub artifacts: ArtifactPaths,
    #[serde(default)]
    pub outputs: OutputDirs,
}

/// Expected artifact file names, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub schematic: String,
    pub netlist: String,
    pub board: String,
    pub placement_top: String,
    pub placement_bottom: String,
    /// Exported board outline gerber, used for board dimensions
    pub edge_cuts: String,
}

impl ArtifactPaths {
    /// Conventional names for a project, matching the KiCad export defaults.
    pub fn for_name(name: &str) -> Self {
        Self {
            schematic: format!("{name}.kicad_sch"),
            netlist: format!("{name}.net"),
            board: format!("{name}.kicad_pcb"),
            placement_top: format!("{name}-top.pos"),
            placement_bottom: format!("{name}-bottom.pos"),
            edge_cuts: format!("gerbers/{name}-Edge.Cuts.gko"),
        }
    }
}

/// Output directories, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDirs {
    /// Derived documents (BOMs, assembly files, fabrication notes)
    pub bom: String,
    /// Gerber exports and the archives built from them
    pub gerbers: String,
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self {
            bom: "bom".to_string(),
            gerbers: "gerbers".to_string(),
        }
    }
}

impl Manifest {
    /// Build a manifest for a new project, seeded from the tool config.
    pub fn new(
        name: &str,
        title: Option<String>,
        description: String,
        version: String,
        config: &Config,
    ) -> Self {
        let today = today();
        Self {
            name: name.to_string(),
            title: title.unwrap_or_else(|| name.to_string()),
            version,
            description,
            author: config.author(),
            company: config.company(),
            email: config.email(),
            website: config.website(),
            license: config.license(),
            created: today.clone(),
            updated: today,
            artifacts: ArtifactPaths::for_name(name),
            outputs: OutputDirs::default(),
        }
    }

    /// Version string used in generated file names, e.g. "v1.0".
    pub fn version_tag(&self) -> String {
        format!("v{}", self.version)
    }
}

/// Today's date in the format used by manifests and documents.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// A KiCad project under KiFisher management.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    pub manifest: Manifest,
}

impl Project {
    pub const MANIFEST_FILE: &'static str = "kf.json";

    /// Create the project directory and write its manifest.
    pub fn scaffold(root: &Path, manifest: Manifest) -> Result<Self, PipelineError> {
        std::fs::create_dir_all(root).map_err(|e| PipelineError::io(root, e))?;

        let project = Self {
            root: root.to_path_buf(),
            manifest,
        };
        std::fs::create_dir_all(project.bom_dir())
            .map_err(|e| PipelineError::io(project.bom_dir(), e))?;
        std::fs::create_dir_all(project.gerbers_dir())
            .map_err(|e| PipelineError::io(project.gerbers_dir(), e))?;
        project.save()?;
        Ok(project)
    }

    /// Open an existing project by reading its manifest.
    pub fn open(root: &Path) -> Result<Self, PipelineError> {
        let path = root.join(Self::MANIFEST_FILE);
        if !path.is_file() {
            return Err(PipelineError::MissingArtifact {
                kind: ArtifactKind::Manifest,
                path,
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
        let manifest: Manifest =
            serde_json::from_str(&contents).map_err(|e| PipelineError::MalformedArtifact {
                kind: ArtifactKind::Manifest,
                path: path.clone(),
                detail: e.to_string(),
            })?;
        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    /// Write the manifest back to disk.
    pub fn save(&self) -> Result<(), PipelineError> {
        let path = self.root.join(Self::MANIFEST_FILE);
        let contents = serde_json::to_string_pretty(&self.manifest)
            .map_err(|e| PipelineError::io(&path, std::io::Error::other(e)))?;
        std::fs::write(&path, contents + "\n").map_err(|e| PipelineError::io(&path, e))
    }

    /// Refresh the manifest's updated date and persist it.
    pub fn touch_updated(&mut self) -> Result<(), PipelineError> {
        self.manifest.updated = today();
        self.save()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    // Artifact inputs, resolved through the manifest.

    pub fn schematic_path(&self) -> PathBuf {
        self.root.join(&self.manifest.artifacts.schematic)
    }

    pub fn netlist_path(&self) -> PathBuf {
        self.root.join(&self.manifest.artifacts.netlist)
    }

    pub fn board_path(&self) -> PathBuf {
        self.root.join(&self.manifest.artifacts.board)
    }

    pub fn placement_paths(&self) -> [PathBuf; 2] {
        [
            self.root.join(&self.manifest.artifacts.placement_top),
            self.root.join(&self.manifest.artifacts.placement_bottom),
        ]
    }

    pub fn edge_cuts_path(&self) -> PathBuf {
        self.root.join(&self.manifest.artifacts.edge_cuts)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.root.join("README.md")
    }

    // Output locations.

    pub fn bom_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.outputs.bom)
    }

    pub fn gerbers_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.outputs.gerbers)
    }

    /// Base name for generated files, e.g. "blink-v1.0".
    fn doc_base(&self) -> String {
        format!("{}-{}", self.manifest.name, self.manifest.version_tag())
    }

    pub fn bom_master_csv(&self) -> PathBuf {
        self.bom_dir().join(format!("{}-bom-master.csv", self.doc_base()))
    }

    pub fn bom_readable_csv(&self) -> PathBuf {
        self.bom_dir()
            .join(format!("{}-bom-readable.csv", self.doc_base()))
    }

    pub fn bom_markdown(&self) -> PathBuf {
        self.bom_dir().join(format!("{}-bom.md", self.doc_base()))
    }

    pub fn fabrication_markdown(&self) -> PathBuf {
        self.bom_dir().join(format!("{}-fab-notes.md", self.doc_base()))
    }

    pub fn assembly_xyrs(&self) -> PathBuf {
        self.bom_dir().join(format!("{}-assy.xyrs", self.doc_base()))
    }

    pub fn assembly_markdown(&self) -> PathBuf {
        self.bom_dir().join(format!("{}-assy.md", self.doc_base()))
    }

    pub fn gerbers_zip(&self) -> PathBuf {
        self.gerbers_dir()
            .join(format!("{}-gerbers.zip", self.doc_base()))
    }

    pub fn stencil_zip(&self) -> PathBuf {
        self.gerbers_dir()
            .join(format!("{}-stencil.zip", self.doc_base()))
    }

    pub fn release_markdown(&self) -> PathBuf {
        self.root.join(format!("{}-release.md", self.doc_base()))
    }

    pub fn release_zip(&self) -> PathBuf {
        self.root.join(format!("{}.zip", self.doc_base()))
    }
}
