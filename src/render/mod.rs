//! Document generation from aggregated records and board metadata
//!
//! All Markdown documents come from fixed Tera templates embedded in the
//! binary; CSV and XYRS outputs are written directly. Rendering is
//! stateless and idempotent: the only permitted non-determinism is the
//! single `generated` date field in Markdown document headers. CSV outputs
//! carry no timestamp at all.

use rust_embed::Embed;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::Tera;

use crate::artifact::board::BoardInfo;
use crate::artifact::gerber::BoardSize;
use crate::artifact::netlist::MountKind;
use crate::bom::AggregatedPart;
use crate::core::error::PipelineError;
use crate::core::project::Manifest;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// The derived documents the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    BomMasterCsv,
    BomReadableCsv,
    BomMarkdown,
    FabricationNotes,
    AssemblyXyrs,
    AssemblyMarkdown,
    ReleaseDocument,
}

impl DocumentKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::BomMasterCsv => "BOM master CSV",
            Self::BomReadableCsv => "BOM readable CSV",
            Self::BomMarkdown => "BOM markdown",
            Self::FabricationNotes => "fabrication notes",
            Self::AssemblyXyrs => "assembly XYRS",
            Self::AssemblyMarkdown => "assembly markdown",
            Self::ReleaseDocument => "release document",
        }
    }
}

/// A generated document, handed from the generator to the package builder.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    pub kind: DocumentKind,
    pub path: PathBuf,
}

impl DocumentArtifact {
    pub fn new(kind: DocumentKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Print a "wrote file" line per artifact unless quieted.
pub fn report_written(artifacts: &[DocumentArtifact], quiet: bool) {
    if quiet {
        return;
    }
    for artifact in artifacts {
        println!(
            "{} Wrote {}: {}",
            console::style("✓").green(),
            artifact.kind.describe(),
            console::style(artifact.path.display()).cyan()
        );
    }
}

/// Renderer over the embedded template set.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, PipelineError> {
        let mut tera = Tera::default();
        for file in EmbeddedTemplates::iter() {
            let name = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(name) {
                let text = std::str::from_utf8(&content.data)
                    .map_err(|e| template_error(name, e.to_string()))?;
                tera.add_raw_template(name, text)
                    .map_err(|e| template_error(name, e.to_string()))?;
            }
        }
        Ok(Self { tera })
    }

    fn render(&self, template: &str, context: &tera::Context) -> Result<String, PipelineError> {
        self.tera
            .render(template, context)
            .map_err(|e| template_error(template, e.to_string()))
    }

    /// README scaffold with title block and marker sections.
    pub fn readme(&self, manifest: &Manifest) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        insert_manifest(&mut context, manifest);
        self.render("readme.md.tera", &context)
    }

    /// Blank schematic sheet with the project's title block.
    pub fn schematic(&self, manifest: &Manifest) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        insert_manifest(&mut context, manifest);
        self.render("schematic.kicad_sch.tera", &context)
    }

    /// BOM table as Markdown. `generated` is the single timestamp field.
    pub fn bom_markdown(
        &self,
        manifest: &Manifest,
        parts: &[AggregatedPart],
        generated: &str,
    ) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        insert_manifest(&mut context, manifest);
        context.insert("generated", generated);
        context.insert("parts", &bom_rows(parts));
        self.render("bom.md.tera", &context)
    }

    /// BOM table alone, for splicing into the README's marker section.
    pub fn bom_section(&self, parts: &[AggregatedPart]) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        context.insert("parts", &bom_rows(parts));
        self.render("bom_section.md.tera", &context)
    }

    /// Assembly summary alone, for splicing into the README.
    pub fn assembly_section(
        &self,
        unique_parts: usize,
        placements: usize,
        size: &BoardSize,
    ) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        context.insert("unique_parts", &unique_parts);
        context.insert("placements", &placements);
        insert_size(&mut context, size);
        self.render("assembly_section.md.tera", &context)
    }

    /// Fabrication notes from board metadata and the export file list.
    pub fn fabrication_markdown(
        &self,
        manifest: &Manifest,
        board: &BoardInfo,
        size: &BoardSize,
        gerber_files: &[String],
        generated: &str,
    ) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        insert_manifest(&mut context, manifest);
        context.insert("generated", generated);
        context.insert(
            "board_title",
            board.title.as_deref().unwrap_or(&manifest.title),
        );
        context.insert(
            "board_revision",
            board.revision.as_deref().unwrap_or(&manifest.version),
        );
        context.insert("copper_layers", &board.copper_layers);
        insert_size(&mut context, size);
        context.insert("files", gerber_files);
        self.render("fabrication.md.tera", &context)
    }

    /// Assembly quoting summary.
    pub fn assembly_markdown(
        &self,
        manifest: &Manifest,
        unique_parts: usize,
        placements: usize,
        size: &BoardSize,
        generated: &str,
    ) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        insert_manifest(&mut context, manifest);
        context.insert("generated", generated);
        context.insert("unique_parts", &unique_parts);
        context.insert("placements", &placements);
        insert_size(&mut context, size);
        self.render("assembly.md.tera", &context)
    }

    /// Final human-readable release document, concatenating the section
    /// bodies already rendered by earlier stages.
    pub fn release_markdown(
        &self,
        manifest: &Manifest,
        bom_section: &str,
        assembly_section: &str,
        fabrication_section: &str,
        generated: &str,
    ) -> Result<String, PipelineError> {
        let mut context = tera::Context::new();
        insert_manifest(&mut context, manifest);
        context.insert("generated", generated);
        context.insert("bom_section", bom_section.trim_end());
        context.insert("assembly_section", assembly_section.trim_end());
        context.insert("fabrication_section", fabrication_section.trim_end());
        self.render("release.md.tera", &context)
    }
}

fn insert_manifest(context: &mut tera::Context, manifest: &Manifest) {
    context.insert("name", &manifest.name);
    context.insert("title", &manifest.title);
    context.insert("version", &manifest.version);
    context.insert("description", &manifest.description);
    context.insert("author", &manifest.author);
    context.insert("company", &manifest.company);
    context.insert("email", &manifest.email);
    context.insert("website", &manifest.website);
    context.insert("license", &manifest.license);
    context.insert("created", &manifest.created);
    context.insert("updated", &manifest.updated);
}

fn insert_size(context: &mut tera::Context, size: &BoardSize) {
    context.insert("width_mm", &format!("{:.2}", size.width_mm));
    context.insert("height_mm", &format!("{:.2}", size.height_mm));
    context.insert("width_in", &format!("{:.2}", size.width_in()));
    context.insert("height_in", &format!("{:.2}", size.height_in()));
}

fn template_error(document: &str, detail: String) -> PipelineError {
    PipelineError::TemplateRender {
        document: document.to_string(),
        detail,
    }
}

/// Reject records missing fields the templates require. Records flagged as
/// approximate matches may render with empty manufacturer columns instead.
pub fn validate_parts(parts: &[AggregatedPart]) -> Result<(), PipelineError> {
    for part in parts {
        if part.key.value.is_empty() {
            return Err(template_error(
                "bom",
                format!("part {} has no value", part.refs_display()),
            ));
        }
        if part.key.footprint.is_empty() && !part.approximate {
            return Err(template_error(
                "bom",
                format!("part {} has no footprint", part.refs_display()),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BomRow {
    refs: String,
    qty: usize,
    value: String,
    footprint: String,
    description: String,
    mf_name: String,
    mf_pn: String,
    supplier_name: String,
    supplier_pn: String,
    mount: String,
    notes: String,
}

fn bom_rows(parts: &[AggregatedPart]) -> Vec<BomRow> {
    parts
        .iter()
        .map(|part| BomRow {
            refs: part.refs_display(),
            qty: part.quantity(),
            value: part.key.value.clone(),
            footprint: part.footprint_name().to_string(),
            description: part.description.clone().unwrap_or_default(),
            mf_name: part.mf_name.clone().unwrap_or_default(),
            mf_pn: part.key.mf_pn.clone().unwrap_or_default(),
            supplier_name: part.supplier_name.clone().unwrap_or_default(),
            supplier_pn: part.supplier_pn.clone().unwrap_or_default(),
            mount: part.mount.as_str().to_string(),
            notes: if part.approximate {
                "approximate match".to_string()
            } else {
                String::new()
            },
        })
        .collect()
}

/// Master BOM CSV with every field the netlist carries.
pub fn write_bom_master_csv(path: &Path, parts: &[AggregatedPart]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record([
            "Refs",
            "Qty",
            "Value",
            "Footprint",
            "Footprint Library",
            "Datasheet",
            "Description",
            "MF Name",
            "MF PN",
            "Supplier",
            "Supplier PN",
            "Type",
            "Notes",
        ])
        .map_err(|e| csv_error(path, e))?;

    for part in parts {
        writer
            .write_record([
                part.refs_display().as_str(),
                &part.quantity().to_string(),
                &part.key.value,
                part.footprint_name(),
                part.footprint_lib(),
                part.datasheet.as_deref().unwrap_or_default(),
                part.description.as_deref().unwrap_or_default(),
                part.mf_name.as_deref().unwrap_or_default(),
                part.key.mf_pn.as_deref().unwrap_or_default(),
                part.supplier_name.as_deref().unwrap_or_default(),
                part.supplier_pn.as_deref().unwrap_or_default(),
                part.mount.as_str(),
                if part.approximate {
                    "approximate match"
                } else {
                    ""
                },
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

/// Short BOM CSV for human review and assembly quoting.
pub fn write_bom_readable_csv(path: &Path, parts: &[AggregatedPart]) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    writer
        .write_record(["Refs", "Qty", "Description", "MF", "MF PN", "Supplier", "Supplier PN"])
        .map_err(|e| csv_error(path, e))?;

    for part in parts {
        let description = part
            .description
            .clone()
            .unwrap_or_else(|| part.key.value.clone());
        writer
            .write_record([
                part.refs_display().as_str(),
                &part.quantity().to_string(),
                &description,
                part.mf_name.as_deref().unwrap_or_default(),
                part.key.mf_pn.as_deref().unwrap_or_default(),
                part.supplier_name.as_deref().unwrap_or_default(),
                part.supplier_pn.as_deref().unwrap_or_default(),
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

/// One line of the MacroFab-style XYRS assembly export.
#[derive(Debug, Clone)]
pub struct XyrsRow {
    pub reference: String,
    pub x_mils: f64,
    pub y_mils: f64,
    pub rotation: f64,
    pub side: String,
    pub mount: MountKind,
    pub value: String,
    pub footprint: String,
    pub mf_pn: String,
}

/// Tab-separated XYRS file; one row per populated part. The Type column
/// carries MacroFab's numeric mount codes (1 = SMT, 2 = TH); the size
/// columns are present but empty, as the netlist carries no part
/// dimensions.
pub fn write_xyrs(path: &Path, rows: &[XyrsRow]) -> Result<(), PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    writer
        .write_record([
            "#Designator",
            "X-Loc",
            "Y-Loc",
            "Rotation",
            "Side",
            "Type",
            "X-Size",
            "Y-Size",
            "Value",
            "Footprint",
            "Populate",
            "MPN",
        ])
        .map_err(|e| csv_error(path, e))?;

    for row in rows {
        writer
            .write_record([
                row.reference.as_str(),
                &format!("{:.2}", row.x_mils),
                &format!("{:.2}", row.y_mils),
                &format!("{:.2}", row.rotation),
                &row.side,
                row.mount.xyrs_code(),
                "",
                "",
                &row.value,
                &row.footprint,
                "1",
                &row.mf_pn,
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

fn csv_error(path: &Path, err: csv::Error) -> PipelineError {
    PipelineError::io(path, std::io::Error::other(err))
}

/// Replace the body between `<!-- {section}:start -->` and
/// `<!-- {section}:end -->` markers, appending a fresh marker block when
/// the markers are absent.
pub fn splice_section(readme: &str, section: &str, body: &str) -> String {
    let start = format!("<!-- {section}:start -->");
    let end = format!("<!-- {section}:end -->");

    match (readme.find(&start), readme.find(&end)) {
        (Some(s), Some(e)) if s < e => {
            let mut out = String::with_capacity(readme.len() + body.len());
            out.push_str(&readme[..s + start.len()]);
            out.push('\n');
            out.push_str(body.trim_end());
            out.push('\n');
            out.push_str(&readme[e..]);
            out
        }
        _ => {
            let mut out = readme.trim_end().to_string();
            out.push_str("\n\n");
            out.push_str(&start);
            out.push('\n');
            out.push_str(body.trim_end());
            out.push('\n');
            out.push_str(&end);
            out.push('\n');
            out
        }
    }
}
