//! `kf assembly` command - XYRS export and assembly summary

use std::collections::HashMap;

use crate::artifact::netlist::{self, NetlistEntry};
use crate::artifact::placement::{self, PlacementRecord};
use crate::artifact::gerber;
use crate::bom::{aggregate, natural_cmp};
use crate::cli::GlobalOpts;
use crate::core::error::PipelineError;
use crate::core::project::{today, Project};
use crate::render::{
    self, report_written, DocumentArtifact, DocumentKind, Renderer, XyrsRow,
};

const MILS_PER_MM: f64 = 1000.0 / 25.4;

#[derive(clap::Args, Debug)]
pub struct AssemblyArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub project: std::path::PathBuf,
}

pub fn run(args: AssemblyArgs, global: &GlobalOpts) -> Result<(), PipelineError> {
    let mut project = Project::open(&args.project)?;

    // Assembly quoting needs the gerber archive alongside the XYRS file,
    // so the manufacturing stage must have run first.
    if !project.gerbers_zip().is_file() {
        return Err(PipelineError::InvalidCommandSequence {
            command: "assembly".to_string(),
            required: "mfr".to_string(),
        });
    }

    let entries = netlist::read(&project.netlist_path())?;
    let placements = read_placements(&project)?;
    let rows = xyrs_rows(&entries, &placements)?;

    render::write_xyrs(&project.assembly_xyrs(), &rows)?;

    let size = gerber::board_size(&project.edge_cuts_path())?;
    let unique_parts = aggregate(&entries).len();
    let renderer = Renderer::new()?;
    let markdown = renderer.assembly_markdown(
        &project.manifest,
        unique_parts,
        rows.len(),
        &size,
        &today(),
    )?;
    std::fs::write(project.assembly_markdown(), markdown)
        .map_err(|e| PipelineError::io(project.assembly_markdown(), e))?;

    splice_readme(&project, &renderer, unique_parts, rows.len(), &size)?;
    project.touch_updated()?;

    report_written(
        &[
            DocumentArtifact::new(DocumentKind::AssemblyXyrs, project.assembly_xyrs()),
            DocumentArtifact::new(DocumentKind::AssemblyMarkdown, project.assembly_markdown()),
        ],
        global.quiet,
    );
    Ok(())
}

/// Merge the top and bottom placement exports. The top file is required;
/// a single-sided board may have no bottom export at all.
fn read_placements(project: &Project) -> Result<Vec<PlacementRecord>, PipelineError> {
    let [top, bottom] = project.placement_paths();
    let mut records = placement::read(&top)?;
    if bottom.is_file() {
        records.extend(placement::read(&bottom)?);
    }
    Ok(records)
}

fn xyrs_rows(
    entries: &[NetlistEntry],
    placements: &[PlacementRecord],
) -> Result<Vec<XyrsRow>, PipelineError> {
    let by_ref: HashMap<&str, &PlacementRecord> = placements
        .iter()
        .map(|record| (record.reference.as_str(), record))
        .collect();

    let mut rows = Vec::new();
    let mut unplaced = Vec::new();

    for entry in entries {
        if !entry.mount.is_placeable() {
            continue;
        }
        let Some(record) = by_ref.get(entry.reference.as_str()) else {
            unplaced.push(entry.reference.clone());
            continue;
        };
        rows.push(XyrsRow {
            reference: entry.reference.clone(),
            x_mils: record.x_mm * MILS_PER_MM,
            y_mils: record.y_mm * MILS_PER_MM,
            rotation: record.rotation,
            side: record.side.as_str().to_string(),
            mount: entry.mount,
            value: entry.value.clone(),
            footprint: entry.footprint_name().unwrap_or_default().to_string(),
            mf_pn: entry.mf_pn.clone().unwrap_or_default(),
        });
    }

    if !unplaced.is_empty() {
        unplaced.sort_by(|a, b| natural_cmp(a, b));
        return Err(PipelineError::TemplateRender {
            document: "assembly XYRS".to_string(),
            detail: format!(
                "no placement found for populated parts: {}",
                unplaced.join(" ")
            ),
        });
    }

    rows.sort_by(|a, b| natural_cmp(&a.reference, &b.reference));
    Ok(rows)
}

fn splice_readme(
    project: &Project,
    renderer: &Renderer,
    unique_parts: usize,
    placements: usize,
    size: &gerber::BoardSize,
) -> Result<(), PipelineError> {
    let readme_path = project.readme_path();
    if !readme_path.is_file() {
        return Ok(());
    }
    let readme =
        std::fs::read_to_string(&readme_path).map_err(|e| PipelineError::io(&readme_path, e))?;
    let section = renderer.assembly_section(unique_parts, placements, size)?;
    let spliced = render::splice_section(&readme, "assembly", &section);
    std::fs::write(&readme_path, spliced).map_err(|e| PipelineError::io(&readme_path, e))
}
