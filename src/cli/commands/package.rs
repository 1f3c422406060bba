//! `kf package` command - verify outputs and build the release archive

use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::error::PipelineError;
use crate::core::project::{today, Project};
use crate::package::{verify_members, OutputBundle};
use crate::render::{report_written, DocumentArtifact, DocumentKind, Renderer};

#[derive(clap::Args, Debug)]
pub struct PackageArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub project: std::path::PathBuf,
}

pub fn run(args: PackageArgs, global: &GlobalOpts) -> Result<(), PipelineError> {
    let mut project = Project::open(&args.project)?;

    // Every member is checked before a single archive byte is written, so
    // a failed run never leaves a partial release behind.
    let members = release_members(&project);
    verify_members(&members)?;

    let renderer = Renderer::new()?;
    let release = renderer.release_markdown(
        &project.manifest,
        &read_section(&project.bom_markdown())?,
        &read_section(&project.assembly_markdown())?,
        &read_section(&project.fabrication_markdown())?,
        &today(),
    )?;
    std::fs::write(project.release_markdown(), release)
        .map_err(|e| PipelineError::io(project.release_markdown(), e))?;

    let mut archive_members = members;
    archive_members.push(project.release_markdown());
    OutputBundle::new(project.release_zip(), archive_members).write()?;

    project.touch_updated()?;

    report_written(
        &[DocumentArtifact::new(
            DocumentKind::ReleaseDocument,
            project.release_markdown(),
        )],
        global.quiet,
    );
    if !global.quiet {
        println!(
            "{} Release package: {}",
            console::style("✓").green(),
            console::style(project.release_zip().display()).cyan()
        );
    }
    Ok(())
}

/// The outputs a complete release must contain.
fn release_members(project: &Project) -> Vec<PathBuf> {
    vec![
        project.bom_master_csv(),
        project.bom_readable_csv(),
        project.bom_markdown(),
        project.fabrication_markdown(),
        project.assembly_xyrs(),
        project.assembly_markdown(),
        project.gerbers_zip(),
        project.stencil_zip(),
    ]
}

fn read_section(path: &std::path::Path) -> Result<String, PipelineError> {
    std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}
