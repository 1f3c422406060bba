//! `kf mfr` command - fabrication notes and gerber archives

use crate::artifact::{board, gerber, ArtifactKind};
use crate::cli::GlobalOpts;
use crate::core::error::PipelineError;
use crate::core::project::{today, Project};
use crate::package::{
    collect_by_extension, OutputBundle, GERBER_EXTENSIONS, STENCIL_EXTENSIONS,
};
use crate::render::{report_written, DocumentArtifact, DocumentKind, Renderer};

#[derive(clap::Args, Debug)]
pub struct MfrArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub project: std::path::PathBuf,
}

pub fn run(args: MfrArgs, global: &GlobalOpts) -> Result<(), PipelineError> {
    let mut project = Project::open(&args.project)?;

    let info = board::read(&project.board_path())?;
    let size = gerber::board_size(&project.edge_cuts_path())?;

    let gerbers = collect_by_extension(&project.gerbers_dir(), GERBER_EXTENSIONS);
    if gerbers.is_empty() {
        return Err(PipelineError::MissingArtifact {
            kind: ArtifactKind::Gerber,
            path: project.gerbers_dir(),
        });
    }
    let stencil = collect_by_extension(&project.gerbers_dir(), STENCIL_EXTENSIONS);

    let file_names: Vec<String> = gerbers
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();

    let renderer = Renderer::new()?;
    let notes =
        renderer.fabrication_markdown(&project.manifest, &info, &size, &file_names, &today())?;
    std::fs::write(project.fabrication_markdown(), notes)
        .map_err(|e| PipelineError::io(project.fabrication_markdown(), e))?;

    OutputBundle::new(project.gerbers_zip(), gerbers).write()?;
    OutputBundle::new(project.stencil_zip(), stencil).write()?;

    project.touch_updated()?;

    report_written(
        &[DocumentArtifact::new(
            DocumentKind::FabricationNotes,
            project.fabrication_markdown(),
        )],
        global.quiet,
    );
    if !global.quiet {
        println!(
            "{} Archived gerbers: {}",
            console::style("✓").green(),
            console::style(project.gerbers_zip().display()).cyan()
        );
        println!(
            "{} Archived stencil layers: {}",
            console::style("✓").green(),
            console::style(project.stencil_zip().display()).cyan()
        );
    }
    Ok(())
}
