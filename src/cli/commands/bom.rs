//! `kf bom` command - aggregate the netlist into BOM files

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::artifact::netlist;
use crate::bom::{aggregate, AggregatedPart};
use crate::cli::GlobalOpts;
use crate::core::error::PipelineError;
use crate::core::project::{today, Project};
use crate::render::{
    self, report_written, DocumentArtifact, DocumentKind, Renderer,
};

#[derive(clap::Args, Debug)]
pub struct BomArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub project: std::path::PathBuf,
}

pub fn run(args: BomArgs, global: &GlobalOpts) -> Result<(), PipelineError> {
    let mut project = Project::open(&args.project)?;
    let entries = netlist::read(&project.netlist_path())?;
    let parts = aggregate(&entries);
    render::validate_parts(&parts)?;

    let renderer = Renderer::new()?;

    render::write_bom_master_csv(&project.bom_master_csv(), &parts)?;
    render::write_bom_readable_csv(&project.bom_readable_csv(), &parts)?;

    let markdown = renderer.bom_markdown(&project.manifest, &parts, &today())?;
    std::fs::write(project.bom_markdown(), markdown)
        .map_err(|e| PipelineError::io(project.bom_markdown(), e))?;

    splice_readme(&project, &renderer, &parts)?;
    project.touch_updated()?;

    if !global.quiet {
        print_table(&parts);
    }
    report_written(
        &[
            DocumentArtifact::new(DocumentKind::BomMasterCsv, project.bom_master_csv()),
            DocumentArtifact::new(DocumentKind::BomReadableCsv, project.bom_readable_csv()),
            DocumentArtifact::new(DocumentKind::BomMarkdown, project.bom_markdown()),
        ],
        global.quiet,
    );
    Ok(())
}

fn splice_readme(
    project: &Project,
    renderer: &Renderer,
    parts: &[AggregatedPart],
) -> Result<(), PipelineError> {
    let readme_path = project.readme_path();
    if !readme_path.is_file() {
        return Ok(());
    }
    let readme =
        std::fs::read_to_string(&readme_path).map_err(|e| PipelineError::io(&readme_path, e))?;
    let section = renderer.bom_section(parts)?;
    let spliced = render::splice_section(&readme, "bom", &section);
    std::fs::write(&readme_path, spliced).map_err(|e| PipelineError::io(&readme_path, e))
}

fn print_table(parts: &[AggregatedPart]) {
    let mut builder = Builder::default();
    builder.push_record(["Refs", "Qty", "Value", "Footprint", "MF PN"]);
    for part in parts {
        builder.push_record([
            part.refs_display(),
            part.quantity().to_string(),
            part.key.value.clone(),
            part.footprint_name().to_string(),
            part.key.mf_pn.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
}
