//! `kf new` command - scaffold a new project

use console::style;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::error::PipelineError;
use crate::core::project::{Manifest, Project};
use crate::render::Renderer;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Project name, used for the directory and artifact file names
    pub name: String,

    /// Human-readable title (default: the project name)
    #[arg(long)]
    pub title: Option<String>,

    /// One-line project description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Version recorded in the manifest, e.g. "1.0"
    #[arg(long = "version-tag")]
    pub version_tag: Option<String>,

    /// Scaffold into an existing directory
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<(), PipelineError> {
    let root = PathBuf::from(&args.name);

    if root.exists() && !args.force {
        return Err(PipelineError::io(
            &root,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "directory already exists (use --force to scaffold into it)",
            ),
        ));
    }

    let config = Config::load();
    let version = args
        .version_tag
        .unwrap_or_else(|| config.default_version());
    let manifest = Manifest::new(&args.name, args.title, args.description, version, &config);

    let project = Project::scaffold(&root, manifest)?;
    let renderer = Renderer::new()?;

    let readme = renderer.readme(&project.manifest)?;
    std::fs::write(project.readme_path(), readme)
        .map_err(|e| PipelineError::io(project.readme_path(), e))?;

    let schematic = renderer.schematic(&project.manifest)?;
    std::fs::write(project.schematic_path(), schematic)
        .map_err(|e| PipelineError::io(project.schematic_path(), e))?;

    if !global.quiet {
        println!(
            "{} Created project {} at {}",
            style("✓").green(),
            style(&project.manifest.name).yellow(),
            style(project.root().display()).cyan()
        );
        println!();
        println!("Next steps:");
        println!(
            "  {} Draw the schematic and export {}",
            style("kf bom").yellow(),
            project.manifest.artifacts.netlist
        );
        println!(
            "  {} After plotting gerbers into {}/",
            style("kf mfr").yellow(),
            project.manifest.outputs.gerbers
        );
    }
    Ok(())
}
