//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};

use crate::cli::commands::{
    assembly::AssemblyArgs, bom::BomArgs, completions::CompletionsArgs, mfr::MfrArgs,
    new::NewArgs, package::PackageArgs,
};

#[derive(Parser)]
#[command(name = "kf")]
#[command(author, version, about = "KiCad documentation pipeline")]
#[command(
    long_about = "Generates BOMs, assembly exports, fabrication notes, and release \
packages from a KiCad project's exported artifacts in a single batch pass."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold a new project with manifest, README, and blank schematic
    #[command(visible_alias = "n")]
    New(NewArgs),

    /// Generate BOM files from the exported netlist
    #[command(visible_alias = "b")]
    Bom(BomArgs),

    /// Generate fabrication notes and gerber/stencil archives
    #[command(visible_alias = "m", alias = "manufacturing")]
    Mfr(MfrArgs),

    /// Generate the XYRS placement export and assembly summary
    #[command(visible_alias = "a", alias = "assy")]
    Assembly(AssemblyArgs),

    /// Verify all outputs and build the release archive
    #[command(visible_alias = "p")]
    Package(PackageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
