//! `kf completions` command - shell completion generation

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::core::error::PipelineError;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<(), PipelineError> {
    let mut command = Cli::command();
    clap_complete::generate(args.shell, &mut command, "kf", &mut std::io::stdout());
    Ok(())
}
