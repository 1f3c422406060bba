use clap::Parser;
use kifisher::cli::{Cli, Commands};
use kifisher::core::error::PipelineError;

fn main() -> miette::Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper
    // Unix piping. Without this, piping to `head`, `grep -q`, etc. causes
    // a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let global = cli.global;
    match cli.command {
        Commands::New(args) => kifisher::cli::commands::new::run(args, &global),
        Commands::Bom(args) => kifisher::cli::commands::bom::run(args, &global),
        Commands::Mfr(args) => kifisher::cli::commands::mfr::run(args, &global),
        Commands::Assembly(args) => kifisher::cli::commands::assembly::run(args, &global),
        Commands::Package(args) => kifisher::cli::commands::package::run(args, &global),
        Commands::Completions(args) => kifisher::cli::commands::completions::run(args),
    }
}
