//! Keel CLI - configure, build and test CMake projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use keel::ops::{OrchestratorError, Stage, Step};
use keel::util::{Diagnostic, Shell};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    init_logging(&shell);

    if let Err(e) = run(cli, &shell) {
        report_error(&shell, &e);
        std::process::exit(1);
    }
}

fn init_logging(shell: &Shell) {
    let filter = if shell.is_quiet() {
        EnvFilter::new("keel=warn")
    } else if shell.is_verbose() {
        EnvFilter::new("keel=debug")
    } else {
        EnvFilter::new("keel=info")
    };

    // stderr keeps stdout free for --plan and completions
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(shell.use_color())
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let args = &cli.pipeline;

    match cli.command.unwrap_or(Commands::All) {
        Commands::All => commands::pipeline::execute(args, Step::until(Stage::Tested), shell),
        Commands::Configure => {
            commands::pipeline::execute(args, Step::until(Stage::Configured), shell)
        }
        Commands::Build => commands::pipeline::execute(args, Step::until(Stage::Built), shell),
        Commands::Test => commands::pipeline::execute(args, &[Step::Test], shell),
        Commands::Clean => commands::clean::execute(args, shell),
        Commands::Doctor => commands::doctor::execute(args, cli.verbose),
        Commands::Completions(completions) => commands::completions::execute(completions),
    }
}

/// Print a failure once, with suggestions when the failure kind is known.
fn report_error(shell: &Shell, err: &anyhow::Error) {
    let diag = match err.downcast_ref::<OrchestratorError>() {
        Some(kind) => kind.to_diagnostic(),
        None => Diagnostic::error(format!("{:#}", err)),
    };
    shell.diagnostic(&diag);
}
