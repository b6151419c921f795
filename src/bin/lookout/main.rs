//! Lookout CLI - dependency discovery for C and C++ projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lookout::resolver::errors::ResolveError;
use lookout::util::diagnostic;
use lookout::util::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color, cli.json);

    if let Err(e) = run(cli, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("lookout=debug")
    } else if cli.quiet || cli.json {
        EnvFilter::new("lookout=error")
    } else {
        EnvFilter::new("lookout=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, shell),
        Commands::Configure(args) => commands::configure::execute(args, shell),
        Commands::Export(args) => commands::export::execute(args, shell),
        Commands::UninstallScript(args) => commands::uninstall_script::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

fn report(e: &anyhow::Error, shell: &Shell) {
    if shell.is_json() {
        shell.error(format!("{:#}", e));
        return;
    }
    match e.downcast_ref::<ResolveError>() {
        Some(err) => diagnostic::emit(&err.to_diagnostic(), shell.use_color()),
        None => eprintln!("error: {:#}", e),
    }
}
