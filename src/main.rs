//! ecs-template CLI - fetch sources and render destinations as templates
//!
//! Usage: ecs-template [OPTIONS]
//!
//! Selection flags (repeatable):
//!   -f, --file <PAIR>        source[,dest] file to fetch and render
//!   -d, --dir <PAIR>         source[,dest] directory or archive to fetch
//!   -g, --glob <PATTERN>     files to render in place
//!   -m, --manifest <REF>     manifest listing dirs, globs and files
//!
//! Without selection flags the help text is printed.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use ecs_template::config::Config;
use ecs_template::logging;
use ecs_template::presentation::{create_resolver, Cli};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.has_selection() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let (config, warnings) = Config::discover(cli.config.as_deref())?;
    logging::init(cli.quiet || config.output.quiet, cli.verbose);
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let working_dir = std::env::current_dir().context("could not read current directory")?;
    let resolver = create_resolver(&config, working_dir)?;

    let summary = resolver.run(&cli.request())?;
    tracing::info!("done: {summary}");
    Ok(())
}
