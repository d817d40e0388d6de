#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;
mod report;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use stylebind_core::paths::normalize;

#[derive(Parser, Debug)]
#[command(name = "stylebind")]
#[command(author, version, about = "Type declarations and diagnostics for CSS modules", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long)]
    json: bool,

    /// Path to a tsconfig.json, or to a folder containing one
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    project: PathBuf,

    /// Watch for changes and regenerate files
    #[arg(short, long)]
    watch: bool,

    /// Remove the output directory before generating files
    #[arg(long)]
    clean: bool,

    /// Color output (default when stderr is a terminal)
    #[arg(long, overrides_with = "no_pretty")]
    pretty: bool,

    /// Disable colored output
    #[arg(long, overrides_with = "pretty")]
    no_pretty: bool,

    /// Do not clear the console between watch-mode reports
    #[arg(long)]
    preserve_watch_output: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let cwd = std::env::current_dir().into_diagnostic()?;
    let project = if cli.project.is_absolute() {
        normalize(&cli.project)
    } else {
        normalize(&cwd.join(&cli.project))
    };

    let pretty = if cli.pretty {
        true
    } else if cli.no_pretty {
        false
    } else {
        std::io::stderr().is_terminal()
    };

    let options = commands::RunOptions {
        project,
        cwd,
        pretty,
        clean: cli.clean,
        json: cli.json,
    };

    if cli.watch {
        commands::watch::run(&options, cli.preserve_watch_output)
    } else {
        commands::check::run(&options)
    }
}
