//! doxup - post-processor for dox-generated API documentation

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "doxup")]
#[command(version, about = "Rewrite dox-generated documentation pages in place", long_about = None)]
#[command(after_help = "EXAMPLES:
    doxup              Process ./docs recursively
    doxup site -q      Process site/docs without progress output")]
struct Cli {
    /// Directory containing the docs/ tree
    #[arg(value_name = "ROOT", default_value = ".")]
    root: PathBuf,

    /// Suppress per-file progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    doxup::process_docs(&cli.root, cli.quiet)
        .with_context(|| format!("failed to process {}", cli.root.display()))
}
