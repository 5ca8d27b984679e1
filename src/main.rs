//! cl-split - split a branch into per-OWNERS changes
//!
//! CLI binary around the splitting engine in the `cl_split` library.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser)]
#[command(name = "cl-split")]
#[command(about = "Split a branch into per-OWNERS changes and upload them for review")]
#[command(version)]
struct Cli {
    /// Path inside the git repository (defaults to current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// File holding the description for every uploaded change;
    /// $directory expands to the change's directory list
    #[arg(long, value_name = "FILE")]
    description: PathBuf,

    /// File holding a comment to publish on every uploaded change
    #[arg(long, value_name = "FILE")]
    comment: Option<PathBuf>,

    /// Preview the split without creating branches or uploading
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Send every uploaded change to the commit queue as a dry run
    #[arg(long)]
    cq_dry_run: bool,

    /// Enable auto-submit on every uploaded change
    #[arg(long)]
    enable_auto_submit: bool,

    /// Maximum directory depth searched for OWNERS files; 0 means no limit
    #[arg(long, default_value_t = 0)]
    max_depth: usize,

    /// Topic to set on every uploaded change
    #[arg(long)]
    topic: Option<String>,

    /// Review host override (defaults to a host derived from the origin remote)
    #[arg(long)]
    host: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::run_split(&cli)
}
