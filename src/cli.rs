use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Cache Sweeper - Find and reclaim space held by application caches
#[derive(Parser, Debug)]
#[command(name = "cache-sweeper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the known cache locations
    Targets(TargetsArgs),

    /// Measure how much space every location holds
    Scan(ScanArgs),

    /// Empty the selected locations
    Clean(CleanArgs),

    /// Speak JSON lines on stdin/stdout for a host application
    Serve,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Output the completion event as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Target ids to clean, in order
    #[arg(value_name = "ID", required_unless_present = "all_safe")]
    pub ids: Vec<String>,

    /// Select every target classified as safe
    #[arg(long, conflicts_with = "ids")]
    pub all_safe: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,

    /// Output the completion event as JSON (implies --force)
    #[arg(long)]
    pub json: bool,
}
