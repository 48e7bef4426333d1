//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Strata - dependency-aware SQL transformation runner
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build models against the database in dependency order
    Run(RunArgs),

    /// Render model SQL to the compiled output directory
    Compile(CompileArgs),

    /// List models in scheduled order
    Ls(LsArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Models to run, comma-separated; dependencies are included (default: all)
    #[arg(short, long)]
    pub select: Option<String>,

    /// Maximum models built concurrently within a batch
    #[arg(long, default_value_t = 4)]
    pub threads: usize,

    /// Rebuild incremental models from scratch, resetting their watermarks
    #[arg(long)]
    pub full_refresh: bool,
}

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Models to compile, comma-separated; dependencies are included (default: all)
    #[arg(short, long)]
    pub select: Option<String>,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,

    /// Models to list, comma-separated; dependencies are included (default: all)
    #[arg(short, long)]
    pub select: Option<String>,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Batches with materializations
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
