use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stills")]
#[command(about = "Pull stills from videos, check them, dress them up and publish them")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "STILLS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write daily rolling log files to this directory
    #[arg(long, global = true, env = "STILLS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a batch of stills and narrow it down with reducers
    Batch(BatchArgs),

    /// Run the pipeline once and print the result as JSON
    Run(RunArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct BatchArgs {
    /// Number of stills to generate
    #[arg(short, long)]
    pub num: Option<usize>,

    /// Glob pattern for videos, relative to the videos directory
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Screening command; `{input}` is replaced by the still's path
    #[arg(long)]
    pub screen_cmd: Option<String>,

    /// Minimum percentage of kept stills that must pass screening
    #[arg(long, requires = "screen_cmd", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub screen_percent: Option<u8>,
}

#[derive(ClapArgs, Debug, Default)]
pub struct RunArgs {
    /// Use this image instead of generating a still
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Keep the generated still afterwards
    #[arg(short, long)]
    pub keep: bool,
}
