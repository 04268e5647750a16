mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fibreg", about = "Serial-section image preprocessing and drift registration")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Maximum worker threads (default: all cores)
    #[arg(short = 'j', long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop, normalize and/or invert a slice stack
    Preprocess(commands::preprocess::PreprocessArgs),
    /// Estimate slice drift and write a registered stack
    Register(commands::register::RegisterArgs),
    /// Run a multi-experiment batch from a TOML config
    Run(commands::pipeline::RunArgs),
    /// Print or save a default batch config
    Config(commands::config::ConfigArgs),
    /// Show the slices of a directory, their size and polarity
    Info(commands::info::InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Preprocess(args) => commands::preprocess::run(args, cli.workers),
        Commands::Register(args) => commands::register::run(args, cli.workers),
        Commands::Run(args) => commands::pipeline::run(args, cli.workers),
        Commands::Config(args) => commands::config::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
