mod cli;
mod commands;
mod config;
mod logging;

use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use crate::{
    cli::{Args, Commands},
    config::AppConfig,
    logging::init_logging,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let guard = match init_logging(args.verbose, args.quiet, args.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    if let Err(e) = run(args).await {
        error!("Application error: {e:#}");
        eprintln!("Error: {e:#}");
        drop(guard);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    match args.command {
        Commands::Batch(batch) => {
            let outcome = commands::batch::execute(&config, batch).await?;
            for file in &outcome.files {
                println!("{}", file.display());
            }
        }
        Commands::Run(run) => {
            let result = commands::run::execute(&config, run).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
