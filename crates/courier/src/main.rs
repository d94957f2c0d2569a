//! Courier CLI binary.
//!
//! - Watch a directory and publish scheduled post folders
//! - Create post folders from the command line
//! - Validate a post folder

use clap::Parser;
use courier::{CourierConfig, init_tracing};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_folder, create_post, watch};

    // Credentials may live in a .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let config = CourierConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Watch { dry_run, dir, stats } => {
            watch(config, dry_run, dir, stats).await?;
        }

        Commands::Create {
            at,
            platforms,
            text,
            files,
            replies,
        } => {
            create_post(&config, &at, &platforms, text, files, replies).await?;
        }

        Commands::Check { folder } => {
            check_folder(&config, &folder).await?;
        }
    }

    Ok(())
}
