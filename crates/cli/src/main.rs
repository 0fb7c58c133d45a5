//! Kicks CLI - database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront migrations
//! kicks-cli migrate
//!
//! # Add one catalog item per image in a directory
//! kicks-cli seed items --dir public/img/sneakers
//!
//! # Same, removing never-ordered items first
//! kicks-cli seed items --dir public/img/sneakers --reset
//! ```
//!
//! Both commands read `KICKS_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kicks-cli")]
#[command(author, version, about = "Kicks storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create one catalog item per image file
    Items {
        /// Directory containing sneaker images
        #[arg(short, long)]
        dir: PathBuf,

        /// Image path prefix stored on each item, relative to the static root
        #[arg(long, default_value = "img/sneakers")]
        image_prefix: String,

        /// Delete items that have never been ordered before seeding
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Items {
                dir,
                image_prefix,
                reset,
            } => {
                commands::seed::items(&dir, &image_prefix, reset).await?;
            }
        },
    }
    Ok(())
}
