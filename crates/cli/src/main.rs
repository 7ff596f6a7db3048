//! FashionStore CLI - database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! fs-cli migrate
//!
//! # Load a catalog from YAML, replacing whatever is there
//! fs-cli seed products catalog.yaml --clear
//!
//! # Let an existing account use the back office
//! fs-cli users promote owner@example.com
//!
//! # Delete expired bearer tokens
//! fs-cli prune-tokens
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed products` - Insert catalog entries from a YAML file
//! - `users promote` / `users demote` - Grant or revoke the admin role
//! - `prune-tokens` - Remove expired API tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use fashion_store_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "fs-cli")]
#[command(author, version, about = "FashionStore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage account roles
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Delete expired API tokens
    PruneTokens,
}

#[derive(Subcommand)]
enum UsersAction {
    /// Grant the admin role
    Promote {
        /// Account email
        email: String,
    },
    /// Revoke the admin role
    Demote {
        /// Account email
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML file
    Products {
        /// Path to the YAML catalog
        file: String,

        /// Delete the existing catalog (and its reviews) first
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
            SeedTarget::Products { file, clear } => commands::seed::products(&file, clear).await?,
        },
        Commands::Users { action } => match action {
            UsersAction::Promote { email } => commands::users::set_role(&email, UserRole::Admin).await?,
            UsersAction::Demote { email } => commands::users::set_role(&email, UserRole::Customer).await?,
        },
        Commands::PruneTokens => commands::tokens::prune().await?,
    }
    Ok(())
}
