//! Coach Exchange CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the marketplace schema and both session tables
//! ce-cli migrate
//!
//! # Hash the admin password for ADMIN_PASSWORD_HASH (reads stdin)
//! ce-cli admin hash-password
//!
//! # Insert demo listings and a published blog post
//! ce-cli seed
//! ```
//!
//! The database comes from `DATABASE_URL`, falling back to
//! `STOREFRONT_DATABASE_URL` and then `ADMIN_DATABASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ce-cli")]
#[command(author, version, about = "Coach Exchange CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (marketplace schema and session tables)
    Migrate,
    /// Admin account tools
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert demo listings and a blog post
    Seed {
        /// Cover image URL for the demo blog post
        #[arg(long, default_value = commands::seed::DEFAULT_COVER_URL)]
        cover_url: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Read a password from stdin and print its Argon2id hash
    HashPassword,
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
        Commands::Migrate => commands::migrate::all().await?,
        Commands::Admin { action } => match action {
            AdminAction::HashPassword => commands::admin::hash_password()?,
        },
        Commands::Seed { cover_url } => commands::seed::demo(&cover_url).await?,
    }
    Ok(())
}
