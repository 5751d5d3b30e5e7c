//! Catalog CLI - database migrations, users and seed data.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! catalog-cli migrate
//!
//! # Create a user with claims
//! catalog-cli user create -e ana@example.com -n "Ana Souza" -p 's3cret-pass' \
//!     -c supplier:add -c supplier:edit
//!
//! # Grant claims to an existing user
//! catalog-cli user grant -e ana@example.com -c product:delete
//!
//! # Load suppliers and products from YAML
//! catalog-cli seed -f seed/catalog.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CATALOG_UPLOAD_DIR` - Where seeded product images are stored

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Supplier catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users and their claims
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Load suppliers and products from a YAML file
    Seed {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,

        /// Claims to grant, e.g. `supplier:add` (repeatable)
        #[arg(short, long = "claim")]
        claims: Vec<String>,
    },
    /// Grant claims to an existing user
    Grant {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Claims to grant, e.g. `product:edit` (repeatable)
        #[arg(short, long = "claim", required = true)]
        claims: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
                claims,
            } => commands::user::create(&email, &name, &password, &claims).await?,
            UserAction::Grant { email, claims } => {
                commands::user::grant(&email, &claims).await?;
            }
        },
        Commands::Seed { file } => commands::seed::run(&file).await?,
    }
    Ok(())
}
