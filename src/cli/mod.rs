//! # Command Line Interface
//!
//! `passkeeper-cli`: account and secret commands against a running server,
//! plus local database maintenance.

pub mod output;
pub mod token;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::client::{save_binary_secret, ClientConfig, PassKeeperClient};
use crate::config::DatabaseConfig;
use crate::domain::{CreditCard, KeyValue, SecretId, Text};
use crate::storage::{
    create_pool, get_migration_version, list_applied_migrations, run_migrations,
    validate_migrations,
};

#[derive(Parser)]
#[command(name = "passkeeper-cli")]
#[command(about = "PassKeeper secret storage client")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the PassKeeper server
    #[arg(long, global = true, env = "PASSKEEPER_SERVER", default_value = "http://127.0.0.1:8080")]
    pub server: String,

    /// File the session token is read from and written to
    #[arg(long, global = true, env = "PASSKEEPER_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and store its token
    Register { login: String, password: String },

    /// Log in and store the issued token
    Login { login: String, password: String },

    /// List your secrets
    List {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one secret
    Get { id: SecretId },

    /// Store a text secret
    AddText {
        text: String,
        #[arg(long, default_value = "")]
        meta: String,
    },

    /// Store a key/value secret
    AddKv {
        key: String,
        value: String,
        #[arg(long, default_value = "")]
        meta: String,
    },

    /// Store a credit card
    AddCard {
        number: String,
        expiration: String,
        cvv: String,
        cardholder: String,
        #[arg(long, default_value = "")]
        meta: String,
    },

    /// Upload a file as a binary secret
    AddFile {
        path: PathBuf,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Restore a binary secret to disk
    Dump {
        id: SecretId,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Delete a secret
    Delete { id: SecretId },

    /// Local database maintenance
    Database {
        /// Database URL (defaults to DATABASE_URI or the built-in default)
        #[arg(long, env = "DATABASE_URI")]
        database_url: Option<String>,

        #[command(subcommand)]
        command: DatabaseCommands,
    },
}

#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// Run pending migrations
    Migrate,

    /// Show migration status
    Status,

    /// List all applied migrations
    List,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    initialise_logging(cli.verbose);

    let token_path = match cli.token_file.clone() {
        Some(path) => path,
        None => token::default_token_path()?,
    };
    let mut client = PassKeeperClient::new(ClientConfig {
        base_url: cli.server.clone(),
        timeout: cli.timeout,
    })?;

    match cli.command {
        Commands::Register { login, password } => {
            let account = client.register(&login, &password).await?;
            token::save_token(&token_path, &account.token)?;
            println!("Registered '{}' (id {})", account.login, account.id);
        }
        Commands::Login { login, password } => {
            let issued = client.login(&login, &password).await?;
            token::save_token(&token_path, &issued)?;
            println!("Logged in as '{}'", login);
        }
        Commands::Database { database_url, command } => {
            let mut database = DatabaseConfig { auto_migrate: false, ..Default::default() };
            if let Some(url) = database_url {
                database.url = url;
            }
            handle_database_command(command, &database).await?;
        }
        command => {
            let client = client.with_token(token::load_token(&token_path)?);
            handle_secret_command(command, &client).await?;
        }
    }

    Ok(())
}

async fn handle_secret_command(
    command: Commands,
    client: &PassKeeperClient,
) -> anyhow::Result<()> {
    match command {
        Commands::List { json } => {
            let secrets = client.list_secrets().await?;
            if json {
                output::print_json(&secrets)?;
            } else {
                output::print_secrets_table(&secrets);
            }
        }
        Commands::Get { id } => {
            let secret = client.get_secret(id).await?;
            output::print_secret(&secret);
        }
        Commands::AddText { text, meta } => {
            let saved = client.post_text(Text { value: text }, &meta).await?;
            println!("Saved secret {}", saved.id);
        }
        Commands::AddKv { key, value, meta } => {
            let saved = client.post_key_value(KeyValue { key, value }, &meta).await?;
            println!("Saved secret {}", saved.id);
        }
        Commands::AddCard { number, expiration, cvv, cardholder, meta } => {
            let card = CreditCard { number, expiration, cvv, cardholder };
            let saved = client.post_credit_card(card, &meta).await?;
            println!("Saved secret {}", saved.id);
        }
        Commands::AddFile { path, description } => {
            let saved = client.post_file(&path, &description).await?;
            println!("Saved {} as secret {}", path.display(), saved.id);
        }
        Commands::Dump { id, dir } => {
            let secret = client.get_secret(id).await?;
            let path = save_binary_secret(&dir, &secret).await?;
            println!("Wrote {}", path.display());
        }
        Commands::Delete { id } => {
            client.delete_secret(id).await?;
            println!("Deleted secret {}", id);
        }
        Commands::Register { .. } | Commands::Login { .. } | Commands::Database { .. } => {
            anyhow::bail!("command does not use a session token")
        }
    }
    Ok(())
}

async fn handle_database_command(
    command: DatabaseCommands,
    config: &DatabaseConfig,
) -> anyhow::Result<()> {
    let pool = create_pool(config).await.context("Failed to open database")?;

    match command {
        DatabaseCommands::Migrate => {
            println!("Running database migrations...");
            run_migrations(&pool).await?;
            println!("Migrations completed successfully!");
        }
        DatabaseCommands::Status => {
            let version = get_migration_version(&pool).await?;
            println!("Current schema version: {}", version);
            if validate_migrations(&pool).await? {
                println!("Database schema is up to date");
            } else {
                anyhow::bail!("Database schema has pending migrations");
            }
        }
        DatabaseCommands::List => {
            let migrations = list_applied_migrations(&pool).await?;
            if migrations.is_empty() {
                println!("No migrations have been applied");
                return Ok(());
            }

            output::print_table_header(&[("VERSION", 16), ("DESCRIPTION", 40), ("APPLIED", 25)]);
            for migration in migrations {
                println!(
                    "{:<16} {:<40} {}",
                    migration.version,
                    output::truncate(&migration.description, 40),
                    migration.installed_on.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
    }
    Ok(())
}

fn initialise_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore a subscriber installed elsewhere.
    let _ = tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).finish(),
    );
}
