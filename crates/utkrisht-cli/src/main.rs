//! Utkrisht operator CLI.
//!
//! Reads the same environment as the API server (`DATABASE_URL`, `JWT_SECRET`,
//! `CLOUDINARY_*`, ...), plus `ADMIN_*` / `SUPERADMIN_*` for `seed`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use utkrisht_api::constants::PASSWORD_HASH_COST;
use utkrisht_api::services::diagnostics::{ping_store, probe_upload};
use utkrisht_api::services::upload::RetryPolicy;
use utkrisht_api::setup::{database, storage};
use utkrisht_cli::{init_tracing, seed, seed_accounts};
use utkrisht_core::{Config, FolderResolver};
use utkrisht_db::Repositories;

#[derive(Parser)]
#[command(name = "utkrisht", about = "Utkrisht site operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or refresh the ADMIN and SUPERADMIN accounts
    Seed,
    /// Ping the media store and run an upload probe
    StorageCheck,
    /// Apply database migrations
    Migrate,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize report")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Seed => {
            let pool = database::setup_database(&config).await?;
            let repos = Repositories::postgres(pool);
            let accounts = seed_accounts(|key| std::env::var(key).ok());
            let reports = seed(repos.users.as_ref(), &accounts, PASSWORD_HASH_COST).await?;
            print_json(&reports)?;
        }
        Commands::StorageCheck => {
            let store = storage::setup_storage(&config).await?;
            let folders = FolderResolver::new(config.media_root_folder());
            let policy = RetryPolicy::from_settings(config.upload_retry());

            let ping = ping_store(store.as_ref()).await;
            let upload = probe_upload(store.as_ref(), &policy, &folders).await;
            let healthy = ping.is_ok() && upload.is_ok();
            print_json(&serde_json::json!({ "ping": ping, "upload": upload }))?;
            if !healthy {
                anyhow::bail!("Media store check failed");
            }
        }
        Commands::Migrate => {
            // setup_database already applies pending migrations
            database::setup_database(&config).await?;
            println!("Migrations applied");
        }
    }

    Ok(())
}
