mod gifts;
mod products;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use lapstore_admin::{Catalog, CatalogSettings};
use lapstore_core::AppConfig;
use lapstore_db::PgProductStore;
use lapstore_storage::{CompressionSettings, JpegCompressor, StorageClient, StorageConfig};
use tracing_subscriber::EnvFilter;

use crate::gifts::GiftsCommands;
use crate::products::ProductsCommands;

#[derive(Debug, Parser)]
#[command(name = "lapstore-cli")]
#[command(about = "Lapstore catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Inspect and manage catalog products
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// Free-gift presets offered in the product editor
    Gifts {
        #[command(subcommand)]
        command: GiftsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("lapstore-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let config = lapstore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db { command } => run_db(&config, command).await,
        Commands::Products { command } => products::run(&config, command).await,
        Commands::Gifts { command } => gifts::run(&config, &command),
    }
}

async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = lapstore_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            lapstore_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = lapstore_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

/// Wires the Postgres store and storage client into a [`Catalog`].
///
/// # Errors
///
/// Returns an error if the pool cannot connect or the storage client cannot
/// be built from the configured URL.
pub(crate) async fn connect_catalog(config: &AppConfig) -> anyhow::Result<Catalog> {
    let pool = lapstore_db::connect_pool_from_config(config).await?;
    let storage = StorageClient::new(StorageConfig::from_app_config(config))?;
    let compressor = JpegCompressor::new(CompressionSettings::from_app_config(config));
    let catalog = Catalog::new(
        Arc::new(PgProductStore::new(pool)),
        Arc::new(storage),
        Arc::new(compressor),
        CatalogSettings::from_app_config(config),
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests;
