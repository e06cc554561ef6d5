mod api;
mod middleware;

use std::sync::Arc;

use lapstore_admin::{Catalog, CatalogSettings};
use lapstore_core::{load_gift_presets, preset_gifts};
use lapstore_db::PgProductStore;
use lapstore_storage::{CompressionSettings, JpegCompressor, StorageClient, StorageConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = lapstore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = lapstore_db::connect_pool_from_config(&config).await?;
    let applied = lapstore_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations applied");

    let storage = StorageClient::new(StorageConfig::from_app_config(&config))?;
    let compressor = JpegCompressor::new(CompressionSettings::from_app_config(&config));
    let catalog = Catalog::new(
        Arc::new(PgProductStore::new(pool)),
        Arc::new(storage),
        Arc::new(compressor),
        CatalogSettings::from_app_config(&config),
    );

    let gifts = match &config.gifts_path {
        Some(path) => load_gift_presets(path)?,
        None => preset_gifts(),
    };

    let auth = AuthState::from_keys(&config.admin_api_keys);
    let app = build_app(
        AppState {
            catalog,
            gifts: Arc::new(gifts),
        },
        auth,
    );

    tracing::info!(bind_addr = %config.bind_addr, env = %config.env, "starting lapstore server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
