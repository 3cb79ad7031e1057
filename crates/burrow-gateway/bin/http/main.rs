mod cli;

use crate::cli::{LogFormat, StorageBackendArg, CLI};
use anyhow::Context;
use burrow_core::{LinkStore, Registry};
use burrow_gateway::{App, AppState};
use burrow_registry::{RegistryConfig, RegistryService};
use burrow_storage::{FileLinkStore, InMemoryLinkStore, SqliteLinkStore};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(&config);

    let public_url = config.public_url();
    info!(
        listen_addr = %config.listen_addr,
        public_url = %public_url,
        storage_backend = %config.storage,
        max_attempts = config.max_attempts,
        "starting burrow"
    );

    let registry_config = RegistryConfig::builder()
        .seed(config.seed.clone())
        .max_attempts(config.max_attempts)
        .build();

    let registry: Arc<dyn Registry> = match config.storage {
        StorageBackendArg::Sqlite => {
            let path = config
                .db_path
                .as_ref()
                .context("--db-path is required when storage backend is sqlite")?;
            let store = SqliteLinkStore::open(path)
                .await
                .with_context(|| format!("failed to open sqlite database {}", path.display()))?;
            build_registry(store, registry_config)?
        }
        StorageBackendArg::Files => {
            let dir = config
                .data_dir
                .as_ref()
                .context("--data-dir is required when storage backend is files")?;
            let store = FileLinkStore::open(dir)
                .await
                .with_context(|| format!("failed to open data directory {}", dir.display()))?;
            build_registry(store, registry_config)?
        }
        StorageBackendArg::InMemory => {
            warn!("in-memory storage selected, links will not survive a restart");
            build_registry(InMemoryLinkStore::new(), registry_config)?
        }
    };

    let state = AppState::new(registry, public_url)
        .with_demo(config.demo)
        .with_copy(config.copy.clone());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn build_registry<S: LinkStore>(
    store: S,
    config: RegistryConfig,
) -> anyhow::Result<Arc<dyn Registry>> {
    let service = RegistryService::new(store, config).context("invalid registry configuration")?;
    Ok(Arc::new(service))
}

fn init_tracing(config: &CLI) {
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
