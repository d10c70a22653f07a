//! Central authority binary.
//!
//! Usage: `central-authority [config.toml]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use credential_verification::{CredentialDirectory, VerificationService};
use tracing::info;
use tracing_subscriber::EnvFilter;

use central_authority::{
    router, AuthorityConfig, AuthorityService, HttpControllerGateway, MemoryDirectory,
    MemoryEventStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AuthorityConfig::load(config_path.as_deref()).context("loading configuration")?;
    info!(listen = %config.listen, "central authority starting");

    let directory = Arc::new(match &config.directory_path {
        Some(path) => MemoryDirectory::from_provision_file(path)
            .with_context(|| format!("loading directory from {}", path.display()))?,
        None => {
            info!("no directory file configured, starting with an empty directory");
            MemoryDirectory::new()
        }
    });

    let events = Arc::new(MemoryEventStore::new());
    let gateway = Arc::new(
        HttpControllerGateway::new(config.command_timeout).context("building controller gateway")?,
    );
    let verification =
        VerificationService::new(Arc::clone(&directory) as Arc<dyn CredentialDirectory>);
    let service = Arc::new(AuthorityService::new(
        directory,
        events,
        gateway,
        verification,
    ));

    let app = router(service, config.max_event_limit);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(listen = %config.listen, "central authority ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("central authority stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown handler");
    }
}
