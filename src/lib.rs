pub mod api;
pub mod classifier; // Keyword diagnosis for public complaints
pub mod config;
pub mod content; // Announcement, banner, education catalog
pub mod core_state;
pub mod csr; // CSR tracker
pub mod intake;
pub mod lifecycle; // Village report escalation
pub mod models;
pub mod navigation; // Role menus + action gates
pub mod reporting;
pub mod session;
pub mod store;
pub mod users;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Startup failures surfaced to `main`.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Startup error: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("Server error: {0}")]
    Server(String),
}

pub fn run() -> Result<(), RunError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    let bind_addr = config.bind_addr;
    let core = Arc::new(core_state::CoreState::bootstrap(config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let server = api::start_server_on(core, bind_addr)
            .await
            .map_err(RunError::Server)?;
        tracing::info!(addr = %server.info.addr, "Listening");

        tokio::signal::ctrl_c().await?;
        tracing::info!("Interrupt received, shutting down");
        server.stop().await;
        Ok::<(), RunError>(())
    })
}
