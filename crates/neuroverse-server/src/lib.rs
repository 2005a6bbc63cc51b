//! NeuroVerse Server
//!
//! Single-user HTTP service behind a shared-password cookie. Serves the chat
//! relay (SSE), brain-dump extraction, and pass-through CRUD over tasks,
//! notes and memory.

#![warn(missing_docs)]

pub mod auth;
pub mod chat;
pub mod config;
pub mod handlers;
pub mod prompts;

use config::ServerConfig;
use handlers::{create_router, AppState};
use neuroverse_llm::{LlmError, ProviderRouter};
use neuroverse_store::{SqliteStore, StoreError};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Store could not be opened
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Provider chain could not be built
    #[error("Provider setup error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Open the store and build the provider chain described by `config`
///
/// Provider keys are read from the environment.
pub fn build_state(config: ServerConfig) -> Result<AppState, ServerError> {
    let store = SqliteStore::new(&config.database_path)?;
    let router = ProviderRouter::new(config.llm.descriptors_from_env())?;

    let available: Vec<&str> = router
        .list_available()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    if available.is_empty() {
        warn!("No provider keys found; chat and brain dump will fail until one is set");
    } else {
        info!("Providers available: {}", available.join(", "));
    }

    Ok(AppState::new(config, store, router))
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting NeuroVerse server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Request ceiling: {} seconds", config.request_timeout_secs);

    let bind_addr = config.bind_addr();
    let app = create_router(build_state(config)?);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
