//! Startup orchestration.
//!
//! Config is loaded first, then logging and metrics, then the listener is
//! bound. Any startup error is fatal.

use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, RelayConfig};
use crate::http::{RelayServer, ServerError};
use crate::lifecycle::shutdown::wait_for;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::lifecycle::Shutdown;
use crate::mock::{mock_router, SessionStore};
use crate::observability::{logging, metrics};

/// Which server to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Relay,
    Mock,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Load configuration, initialize observability and serve until a signal.
pub async fn run(config_path: Option<&Path>, mode: Mode) -> Result<(), StartupError> {
    let config = load_config(config_path)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?mode,
        bind_address = %config.listener.bind_address,
        "ephemail-relay starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        }
    }

    let listener = bind(&config).await?;
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    match mode {
        Mode::Relay => {
            let server = RelayServer::new(config)?;
            server.run(listener, shutdown.subscribe()).await?;
        }
        Mode::Mock => serve_mock(&config, listener, shutdown).await?,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn bind(config: &RelayConfig) -> Result<TcpListener, StartupError> {
    TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })
}

async fn serve_mock(
    config: &RelayConfig,
    listener: TcpListener,
    shutdown: Shutdown,
) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Mock server starting");

    let app = mock_router(SessionStore::new(), &config.cors);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for(shutdown.subscribe()))
        .await?;

    tracing::info!("Mock server stopped");
    Ok(())
}
