//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all relay handlers
//! - Wire up middleware (CORS, timeout, request ID, tracing)
//! - Build the upstream executor and route table from config
//! - Bind server to listener and stop on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::{CorsConfig, RelayConfig};
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::wait_for;
use crate::upstream::{HttpExecutor, RouteTable, UpstreamExecutor};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<dyn UpstreamExecutor>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(executor: Arc<dyn UpstreamExecutor>, routes: RouteTable) -> Self {
        Self {
            executor,
            routes: Arc::new(routes),
        }
    }
}

/// Errors building the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a server talking to the configured upstream over HTTP.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let base_url = Url::parse(config.upstream.effective_base_url())?;
        let executor = HttpExecutor::new(
            base_url,
            config.timeouts.connect(),
            config.timeouts.upstream(),
        )?;
        Ok(Self::with_executor(config, Arc::new(executor)))
    }

    /// Create a server around any executor.
    pub fn with_executor(config: RelayConfig, executor: Arc<dyn UpstreamExecutor>) -> Self {
        let state = AppState::new(executor, config.upstream.route_table());
        let router = build_router(&config, state);
        Self { router, config }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            provider = %self.config.upstream.provider,
            upstream = %self.config.upstream.effective_base_url(),
            "Relay server starting"
        );

        if self.config.upstream.api_key.is_none() {
            tracing::warn!("No upstream API key configured; key-authenticated calls will be rejected upstream");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("Relay server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &RelayConfig, state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/domains", get(handlers::list_domains))
        .route("/create-account", post(handlers::create_account))
        .route("/authenticate", post(handlers::authenticate))
        .route("/fetch-messages", post(handlers::fetch_messages))
        .route(
            "/messages/{id}",
            get(handlers::get_message).delete(handlers::delete_message),
        )
        .route("/messages/{id}/attachments", get(handlers::list_attachments))
        .route(
            "/messages/{id}/attachments/{attachment_id}",
            get(handlers::get_attachment),
        )
        .with_state(state)
        .layer(cors_layer(&config.cors))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(set_request_id_layer())
}

/// CORS policy for the front-end origin.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allowed_origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(&config.allowed_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = %config.allowed_origin, "Invalid CORS origin, cross-origin requests will be refused");
            layer
        }
    }
}
