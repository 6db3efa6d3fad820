//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, CORS, timeout, request ID, tracing)
//!     → request.rs (request ID, body parsing, bearer extraction)
//!     → handlers.rs (field checks, build UpstreamRequestSpec)
//!     → upstream executor (one outbound call)
//!     → response.rs (status envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{build_router, AppState, RelayServer, ServerError};
