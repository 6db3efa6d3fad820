//! Upstream proxy subsystem.
//!
//! # Data Flow
//! ```text
//! route handler
//!     → routes.rs (operation → method, path template, auth scheme)
//!     → request.rs (UpstreamRequestSpec, placeholders resolved)
//!     → executor.rs (one outbound call, body decoded)
//!     → result.rs (ProxyResult: success flag, status, payload)
//!     → back to the handler
//! ```
//!
//! # Design Decisions
//! - The executor holds no mutable state; one inbound call = one outbound call
//! - Every failure becomes a ProxyResult, nothing escapes as a panic
//! - Status mapping for failures lives in error.rs only

pub mod error;
pub mod executor;
pub mod request;
pub mod result;
pub mod routes;

pub use error::RelayError;
pub use executor::{HttpExecutor, UpstreamExecutor};
pub use request::{resolve_path, UpstreamMethod, UpstreamRequestSpec};
pub use result::ProxyResult;
pub use routes::{AuthScheme, Operation, Provider, RouteSpec, RouteTable, UpstreamAuth};
