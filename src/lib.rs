//! Disposable-email relay library.
//!
//! A thin HTTP relay in front of a temporary-mailbox provider plus a mock
//! server for front-end work.

pub mod config;
pub mod credentials;
pub mod http;
pub mod lifecycle;
pub mod mock;
pub mod observability;
pub mod upstream;

pub use config::RelayConfig;
pub use credentials::{generate_credentials, Credentials};
pub use http::RelayServer;
pub use lifecycle::Shutdown;
pub use upstream::{ProxyResult, RelayError, UpstreamExecutor, UpstreamRequestSpec};
