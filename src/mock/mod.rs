//! Mock relay for front-end development.
//!
//! # Data Flow
//! ```text
//! POST /create-account → session.rs (new session, id returned to caller)
//! GET  /me, /messages  → session.rs (lookup by x-session-id)
//! DELETE /delete-account → session.rs (remove)
//! ```
//!
//! # Design Decisions
//! - State is per session, keyed by an ID the caller passes back
//! - No upstream calls; responses are canned
//! - Sessions expire an hour after creation

pub mod handlers;
pub mod session;

pub use handlers::mock_router;
pub use session::{MockAccount, SessionStore, X_SESSION_ID};
