//! # Lingodesk (session and route access control)
//!
//! `lingodesk` is the client-side core of the Lingodesk English-learning
//! platform. It owns the authentication state of a single client, keeps that
//! state in sync with a durable key-value store, and decides which views a
//! session may reach.
//!
//! ## Session Lifecycle
//!
//! 1. **Restore:** on start the [`AuthContext`](features::auth::AuthContext)
//!    hydrates from the persisted token and user record. A structurally valid
//!    record is trusted optimistically and revalidated in the background.
//! 2. **Login / Register:** the remote API returns `{user, token, refreshToken?}`;
//!    the token and the flat user record are persisted, then the state flips to
//!    authenticated.
//! 3. **Logout:** the server is notified on a best-effort basis and every
//!    persisted key is wiped, preferences included.
//!
//! ## Access Control
//!
//! Roles form the closed set `ADMIN`, `TRAINER`, `USER`. Route guards admit,
//! redirect, or block navigation based on the current state snapshot, and an
//! `ADMIN` session passes every role-gated view. Guards are UX only; the API
//! must still enforce authorization on every request.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod features;
pub mod messages;
pub mod preferences;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub use config::AppConfig;
pub use errors::AppError;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
