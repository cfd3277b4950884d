//! HTTP surface of Tunemates: OAuth login, the dashboard and the social routes.

mod auth;
mod config;
mod entities;
mod error;
mod groups;
mod music;
mod requests_logging;
mod server;
pub mod session;
pub mod state;
mod users;

pub use config::ServerConfig;
pub use error::ApiError;
pub use requests_logging::{log_requests, RequestsLoggingLevel};
pub use server::{make_app, run_server};
pub use state::ServerState;

/// Percent-encode one path segment for use in a redirect location.
pub(crate) fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
