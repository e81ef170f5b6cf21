//! Transport to the Stockline auth API.
//!
//! Provides [`HttpBackend`], an implementation of the session store's
//! [`Backend`](stockline_session::Backend) trait over HTTP.
//!
//! # Feature Flags
//!
//! - `http` (default) — HTTP backend via `reqwest`

mod error;
#[cfg(feature = "http")]
mod http;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpBackend;

/// Paths of the auth API, relative to its base URL.
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const LOGOUT: &str = "/auth/logout";
    pub const PROFILE: &str = "/user/profile";
}

/// Joins `base` and `path` with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
