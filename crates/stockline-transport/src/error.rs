/// Errors constructing a transport. Request failures are reported as
/// [`BackendError`](stockline_session::BackendError) instead.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The base URL isn't an absolute `http(s)` URL.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The HTTP client couldn't be built (TLS backend, proxy settings).
    #[cfg(feature = "http")]
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
