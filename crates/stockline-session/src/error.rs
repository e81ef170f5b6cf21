//! Error types for the session layer.

use stockline_protocol::ProtocolError;

/// Errors surfaced by [`SessionStore`](crate::SessionStore) operations.
///
/// Only [`login`](crate::SessionStore::login) is expected to hand one of
/// these to a human; the `Display` text of `Authentication` and `Network`
/// is written to be shown as-is.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Sign-in was refused: bad credentials, or the server rejected the
    /// request. The message is safe to display.
    #[error("{0}")]
    Authentication(String),

    /// The session's token has lapsed or the server no longer accepts it.
    /// The store has already torn the session down when this is returned.
    #[error("your session has expired, please sign in again")]
    SessionExpired,

    /// The backend couldn't be reached.
    #[error("could not reach the server ({0}); check your connection and try again")]
    Network(String),

    /// A persisted or issued token couldn't be read.
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] ProtocolError),

    /// The operation needs a signed-in identity and there is none.
    #[error("not signed in")]
    NotAuthenticated,

    /// The store hasn't finished `initialize()` yet.
    #[error("session store is not ready")]
    NotReady,

    /// A sign-out happened while this operation was in flight, so its
    /// result was discarded.
    #[error("signed out while the request was in flight")]
    Superseded,

    /// Any other backend failure (unexpected status or body).
    #[error(transparent)]
    Backend(BackendError),

    /// Reading or writing the persisted token failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures reported by a [`Backend`](crate::Backend) implementation.
///
/// Implementations classify their transport errors into these buckets so
/// the store can decide between "tear down", "retry later" and "show the
/// message".
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP 401: the credentials or the bearer token were refused.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-success status, with the server's message if it
    /// sent one.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Connect, timeout, or other I/O failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// A success status with a body that didn't decode.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from a [`TokenStore`](crate::TokenStore).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Corrupt(#[source] ProtocolError),
}
