//! Error types for the protocol layer.
//!
//! Each crate in Stockline defines its own error enum. This keeps errors
//! specific and meaningful — when you see a `ProtocolError`, you know
//! the problem is in serialization or token parsing, not in networking
//! or authorization.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// wrong data types, or truncated bodies.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The bearer token doesn't have the `header.payload.signature`
    /// shape, or its payload segment isn't base64url-encoded JSON
    /// carrying an `exp` claim.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A role name outside the closed role set.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}
