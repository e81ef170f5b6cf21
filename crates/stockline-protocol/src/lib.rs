//! Wire types for Stockline.
//!
//! This crate defines the "language" the console and the backend API speak:
//!
//! - **Types** ([`Role`], [`Identity`], [`Credentials`], [`LoginResponse`]) —
//!   the structures that travel in request and response bodies.
//! - **Tokens** ([`TokenClaims`], [`decode_claims`]) — reading the expiry
//!   claim out of the bearer token the backend issues.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those structures
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits below the session store. It doesn't know about
//! HTTP, storage, or routing — it only knows what an identity looks like
//! and how to read a token.
//!
//! ```text
//! Transport (HTTP) → Protocol (Identity, TokenClaims) → Session (store)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod token;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// `pub use` flattens the public API: callers write
// `use stockline_protocol::Role` instead of `stockline_protocol::types::Role`.

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
#[cfg(feature = "json")]
pub use token::decode_claims;
pub use token::TokenClaims;
pub use types::{AssignedRole, Credentials, Identity, LoginResponse, Role};
