//! Session types: the data the store tracks and the views it hands out.
//!
//! A "session" is the console's record of a sign-in. It tracks:
//! - WHAT credential proves it (the bearer token)
//! - WHEN it stops being valid (the token's `exp` claim)
//!
//! The identity (WHO) is kept next to it in the store, and the pair is
//! created and destroyed together.

use std::fmt;

use stockline_protocol::{Identity, Role, TokenClaims, decode_claims};

use crate::{BackendError, SessionError};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key the token is persisted under in the [`TokenStore`](crate::TokenStore).
    ///
    /// Default: `"stockline.auth_token"`.
    pub storage_key: String,

    /// Treat tokens as expired this many seconds before their `exp`, so a
    /// request doesn't leave with a token that lapses in transit.
    ///
    /// Default: 0.
    pub expiry_leeway_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "stockline.auth_token".to_string(),
            expiry_leeway_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Where the store is in its start-up sequence.
///
/// ```text
///   Uninitialized ──(initialize)──→ Loading ──(settled)──→ Ready
/// ```
///
/// `Ready` is terminal. Signing in and out moves between the anonymous
/// and authenticated sub-states of `Ready` (see [`SessionSnapshot`]) but
/// never back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Loading,
    Ready,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A bearer token plus its decoded claims.
///
/// `Debug` is written by hand so the token never ends up in a log line.
#[derive(Clone)]
pub struct Session {
    token: String,
    claims: TokenClaims,
}

impl Session {
    /// Decodes `token`'s claims and wraps both.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidToken`] if the claims can't be read.
    pub fn from_token(token: String) -> Result<Self, SessionError> {
        let claims = decode_claims(&token)?;
        Ok(Self { token, claims })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Unix time after which the session is no longer valid.
    pub fn expires_at(&self) -> u64 {
        self.claims.exp
    }

    pub fn is_expired_at(&self, now_unix: u64) -> bool {
        self.claims.is_expired_at(now_unix)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("exp", &self.claims.exp)
            .field("sub", &self.claims.sub)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// What the view layer sees: the lifecycle and, once ready, who (if
/// anyone) is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub lifecycle: Lifecycle,
    pub identity: Option<Identity>,
}

impl SessionSnapshot {
    pub fn uninitialized() -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
            identity: None,
        }
    }

    /// `true` once `initialize()` has settled.
    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// `true` if ready and someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.is_ready() && self.identity.is_some()
    }

    /// The signed-in role, if there is one and it's in the closed set.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().and_then(Identity::role)
    }
}

// ---------------------------------------------------------------------------
// LogoutOutcome
// ---------------------------------------------------------------------------

/// How a logout went. Every variant leaves the store signed out; the
/// difference is only whether the server heard about it.
#[derive(Debug)]
pub enum LogoutOutcome {
    /// The server invalidated the token.
    Notified,
    /// The server couldn't be told; the local session was cleared anyway.
    NotificationFailed(BackendError),
    /// There was no session to end.
    AlreadySignedOut,
}
