//! The session store: owns who is signed in, and for how long.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Restoring a persisted session at start-up (`initialize`)
//! - Signing in and out (`login`, `logout`)
//! - Tearing the session down the moment its token lapses
//! - Answering role questions (`has_minimum_role`, `is_in_any_of`)
//!
//! # Concurrency note
//!
//! State lives behind a `tokio::sync::Mutex` so the store can be shared
//! across tasks behind an `Arc`. Backend calls are made WITHOUT the lock
//! held; results are committed afterwards. That opens a race between a
//! slow login and a logout, which the `logouts` counter closes: every
//! logout bumps it, and a login (or a restore) only commits if no logout
//! ran since it started. Expiry and server rejections don't touch it, so
//! they never cancel a newer sign-in. Two overlapping logins don't bump
//! it either, so the last one to finish wins.
//!
//! Every committed session gets a background task that tears it down when
//! its token lapses, so subscribers hear about expiry even if nobody reads
//! the store.

use std::sync::{Arc, Weak};
use std::time::Duration;

use stockline_protocol::{Credentials, Identity, Role};
use tokio::sync::{Mutex, watch};

use crate::{
    Backend, BackendError, Clock, Lifecycle, LogoutOutcome, Session, SessionConfig,
    SessionError, SessionSnapshot, SystemClock, TokenStore,
};

/// Mutable state, always accessed under the store's lock.
struct Inner {
    lifecycle: Lifecycle,
    session: Option<Session>,
    identity: Option<Identity>,
    /// Bumped at the start of every logout.
    logouts: u64,
    /// Bumped whenever the session is replaced or cleared.
    epoch: u64,
}

impl Inner {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            lifecycle: self.lifecycle,
            identity: self.identity.clone(),
        }
    }
}

/// The part of the store the expiry task needs. Held behind an `Arc` so
/// the task can keep a `Weak` to it.
struct Shared<S, C> {
    storage: S,
    clock: C,
    config: SessionConfig,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<SessionSnapshot>,
}

/// Process-wide authentication state, constructed once and shared.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ initialize() ──→ [Ready: anonymous] ──login()──→ [Ready: authenticated]
///                                    ↑                               │
///                                    └──── logout() / expiry ────────┘
/// ```
///
/// Type parameters are the three collaborators: the auth API `B`, the
/// token persistence `S`, and the wall clock `C`.
pub struct SessionStore<B, S, C = SystemClock> {
    backend: B,
    shared: Arc<Shared<S, C>>,
}

impl<B: Backend, S: TokenStore> SessionStore<B, S, SystemClock> {
    /// Creates an uninitialized store using the system clock.
    pub fn new(backend: B, storage: S, config: SessionConfig) -> Self {
        Self::with_clock(backend, storage, SystemClock, config)
    }
}

impl<B: Backend, S: TokenStore, C: Clock> SessionStore<B, S, C> {
    /// Creates an uninitialized store with an explicit clock.
    pub fn with_clock(backend: B, storage: S, clock: C, config: SessionConfig) -> Self {
        let (snapshots, _) = watch::channel(SessionSnapshot::uninitialized());
        Self {
            backend,
            shared: Arc::new(Shared {
                storage,
                clock,
                config,
                inner: Mutex::new(Inner {
                    lifecycle: Lifecycle::Uninitialized,
                    session: None,
                    identity: None,
                    logouts: 0,
                    epoch: 0,
                }),
                snapshots,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Subscribes to state changes. The receiver always holds the latest
    /// snapshot; it doesn't replay intermediate ones. A lapsed token is
    /// announced as a sign-out without anyone having to read the store.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    // =====================================================================
    // initialize
    // =====================================================================

    /// Restores the persisted session, if any, and moves the store to
    /// `Ready`.
    ///
    /// Never fails: a missing, malformed, expired, or rejected token (or
    /// an unreachable backend) all settle as `Ready` with no identity and
    /// an empty token store. Calling it again after the first call is a
    /// no-op that returns the current snapshot.
    ///
    /// A `logout()` issued while this is loading wins: the restored token
    /// is revoked on the backend and the store settles signed out.
    pub async fn initialize(&self) -> SessionSnapshot {
        let logouts = {
            let mut inner = self.shared.inner.lock().await;
            if inner.lifecycle != Lifecycle::Uninitialized {
                tracing::debug!(lifecycle = ?inner.lifecycle, "initialize already called");
                return inner.snapshot();
            }
            inner.lifecycle = Lifecycle::Loading;
            self.shared.publish(&inner);
            inner.logouts
        };

        let restored = self.restore().await;

        let mut revoke = None;
        let snapshot = {
            let mut inner = self.shared.inner.lock().await;
            match restored {
                Ok(Some((session, identity))) if inner.logouts == logouts => {
                    tracing::info!(
                        user_id = %identity.id,
                        role = %identity.role,
                        expires_at = session.expires_at(),
                        "session restored"
                    );
                    Shared::commit(&self.shared, &mut inner, session, identity);
                }
                Ok(Some((session, _))) => {
                    tracing::info!("signed out during initialize, revoking restored session");
                    revoke = Some(session.token().to_string());
                }
                Ok(None) => {
                    tracing::debug!("no persisted session");
                }
                Err(e) => {
                    tracing::info!(error = %e, "persisted session unusable, starting signed out");
                    self.shared.teardown(&mut inner).await;
                }
            }
            inner.lifecycle = Lifecycle::Ready;
            self.shared.publish(&inner);
            inner.snapshot()
        };

        if let Some(token) = revoke {
            if let Err(e) = self.backend.logout(&token).await {
                tracing::warn!(error = %e, "failed to revoke restored session on the backend");
            }
        }
        snapshot
    }

    /// Loads and validates the persisted token, then fetches its profile.
    async fn restore(&self) -> Result<Option<(Session, Identity)>, SessionError> {
        let Some(token) = self.shared.storage.load(&self.shared.config.storage_key).await? else {
            return Ok(None);
        };

        let session = Session::from_token(token)?;
        if session.is_expired_at(self.shared.expiry_horizon()) {
            return Err(SessionError::SessionExpired);
        }

        let identity = self
            .backend
            .profile(session.token())
            .await
            .map_err(profile_error)?;
        Ok(Some((session, identity)))
    }

    // =====================================================================
    // login / logout
    // =====================================================================

    /// Signs in with `credentials` and returns the server's identity.
    ///
    /// The role in `credentials` is only what the user picked on the form.
    /// The identity returned (and stored) carries the role the SERVER
    /// assigned, and every later check uses that.
    ///
    /// # Errors
    /// - [`SessionError::NotReady`] — `initialize()` hasn't settled
    /// - [`SessionError::Authentication`] — refused; message is displayable
    /// - [`SessionError::Network`] — backend unreachable
    /// - [`SessionError::Superseded`] — a logout ran while this was in flight
    ///
    /// On any error the store is left exactly as it was.
    pub async fn login(&self, credentials: Credentials) -> Result<Identity, SessionError> {
        let logouts = {
            let inner = self.shared.inner.lock().await;
            if inner.lifecycle != Lifecycle::Ready {
                return Err(SessionError::NotReady);
            }
            inner.logouts
        };

        tracing::debug!(email = %credentials.email, claimed_role = ?credentials.role, "signing in");
        let response = self.backend.login(&credentials).await.map_err(login_error)?;

        let session = Session::from_token(response.token).map_err(|e| {
            tracing::warn!(error = %e, "backend issued an unreadable token");
            SessionError::Authentication("The server returned an invalid session. Please try again.".into())
        })?;
        if session.is_expired_at(self.shared.expiry_horizon()) {
            tracing::warn!(expires_at = session.expires_at(), "backend issued an expired token");
            return Err(SessionError::Authentication(
                "The server returned an expired session. Please try again.".into(),
            ));
        }

        let identity = response.user;
        if let Some(claimed) = credentials.role {
            if identity.role() != Some(claimed) {
                tracing::info!(
                    claimed_role = %claimed,
                    assigned_role = %identity.role,
                    "claimed role differs from assigned role, using assigned role"
                );
            }
        }

        let mut inner = self.shared.inner.lock().await;
        if inner.logouts != logouts {
            tracing::info!(user_id = %identity.id, "sign-in finished after sign-out, discarding");
            return Err(SessionError::Superseded);
        }
        let storage_key = &self.shared.config.storage_key;
        if let Err(e) = self.shared.storage.save(storage_key, session.token()).await {
            tracing::warn!(error = %e, "failed to persist token, session won't survive a restart");
        }
        Shared::commit(&self.shared, &mut inner, session, identity.clone());
        self.shared.publish(&inner);

        tracing::info!(user_id = %identity.id, role = %identity.role, "signed in");
        Ok(identity)
    }

    /// Signs out. Always succeeds and always leaves the store signed out.
    ///
    /// The backend is told first, on a best-effort basis; its failure is
    /// logged and reported in the outcome but doesn't stop the local
    /// teardown. Calling this while already signed out is a no-op.
    pub async fn logout(&self) -> LogoutOutcome {
        let token = {
            let mut inner = self.shared.inner.lock().await;
            // Any login or restore already in flight must not commit after this.
            inner.logouts += 1;
            inner.session.as_ref().map(|s| s.token().to_string())
        };

        let outcome = match token {
            None => LogoutOutcome::AlreadySignedOut,
            Some(token) => match self.backend.logout(&token).await {
                Ok(()) => LogoutOutcome::Notified,
                Err(e) => {
                    tracing::warn!(error = %e, "backend logout failed, clearing local session anyway");
                    LogoutOutcome::NotificationFailed(e)
                }
            },
        };

        let mut inner = self.shared.inner.lock().await;
        self.shared.teardown(&mut inner).await;
        match &outcome {
            LogoutOutcome::AlreadySignedOut => tracing::debug!("logout while signed out"),
            _ => tracing::info!("signed out"),
        }
        outcome
    }

    /// Re-fetches the profile for the current session.
    ///
    /// # Errors
    /// - [`SessionError::NotAuthenticated`] — nobody is signed in
    /// - [`SessionError::SessionExpired`] — the token lapsed or the server
    ///   refused it; the session has been torn down
    /// - [`SessionError::Superseded`] — the session changed meanwhile; the
    ///   new one is left alone whatever the server said about the old one
    /// - [`SessionError::Network`] — backend unreachable; session kept
    pub async fn refresh_profile(&self) -> Result<Identity, SessionError> {
        let (token, epoch) = self.live_token().await?;

        let result = self.backend.profile(&token).await;

        let mut inner = self.shared.inner.lock().await;
        if inner.epoch != epoch {
            tracing::debug!("session changed during profile refresh, discarding result");
            return Err(SessionError::Superseded);
        }
        match result {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.id, role = %identity.role, "profile refreshed");
                inner.identity = Some(identity.clone());
                self.shared.publish(&inner);
                Ok(identity)
            }
            Err(BackendError::Unauthorized) => {
                tracing::info!("server refused session token, signing out");
                self.shared.teardown(&mut inner).await;
                Err(SessionError::SessionExpired)
            }
            Err(e) => Err(profile_error(e)),
        }
    }

    // =====================================================================
    // Reads (all expiry-checked)
    // =====================================================================

    /// The current state. If the token lapsed since the last read, the
    /// session is torn down first and the snapshot shows it signed out.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let mut inner = self.shared.inner.lock().await;
        self.shared.expire_if_due(&mut inner).await;
        inner.snapshot()
    }

    /// The signed-in identity, if any.
    pub async fn identity(&self) -> Option<Identity> {
        self.snapshot().await.identity
    }

    /// The token to attach to authenticated requests.
    ///
    /// # Errors
    /// [`SessionError::SessionExpired`] if this read found the token
    /// lapsed (and tore it down), [`SessionError::NotAuthenticated`] if
    /// nobody was signed in to begin with.
    pub async fn bearer_token(&self) -> Result<String, SessionError> {
        self.live_token().await.map(|(token, _)| token)
    }

    /// `true` iff someone is signed in and their role ranks at or above
    /// `required`. An unrecognized role passes nothing.
    pub async fn has_minimum_role(&self, required: Role) -> bool {
        self.snapshot()
            .await
            .role()
            .is_some_and(|role| role.at_least(required))
    }

    /// `true` iff someone is signed in and their role is exactly one of
    /// `roles`. Not hierarchical.
    pub async fn is_in_any_of(&self, roles: &[Role]) -> bool {
        self.snapshot()
            .await
            .role()
            .is_some_and(|role| roles.contains(&role))
    }

    /// The unexpired token and the epoch it belongs to.
    async fn live_token(&self) -> Result<(String, u64), SessionError> {
        let mut inner = self.shared.inner.lock().await;
        if self.shared.expire_if_due(&mut inner).await {
            return Err(SessionError::SessionExpired);
        }
        let token = inner
            .session
            .as_ref()
            .map(|s| s.token().to_string())
            .ok_or(SessionError::NotAuthenticated)?;
        Ok((token, inner.epoch))
    }
}

// =========================================================================
// Internals
// =========================================================================

impl<S: TokenStore, C: Clock> Shared<S, C> {
    /// Installs a new session and starts watching its expiry. The caller
    /// publishes.
    fn commit(this: &Arc<Self>, inner: &mut Inner, session: Session, identity: Identity) {
        inner.epoch += 1;
        let expires_at = session.expires_at();
        inner.session = Some(session);
        inner.identity = Some(identity);
        Self::watch_expiry(this, inner.epoch, expires_at);
    }

    /// Spawns a task that tears the session of `epoch` down once the clock
    /// passes `expires_at`. It gives up as soon as that session is gone.
    fn watch_expiry(this: &Arc<Self>, epoch: u64, expires_at: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime, expiry is only detected on read");
            return;
        };
        let shared: Weak<Self> = Arc::downgrade(this);
        runtime.spawn(async move {
            loop {
                let wait = match shared.upgrade() {
                    Some(shared) => expires_at.saturating_sub(shared.expiry_horizon()),
                    None => return,
                };
                tokio::time::sleep(Duration::from_secs(wait.max(1))).await;

                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let mut inner = shared.inner.lock().await;
                if inner.epoch != epoch || shared.expire_if_due(&mut inner).await {
                    return;
                }
            }
        });
    }

    /// Tears down a lapsed session. Returns `true` if it did.
    async fn expire_if_due(&self, inner: &mut Inner) -> bool {
        let horizon = self.expiry_horizon();
        let expired = inner
            .session
            .as_ref()
            .is_some_and(|s| s.is_expired_at(horizon));
        if expired {
            tracing::info!("session token expired, signing out");
            self.teardown(inner).await;
        }
        expired
    }

    /// Clears token and identity together and tells subscribers. The lock
    /// is held throughout, so nobody observes one cleared without the other.
    async fn teardown(&self, inner: &mut Inner) {
        inner.epoch += 1;
        inner.session = None;
        inner.identity = None;
        if let Err(e) = self.storage.clear(&self.config.storage_key).await {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        self.publish(inner);
    }

    fn publish(&self, inner: &Inner) {
        self.snapshots.send_replace(inner.snapshot());
    }

    fn expiry_horizon(&self) -> u64 {
        self.clock
            .now_unix()
            .saturating_add(self.config.expiry_leeway_secs)
    }
}

fn login_error(err: BackendError) -> SessionError {
    match err {
        BackendError::Unauthorized => SessionError::Authentication("Invalid email or password.".into()),
        BackendError::Rejected { message, .. } if !message.trim().is_empty() => {
            SessionError::Authentication(message)
        }
        BackendError::Rejected { status, .. } => {
            SessionError::Authentication(format!("Sign-in was rejected by the server ({status})."))
        }
        BackendError::Network(reason) => SessionError::Network(reason),
        BackendError::InvalidResponse(reason) => {
            tracing::warn!(%reason, "unreadable login response");
            SessionError::Authentication("Unexpected response from the server. Please try again.".into())
        }
    }
}

fn profile_error(err: BackendError) -> SessionError {
    match err {
        BackendError::Unauthorized => SessionError::SessionExpired,
        BackendError::Network(reason) => SessionError::Network(reason),
        other => SessionError::Backend(other),
    }
}
