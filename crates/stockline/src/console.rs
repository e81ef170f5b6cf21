//! `Console` builder and the navigation entry point.
//!
//! This is what a front end holds on to. It ties the two halves together:
//! the session store (who is signed in) and the route authorizer (where
//! they may go).

use std::sync::Arc;

use stockline_protocol::{Credentials, Identity};
use stockline_router::{AuthorizationRules, Decision, RouteAuthorizer};
use stockline_session::{
    Backend, Clock, FileTokenStore, LogoutOutcome, SessionSnapshot, SessionStore, SystemClock,
    TokenStore,
};
use stockline_transport::HttpBackend;
use tokio::sync::watch;

use crate::{ConsoleConfig, StocklineError};

/// Builder for wiring a [`Console`].
///
/// # Example
///
/// ```rust,no_run
/// use stockline::prelude::*;
///
/// # async fn run() -> Result<(), StocklineError> {
/// let console = Console::builder()
///     .config(ConsoleConfig::from_env()?)
///     .build()?;
/// console.initialize().await;
/// let decision = console.navigate("/admin/dashboard").await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleBuilder {
    config: ConsoleConfig,
    rules: Option<AuthorizationRules>,
}

impl ConsoleBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ConsoleConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the authorization table. Without this, the table comes
    /// from the config's rules file, or the built-in one.
    pub fn rules(mut self, rules: AuthorizationRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Builds a console talking HTTP to `api_base_url` and keeping the
    /// token in `token_file`.
    pub fn build(self) -> Result<Console<HttpBackend, FileTokenStore>, StocklineError> {
        let backend =
            HttpBackend::with_timeout(&self.config.api_base_url, self.config.request_timeout)?;
        let storage = FileTokenStore::new(self.config.token_file.clone());
        self.build_with(backend, storage)
    }

    /// Builds a console over any backend and token store.
    pub fn build_with<B, S>(
        self,
        backend: B,
        storage: S,
    ) -> Result<Console<B, S>, StocklineError>
    where
        B: Backend,
        S: TokenStore,
    {
        self.build_with_clock(backend, storage, SystemClock)
    }

    /// Builds a console with an explicit clock.
    pub fn build_with_clock<B, S, C>(
        self,
        backend: B,
        storage: S,
        clock: C,
    ) -> Result<Console<B, S, C>, StocklineError>
    where
        B: Backend,
        S: TokenStore,
        C: Clock,
    {
        let rules = match self.rules {
            Some(rules) => rules,
            None => self.config.load_rules()?,
        };
        let store = SessionStore::with_clock(backend, storage, clock, self.config.session);
        Ok(Console {
            store: Arc::new(store),
            authorizer: RouteAuthorizer::new(rules),
        })
    }
}

/// A session store and a route authorizer sharing one view of who is
/// signed in.
///
/// Cheap to clone: clones share the same store.
pub struct Console<B, S, C = SystemClock> {
    store: Arc<SessionStore<B, S, C>>,
    authorizer: RouteAuthorizer,
}

impl<B, S, C> Clone for Console<B, S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            authorizer: self.authorizer.clone(),
        }
    }
}

impl Console<HttpBackend, FileTokenStore> {
    /// Creates a new builder.
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::new()
    }
}

impl<B, S, C> Console<B, S, C>
where
    B: Backend,
    S: TokenStore,
    C: Clock,
{
    /// Restores any persisted session. Navigation defers until this
    /// settles.
    pub async fn initialize(&self) -> SessionSnapshot {
        self.store.initialize().await
    }

    /// Signs in. On success the returned identity carries the role the
    /// server assigned, which may differ from `credentials.role`.
    pub async fn login(&self, credentials: Credentials) -> Result<Identity, StocklineError> {
        Ok(self.store.login(credentials).await?)
    }

    /// Signs out. Local state is always cleared.
    pub async fn logout(&self) -> LogoutOutcome {
        self.store.logout().await
    }

    /// Re-fetches the signed-in user's profile.
    pub async fn refresh_profile(&self) -> Result<Identity, StocklineError> {
        Ok(self.store.refresh_profile().await?)
    }

    /// Decides what to do with a request for `path`, against the session
    /// as it stands right now.
    pub async fn navigate(&self, path: &str) -> Decision {
        let snapshot = self.store.snapshot().await;
        let decision = self.authorizer.authorize(&snapshot, path);
        tracing::debug!(path, role = ?snapshot.role(), %decision, "navigation");
        decision
    }

    /// Waits for the store to finish loading, then decides.
    ///
    /// Never returns [`Decision::Defer`] unless the store is dropped
    /// mid-wait.
    pub async fn navigate_when_ready(&self, path: &str) -> Decision {
        let mut updates = self.store.subscribe();
        let settled = updates.wait_for(SessionSnapshot::is_ready).await.is_ok();
        if !settled {
            return Decision::Defer;
        }
        self.navigate(path).await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot().await
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.store.identity().await
    }

    /// Subscribes to session changes. Re-run [`navigate`](Self::navigate)
    /// for the current path whenever this fires.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    /// The underlying session store, for role checks and bearer tokens.
    pub fn store(&self) -> &SessionStore<B, S, C> {
        &self.store
    }

    pub fn authorizer(&self) -> &RouteAuthorizer {
        &self.authorizer
    }
}
