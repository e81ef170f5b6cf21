//! Shared fixtures for session store tests: a scripted backend and a
//! token minter.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use stockline_protocol::{AssignedRole, Credentials, Identity, LoginResponse, Role};
use stockline_session::{
    Backend, BackendError, ManualClock, MemoryTokenStore, SessionConfig, SessionStore,
};
use tokio::sync::{Mutex, Notify};

/// "Now" for every test that uses a [`ManualClock`].
pub const NOW: u64 = 1_800_000_000;

pub const KEY: &str = "stockline.auth_token";

/// Builds an unsigned `header.payload.signature` token expiring at `exp`.
pub fn token_expiring_at(exp: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"sub":"test"}}"#));
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn identity(id: &str, role: Role) -> Identity {
    Identity {
        id: id.into(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        role: AssignedRole::Known(role),
        territory: None,
        avatar: None,
    }
}

pub fn credentials(email: &str, password: &str, claimed: Option<Role>) -> Credentials {
    Credentials {
        email: email.into(),
        password: password.into(),
        role: claimed,
    }
}

/// What `GET /user/profile` answers.
#[derive(Clone)]
pub enum ProfileReply {
    Identity(Identity),
    Unauthorized,
    Network,
}

/// A calls-recording backend with scripted replies.
pub struct MockBackend {
    accounts: Vec<(String, String, Identity)>,
    token_exp: u64,
    profile: Mutex<ProfileReply>,
    network_down: AtomicBool,
    logout_fails: AtomicBool,
    /// When set, a login for this email parks until the `Notify` fires.
    login_gate: Mutex<Option<(String, Arc<Notify>)>>,
    /// When set, every profile request parks until the `Notify` fires.
    profile_gate: Mutex<Option<Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            token_exp: NOW + 3600,
            profile: Mutex::new(ProfileReply::Unauthorized),
            network_down: AtomicBool::new(false),
            logout_fails: AtomicBool::new(false),
            login_gate: Mutex::new(None),
            profile_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_account(mut self, email: &str, password: &str, identity: Identity) -> Self {
        self.accounts.push((email.into(), password.into(), identity));
        self
    }

    pub fn with_profile(self, reply: ProfileReply) -> Self {
        Self {
            profile: Mutex::new(reply),
            ..self
        }
    }

    pub fn with_token_exp(self, exp: u64) -> Self {
        Self {
            token_exp: exp,
            ..self
        }
    }

    pub async fn set_profile(&self, reply: ProfileReply) {
        *self.profile.lock().await = reply;
    }

    pub fn set_network_down(&self, down: bool) {
        self.network_down.store(down, Ordering::SeqCst);
    }

    pub fn set_logout_fails(&self, fails: bool) {
        self.logout_fails.store(fails, Ordering::SeqCst);
    }

    pub async fn gate_login(&self, email: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.login_gate.lock().await = Some((email.into(), Arc::clone(&notify)));
        notify
    }

    pub async fn gate_profile(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.profile_gate.lock().await = Some(Arc::clone(&notify));
        notify
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }
}

impl Backend for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        self.record(format!("login:{}", credentials.email)).await;

        let gate = self.login_gate.lock().await.clone();
        if let Some((email, notify)) = gate {
            if email == credentials.email {
                notify.notified().await;
            }
        }

        if self.network_down.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection refused".into()));
        }
        self.accounts
            .iter()
            .find(|(email, password, _)| {
                *email == credentials.email && *password == credentials.password
            })
            .map(|(_, _, user)| LoginResponse {
                token: token_expiring_at(self.token_exp),
                user: user.clone(),
            })
            .ok_or(BackendError::Unauthorized)
    }

    async fn logout(&self, token: &str) -> Result<(), BackendError> {
        self.record(format!("logout:{token}")).await;
        if self.logout_fails.load(Ordering::SeqCst) || self.network_down.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection reset".into()));
        }
        Ok(())
    }

    async fn profile(&self, _token: &str) -> Result<Identity, BackendError> {
        self.record("profile".into()).await;

        let gate = self.profile_gate.lock().await.clone();
        if let Some(notify) = gate {
            notify.notified().await;
        }

        if self.network_down.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection refused".into()));
        }
        match self.profile.lock().await.clone() {
            ProfileReply::Identity(identity) => Ok(identity),
            ProfileReply::Unauthorized => Err(BackendError::Unauthorized),
            ProfileReply::Network => Err(BackendError::Network("timed out".into())),
        }
    }
}

pub type TestStore = SessionStore<Arc<MockBackend>, MemoryTokenStore, ManualClock>;

/// A store over `backend` and `storage` with the clock at [`NOW`].
pub fn store(backend: &Arc<MockBackend>, storage: &MemoryTokenStore) -> (TestStore, ManualClock) {
    let clock = ManualClock::new(NOW);
    let store = SessionStore::with_clock(
        Arc::clone(backend),
        storage.clone(),
        clock.clone(),
        SessionConfig::default(),
    );
    (store, clock)
}
