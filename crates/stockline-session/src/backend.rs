//! The seam between the session store and the auth API.
//!
//! The store doesn't speak HTTP itself. It defines the [`Backend`] trait —
//! three async calls mirroring the API's endpoints — and the transport
//! crate implements it over HTTP. Tests implement it with a scripted mock.

use std::future::Future;
use std::sync::Arc;

use stockline_protocol::{Credentials, Identity, LoginResponse};

use crate::BackendError;

/// The auth API the session store depends on.
///
/// # Trait bounds
///
/// - `Send + Sync` → the store is shared across tasks behind an `Arc`.
/// - `'static` → the backend lives as long as the store.
///
/// Each method returns `impl Future + Send` rather than using `async fn`
/// so that futures produced by the store stay `Send` and can be spawned.
///
/// # Example
///
/// ```rust
/// use stockline_protocol::{AssignedRole, Credentials, Identity, LoginResponse, Role};
/// use stockline_session::{Backend, BackendError};
///
/// /// Knows exactly one account. Handy for demos, useless in production.
/// struct SingleUser;
///
/// impl Backend for SingleUser {
///     async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
///         if credentials.password != "demo" {
///             return Err(BackendError::Unauthorized);
///         }
///         Ok(LoginResponse { token: "h.e30.s".into(), user: self.profile("").await? })
///     }
///
///     async fn logout(&self, _token: &str) -> Result<(), BackendError> {
///         Ok(())
///     }
///
///     async fn profile(&self, _token: &str) -> Result<Identity, BackendError> {
///         Ok(Identity {
///             id: "1".into(),
///             name: "Demo".into(),
///             email: "demo@example.com".into(),
///             role: AssignedRole::Known(Role::Salesman),
///             territory: None,
///             avatar: None,
///         })
///     }
/// }
/// ```
pub trait Backend: Send + Sync + 'static {
    /// `POST /auth/login` — exchanges credentials for a token and profile.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, BackendError>> + Send;

    /// `POST /auth/logout` — asks the server to invalidate `token`.
    fn logout(&self, token: &str) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// `GET /user/profile` — the identity behind `token`.
    fn profile(&self, token: &str) -> impl Future<Output = Result<Identity, BackendError>> + Send;
}

/// Lets callers keep a handle on a backend they hand to the store.
impl<B: Backend> Backend for Arc<B> {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, BackendError>> + Send {
        (**self).login(credentials)
    }

    fn logout(&self, token: &str) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).logout(token)
    }

    fn profile(&self, token: &str) -> impl Future<Output = Result<Identity, BackendError>> + Send {
        (**self).profile(token)
    }
}
