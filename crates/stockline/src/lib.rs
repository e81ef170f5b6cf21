//! # Stockline
//!
//! Sign-in and role-gated navigation for the Stockline distribution
//! console.
//!
//! A [`Console`] owns the session store (who is signed in, restored across
//! restarts, torn down on expiry) and the route authorizer (which portal
//! each role may enter, and where to send them otherwise).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stockline::prelude::*;
//!
//! # async fn run() -> Result<(), StocklineError> {
//! stockline::logging::init();
//! let console = Console::builder().config(ConsoleConfig::from_env()?).build()?;
//! console.initialize().await;
//!
//! console
//!     .login(Credentials {
//!         email: "dana@example.com".into(),
//!         password: "hunter2".into(),
//!         role: Some(Role::Distributor),
//!     })
//!     .await?;
//!
//! // A distributor asking for the admin portal is sent home.
//! let decision = console.navigate("/admin/dashboard").await;
//! assert_eq!(decision.target(), Some("/distributor/dashboard"));
//! # Ok(())
//! # }
//! ```

mod config;
mod console;
mod error;
pub mod logging;

pub use config::{
    ConsoleConfig, ENV_API_URL, ENV_EXPIRY_LEEWAY_SECS, ENV_REQUEST_TIMEOUT_SECS,
    ENV_RULES_FILE, ENV_STORAGE_KEY, ENV_TOKEN_FILE,
};
pub use console::{Console, ConsoleBuilder};
pub use error::StocklineError;

pub use stockline_protocol as protocol;
pub use stockline_router as router;
pub use stockline_session as session;
pub use stockline_transport as transport;

/// Everything a front end needs in one import.
pub mod prelude {
    pub use crate::{Console, ConsoleBuilder, ConsoleConfig, StocklineError};
    pub use stockline_protocol::{AssignedRole, Credentials, Identity, Role};
    pub use stockline_router::{Area, AuthorizationRules, Decision, LOGIN_PATH, Route};
    pub use stockline_session::{
        Backend, BackendError, Lifecycle, LogoutOutcome, SessionError, SessionSnapshot,
        TokenStore,
    };
}
