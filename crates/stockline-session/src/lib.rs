//! Session store for Stockline.
//!
//! This crate owns the console's authentication state:
//!
//! 1. **Backend seam** — talking to the auth API ([`Backend`] trait)
//! 2. **Persistence** — keeping the token across restarts ([`TokenStore`])
//! 3. **Session tracking** — who is signed in, and until when
//!    ([`SessionStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)  ← reads snapshots to decide where a visitor may go
//!     ↕
//! Session Layer (this crate)  ← owns token + identity, login/logout/restore
//!     ↕
//! Protocol Layer (below)  ← provides Identity, Role, TokenClaims
//! ```

mod backend;
mod clock;
mod error;
mod session;
mod storage;
mod store;

pub use backend::Backend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BackendError, SessionError, StorageError};
pub use session::{Lifecycle, LogoutOutcome, Session, SessionConfig, SessionSnapshot};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use store::SessionStore;
