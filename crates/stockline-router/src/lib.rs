//! Route authorization for the Stockline portals.
//!
//! Given the session store's current snapshot and a requested path, the
//! [`RouteAuthorizer`] decides whether to render it, send the visitor
//! somewhere else, or wait for the store to finish loading.
//!
//! # Key types
//!
//! - [`Area`] — a role-gated portal (admin, superstockist, ...)
//! - [`Route`] — a parsed request path
//! - [`AuthorizationRules`] — which roles may enter which area
//! - [`default_area_for`] — where each role lands
//! - [`Decision`] — `Allow`, `Redirect(path)` or `Defer`

mod area;
mod authorizer;
mod error;
mod rules;

pub use area::{Area, LOGIN_PATH, Route};
pub use authorizer::{Decision, RouteAuthorizer};
pub use error::RouterError;
pub use rules::{AuthorizationRules, default_area_for};
