//! Error types for the router layer.

use stockline_protocol::Role;

use crate::Area;

/// Errors building or parsing routing configuration.
///
/// Authorization itself never fails — a request always gets a
/// [`Decision`](crate::Decision). These only come from constructing an
/// [`AuthorizationRules`](crate::AuthorizationRules) table that would
/// leave some area or role stranded.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A name that isn't one of the portal areas.
    #[error("unknown area: {0}")]
    UnknownArea(String),

    /// The table has no entry for this area.
    #[error("no rule for area {0}")]
    MissingArea(Area),

    /// The table lets nobody into this area.
    #[error("area {0} admits no roles")]
    EmptyArea(Area),

    /// A role's landing area doesn't admit it, which would redirect
    /// forever.
    #[error("role {role} lands on area {area} but is not allowed in")]
    UnreachableDefault { role: Role, area: Area },
}
