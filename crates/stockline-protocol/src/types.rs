//! Core wire types: roles, identities, and login payloads.
//!
//! Every type here travels in an HTTP body between the console and the
//! backend API, or is persisted alongside the session token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The closed set of roles a signed-in actor can hold.
///
/// Roles form a total order used for hierarchical checks (see
/// [`Role::rank`]). Area access is NOT hierarchical — an admin doesn't
/// get into the salesman portal just because it outranks a salesman.
/// That exact-membership rule lives in the router crate.
///
/// `#[serde(rename_all = "SCREAMING_SNAKE_CASE")]` makes the JSON
/// representation match the backend: `"ADMIN"`, `"SUPERSTOCKIST"`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Salesman,
    Distributor,
    Superstockist,
    Management,
    Admin,
}

impl Role {
    /// Every role, lowest rank first.
    pub const ALL: [Role; 5] = [
        Role::Salesman,
        Role::Distributor,
        Role::Superstockist,
        Role::Management,
        Role::Admin,
    ];

    /// Position in the role hierarchy. Higher rank means a superset of
    /// the permissions of every lower rank for hierarchical checks.
    pub fn rank(self) -> u8 {
        match self {
            Role::Admin => 4,
            Role::Management => 3,
            Role::Superstockist => 2,
            Role::Distributor => 1,
            Role::Salesman => 0,
        }
    }

    /// Returns `true` if this role ranks at or above `required`.
    pub fn at_least(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    /// The wire name, e.g. `"SUPERSTOCKIST"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Management => "MANAGEMENT",
            Role::Superstockist => "SUPERSTOCKIST",
            Role::Distributor => "DISTRIBUTOR",
            Role::Salesman => "SALESMAN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a role name, ignoring ASCII case and surrounding whitespace.
impl FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ProtocolError::UnknownRole(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// AssignedRole
// ---------------------------------------------------------------------------

/// The role field exactly as the backend (or persisted data) sent it.
///
/// A profile carrying a role outside the closed set must still decode —
/// rejecting it would turn corrupted data into a crash. Instead it lands
/// in [`AssignedRole::Unrecognized`], and every permission check treats
/// it as "no permissions".
///
/// `#[serde(from = "String", into = "String")]` routes (de)serialization
/// through the `From` impls below, so on the wire this is a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssignedRole {
    Known(Role),
    Unrecognized(String),
}

impl AssignedRole {
    /// The role, if it is one of the closed set.
    pub fn known(&self) -> Option<Role> {
        match self {
            AssignedRole::Known(role) => Some(*role),
            AssignedRole::Unrecognized(_) => None,
        }
    }
}

impl From<Role> for AssignedRole {
    fn from(role: Role) -> Self {
        AssignedRole::Known(role)
    }
}

impl From<String> for AssignedRole {
    fn from(raw: String) -> Self {
        match raw.parse::<Role>() {
            Ok(role) => AssignedRole::Known(role),
            Err(_) => AssignedRole::Unrecognized(raw),
        }
    }
}

impl From<AssignedRole> for String {
    fn from(role: AssignedRole) -> Self {
        match role {
            AssignedRole::Known(role) => role.as_str().to_string(),
            AssignedRole::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for AssignedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignedRole::Known(role) => f.write_str(role.as_str()),
            AssignedRole::Unrecognized(raw) => write!(f, "unrecognized({raw})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The signed-in actor, as returned by the backend's profile endpoint.
///
/// `territory` accepts `region` as an alias; older backend builds used
/// that name for the same field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: AssignedRole,
    #[serde(default, alias = "region", skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    /// The identity's role, or `None` if the backend sent something
    /// outside the closed role set.
    pub fn role(&self) -> Option<Role> {
        self.role.known()
    }
}

// ---------------------------------------------------------------------------
// Login payloads
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
///
/// `role` is the portal the user picked on the login form. It is
/// advisory: the backend's answer decides the actual role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Successful response of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}
