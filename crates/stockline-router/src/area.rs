//! Portal areas and request path parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RouterError;

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/login";

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// A top-level section of the console, gated by role.
///
/// Each area owns the first path segment: `/admin/...`,
/// `/superstockist/...`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Admin,
    Superstockist,
    Distributor,
    Salesman,
}

impl Area {
    pub const ALL: [Area; 4] = [
        Area::Admin,
        Area::Superstockist,
        Area::Distributor,
        Area::Salesman,
    ];

    /// The first path segment this area owns.
    pub fn segment(self) -> &'static str {
        match self {
            Area::Admin => "admin",
            Area::Superstockist => "superstockist",
            Area::Distributor => "distributor",
            Area::Salesman => "salesman",
        }
    }

    /// Where a visitor lands when redirected into this area.
    pub fn landing_path(self) -> &'static str {
        match self {
            Area::Admin => "/admin/dashboard",
            Area::Superstockist => "/superstockist/dashboard",
            Area::Distributor => "/distributor/dashboard",
            Area::Salesman => "/salesman/dashboard",
        }
    }

    /// Matches a path segment, ignoring ASCII case.
    pub fn from_segment(segment: &str) -> Option<Area> {
        Area::ALL
            .into_iter()
            .find(|area| area.segment().eq_ignore_ascii_case(segment))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for Area {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Area::from_segment(s.trim()).ok_or_else(|| RouterError::UnknownArea(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// A request path, classified by its first segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/` — no area picked yet.
    Root,
    /// `/login` — the public sign-in page.
    Login,
    /// A path inside a gated area. `path` is normalized.
    Area { area: Area, path: String },
    /// Anything else. Gated like an area nobody is allowed into.
    Unknown(String),
}

impl Route {
    /// Parses a request path.
    ///
    /// The query string and fragment are dropped, empty segments are
    /// collapsed (`//admin//orders/` → `/admin/orders`), and the first
    /// segment is matched without regard to ASCII case.
    pub fn parse(path: &str) -> Route {
        let normalized = normalize(path);
        let first = normalized[1..].split('/').next().unwrap_or_default();

        if first.is_empty() {
            Route::Root
        } else if first.eq_ignore_ascii_case("login") {
            Route::Login
        } else if let Some(area) = Area::from_segment(first) {
            Route::Area {
                area,
                path: normalized,
            }
        } else {
            Route::Unknown(normalized)
        }
    }

    /// The normalized path.
    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Login => LOGIN_PATH,
            Route::Area { path, .. } | Route::Unknown(path) => path,
        }
    }

    /// The gated area this route belongs to, if any.
    pub fn area(&self) -> Option<Area> {
        match self {
            Route::Area { area, .. } => Some(*area),
            _ => None,
        }
    }
}

/// Always returns a path starting with exactly one `/`.
fn normalize(path: &str) -> String {
    let without_suffix = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = without_suffix
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}
