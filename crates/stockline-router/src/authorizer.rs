//! The per-navigation decision.

use std::fmt;

use stockline_session::SessionSnapshot;

use crate::{AuthorizationRules, LOGIN_PATH, Route, default_area_for};

/// What the navigation layer should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the requested page.
    Allow,
    /// Send the visitor to this path instead.
    Redirect(String),
    /// The session store is still loading; show a placeholder and ask
    /// again once it settles.
    Defer,
}

impl Decision {
    /// The redirect target, if this is a redirect.
    pub fn target(&self) -> Option<&str> {
        match self {
            Decision::Redirect(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("allow"),
            Decision::Redirect(path) => write!(f, "redirect to {path}"),
            Decision::Defer => f.write_str("defer"),
        }
    }
}

/// Decides, per request, where a visitor may go.
///
/// The algorithm, in order:
///
/// 1. Store not ready → [`Decision::Defer`].
/// 2. Nobody signed in → the login page is allowed, everything else
///    redirects to it.
/// 3. Signed in with a role outside the closed set → handled exactly
///    like step 2. Unknown roles get no permissions.
/// 4. Signed in and the route's area admits the role → [`Decision::Allow`].
/// 5. Otherwise (wrong area, root, login page, unknown path) → redirect
///    to the role's landing page.
///
/// Because every role is admitted to its landing area (enforced by
/// [`AuthorizationRules`]), step 5's target always passes step 4.
#[derive(Debug, Clone, Default)]
pub struct RouteAuthorizer {
    rules: AuthorizationRules,
}

impl RouteAuthorizer {
    pub fn new(rules: AuthorizationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AuthorizationRules {
        &self.rules
    }

    /// Parses `path` and decides.
    pub fn authorize(&self, snapshot: &SessionSnapshot, path: &str) -> Decision {
        self.authorize_route(snapshot, &Route::parse(path))
    }

    /// Decides for an already-parsed route.
    pub fn authorize_route(&self, snapshot: &SessionSnapshot, route: &Route) -> Decision {
        if !snapshot.is_ready() {
            return Decision::Defer;
        }

        let Some(identity) = &snapshot.identity else {
            return anonymous(route);
        };

        let Some(role) = identity.role() else {
            tracing::warn!(
                user_id = %identity.id,
                role = %identity.role,
                path = route.path(),
                "unrecognized role, treating as signed out"
            );
            return anonymous(route);
        };

        match route.area() {
            Some(area) if self.rules.permits(area, role) => Decision::Allow,
            _ => {
                let target = default_area_for(role).landing_path();
                tracing::debug!(%role, path = route.path(), redirect = target, "redirecting to landing page");
                Decision::Redirect(target.to_string())
            }
        }
    }
}

fn anonymous(route: &Route) -> Decision {
    match route {
        Route::Login => Decision::Allow,
        _ => Decision::Redirect(LOGIN_PATH.to_string()),
    }
}
