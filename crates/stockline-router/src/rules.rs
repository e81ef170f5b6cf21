//! The role → area table, and where each role lands.
//!
//! Every place in the console that needs to know "may this role see that
//! area?" or "where does this role go after sign-in?" asks this module.
//! Nothing else re-encodes the mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stockline_protocol::Role;

use crate::{Area, RouterError};

/// The area each role is sent to when it lands somewhere it may not be.
///
/// Total over [`Role`]: adding a role without a landing area is a
/// compile error here, not a runtime surprise.
pub fn default_area_for(role: Role) -> Area {
    match role {
        Role::Admin | Role::Management => Area::Admin,
        Role::Superstockist => Area::Superstockist,
        Role::Distributor => Area::Distributor,
        Role::Salesman => Area::Salesman,
    }
}

/// Which roles may enter which area.
///
/// Membership is exact, not hierarchical: admins don't get into the
/// salesman portal by outranking salesmen.
///
/// Every table is checked on construction:
/// - every [`Area`] has an entry admitting at least one role, and
/// - every role is admitted to its [`default_area_for`] area.
///
/// Together these guarantee a redirect always ends somewhere the visitor
/// is allowed, so redirect chains have length one.
///
/// Tables deserialize from a map of area to role list, and fail to
/// deserialize if they break either rule:
///
/// ```rust
/// use stockline_router::{Area, AuthorizationRules};
/// use stockline_protocol::Role;
///
/// let rules: AuthorizationRules = serde_json::from_str(r#"{
///     "admin": ["ADMIN", "MANAGEMENT"],
///     "superstockist": ["SUPERSTOCKIST", "MANAGEMENT"],
///     "distributor": ["DISTRIBUTOR"],
///     "salesman": ["SALESMAN"]
/// }"#).unwrap();
///
/// assert!(rules.permits(Area::Superstockist, Role::Management));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Area, Vec<Role>>", into = "BTreeMap<Area, Vec<Role>>")]
pub struct AuthorizationRules {
    allowed: BTreeMap<Area, Vec<Role>>,
}

impl AuthorizationRules {
    /// Builds and validates a table.
    ///
    /// # Errors
    /// - [`RouterError::MissingArea`] — an area has no entry
    /// - [`RouterError::EmptyArea`] — an area admits nobody
    /// - [`RouterError::UnreachableDefault`] — a role's landing area
    ///   doesn't admit it
    pub fn new(
        table: impl IntoIterator<Item = (Area, Vec<Role>)>,
    ) -> Result<Self, RouterError> {
        let mut allowed: BTreeMap<Area, Vec<Role>> = BTreeMap::new();
        for (area, roles) in table {
            let entry = allowed.entry(area).or_default();
            for role in roles {
                if !entry.contains(&role) {
                    entry.push(role);
                }
            }
        }

        for area in Area::ALL {
            match allowed.get(&area) {
                None => return Err(RouterError::MissingArea(area)),
                Some(roles) if roles.is_empty() => return Err(RouterError::EmptyArea(area)),
                Some(_) => {}
            }
        }

        let rules = Self { allowed };
        for role in Role::ALL {
            let area = default_area_for(role);
            if !rules.permits(area, role) {
                return Err(RouterError::UnreachableDefault { role, area });
            }
        }
        Ok(rules)
    }

    /// The roles admitted to `area`.
    pub fn allowed_roles(&self, area: Area) -> &[Role] {
        self.allowed.get(&area).map(Vec::as_slice).unwrap_or_default()
    }

    /// `true` iff `role` may enter `area`.
    pub fn permits(&self, area: Area, role: Role) -> bool {
        self.allowed_roles(area).contains(&role)
    }

    /// Every area `role` may enter, in declaration order. Useful for
    /// building navigation menus.
    pub fn reachable_areas(&self, role: Role) -> Vec<Area> {
        Area::ALL
            .into_iter()
            .filter(|area| self.permits(*area, role))
            .collect()
    }
}

/// One portal per role; management shares the admin portal.
impl Default for AuthorizationRules {
    fn default() -> Self {
        let mut allowed = BTreeMap::new();
        allowed.insert(Area::Admin, vec![Role::Admin, Role::Management]);
        allowed.insert(Area::Superstockist, vec![Role::Superstockist]);
        allowed.insert(Area::Distributor, vec![Role::Distributor]);
        allowed.insert(Area::Salesman, vec![Role::Salesman]);
        Self { allowed }
    }
}

impl TryFrom<BTreeMap<Area, Vec<Role>>> for AuthorizationRules {
    type Error = RouterError;

    fn try_from(table: BTreeMap<Area, Vec<Role>>) -> Result<Self, Self::Error> {
        Self::new(table)
    }
}

impl From<AuthorizationRules> for BTreeMap<Area, Vec<Role>> {
    fn from(rules: AuthorizationRules) -> Self {
        rules.allowed
    }
}
