//! Static role → capability table.
//!
//! This is configuration, not runtime state: the table is the single source of
//! truth for every permission predicate in the client.

use serde::{Deserialize, Serialize};

use crate::Role;

/// A named action a role may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageUsers,
    ManageProducts,
    ManageCategories,
    ManageMovements,
    ManageInventories,
    ViewProducts,
    ViewCategories,
    ViewMovements,
    ViewInventories,
    ViewReports,
    ViewPredictions,
    ViewAlerts,
    Export,
}

impl Capability {
    pub const ALL: [Capability; 13] = [
        Capability::ManageUsers,
        Capability::ManageProducts,
        Capability::ManageCategories,
        Capability::ManageMovements,
        Capability::ManageInventories,
        Capability::ViewProducts,
        Capability::ViewCategories,
        Capability::ViewMovements,
        Capability::ViewInventories,
        Capability::ViewReports,
        Capability::ViewPredictions,
        Capability::ViewAlerts,
        Capability::Export,
    ];

    /// Stable dotted name (e.g. `products.manage`), used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageUsers => "users.manage",
            Capability::ManageProducts => "products.manage",
            Capability::ManageCategories => "categories.manage",
            Capability::ManageMovements => "movements.manage",
            Capability::ManageInventories => "inventories.manage",
            Capability::ViewProducts => "products.view",
            Capability::ViewCategories => "categories.view",
            Capability::ViewMovements => "movements.view",
            Capability::ViewInventories => "inventories.view",
            Capability::ViewReports => "reports.view",
            Capability::ViewPredictions => "predictions.view",
            Capability::ViewAlerts => "alerts.view",
            Capability::Export => "export",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ADMIN: &[Capability] = &Capability::ALL;

const MANAGER: &[Capability] = &[
    Capability::ManageProducts,
    Capability::ManageCategories,
    Capability::ManageMovements,
    Capability::ManageInventories,
    Capability::ViewProducts,
    Capability::ViewCategories,
    Capability::ViewMovements,
    Capability::ViewInventories,
    Capability::ViewReports,
    Capability::ViewPredictions,
    Capability::ViewAlerts,
    Capability::Export,
];

// Observers are read-only; reports, predictions, alerts and export are open to
// every authenticated user.
const OBSERVER: &[Capability] = &[
    Capability::ViewProducts,
    Capability::ViewCategories,
    Capability::ViewMovements,
    Capability::ViewInventories,
    Capability::ViewReports,
    Capability::ViewPredictions,
    Capability::ViewAlerts,
    Capability::Export,
];

/// Capabilities granted to `role`.
pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Admin => ADMIN,
        Role::Manager => MANAGER,
        Role::Observer => OBSERVER,
    }
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}
