use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// The set is closed. Wire names are the backend's (`admin`, `gestionnaire`,
/// `observateur`); the variant names are what the roles mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "gestionnaire")]
    Manager,
    #[serde(rename = "observateur")]
    Observer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Observer];

    /// Wire name, as sent and received by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "gestionnaire",
            Role::Observer => "observateur",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator: full access, including user management",
            Role::Manager => "Manager: manages products, categories, movements and inventories",
            Role::Observer => "Observer: read-only access",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Accepts the wire names and their English equivalents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Ok(Role::Admin),
            "gestionnaire" | "manager" => Ok(Role::Manager),
            "observateur" | "observer" => Ok(Role::Observer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
