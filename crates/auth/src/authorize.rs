use serde::Serialize;
use thiserror::Error;

use crate::{Capability, Role, User, capabilities};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: role '{role}' lacks capability '{capability}'")]
    Forbidden { role: Role, capability: Capability },
}

/// Check that `user` may perform `required`.
///
/// - No IO
/// - No panics
/// - Absent user is denied everything
pub fn authorize(user: Option<&User>, required: Capability) -> Result<(), AuthzError> {
    let user = user.ok_or(AuthzError::Unauthenticated)?;
    if user.can(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: user.role,
            capability: required,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Why an authorization decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub required: Capability,
    pub granted: bool,
    pub role: Option<Role>,
    pub effective: Vec<Capability>,
    pub reason: String,
    /// Roles that would grant `required`, when denied.
    pub granting_roles: Vec<Role>,
}

/// Explain the decision `authorize` would make.
pub fn explain_authorization(user: Option<&User>, required: Capability) -> AuthorizationExplanation {
    let granting_roles: Vec<Role> = Role::ALL
        .into_iter()
        .filter(|r| capabilities(*r).contains(&required))
        .collect();

    let Some(user) = user else {
        return AuthorizationExplanation {
            required,
            granted: false,
            role: None,
            effective: Vec::new(),
            reason: "no user is logged in".to_string(),
            granting_roles,
        };
    };

    let effective = capabilities(user.role).to_vec();
    if effective.contains(&required) {
        AuthorizationExplanation {
            required,
            granted: true,
            role: Some(user.role),
            effective,
            reason: format!("role '{}' grants '{}'", user.role, required),
            granting_roles: Vec::new(),
        }
    } else {
        AuthorizationExplanation {
            required,
            granted: false,
            role: Some(user.role),
            effective,
            reason: format!("role '{}' does not grant '{}'", user.role, required),
            granting_roles,
        }
    }
}
