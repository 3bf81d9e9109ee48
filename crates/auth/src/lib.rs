//! `sara-auth`: pure authorization boundary for the SARA client.
//!
//! This crate is intentionally decoupled from HTTP, storage and routing: it
//! knows the closed set of roles, the static role → capability table and the
//! user record the backend hands out.

pub mod authorize;
pub mod permissions;
pub mod roles;
pub mod user;

pub use authorize::{AuthorizationExplanation, AuthzError, authorize, explain_authorization};
pub use permissions::{Capability, capabilities, has_capability};
pub use roles::{Role, UnknownRole};
pub use user::{User, UserId};
